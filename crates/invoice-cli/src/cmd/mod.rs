pub mod config;
pub mod generate;
pub mod init;
pub mod save;
pub mod saved;

use anyhow::Context;
use invoice_core::{
    config::Config, paths, DocumentPayload, FileStore, PdfOrchestrator, RenderClient,
};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Read a JSON payload from `source`, where `-` means stdin.
pub fn read_payload(source: &str) -> anyhow::Result<DocumentPayload> {
    let data = if source == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read payload from stdin")?;
        buf
    } else {
        std::fs::read_to_string(source).with_context(|| format!("failed to read {source}"))?
    };
    DocumentPayload::from_json(&data).with_context(|| format!("{source} is not valid JSON"))
}

/// Build an orchestrator wired to the project's file store.
pub fn orchestrator(
    root: &Path,
    config: &Config,
    endpoint: Option<&str>,
    out_dir: Option<PathBuf>,
) -> anyhow::Result<PdfOrchestrator> {
    let endpoint = endpoint.unwrap_or(&config.render.endpoint);
    let client = RenderClient::new(endpoint, config.render.timeout())
        .context("failed to create render client")?;
    let store = FileStore::new(paths::storage_path(root));
    let mut orch = PdfOrchestrator::new(client, store).with_save_guard(config.save.guard());
    // Without an explicit dir, ~/Downloads is resolved only when downloading.
    if let Some(dir) = out_dir.or_else(|| config.download.dir.clone()) {
        orch = orch.with_download_dir(dir);
    }
    Ok(orch)
}
