use crate::output::print_json;
use anyhow::Context;
use clap::Args;
use invoice_core::{config::Config, Notifier, RenderedArtifact, SaveOutcome};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// JSON payload file, or `-` for stdin
    pub payload: String,

    /// Save the PDF as invoice.pdf in the download directory
    #[arg(long)]
    pub download: bool,

    /// Open the PDF in the default viewer until Enter is pressed
    #[arg(long)]
    pub preview: bool,

    /// Append the payload to the saved invoices
    #[arg(long)]
    pub save: bool,

    /// Render service URL (overrides render.endpoint)
    #[arg(long, env = "INVOICE_PDF_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Download directory (overrides download.dir)
    #[arg(long)]
    pub out_dir: Option<PathBuf>,
}

struct CliNotifier {
    quiet: bool,
}

impl Notifier for CliNotifier {
    fn pdf_generated(&self, artifact: &RenderedArtifact) {
        if !self.quiet {
            println!("PDF generated ({} bytes)", artifact.len());
        }
    }
}

pub fn run(root: &Path, args: GenerateArgs, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let payload = super::read_payload(&args.payload)?;
    let orch = super::orchestrator(root, &config, args.endpoint.as_deref(), args.out_dir)?
        .with_notifier(Arc::new(CliNotifier { quiet: json }));

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(orch.generate(&payload))
        .with_context(|| format!("render via {} failed", orch.render_client().endpoint()))?;

    let downloaded = if args.download { orch.download()? } else { None };
    let saved = if args.save {
        Some(orch.save(|| payload.clone())?)
    } else {
        None
    };
    let previewed = if args.preview { orch.preview()? } else { None };

    if json {
        print_json(&serde_json::json!({
            "bytes": orch.artifact().len(),
            "downloaded": downloaded,
            "saved": saved.map(|o| match o {
                SaveOutcome::Saved { count } => Some(count),
                SaveOutcome::Skipped => None,
            }),
            "preview": previewed,
        }))?;
    } else {
        if let Some(path) = &downloaded {
            println!("Downloaded: {}", path.display());
        }
        match saved {
            Some(SaveOutcome::Saved { count }) => println!("Saved ({count} total)"),
            Some(SaveOutcome::Skipped) => println!("Save skipped"),
            None => {}
        }
    }

    if let Some(path) = previewed {
        if !json {
            println!("Previewing {}; press Enter to close", path.display());
        }
        let mut line = String::new();
        std::io::stdin().read_line(&mut line)?;
        orch.close_preview();
    }

    Ok(())
}
