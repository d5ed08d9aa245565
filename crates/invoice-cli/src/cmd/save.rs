use crate::output::print_json;
use anyhow::Context;
use invoice_core::{config::Config, SaveGuard, SaveOutcome};
use std::path::Path;

pub fn run(root: &Path, source: &str, always: bool, json: bool) -> anyhow::Result<()> {
    let config = Config::load(root).context("failed to load config")?;
    let mut orch = super::orchestrator(root, &config, None, None)?;
    if always {
        orch = orch.with_save_guard(SaveGuard::Always);
    }

    let payload = super::read_payload(source)?;
    let outcome = orch
        .save(move || payload)
        .context("failed to save invoice values")?;

    match (outcome, json) {
        (SaveOutcome::Saved { count }, true) => {
            print_json(&serde_json::json!({ "saved": true, "count": count }))?
        }
        (SaveOutcome::Skipped, true) => print_json(&serde_json::json!({ "saved": false }))?,
        (SaveOutcome::Saved { count }, false) => println!("Saved ({count} total)"),
        (SaveOutcome::Skipped, false) => {
            println!("Save skipped: no PDF has been generated (use --always to save anyway)")
        }
    }
    Ok(())
}
