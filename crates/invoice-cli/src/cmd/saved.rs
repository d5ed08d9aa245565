use crate::output::{print_json, print_table};
use anyhow::Context;
use clap::Subcommand;
use invoice_core::{paths, storage::load_saved_invoices, DocumentPayload, FileStore};
use std::path::Path;

#[derive(Subcommand, Debug)]
pub enum SavedSubcommand {
    /// List saved invoices, oldest first
    List,
    /// Print one saved invoice
    Show {
        /// Position as shown by `saved list` (1-based)
        index: usize,
    },
}

pub fn run(root: &Path, subcmd: SavedSubcommand, json: bool) -> anyhow::Result<()> {
    let store = FileStore::new(paths::storage_path(root));
    let saved = load_saved_invoices(&store).context("failed to read saved invoices")?;
    match subcmd {
        SavedSubcommand::List => list(&saved, json),
        SavedSubcommand::Show { index } => show(&saved, index),
    }
}

fn list(saved: &[DocumentPayload], json: bool) -> anyhow::Result<()> {
    if json {
        return print_json(&saved);
    }
    if saved.is_empty() {
        println!("No saved invoices.");
        return Ok(());
    }
    let rows: Vec<Vec<String>> = saved
        .iter()
        .enumerate()
        .map(|(i, p)| {
            vec![
                (i + 1).to_string(),
                p.invoice_number().unwrap_or("-").to_string(),
                p.field_count().to_string(),
            ]
        })
        .collect();
    print_table(&["#", "INVOICE", "FIELDS"], &rows);
    Ok(())
}

fn show(saved: &[DocumentPayload], index: usize) -> anyhow::Result<()> {
    let Some(payload) = index.checked_sub(1).and_then(|i| saved.get(i)) else {
        anyhow::bail!("no saved invoice #{index} ({} saved)", saved.len());
    };
    print_json(payload)
}
