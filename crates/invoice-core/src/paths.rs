use crate::error::{InvoiceError, Result};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const INVOICE_DIR: &str = ".invoice";
pub const CONFIG_FILE: &str = ".invoice/config.yaml";
pub const STORAGE_FILE: &str = ".invoice/storage.json";

/// Fixed filename every download is saved under.
pub const DOWNLOAD_FILENAME: &str = "invoice.pdf";

pub const PREVIEW_PREFIX: &str = "invoice-preview-";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn invoice_dir(root: &Path) -> PathBuf {
    root.join(INVOICE_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn storage_path(root: &Path) -> PathBuf {
    root.join(STORAGE_FILE)
}

/// `~/Downloads`, the default target for `download`.
pub fn default_download_dir() -> Result<PathBuf> {
    let home = home::home_dir().ok_or(InvoiceError::HomeNotFound)?;
    Ok(home.join("Downloads"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
