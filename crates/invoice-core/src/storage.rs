use crate::error::{InvoiceError, Result};
use crate::io::atomic_write;
use crate::types::DocumentPayload;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};

/// Key the saved invoice sequence lives under.
pub const SAVED_INVOICES_KEY: &str = "savedInvoices";

// ---------------------------------------------------------------------------
// KeyValueStore
// ---------------------------------------------------------------------------

/// String-keyed persistent state with get/set semantics.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Arc<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// In-process store. Contents vanish with the value.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// All keys in one JSON object on disk, rewritten atomically on every `set`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileStore {
    /// The file is created lazily on the first `set`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let data = std::fs::read_to_string(&self.path)?;
        if data.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&data).map_err(|source| InvoiceError::CorruptStore {
            key: self.path.display().to_string(),
            source,
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut all = self.read_all()?;
        all.insert(key.to_string(), value.to_string());
        let data = serde_json::to_string_pretty(&all)?;
        atomic_write(&self.path, data.as_bytes())
    }
}

// ---------------------------------------------------------------------------
// Saved invoice sequence
// ---------------------------------------------------------------------------

/// Read the saved invoice sequence in insertion order.
///
/// A missing or blank value is an empty sequence. Anything that does not
/// parse as a JSON array is `CorruptStore`.
pub fn load_saved_invoices(store: &dyn KeyValueStore) -> Result<Vec<DocumentPayload>> {
    let Some(raw) = store.get(SAVED_INVOICES_KEY)? else {
        return Ok(Vec::new());
    };
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&raw).map_err(|source| InvoiceError::CorruptStore {
        key: SAVED_INVOICES_KEY.to_string(),
        source,
    })
}

/// Append one snapshot and write the whole sequence back.
/// Returns the new length. Existing entries are left untouched.
pub fn append_saved_invoice(store: &dyn KeyValueStore, payload: DocumentPayload) -> Result<usize> {
    let mut saved = load_saved_invoices(store)?;
    saved.push(payload);
    let data = serde_json::to_string(&saved)?;
    store.set(SAVED_INVOICES_KEY, &data)?;
    Ok(saved.len())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn payload(v: serde_json::Value) -> DocumentPayload {
        DocumentPayload::new(v)
    }

    #[test]
    fn memory_store_get_missing_is_none() {
        let store = MemoryStore::new();
        assert_eq!(store.get("nope").unwrap(), None);
    }

    #[test]
    fn memory_store_set_overwrites() {
        let store = MemoryStore::new();
        store.set("k", "1").unwrap();
        store.set("k", "2").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn file_store_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".invoice/storage.json");
        FileStore::new(&path).set("savedInvoices", "[]").unwrap();
        let reopened = FileStore::new(&path);
        assert_eq!(reopened.get("savedInvoices").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn file_store_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("storage.json"));
        store.set("theme", "dark").unwrap();
        store.set("savedInvoices", "[]").unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn file_store_missing_file_reads_empty() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(dir.path().join("absent.json"));
        assert_eq!(store.get("savedInvoices").unwrap(), None);
    }

    #[test]
    fn file_store_corrupt_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = FileStore::new(&path).get("savedInvoices").unwrap_err();
        assert!(matches!(err, InvoiceError::CorruptStore { .. }));
    }

    #[test]
    fn append_on_empty_store_writes_array() {
        let store = MemoryStore::new();
        assert_eq!(append_saved_invoice(&store, payload(json!({"a": 1}))).unwrap(), 1);
        assert_eq!(append_saved_invoice(&store, payload(json!({"a": 2}))).unwrap(), 2);
        let raw = store.get(SAVED_INVOICES_KEY).unwrap().unwrap();
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&raw).unwrap(),
            json!([{"a": 1}, {"a": 2}])
        );
    }

    #[test]
    fn blank_value_reads_as_empty() {
        let store = MemoryStore::new();
        store.set(SAVED_INVOICES_KEY, "  ").unwrap();
        assert!(load_saved_invoices(&store).unwrap().is_empty());
    }

    #[test]
    fn malformed_value_is_surfaced_and_not_overwritten() {
        let store = MemoryStore::new();
        store.set(SAVED_INVOICES_KEY, r#"{"a":1}"#).unwrap();
        let err = append_saved_invoice(&store, payload(json!({"a": 2}))).unwrap_err();
        assert!(matches!(err, InvoiceError::CorruptStore { ref key, .. } if key == SAVED_INVOICES_KEY));
        assert_eq!(
            store.get(SAVED_INVOICES_KEY).unwrap().as_deref(),
            Some(r#"{"a":1}"#)
        );
    }
}
