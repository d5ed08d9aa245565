use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// DocumentPayload
// ---------------------------------------------------------------------------

/// The invoice form values submitted for rendering.
///
/// The field layout belongs to the embedding form, so the payload is kept as
/// raw JSON and serialized verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentPayload(Value);

impl DocumentPayload {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    /// The `invoiceNumber` field, if the payload carries one.
    pub fn invoice_number(&self) -> Option<&str> {
        self.0.get("invoiceNumber").and_then(Value::as_str)
    }

    /// Number of top-level fields (0 for non-object payloads).
    pub fn field_count(&self) -> usize {
        self.0.as_object().map(|m| m.len()).unwrap_or(0)
    }
}

impl From<Value> for DocumentPayload {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

// ---------------------------------------------------------------------------
// RenderedArtifact
// ---------------------------------------------------------------------------

const PDF_MAGIC: &[u8] = b"%PDF";

/// Opaque bytes returned by the render service. Cloning is cheap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedArtifact(Bytes);

impl RenderedArtifact {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn looks_like_pdf(&self) -> bool {
        self.0.starts_with(PDF_MAGIC)
    }
}

impl From<Bytes> for RenderedArtifact {
    fn from(bytes: Bytes) -> Self {
        Self(bytes)
    }
}

impl From<Vec<u8>> for RenderedArtifact {
    fn from(bytes: Vec<u8>) -> Self {
        Self(Bytes::from(bytes))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_serializes_transparently() {
        let payload = DocumentPayload::new(json!({"invoiceNumber": "INV-1", "total": 12.5}));
        let s = serde_json::to_string(&payload).unwrap();
        assert_eq!(
            serde_json::from_str::<Value>(&s).unwrap(),
            json!({"invoiceNumber": "INV-1", "total": 12.5})
        );
    }

    #[test]
    fn invoice_number_is_optional() {
        let with = DocumentPayload::new(json!({"invoiceNumber": "INV-7"}));
        let without = DocumentPayload::new(json!({"a": 1}));
        assert_eq!(with.invoice_number(), Some("INV-7"));
        assert_eq!(without.invoice_number(), None);
        assert_eq!(without.field_count(), 1);
    }

    #[test]
    fn artifact_starts_empty() {
        let artifact = RenderedArtifact::empty();
        assert!(artifact.is_empty());
        assert!(!artifact.looks_like_pdf());
    }

    #[test]
    fn artifact_detects_pdf_magic() {
        let artifact = RenderedArtifact::from(vec![0x25, 0x50, 0x44, 0x46, 0x2d]);
        assert_eq!(artifact.len(), 5);
        assert!(artifact.looks_like_pdf());
        assert!(!RenderedArtifact::from(b"<html>".to_vec()).looks_like_pdf());
    }
}
