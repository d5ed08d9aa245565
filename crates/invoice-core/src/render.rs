//! HTTP client for the remote PDF rendering service.

use crate::error::{InvoiceError, Result};
use crate::types::{DocumentPayload, RenderedArtifact};
use reqwest::header::{HeaderValue, ACCEPT, CONTENT_TYPE};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct RenderClient {
    http: reqwest::Client,
    endpoint: String,
}

impl RenderClient {
    /// `timeout` bounds the whole request, body included.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let endpoint = endpoint.into();
        validate_endpoint(&endpoint)?;
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(RenderClient { http, endpoint })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST `payload` as JSON and return the rendered bytes.
    ///
    /// Anything other than a 2xx response with a non-empty, non-textual body
    /// is an error.
    pub async fn render(&self, payload: &DocumentPayload) -> Result<RenderedArtifact> {
        let body = serde_json::to_vec(payload)?;
        tracing::debug!(
            endpoint = %self.endpoint,
            invoice = payload.invoice_number().unwrap_or("-"),
            bytes = body.len(),
            "submitting render request"
        );

        let resp = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/pdf")
            .body(body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(InvoiceError::RenderStatus {
                status: status.as_u16(),
            });
        }

        check_content_type(resp.headers().get(CONTENT_TYPE))?;

        let bytes = resp.bytes().await?;
        if bytes.is_empty() {
            return Err(InvoiceError::EmptyArtifact);
        }

        let artifact = RenderedArtifact::from(bytes);
        if !artifact.looks_like_pdf() {
            tracing::warn!(bytes = artifact.len(), "render response has no %PDF header");
        }
        tracing::info!(bytes = artifact.len(), "render succeeded");
        Ok(artifact)
    }
}

pub fn validate_endpoint(endpoint: &str) -> Result<()> {
    match reqwest::Url::parse(endpoint) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Ok(()),
        _ => Err(InvoiceError::InvalidEndpoint(endpoint.to_string())),
    }
}

/// A missing content type is accepted; an unreadable or textual one is not.
fn check_content_type(value: Option<&HeaderValue>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    match value.to_str() {
        Ok(ct) if !is_textual(ct) => Ok(()),
        Ok(ct) => Err(InvoiceError::UnexpectedContentType(ct.to_string())),
        Err(_) => Err(InvoiceError::UnexpectedContentType(
            String::from_utf8_lossy(value.as_bytes()).into_owned(),
        )),
    }
}

fn is_textual(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    mime.starts_with("text/") || mime == "application/json" || mime.ends_with("+json")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
