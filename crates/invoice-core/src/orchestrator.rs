//! `PdfOrchestrator`: owns the generated PDF for one invoice form and offers
//! the follow-on actions on it.
//!
//! ```text
//! DocumentPayload ──generate──▶ RenderClient ──POST──▶ render service
//!                                     │
//!                                     ▼
//!                             RenderedArtifact ──▶ download / preview
//!
//! current form values ──save──▶ KeyValueStore["savedInvoices"]
//! ```
//!
//! All state sits behind one mutex that is never held across the network
//! await, so overlapping `generate` calls are allowed and the last response
//! to arrive wins.

use crate::error::Result;
use crate::hooks::{LogNotifier, Notifier, Opener, SystemOpener};
use crate::io::atomic_write;
use crate::paths::{self, DOWNLOAD_FILENAME, PREVIEW_PREFIX};
use crate::render::RenderClient;
use crate::storage::{append_saved_invoice, load_saved_invoices, KeyValueStore};
use crate::types::{DocumentPayload, RenderedArtifact};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tempfile::TempPath;

// ---------------------------------------------------------------------------
// SaveGuard / SaveOutcome
// ---------------------------------------------------------------------------

/// Whether `save` requires a generated PDF before it stores form values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SaveGuard {
    #[default]
    RequireArtifact,
    Always,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Values were appended; `count` is the new length of the saved sequence.
    Saved { count: usize },
    /// The guard refused: nothing was read or written.
    Skipped,
}

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Default)]
struct State {
    artifact: RenderedArtifact,
    /// Bumped each time a generation replaces `artifact`.
    generation: u64,
    in_flight: usize,
    preview: Option<TempPath>,
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    // Every critical section leaves State consistent, so a poisoned lock is safe to reuse.
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Marks one render request as in flight until dropped.
struct InFlight<'a> {
    state: &'a Mutex<State>,
}

impl<'a> InFlight<'a> {
    fn enter(state: &'a Mutex<State>) -> Self {
        lock(state).in_flight += 1;
        InFlight { state }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut state = lock(self.state);
        state.in_flight = state.in_flight.saturating_sub(1);
    }
}

fn release_preview(path: TempPath) {
    let shown = path.display().to_string();
    if let Err(e) = path.close() {
        tracing::warn!(path = %shown, error = %e, "failed to remove preview file");
    }
}

// ---------------------------------------------------------------------------
// PdfOrchestrator
// ---------------------------------------------------------------------------

pub struct PdfOrchestrator {
    client: RenderClient,
    store: Box<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
    opener: Box<dyn Opener>,
    download_dir: Option<PathBuf>,
    save_guard: SaveGuard,
    state: Mutex<State>,
}

impl PdfOrchestrator {
    /// Start with an empty artifact, a [`LogNotifier`], a [`SystemOpener`]
    /// and [`SaveGuard::RequireArtifact`]. Downloads go to `~/Downloads`
    /// unless [`with_download_dir`](Self::with_download_dir) says otherwise.
    pub fn new(client: RenderClient, store: impl KeyValueStore + 'static) -> Self {
        PdfOrchestrator {
            client,
            store: Box::new(store),
            notifier: Arc::new(LogNotifier),
            opener: Box::new(SystemOpener),
            download_dir: None,
            save_guard: SaveGuard::default(),
            state: Mutex::new(State::default()),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_opener(mut self, opener: impl Opener + 'static) -> Self {
        self.opener = Box::new(opener);
        self
    }

    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = Some(dir.into());
        self
    }

    pub fn with_save_guard(mut self, guard: SaveGuard) -> Self {
        self.save_guard = guard;
        self
    }

    pub fn render_client(&self) -> &RenderClient {
        &self.client
    }

    /// The current PDF bytes (empty until the first successful generation).
    pub fn artifact(&self) -> RenderedArtifact {
        lock(&self.state).artifact.clone()
    }

    pub fn has_artifact(&self) -> bool {
        !lock(&self.state).artifact.is_empty()
    }

    pub fn is_loading(&self) -> bool {
        lock(&self.state).in_flight > 0
    }

    // -----------------------------------------------------------------------
    // generate
    // -----------------------------------------------------------------------

    /// Render `payload` and make the result the current artifact.
    ///
    /// On failure the error is logged and returned; the previous artifact
    /// stays and no notification fires. Loading is cleared on every path,
    /// including when this future is dropped before completion.
    pub async fn generate(&self, payload: &DocumentPayload) -> Result<()> {
        let _in_flight = InFlight::enter(&self.state);

        let artifact = match self.client.render(payload).await {
            Ok(artifact) => artifact,
            Err(e) => {
                tracing::error!(
                    endpoint = %self.client.endpoint(),
                    invoice = payload.invoice_number().unwrap_or("-"),
                    error = %e,
                    "PDF generation failed"
                );
                return Err(e);
            }
        };

        let stale_preview = {
            let mut state = lock(&self.state);
            state.artifact = artifact.clone();
            state.generation += 1;
            state.preview.take()
        };
        if let Some(path) = stale_preview {
            release_preview(path);
        }

        self.notifier.pdf_generated(&artifact);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // download / preview
    // -----------------------------------------------------------------------

    /// Save the artifact as `invoice.pdf` in the download directory.
    /// Returns `None` (and touches nothing) when there is no artifact.
    pub fn download(&self) -> Result<Option<PathBuf>> {
        let artifact = self.artifact();
        if artifact.is_empty() {
            tracing::debug!("download skipped: no PDF generated");
            return Ok(None);
        }

        let dir = match &self.download_dir {
            Some(dir) => dir.clone(),
            None => paths::default_download_dir()?,
        };
        let dest = dir.join(DOWNLOAD_FILENAME);
        atomic_write(&dest, artifact.as_bytes())?;
        tracing::info!(path = %dest.display(), bytes = artifact.len(), "invoice downloaded");
        Ok(Some(dest))
    }

    /// Write the artifact to a temporary file and open it in the viewer.
    ///
    /// The file stays until the next `preview`, `close_preview`, a successful
    /// `generate`, or until the orchestrator is dropped. If a `generate`
    /// replaces the artifact while the viewer is opening, the file is removed
    /// again and `None` is returned.
    pub fn preview(&self) -> Result<Option<PathBuf>> {
        let (artifact, generation) = {
            let state = lock(&self.state);
            (state.artifact.clone(), state.generation)
        };
        if artifact.is_empty() {
            tracing::debug!("preview skipped: no PDF generated");
            return Ok(None);
        }

        self.close_preview();

        let mut file = tempfile::Builder::new()
            .prefix(PREVIEW_PREFIX)
            .suffix(".pdf")
            .tempfile()?;
        file.write_all(artifact.as_bytes())?;
        file.flush()?;
        let temp_path = file.into_temp_path();

        // On failure temp_path drops here and the file goes with it.
        self.opener.open(&temp_path)?;

        let path = temp_path.to_path_buf();
        let released = {
            let mut state = lock(&self.state);
            if state.generation != generation {
                Err(temp_path)
            } else {
                Ok(state.preview.replace(temp_path))
            }
        };
        match released {
            Err(stale) => {
                tracing::debug!(path = %path.display(), "artifact replaced while opening preview");
                release_preview(stale);
                return Ok(None);
            }
            Ok(Some(old)) => release_preview(old),
            Ok(None) => {}
        }
        tracing::info!(path = %path.display(), "preview opened");
        Ok(Some(path))
    }

    /// Release the live preview file. Returns whether there was one.
    pub fn close_preview(&self) -> bool {
        let previous = lock(&self.state).preview.take();
        match previous {
            Some(path) => {
                release_preview(path);
                true
            }
            None => false,
        }
    }

    // -----------------------------------------------------------------------
    // save
    // -----------------------------------------------------------------------

    /// Append the current form values to the saved invoice sequence.
    ///
    /// `current_values` is only called once the guard has passed.
    pub fn save<F>(&self, current_values: F) -> Result<SaveOutcome>
    where
        F: FnOnce() -> DocumentPayload,
    {
        if self.save_guard == SaveGuard::RequireArtifact && !self.has_artifact() {
            tracing::warn!("save skipped: no PDF generated");
            return Ok(SaveOutcome::Skipped);
        }

        let values = current_values();
        let invoice = values.invoice_number().map(str::to_owned);
        let count = append_saved_invoice(self.store.as_ref(), values)?;
        tracing::info!(
            invoice = invoice.as_deref().unwrap_or("-"),
            count,
            "invoice values saved"
        );
        Ok(SaveOutcome::Saved { count })
    }

    /// Every saved snapshot, oldest first.
    pub fn saved(&self) -> Result<Vec<DocumentPayload>> {
        load_saved_invoices(self.store.as_ref())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
