//! Collaborators the embedding UI supplies to the orchestrator.

use crate::error::Result;
use crate::types::RenderedArtifact;
use std::path::Path;

/// Told about each successful generation (the "PDF ready" toast).
pub trait Notifier: Send + Sync {
    fn pdf_generated(&self, artifact: &RenderedArtifact);
}

/// Hands a file to an external viewer.
pub trait Opener: Send + Sync {
    fn open(&self, path: &Path) -> Result<()>;
}

/// Emits a tracing event per generation.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn pdf_generated(&self, artifact: &RenderedArtifact) {
        tracing::info!(bytes = artifact.len(), "PDF generated successfully");
    }
}

/// Opens files with the desktop's default application.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemOpener;

impl Opener for SystemOpener {
    fn open(&self, path: &Path) -> Result<()> {
        open::that(path)?;
        Ok(())
    }
}
