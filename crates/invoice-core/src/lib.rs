//! `invoice-core`: generate invoice PDFs through a remote rendering service,
//! then download, preview, or save the form values that produced them.
//!
//! The entry point is [`PdfOrchestrator`]; see the `orchestrator` module.

pub mod config;
pub mod error;
pub mod hooks;
pub mod io;
pub mod orchestrator;
pub mod paths;
pub mod render;
pub mod storage;
pub mod types;

pub use error::{InvoiceError, Result};
pub use hooks::{LogNotifier, Notifier, Opener, SystemOpener};
pub use orchestrator::{PdfOrchestrator, SaveGuard, SaveOutcome};
pub use render::RenderClient;
pub use storage::{FileStore, KeyValueStore, MemoryStore, SAVED_INVOICES_KEY};
pub use types::{DocumentPayload, RenderedArtifact};
