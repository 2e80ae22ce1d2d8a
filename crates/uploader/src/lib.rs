//! Upload pipeline for the file-hosting backend.
//!
//! Sequences probe → plan → negotiate → transfer → finalize for a
//! single local file, with live progress events, cancellation, and a
//! bounded-concurrency queue for multi-file callers.

mod engine;
mod error;
mod orchestrator;
mod queue;
mod state;

#[cfg(any(test, feature = "test-util"))]
#[doc(hidden)]
pub mod test_support;

pub use engine::{ProgressCallback, STREAM_CHUNK_SIZE, TransferEngine, TransferError};
pub use error::UploadError;
pub use orchestrator::{UploadEvent, UploadOrchestrator};
pub use queue::{UploadOutcome, UploadQueue};
pub use state::UploadPhase;
