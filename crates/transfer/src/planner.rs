use tracing::debug;

use crate::{FileDescriptor, STREAMING_THRESHOLD};

/// How the bytes travel to the negotiated destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStrategy {
    /// Whole file read into memory once, sent as one request body.
    Buffered,
    /// File read incrementally and piped into the request body.
    Streamed,
}

/// Picks a strategy from the file size. Purely a decision function.
pub fn plan(descriptor: &FileDescriptor) -> TransferStrategy {
    let strategy = if descriptor.size_bytes > STREAMING_THRESHOLD {
        TransferStrategy::Streamed
    } else {
        TransferStrategy::Buffered
    };
    debug!(
        file = %descriptor.display_name,
        bytes = descriptor.size_bytes,
        ?strategy,
        "planned transfer"
    );
    strategy
}
