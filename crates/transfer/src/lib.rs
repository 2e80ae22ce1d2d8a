//! Local-side upload planning: file probing, strategy selection and
//! progress math.
//!
//! Everything in this crate runs before (or alongside) the network
//! pipeline and touches only the local filesystem.

mod planner;
mod probe;
mod profile;
mod progress;

pub use planner::{TransferStrategy, plan};
pub use probe::{FileDescriptor, ProbeError, probe};
pub use profile::TransferProfile;
pub use progress::{ProgressReport, TransferProgressSample};

/// Files larger than this are streamed instead of buffered in memory.
///
/// Fixed design constant, not user-configurable. Exactly 100 MiB is
/// still buffered; the first byte past it switches to streaming.
pub const STREAMING_THRESHOLD: u64 = 100 * 1024 * 1024;

/// Hard ceiling on upload size, enforced locally by the probe.
///
/// The backend answers 413 for anything larger; failing before the
/// transfer avoids sending gigabytes just to learn that.
pub const MAX_UPLOAD_SIZE: u64 = 5 * 1024 * 1024 * 1024;
