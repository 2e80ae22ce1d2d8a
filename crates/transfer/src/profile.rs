use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Named bundle of transfer-tuning constants, selected once per run
/// and never mutated during a transfer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferProfile {
    Slow,
    #[default]
    Medium,
    Fast,
    Ultra,
}

impl TransferProfile {
    /// Part size used when splitting work for the backend's multipart
    /// endpoints. Not used by the single-request pipeline itself, but
    /// passed through for backends that consult it.
    pub fn part_size_bytes(self) -> u64 {
        match self {
            TransferProfile::Slow => 4 * 1024 * 1024,
            TransferProfile::Medium => 8 * 1024 * 1024,
            TransferProfile::Fast => 16 * 1024 * 1024,
            TransferProfile::Ultra => 32 * 1024 * 1024,
        }
    }

    /// Cap on simultaneously running transfers for callers uploading
    /// several files at once.
    pub fn max_concurrent_uploads(self) -> usize {
        match self {
            TransferProfile::Slow => 1,
            TransferProfile::Medium => 2,
            TransferProfile::Fast => 4,
            TransferProfile::Ultra => 8,
        }
    }

    /// Bound on a single transfer attempt. On expiry the engine
    /// aborts the connection and reports a timeout.
    pub fn timeout(self) -> Duration {
        match self {
            TransferProfile::Slow => Duration::from_secs(600),
            TransferProfile::Medium => Duration::from_secs(300),
            TransferProfile::Fast => Duration::from_secs(180),
            TransferProfile::Ultra => Duration::from_secs(120),
        }
    }
}
