use serde::{Deserialize, Serialize};

/// One observation of an in-flight transfer.
///
/// Produced continuously by the engine, consumed by
/// [`ProgressReport::from_sample`], discarded after the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferProgressSample {
    /// Bytes sent so far.
    pub bytes_sent: u64,
    /// Total bytes for this file.
    pub total_bytes: u64,
    /// Milliseconds since the transfer started.
    pub elapsed_millis: u64,
}

/// Derived progress figures for one sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    /// Percent complete, clamped to [0, 100].
    pub percent: f64,
    /// Instantaneous throughput; 0 when no time has elapsed.
    pub bytes_per_second: u64,
    /// Remaining-time label, `"Calculating..."` while speed is 0.
    pub eta_label: String,
}

impl ProgressReport {
    /// Derives percentage, speed and ETA from a sample.
    ///
    /// Pure function of its input; the caller owns the start
    /// timestamp that produced `elapsed_millis`.
    pub fn from_sample(sample: &TransferProgressSample) -> Self {
        let percent = if sample.total_bytes == 0 {
            100.0
        } else {
            (sample.bytes_sent as f64 / sample.total_bytes as f64 * 100.0).clamp(0.0, 100.0)
        };

        let bytes_per_second = if sample.elapsed_millis == 0 {
            0
        } else {
            (sample.bytes_sent as f64 / (sample.elapsed_millis as f64 / 1000.0)) as u64
        };

        let eta_label = if bytes_per_second == 0 {
            "Calculating...".to_string()
        } else {
            let remaining = sample.total_bytes.saturating_sub(sample.bytes_sent);
            format_eta(remaining / bytes_per_second)
        };

        Self {
            percent,
            bytes_per_second,
            eta_label,
        }
    }

    /// Human-readable throughput, for UI rendering.
    pub fn speed_label(&self) -> String {
        format_bytes_per_second(self.bytes_per_second)
    }
}

/// Formats remaining seconds: `"45s"`, `"2m"`, `"1h 5m"`.
fn format_eta(seconds: u64) -> String {
    if seconds < 60 {
        format!("{seconds}s")
    } else if seconds < 3600 {
        format!("{}m", seconds / 60)
    } else {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    }
}

fn format_bytes_per_second(bps: u64) -> String {
    const KB: u64 = 1000;
    const MB: u64 = 1000 * 1000;
    if bps >= MB {
        format!("{:.1} MB/s", bps as f64 / MB as f64)
    } else if bps >= KB {
        format!("{:.1} KB/s", bps as f64 / KB as f64)
    } else {
        format!("{bps} B/s")
    }
}
