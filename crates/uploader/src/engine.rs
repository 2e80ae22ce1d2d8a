//! Byte transmission against a negotiated destination.
//!
//! Either a single buffered PUT or a streamed, progress-observed
//! transfer. No automatic retry: a failure here is terminal for the
//! attempt, and the destination must not be reused.

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use droplift_api_client::NegotiatedDestination;
use droplift_transfer::{
    FileDescriptor, TransferProfile, TransferProgressSample, TransferStrategy,
};
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use tokio::io::AsyncReadExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Chunk size for the streamed path.
///
/// Bounded so memory use stays constant regardless of file size.
pub const STREAM_CHUNK_SIZE: usize = 256 * 1024;

/// Observer invoked with each progress sample.
///
/// Called on the transfer task; implementations must return quickly
/// or throughput degrades.
pub type ProgressCallback = Arc<dyn Fn(TransferProgressSample) + Send + Sync>;

/// Failures during byte transmission.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("network error: {0}")]
    Network(String),

    #[error("transfer timed out")]
    Timeout,

    /// Non-2xx response from the destination. 413 means the server
    /// refused the file as too large.
    #[error("remote rejected transfer: HTTP {0}")]
    RemoteRejected(u16),

    #[error("transfer cancelled")]
    Cancelled,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<reqwest::Error> for TransferError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransferError::Timeout
        } else {
            TransferError::Network(e.to_string())
        }
    }
}

/// Performs the byte transfer for one negotiated destination.
pub struct TransferEngine {
    http: reqwest::Client,
    timeout: Duration,
}

impl TransferEngine {
    /// Creates an engine whose single-attempt timeout comes from the
    /// profile.
    pub fn new(profile: TransferProfile) -> Result<Self, TransferError> {
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            timeout: profile.timeout(),
        })
    }

    /// Overrides the attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Transmits the file's bytes to the destination.
    ///
    /// The local file handle is scoped to this call and released on
    /// success, failure and timeout alike. The cancellation token is
    /// honored between chunks on the streamed path and aborts the
    /// request on either path.
    pub async fn transfer(
        &self,
        destination: &NegotiatedDestination,
        descriptor: &FileDescriptor,
        strategy: TransferStrategy,
        on_progress: ProgressCallback,
        cancel: &CancellationToken,
    ) -> Result<(), TransferError> {
        if cancel.is_cancelled() {
            return Err(TransferError::Cancelled);
        }

        info!(
            file = %descriptor.display_name,
            bytes = descriptor.size_bytes,
            ?strategy,
            "starting transfer"
        );

        match strategy {
            TransferStrategy::Buffered => {
                self.transfer_buffered(destination, descriptor, on_progress, cancel)
                    .await
            }
            TransferStrategy::Streamed => {
                self.transfer_streamed(destination, descriptor, on_progress, cancel)
                    .await
            }
        }
    }

    /// Single request carrying the whole file in memory.
    async fn transfer_buffered(
        &self,
        destination: &NegotiatedDestination,
        descriptor: &FileDescriptor,
        on_progress: ProgressCallback,
        cancel: &CancellationToken,
    ) -> Result<(), TransferError> {
        let body = tokio::fs::read(&descriptor.path).await?;
        let total = descriptor.size_bytes;
        let started = Instant::now();

        let send = self
            .http
            .put(&destination.write_url)
            .timeout(self.timeout)
            .header(CONTENT_TYPE, &descriptor.mime_type)
            .header(CONTENT_LENGTH, total)
            .body(body)
            .send();

        let resp = tokio::select! {
            _ = cancel.cancelled() => return Err(TransferError::Cancelled),
            resp = send => resp.map_err(|e| self.classify(e, cancel))?,
        };

        let status = resp.status();
        if !status.is_success() {
            return Err(TransferError::RemoteRejected(status.as_u16()));
        }

        on_progress(TransferProgressSample {
            bytes_sent: total,
            total_bytes: total,
            elapsed_millis: started.elapsed().as_millis() as u64,
        });

        debug!(file = %descriptor.display_name, "buffered transfer complete");
        Ok(())
    }

    /// Streamed request: the file is read in bounded chunks and piped
    /// into the request body, with a progress sample per chunk.
    async fn transfer_streamed(
        &self,
        destination: &NegotiatedDestination,
        descriptor: &FileDescriptor,
        on_progress: ProgressCallback,
        cancel: &CancellationToken,
    ) -> Result<(), TransferError> {
        let file = tokio::fs::File::open(&descriptor.path).await?;
        let total = descriptor.size_bytes;
        let started = Instant::now();

        let stream_cancel = cancel.clone();
        let stream = futures_util::stream::try_unfold((file, 0u64), move |(mut file, sent)| {
            let cancel = stream_cancel.clone();
            let on_progress = Arc::clone(&on_progress);
            async move {
                if cancel.is_cancelled() {
                    return Err(io::Error::new(
                        io::ErrorKind::Interrupted,
                        "transfer cancelled",
                    ));
                }

                let mut buf = vec![0u8; STREAM_CHUNK_SIZE];
                let n = file.read(&mut buf).await?;
                if n == 0 {
                    return Ok(None);
                }
                buf.truncate(n);

                let sent = sent + n as u64;
                on_progress(TransferProgressSample {
                    bytes_sent: sent,
                    total_bytes: total,
                    elapsed_millis: started.elapsed().as_millis() as u64,
                });

                Ok(Some((Bytes::from(buf), (file, sent))))
            }
        });

        let send = self
            .http
            .put(&destination.write_url)
            .timeout(self.timeout)
            .header(CONTENT_TYPE, &descriptor.mime_type)
            .header(CONTENT_LENGTH, total)
            .body(reqwest::Body::wrap_stream(stream))
            .send();

        let resp = tokio::select! {
            _ = cancel.cancelled() => return Err(TransferError::Cancelled),
            resp = send => resp.map_err(|e| self.classify(e, cancel))?,
        };

        let status = resp.status();
        if !status.is_success() {
            return Err(TransferError::RemoteRejected(status.as_u16()));
        }

        debug!(file = %descriptor.display_name, "streamed transfer complete");
        Ok(())
    }

    /// Maps a send error, preferring cancellation over the transport
    /// classification when the token fired mid-request.
    fn classify(&self, e: reqwest::Error, cancel: &CancellationToken) -> TransferError {
        if cancel.is_cancelled() {
            TransferError::Cancelled
        } else {
            e.into()
        }
    }
}
