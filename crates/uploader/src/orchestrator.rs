//! Single-file upload pipeline.
//!
//! Drives probe → plan → negotiate → transfer → finalize for one
//! local path, reporting phase changes and progress over an event
//! channel while the typed result goes back to the caller.

use std::sync::Arc;

use droplift_api_client::{Client, UploadOptions, UploadResult};
use droplift_transfer::{ProgressReport, TransferProfile, TransferProgressSample};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::engine::TransferEngine;
use crate::error::UploadError;
use crate::state::UploadPhase;

/// Events are dropped, not awaited, when the consumer lags; progress
/// is advisory and must never stall the transfer.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// What an observer sees during a run.
#[derive(Debug)]
pub enum UploadEvent {
    PhaseChanged(UploadPhase),
    Progress {
        sample: TransferProgressSample,
        report: ProgressReport,
    },
    Completed {
        result: UploadResult,
    },
    Failed {
        message: String,
    },
}

/// Runs the upload pipeline for one file at a time.
///
/// Holds no per-file state between runs; a failed or cancelled run
/// leaves nothing behind, and the next run negotiates a fresh
/// destination.
pub struct UploadOrchestrator {
    client: Client,
    engine: TransferEngine,
    options: UploadOptions,
    events_tx: mpsc::Sender<UploadEvent>,
    events_rx: Option<mpsc::Receiver<UploadEvent>>,
    cancel: CancellationToken,
}

impl UploadOrchestrator {
    pub fn new(
        client: Client,
        profile: TransferProfile,
        options: UploadOptions,
    ) -> Result<Self, UploadError> {
        let (events_tx, events_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        Ok(Self {
            client,
            engine: TransferEngine::new(profile)?,
            options,
            events_tx,
            events_rx: Some(events_rx),
            cancel: CancellationToken::new(),
        })
    }

    /// Takes the event receiver. Yields `None` after the first call.
    pub fn take_events(&mut self) -> Option<mpsc::Receiver<UploadEvent>> {
        self.events_rx.take()
    }

    /// Token that aborts the current and any future run when fired.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Uploads one file end to end.
    ///
    /// On success the file is live at the returned URL. On failure the
    /// run stops at the failing stage and nothing is finalized; the
    /// error carries which stage gave up.
    pub async fn run(&self, path: &str) -> Result<UploadResult, UploadError> {
        match self.run_inner(path).await {
            Ok(result) => {
                self.emit(UploadEvent::PhaseChanged(UploadPhase::Done));
                self.emit(UploadEvent::Completed {
                    result: result.clone(),
                });
                info!(path, url = %result.url, "upload complete");
                Ok(result)
            }
            Err(err) => {
                self.emit(UploadEvent::PhaseChanged(UploadPhase::Failed));
                self.emit(UploadEvent::Failed {
                    message: err.user_message(),
                });
                warn!(path, error = %err, "upload failed");
                Err(err)
            }
        }
    }

    async fn run_inner(&self, path: &str) -> Result<UploadResult, UploadError> {
        self.checkpoint()?;
        self.emit(UploadEvent::PhaseChanged(UploadPhase::Probing));
        let descriptor = droplift_transfer::probe(path)?;

        self.emit(UploadEvent::PhaseChanged(UploadPhase::Planning));
        let strategy = droplift_transfer::plan(&descriptor);

        self.checkpoint()?;
        self.emit(UploadEvent::PhaseChanged(UploadPhase::Negotiating));
        let destination = self
            .client
            .begin_upload(
                &descriptor.display_name,
                &descriptor.mime_type,
                descriptor.size_bytes,
                &self.options,
            )
            .await?;

        self.emit(UploadEvent::PhaseChanged(UploadPhase::Transferring));
        let progress_tx = self.events_tx.clone();
        let on_progress = Arc::new(move |sample: TransferProgressSample| {
            let report = ProgressReport::from_sample(&sample);
            let _ = progress_tx.try_send(UploadEvent::Progress { sample, report });
        });
        self.engine
            .transfer(
                &destination,
                &descriptor,
                strategy,
                on_progress,
                &self.cancel,
            )
            .await?;

        self.checkpoint()?;
        self.emit(UploadEvent::PhaseChanged(UploadPhase::Finalizing));
        let result = self
            .client
            .complete_upload(&destination.opaque_key, &self.options)
            .await?;

        Ok(result)
    }

    fn checkpoint(&self) -> Result<(), UploadError> {
        if self.cancel.is_cancelled() {
            Err(UploadError::Cancelled)
        } else {
            Ok(())
        }
    }

    fn emit(&self, event: UploadEvent) {
        let _ = self.events_tx.try_send(event);
    }
}
