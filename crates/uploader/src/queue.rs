//! Multi-file upload queue with bounded concurrency.

use std::sync::Arc;

use droplift_api_client::{Client, UploadOptions, UploadResult};
use droplift_transfer::TransferProfile;
use tokio::sync::Semaphore;
use tracing::info;

use crate::engine::TransferError;
use crate::error::UploadError;
use crate::orchestrator::UploadOrchestrator;

/// Per-file result of a queue run.
#[derive(Debug)]
pub struct UploadOutcome {
    pub path: String,
    pub result: Result<UploadResult, UploadError>,
}

/// Uploads a batch of files, at most `profile.max_concurrent_uploads()`
/// in flight at once.
///
/// Each file gets its own pipeline run; one file failing never stops
/// the others. Outcomes come back in input order.
pub struct UploadQueue {
    client: Client,
    profile: TransferProfile,
    options: UploadOptions,
}

impl UploadQueue {
    pub fn new(client: Client, profile: TransferProfile, options: UploadOptions) -> Self {
        Self {
            client,
            profile,
            options,
        }
    }

    pub async fn run(&self, paths: &[String]) -> Vec<UploadOutcome> {
        let limit = self.profile.max_concurrent_uploads();
        let semaphore = Arc::new(Semaphore::new(limit));
        info!(files = paths.len(), limit, "starting upload queue");

        let mut handles = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.clone();
            let client = self.client.clone();
            let profile = self.profile;
            let options = self.options.clone();
            let semaphore = Arc::clone(&semaphore);

            handles.push(tokio::spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return UploadOutcome {
                            path,
                            result: Err(UploadError::Cancelled),
                        };
                    }
                };
                let result = match UploadOrchestrator::new(client, profile, options) {
                    Ok(orchestrator) => orchestrator.run(&path).await,
                    Err(err) => Err(err),
                };
                UploadOutcome { path, result }
            }));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (handle, path) in handles.into_iter().zip(paths) {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(err) => UploadOutcome {
                    path: path.clone(),
                    result: Err(UploadError::Transfer(TransferError::Network(format!(
                        "upload task failed: {err}"
                    )))),
                },
            };
            outcomes.push(outcome);
        }
        outcomes
    }
}
