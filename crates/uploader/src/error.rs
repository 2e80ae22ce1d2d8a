//! Unified error type for a whole upload run.

use droplift_api_client::ApiError;
use droplift_transfer::ProbeError;

use crate::engine::TransferError;

/// Everything that can abort an upload run.
///
/// Each failure surfaces exactly once, as the run's single typed
/// result; no partial state is retried silently. A caller that wants
/// to retry re-runs the whole pipeline, which negotiates a fresh
/// destination.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("probe failed: {0}")]
    Probe(#[from] ProbeError),

    #[error("negotiation failed: {0}")]
    Negotiation(#[from] ApiError),

    #[error("transfer failed: {0}")]
    Transfer(#[from] TransferError),

    #[error("upload cancelled")]
    Cancelled,
}

impl UploadError {
    /// Short, user-facing explanation.
    ///
    /// Distinguishes the three situations a user can act on: the file
    /// itself is too large, the session needs re-authentication, or
    /// the network hiccuped and the upload is worth retrying.
    pub fn user_message(&self) -> String {
        match self {
            UploadError::Probe(ProbeError::TooLarge { .. })
            | UploadError::Negotiation(ApiError::TooLarge)
            | UploadError::Transfer(TransferError::RemoteRejected(413)) => {
                "Your file is too large for this server.".into()
            }
            UploadError::Negotiation(ApiError::AuthExpired) => {
                "Your session has expired. Please sign in again.".into()
            }
            UploadError::Negotiation(ApiError::Timeout)
            | UploadError::Negotiation(ApiError::Http(_))
            | UploadError::Transfer(TransferError::Network(_))
            | UploadError::Transfer(TransferError::Timeout) => {
                "Network problem during upload. Please try again.".into()
            }
            UploadError::Transfer(TransferError::Cancelled) | UploadError::Cancelled => {
                "Upload cancelled.".into()
            }
            other => format!("Upload failed: {other}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oversize_transfer_maps_to_too_large() {
        let err = UploadError::Transfer(TransferError::RemoteRejected(413));
        assert!(err.user_message().contains("too large"));
    }

    #[test]
    fn oversize_probe_maps_to_too_large() {
        let err = UploadError::Probe(ProbeError::TooLarge {
            size: 10,
            limit: 5,
        });
        assert!(err.user_message().contains("too large"));
    }

    #[test]
    fn oversize_negotiation_maps_to_too_large() {
        // A 413 can arrive before any byte is sent, on phase 1.
        let err = UploadError::Negotiation(ApiError::TooLarge);
        assert!(err.user_message().contains("too large"));
    }

    #[test]
    fn auth_expired_maps_to_sign_in() {
        let err = UploadError::Negotiation(ApiError::AuthExpired);
        assert!(err.user_message().contains("sign in"));
    }

    #[test]
    fn network_maps_to_try_again() {
        let err = UploadError::Transfer(TransferError::Network("reset".into()));
        assert!(err.user_message().contains("try again"));
        let err = UploadError::Transfer(TransferError::Timeout);
        assert!(err.user_message().contains("try again"));
    }

    #[test]
    fn other_rejections_keep_their_detail() {
        let err = UploadError::Transfer(TransferError::RemoteRejected(500));
        assert!(err.user_message().contains("500"));
    }
}
