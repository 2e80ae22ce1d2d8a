//! HTTP client for the two-phase upload negotiation.
//!
//! Async `reqwest` client with Bearer token authentication.

use std::time::Duration;

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use tracing::debug;

use crate::types::{
    ApiEnvelope, BeginUploadRequest, CompleteUploadRequest, NegotiatedDestination,
    PresignedUrlData, UploadOptions, UploadResult,
};

/// Bound on a single negotiation exchange. These are small JSON
/// round trips; the byte transfer has its own, profile-driven bound.
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from the negotiation client.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Credential rejected by the remote (HTTP 401). Propagated to
    /// the caller for re-authentication, never retried automatically.
    #[error("authentication expired")]
    AuthExpired,

    /// Malformed or logically-refused negotiation response. Fatal for
    /// the run.
    #[error("server rejected request: {0}")]
    ServerRejected(String),

    /// HTTP 413: the file exceeds the server's size limit.
    #[error("file exceeds the server size limit")]
    TooLarge,

    /// The exchange exceeded the request timeout.
    #[error("negotiation timed out")]
    Timeout,

    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid bearer token")]
    InvalidToken,
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::Http(e)
        }
    }
}

/// Negotiation client. Holds no state between calls beyond the
/// connection pool; each returned destination belongs to the caller.
/// Cloning shares the pool.
#[derive(Clone, Debug)]
pub struct Client {
    http: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
}

impl Client {
    /// Creates a client for the given backend with a bearer credential.
    pub fn new(base_url: &str, token: &str) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| ApiError::InvalidToken)?,
        );

        let http = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        })
    }

    /// Overrides the per-exchange timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Phase 1: asks the backend for a write destination.
    ///
    /// The response must carry both a write URL and an opaque key;
    /// absence of either is a [`ApiError::ServerRejected`], distinct
    /// from a network timeout.
    pub async fn begin_upload(
        &self,
        filename: &str,
        content_type: &str,
        file_size: u64,
        options: &UploadOptions,
    ) -> Result<NegotiatedDestination, ApiError> {
        let req = BeginUploadRequest {
            filename,
            content_type,
            file_size,
            preserve_filename: options.preserve_original_name,
            optimize: options.optimize,
            generate_thumbnails: options.generate_thumbnails,
        };

        let url = format!("{}/files/presigned-url", self.base_url);
        let data: PresignedUrlData = self.post_json(&url, &serde_json::to_value(&req)?).await?;

        let write_url = data
            .presigned_url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| ApiError::ServerRejected("response missing write URL".into()))?;
        let opaque_key = data
            .file_key
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ApiError::ServerRejected("response missing file key".into()))?;

        debug!(file = %filename, key = %opaque_key, "negotiated upload destination");

        Ok(NegotiatedDestination {
            write_url,
            opaque_key,
        })
    }

    /// Phase 2: finalizes a transferred upload.
    ///
    /// Only invoked after the byte transfer succeeded; the orchestrator
    /// never calls this on a transfer failure.
    pub async fn complete_upload(
        &self,
        opaque_key: &str,
        options: &UploadOptions,
    ) -> Result<UploadResult, ApiError> {
        let custom_name = if options.custom_display_name.is_empty() {
            None
        } else {
            Some(options.custom_display_name.as_str())
        };
        let req = CompleteUploadRequest {
            generate_thumbnails: options.generate_thumbnails,
            is_public: options.is_public,
            custom_name,
        };

        let encoded_key = utf8_percent_encode(opaque_key, NON_ALPHANUMERIC).to_string();
        let url = format!("{}/files/complete-upload/{encoded_key}", self.base_url);
        let result: UploadResult = self.post_json(&url, &serde_json::to_value(&req)?).await?;

        debug!(key = %opaque_key, remote_id = %result.remote_id, "upload finalized");

        Ok(result)
    }

    /// POSTs a JSON body and unwraps the `{success, data, error}` envelope.
    async fn post_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<T, ApiError> {
        let resp = self
            .http
            .post(url)
            .timeout(self.request_timeout)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        match status {
            StatusCode::UNAUTHORIZED => return Err(ApiError::AuthExpired),
            StatusCode::PAYLOAD_TOO_LARGE => return Err(ApiError::TooLarge),
            s if !s.is_success() => {
                let body = resp.text().await.unwrap_or_default();
                return Err(ApiError::ServerRejected(format!("HTTP {}: {body}", s.as_u16())));
            }
            _ => {}
        }

        let envelope: ApiEnvelope<T> = serde_json::from_slice(&resp.bytes().await?)?;
        if !envelope.success {
            return Err(ApiError::ServerRejected(
                envelope.error.unwrap_or_else(|| "request refused".into()),
            ));
        }
        envelope
            .data
            .ok_or_else(|| ApiError::ServerRejected("response missing data".into()))
    }
}
