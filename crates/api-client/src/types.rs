//! Wire types for the negotiation protocol.

use serde::{Deserialize, Serialize};

/// User-supplied upload options, passed through unchanged to both
/// negotiation phases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadOptions {
    pub preserve_original_name: bool,
    pub optimize: bool,
    pub generate_thumbnails: bool,
    /// Empty means no custom name; sent as `null` on the wire.
    pub custom_display_name: String,
    pub is_public: bool,
}

/// A negotiated write destination.
///
/// Valid for a single transfer attempt: used at most once for the
/// byte transfer and at most once for finalize. Reuse after a failure
/// requires a fresh negotiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NegotiatedDestination {
    /// Temporary write URL (raw PUT target).
    pub write_url: String,
    /// Server-issued handle identifying the in-progress upload.
    pub opaque_key: String,
}

/// Terminal result of a successfully finalized upload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    #[serde(alias = "id")]
    pub remote_id: String,
    pub url: String,
    #[serde(alias = "fileSize", default)]
    pub final_size_bytes: u64,
    #[serde(alias = "contentType", default)]
    pub mime_type: String,
    #[serde(default)]
    pub thumbnail_urls: Vec<String>,
}

/// Phase-1 request body for `POST /files/presigned-url`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BeginUploadRequest<'a> {
    pub filename: &'a str,
    pub content_type: &'a str,
    pub file_size: u64,
    pub preserve_filename: bool,
    pub optimize: bool,
    pub generate_thumbnails: bool,
}

/// Phase-2 request body for `POST /files/complete-upload/<key>`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CompleteUploadRequest<'a> {
    pub generate_thumbnails: bool,
    pub is_public: bool,
    pub custom_name: Option<&'a str>,
}

/// Standard `{success, data, error}` response envelope.
///
/// Missing `Option` fields deserialize to `None` as-is; a `default`
/// attribute on `data` would require `T: Default`.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiEnvelope<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

/// Phase-1 response payload. Some deployments call the URL field
/// `presignedUrl`, others `uploadUrl`; both fields are optional so
/// absence can be reported as a rejection rather than a parse error.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PresignedUrlData {
    #[serde(alias = "uploadUrl")]
    pub presigned_url: Option<String>,
    pub file_key: Option<String>,
}
