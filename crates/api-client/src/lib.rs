//! Negotiation client for the file-hosting backend.
//!
//! Wraps the two-phase upload handshake: `begin_upload` obtains a
//! presigned write destination, `complete_upload` finalizes the
//! transfer after the bytes have been sent. The byte transfer itself
//! lives in `droplift-uploader`.

pub mod client;
#[cfg(any(test, feature = "test-util"))]
#[doc(hidden)]
pub mod test_util;
pub mod types;

pub use client::{ApiError, Client};
pub use types::{NegotiatedDestination, UploadOptions, UploadResult};
