//! Error types for the wp-vault-sync library.
//!
//! Only a handful of failures are fatal for a run:
//!
//! * the local document cannot be read,
//! * its front-matter header is malformed YAML,
//! * the configuration is unusable (no site URL, bad scheme).
//!
//! Everything the WordPress side can do wrong (non-success status, an image
//! that fails to upload, a category that cannot be created) is reported as a
//! [`SyncError`] by [`crate::client::WpClient`] but *downgraded* by the
//! pipelines: it is logged with `tracing::warn!` and the affected value is
//! treated as absent. Callers of the client who want stricter behaviour can
//! match on the variant themselves.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the wp-vault-sync library.
#[derive(Debug, Error)]
pub enum SyncError {
    // ── Local file errors ─────────────────────────────────────────────────
    /// The document or image was not found at the given path.
    #[error("File not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// The file exists but could not be read.
    #[error("Failed to read '{path}': {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The front-matter header is not valid YAML or does not match the
    /// expected field types.
    #[error("Malformed front matter in '{path}': {detail}")]
    FrontMatter { path: PathBuf, detail: String },

    /// Could not create or write a markdown file in the vault.
    #[error("Failed to write '{path}': {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Remote errors ─────────────────────────────────────────────────────
    /// Transport-level failure (DNS, TLS, connection reset, …).
    #[error("Request to '{url}' failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// WordPress answered with a status other than the one the endpoint
    /// reports on success.
    #[error("WordPress returned HTTP {status} for '{endpoint}': {body}")]
    RemoteStatus {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// The response body did not have the expected JSON shape.
    #[error("Unexpected response from '{endpoint}': {detail}")]
    Decode { endpoint: String, detail: String },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SyncError {
    /// Whether this error came from the WordPress side rather than from the
    /// local vault or configuration.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            SyncError::Http { .. } | SyncError::RemoteStatus { .. } | SyncError::Decode { .. }
        )
    }
}
