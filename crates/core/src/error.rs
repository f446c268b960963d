//! Failure taxonomy surfaced by the execution router.
//!
//! Four classes, each with a distinct recovery policy: validation
//! errors are never retried, unavailability may trigger the hybrid
//! fallback, backend errors carry the backend's own diagnostic, and
//! download conflicts are state rejections rather than failures.

use compact_str::CompactString;

/// Convenience alias used throughout the router crates.
pub type Result<T> = std::result::Result<T, Error>;

/// Classified failure returned to callers of the router.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// The request violated an input invariant. Caller's fault,
    /// never retried, no backend was contacted.
    #[error("invalid request: {0}")]
    Validation(String),

    /// The backend could not be reached: connection refused, DNS
    /// failure, or timeout. Transient by definition.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    /// The backend was reached but rejected the request. The HTTP
    /// status and the backend's error body are attached.
    #[error("backend error (status {status}): {message}")]
    Backend {
        /// HTTP status code returned by the backend.
        status: u16,
        /// Error body (or reason phrase) from the backend.
        message: String,
    },

    /// A model download was requested while another is in flight.
    /// The second request is rejected, not queued.
    #[error("download already in progress for model {0}")]
    DownloadInProgress(CompactString),
}

impl Error {
    /// Whether the hybrid fallback is allowed to recover from this
    /// error. Only backend-side failures qualify.
    pub fn recoverable(&self) -> bool {
        matches!(self, Self::Unavailable(_) | Self::Backend { .. })
    }

    /// Build a `Backend` error from a status code and body.
    pub fn backend(status: u16, message: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: message.into(),
        }
    }
}
