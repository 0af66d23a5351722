//! Error types for fetch operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Categories of fetch errors for retry logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Transient network failure (retryable)
    Network,
    /// The server answered with a permanent error
    Http,
    /// Content did not match the expected checksum
    Integrity,
    /// Bad input such as an unsupported URL or malformed checksum
    Input,
    /// Local filesystem failure
    Io,
}

impl ErrorCategory {
    /// Whether this error category is typically transient and worth retrying.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Network)
    }
}

/// Errors that can occur while fetching a file.
#[derive(Debug, Error)]
pub enum Error {
    /// Connection, DNS, TLS or timeout failure
    #[error("network error fetching {url}: {message}")]
    Network {
        /// Requested URL
        url: String,
        /// Transport error
        message: String,
    },

    /// Non-success HTTP status
    #[error("HTTP {status} fetching {url}")]
    Status {
        /// Requested URL
        url: String,
        /// Response status code
        status: u16,
    },

    /// Downloaded content has a different digest
    #[error("checksum mismatch for {url}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Requested URL
        url: String,
        /// Declared SHA-256
        expected: String,
        /// SHA-256 of the received bytes
        actual: String,
    },

    /// The checksum is not a SHA-256 hex digest
    #[error("invalid checksum '{0}': expected 64 hex characters")]
    InvalidChecksum(String),

    /// Only http, https and file URLs are supported
    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    /// IO error at a path
    #[error("{}: {source}", path.display())]
    Io {
        /// Path being read or written
        path: PathBuf,
        /// Underlying error
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Get the error category for retry logic.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Network { .. } => ErrorCategory::Network,
            // Server-side trouble and throttling are worth another try
            Self::Status { status, .. } if *status == 429 || *status >= 500 => {
                ErrorCategory::Network
            }
            Self::Status { .. } => ErrorCategory::Http,
            Self::ChecksumMismatch { .. } => ErrorCategory::Integrity,
            Self::InvalidChecksum(_) | Self::UnsupportedScheme(_) => ErrorCategory::Input,
            Self::Io { .. } => ErrorCategory::Io,
        }
    }

    /// Whether this error is typically transient and worth retrying.
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn from_ureq(url: &str, err: ureq::Error) -> Self {
        match err {
            ureq::Error::StatusCode(status) => Self::Status {
                url: url.to_string(),
                status,
            },
            other => Self::Network {
                url: url.to_string(),
                message: other.to_string(),
            },
        }
    }
}

/// Result type for fetch operations.
pub type Result<T> = std::result::Result<T, Error>;
