//! Error types for preference operations.

use thiserror::Error;

/// Errors that can occur reading or writing preferences.
#[derive(Debug, Error)]
pub enum Error {
    /// The stored value has a type with no [`Value`](crate::Value) counterpart
    #[error("{domain} {key} is stored as {kind}, which cannot be compared")]
    UnsupportedType {
        /// Preference domain
        domain: String,
        /// Preference key
        key: String,
        /// Stored plist type
        kind: &'static str,
    },

    /// `defaults` exited nonzero
    #[error("`defaults {args}` failed: {stderr}")]
    CommandFailed {
        /// Arguments passed to defaults
        args: String,
        /// Standard error output
        stderr: String,
    },

    /// The exported domain was not a property list dictionary
    #[error("could not parse exported domain {domain}: {message}")]
    Parse {
        /// Preference domain
        domain: String,
        /// Parser message
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for preference operations.
pub type Result<T> = std::result::Result<T, Error>;
