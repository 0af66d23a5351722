//! Error types for Homebrew operations.
//!
//! Failures from `brew` are classified from their stderr so callers can
//! decide whether to retry, ignore or report them.

use thiserror::Error;

/// Coarse classification of a `brew` failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Transient download trouble, worth retrying
    Network,
    /// Unknown package or tap
    NotFound,
    /// Clashing links or dependencies
    Conflict,
    /// Prefix not writable
    Permission,
    /// Nothing to do
    AlreadyInstalled,
    /// No usable `brew`
    BrewNotFound,
    /// Anything else
    Other,
}

const NETWORK_MARKERS: &[&str] = &[
    "curl",
    "could not resolve",
    "connection refused",
    "timed out",
    "network",
    "ssl",
    "certificate",
    "failed to download",
    "sha256 mismatch",
];

const NOT_FOUND_MARKERS: &[&str] = &[
    "no available formula",
    "no formulae found",
    "no cask with this name",
    "no such keg",
    "couldn't find",
    "invalid tap name",
];

const ALREADY_INSTALLED_MARKERS: &[&str] = &["already installed", "is already an installed"];

const CONFLICT_MARKERS: &[&str] = &["conflict", "depends on", "is a dependency"];

const PERMISSION_MARKERS: &[&str] = &[
    "permission denied",
    "operation not permitted",
    "cannot write",
    "sudo",
];

impl ErrorCategory {
    /// Classify `brew` stderr. Earlier categories win.
    pub fn classify(stderr: &str) -> Self {
        let lower = stderr.to_lowercase();
        let hit = |markers: &[&str]| markers.iter().any(|m| lower.contains(m));

        if hit(NETWORK_MARKERS) {
            Self::Network
        } else if hit(NOT_FOUND_MARKERS) {
            Self::NotFound
        } else if hit(ALREADY_INSTALLED_MARKERS) {
            Self::AlreadyInstalled
        } else if hit(CONFLICT_MARKERS) {
            Self::Conflict
        } else if hit(PERMISSION_MARKERS) {
            Self::Permission
        } else {
            Self::Other
        }
    }

    /// Only network failures are retried.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::Network)
    }

    /// The install already happened.
    pub fn is_ignorable(self) -> bool {
        matches!(self, Self::AlreadyInstalled)
    }

    /// One-line hint shown next to the error.
    pub fn advice(self) -> &'static str {
        match self {
            Self::Network => "Check your internet connection and try again",
            Self::NotFound => "Verify the package name or declare the required tap first",
            Self::Conflict => "Resolve the conflict by removing conflicting packages",
            Self::Permission => "Check ownership of the Homebrew prefix",
            Self::AlreadyInstalled => "No action needed",
            Self::BrewNotFound => "Install Homebrew from https://brew.sh",
            Self::Other => "Check the error details for more information",
        }
    }
}

/// A failed Homebrew probe or install.
#[derive(Debug, Error)]
pub enum Error {
    /// Download or DNS trouble while installing
    #[error("network error installing {package}: {message}")]
    Network {
        /// Package that was being installed
        package: String,
        /// Trimmed stderr
        message: String,
    },

    /// No tap provides the package
    #[error("package not found: {package}")]
    NotFound {
        /// The unknown name
        package: String,
    },

    /// Links or dependencies clash with something installed
    #[error("conflict installing {package}: {message}")]
    Conflict {
        /// Package that was being installed
        package: String,
        /// Trimmed stderr
        message: String,
    },

    /// The Homebrew prefix is not writable
    #[error("permission denied installing {package}: {message}")]
    Permission {
        /// Package that was being installed
        package: String,
        /// Trimmed stderr
        message: String,
    },

    /// `brew` reported the package as present
    #[error("already installed: {package}")]
    AlreadyInstalled {
        /// The installed name
        package: String,
    },

    /// No `brew` executable on PATH or at a standard prefix
    #[error("Homebrew not found. Install it from https://brew.sh")]
    BrewNotFound,

    /// `brew` exited nonzero and stderr matched no category
    #[error("`brew {args}` failed: {stderr}")]
    CommandFailed {
        /// Space-joined arguments
        args: String,
        /// Trimmed stderr
        stderr: String,
    },

    /// Spawning or reading from `brew` failed
    #[error("could not run brew: {0}")]
    Io(#[from] std::io::Error),

    /// `brew info --json` produced something unexpected
    #[error("unexpected `brew info` output: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Category used for retry and reporting decisions.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Network { .. } => ErrorCategory::Network,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Conflict { .. } => ErrorCategory::Conflict,
            Self::Permission { .. } => ErrorCategory::Permission,
            Self::AlreadyInstalled { .. } => ErrorCategory::AlreadyInstalled,
            Self::BrewNotFound => ErrorCategory::BrewNotFound,
            Self::CommandFailed { .. } | Self::Io(_) | Self::Json(_) => ErrorCategory::Other,
        }
    }

    /// Shorthand for `self.category().is_retryable()`.
    pub fn is_retryable(&self) -> bool {
        self.category().is_retryable()
    }

    /// Shorthand for `self.category().is_ignorable()`.
    pub fn is_ignorable(&self) -> bool {
        self.category().is_ignorable()
    }

    /// Build an error from the stderr of a failed `brew` call.
    pub fn from_brew_output(args: &[&str], stderr: &str, package: &str) -> Self {
        let package = package.to_string();
        let message = stderr.trim().to_string();
        match ErrorCategory::classify(stderr) {
            ErrorCategory::Network => Self::Network { package, message },
            ErrorCategory::NotFound => Self::NotFound { package },
            ErrorCategory::AlreadyInstalled => Self::AlreadyInstalled { package },
            ErrorCategory::Conflict => Self::Conflict { package, message },
            ErrorCategory::Permission => Self::Permission { package, message },
            ErrorCategory::BrewNotFound | ErrorCategory::Other => Self::CommandFailed {
                args: args.join(" "),
                stderr: message,
            },
        }
    }
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, Error>;
