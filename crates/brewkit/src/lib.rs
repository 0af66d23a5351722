//! # brewkit
//!
//! Pure Rust library for probing and installing Homebrew packages.
//!
//! This crate provides functionality for:
//! - Checking whether taps, formulae and casks are installed
//! - Installing packages with extra options
//! - Retrying transient (network) failures with exponential backoff
//!
//! ## Example
//!
//! ```no_run
//! use brewkit::{Client, Package, RetryConfig};
//!
//! let client = Client::new()?;
//! let zsh = Package::brew("zsh");
//! if !client.is_installed(&zsh)? {
//!     client.install_with_retry(&zsh, &RetryConfig::default())?;
//! }
//! # Ok::<(), brewkit::Error>(())
//! ```

#![warn(missing_docs)]

pub mod backend;
pub mod error;
pub mod retry;
pub mod types;

pub use error::{Error, ErrorCategory, Result};
pub use types::{Package, PackageType, RetryConfig};

use backend::{Backend, brew::BrewBackend};

/// High-level client for Homebrew operations.
pub struct Client {
    backend: Box<dyn Backend>,
}

impl Client {
    /// Create a new Client with the default backend.
    ///
    /// Returns an error if Homebrew is not installed.
    pub fn new() -> Result<Self> {
        let backend = BrewBackend::new()?;
        Ok(Self {
            backend: Box::new(backend),
        })
    }

    /// Create a client with a custom backend (useful for testing).
    pub fn with_backend(backend: Box<dyn Backend>) -> Self {
        Self { backend }
    }

    /// Check if Homebrew is available.
    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    /// Check if a package is installed.
    pub fn is_installed(&self, package: &Package) -> Result<bool> {
        self.backend.is_installed(package)
    }

    /// Install a package.
    pub fn install(&self, package: &Package) -> Result<()> {
        self.backend.install(package)
    }

    /// Install a package, retrying network failures.
    pub fn install_with_retry(&self, package: &Package, config: &RetryConfig) -> Result<()> {
        retry::with_retry(config, Some(&retry::LogCallback), || {
            self.backend.install(package)
        })
    }
}
