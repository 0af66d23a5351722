//! Backend abstraction for Homebrew operations.
//!
//! The [`Backend`] trait lets the [`Client`](crate::Client) run against the
//! real `brew` CLI or a test double.

pub mod brew;

use crate::error::Result;
use crate::types::Package;

/// Backend trait for Homebrew operations.
pub trait Backend {
    /// Check if Homebrew is available.
    fn is_available(&self) -> bool;

    /// Check if a package is installed.
    fn is_installed(&self, package: &Package) -> Result<bool>;

    /// Install a package with its options.
    fn install(&self, package: &Package) -> Result<()>;
}

