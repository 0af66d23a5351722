//! Sudo configuration and credential cleanup
//!
//! Sudo is never prompted for by the engine:
//! 1. Guards run `sudo -n`, so a missing credential fails the probe
//! 2. Privileged preference domains are written with `sudo -n defaults`
//! 3. After `apply`, a cached timestamp is dropped if the config asks for it

use crate::runner;
use serde::{Deserialize, Serialize};

/// The `[sudo]` section of the declaration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SudoConfig {
    /// Preference domains that need sudo to write (e.g., "com.apple.loginwindow")
    #[serde(default)]
    pub defaults: Vec<String>,

    /// Drop cached sudo credentials when `apply` finishes
    #[serde(default)]
    pub invalidate_after_run: bool,
}

/// Check if sudo is currently valid (without prompting)
pub fn is_valid() -> bool {
    runner::run_quiet("sudo", &["-n", "true"])
}

/// Invalidate the cached sudo timestamp, if there is one
///
/// Returns whether credentials were dropped.
pub fn invalidate() -> bool {
    if !is_valid() {
        log::debug!("No cached sudo credentials to invalidate");
        return false;
    }
    if runner::run_quiet("sudo", &["-k"]) {
        log::info!("Invalidated cached sudo credentials");
        true
    } else {
        log::warn!("Failed to invalidate cached sudo credentials");
        false
    }
}

/// Scoped cleanup - invalidates cached credentials on drop when enabled
pub struct CredentialScope {
    enabled: bool,
}

impl CredentialScope {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }
}

impl Drop for CredentialScope {
    fn drop(&mut self) {
        if self.enabled {
            invalidate();
        }
    }
}
