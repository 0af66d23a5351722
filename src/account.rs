//! Account database lookups

use anyhow::Result;
use declarative::AccountProbe;
use std::ffi::CStr;
use std::path::PathBuf;

/// Reads the current user's entry from the password database
pub struct PasswdAccount;

impl AccountProbe for PasswdAccount {
    fn login_shell(&self) -> Result<Option<PathBuf>> {
        Ok(login_shell())
    }
}

#[allow(unsafe_code)]
fn login_shell() -> Option<PathBuf> {
    // SAFETY: getpwuid returns a pointer into static storage or null. The
    // shell string is copied out before any other passwd call can reuse it.
    unsafe {
        let entry = libc::getpwuid(libc::getuid());
        if entry.is_null() || (*entry).pw_shell.is_null() {
            return None;
        }
        let shell = CStr::from_ptr((*entry).pw_shell).to_string_lossy().into_owned();
        (!shell.is_empty()).then(|| PathBuf::from(shell))
    }
}
