//! # prefkit
//!
//! Typed access to macOS preference domains.
//!
//! `defaults read` prints booleans as `1` and floats without a decimal
//! point, so a stored value's type is lost. This crate reads a domain via
//! `defaults export` and parses the property list, keeping each value's
//! real type. Writes use the typed `defaults write` flags.
//!
//! ## Example
//!
//! ```no_run
//! use prefkit::{Preferences, Value};
//!
//! let prefs = Preferences::new();
//! let key = ("com.apple.menuextra.battery", "ShowPercent");
//! if prefs.read(key.0, key.1)? != Some(Value::Bool(true)) {
//!     prefs.write(key.0, key.1, &Value::Bool(true))?;
//! }
//! # Ok::<(), prefkit::Error>(())
//! ```

#![warn(missing_docs)]

pub mod backend;
pub mod error;
pub mod value;

pub use error::{Error, Result};
pub use value::Value;

use backend::{Backend, defaults::DefaultsCli};
use plist::Value as Plist;
use std::io::Cursor;

/// Reads and writes preferences through a backend.
pub struct Preferences {
    backend: Box<dyn Backend>,
    privileged: Vec<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self::new()
    }
}

impl Preferences {
    /// Create a store over the real `defaults` CLI.
    pub fn new() -> Self {
        Self::with_backend(Box::new(DefaultsCli))
    }

    /// Create a store with a custom backend (useful for testing).
    pub fn with_backend(backend: Box<dyn Backend>) -> Self {
        Self {
            backend,
            privileged: Vec::new(),
        }
    }

    /// Domains whose writes go through `sudo -n`.
    #[must_use]
    pub fn with_privileged_domains(mut self, domains: Vec<String>) -> Self {
        self.privileged = domains;
        self
    }

    /// Whether writes to `domain` need elevated privileges.
    ///
    /// Listed domains and absolute paths under `/Library` do.
    pub fn is_privileged(&self, domain: &str) -> bool {
        self.privileged.iter().any(|d| d == domain) || domain.starts_with("/Library/")
    }

    /// Read a key with its stored type, `None` when unset.
    pub fn read(&self, domain: &str, key: &str) -> Result<Option<Value>> {
        let Some(exported) = self.backend.export(domain)? else {
            return Ok(None);
        };
        let Some(stored) = lookup(&exported, domain, key)? else {
            return Ok(None);
        };
        Value::from_plist(&stored, domain, key).map(Some)
    }

    /// Write a key with the value's type.
    pub fn write(&self, domain: &str, key: &str, value: &Value) -> Result<()> {
        let privileged = self.is_privileged(domain);
        log::debug!("write {domain} {key} (privileged: {privileged})");
        self.backend
            .write(domain, key, &value.write_args(), privileged)
    }
}

/// Find `key` in an exported domain.
fn lookup(exported: &[u8], domain: &str, key: &str) -> Result<Option<Plist>> {
    if exported.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let parse_error = |message: String| Error::Parse {
        domain: domain.to_string(),
        message,
    };
    let root = Plist::from_reader(Cursor::new(exported)).map_err(|e| parse_error(e.to_string()))?;
    match root {
        Plist::Dictionary(mut dict) => Ok(dict.remove(key)),
        _ => Err(parse_error("expected a dictionary at the root".to_string())),
    }
}
