//! Backend abstraction over the preference database.

pub mod defaults;

use crate::error::Result;

/// Raw access to preference domains.
pub trait Backend {
    /// Export a whole domain as a property list, `None` if it does not exist.
    fn export(&self, domain: &str) -> Result<Option<Vec<u8>>>;

    /// Write one key. `args` are the typed value arguments.
    ///
    /// Privileged writes must never prompt for a password.
    fn write(&self, domain: &str, key: &str, args: &[String], privileged: bool) -> Result<()>;
}
