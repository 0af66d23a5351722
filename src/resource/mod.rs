//! Resource kinds for provisioning
//!
//! Each kind implements [`declarative::Resource`]: a probe that reports
//! whether the machine already matches, and an action that converges it.
//! They reach the system through the collaborators in [`ApplyContext`],
//! except for the filesystem kinds, which touch local paths directly.

mod brew_package;
mod directory;
mod download;
mod execute;
mod file_copy;
mod macos_default;

#[cfg(test)]
pub mod testing;

pub use brew_package::BrewPackage;
pub use directory::Directory;
pub use download::Download;
pub use execute::Execute;
pub use file_copy::FileCopy;
pub use macos_default::MacOSDefault;

use anyhow::{Context, Result};
use std::fs::Metadata;
use std::path::Path;

/// Permission bits of an existing file, if the platform has them
#[cfg(unix)]
fn mode_of(metadata: &Metadata) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    Some(metadata.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
fn mode_of(_metadata: &Metadata) -> Option<u32> {
    None
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
        .with_context(|| format!("Failed to set mode {mode:o} on {}", path.display()))
}

#[cfg(not(unix))]
fn set_mode(path: &Path, _mode: u32) -> Result<()> {
    log::warn!("Ignoring mode for {}: not supported here", path.display());
    Ok(())
}

/// True when no mode is wanted or the file already has it
fn mode_matches(metadata: &Metadata, wanted: Option<u32>) -> bool {
    match wanted {
        None => true,
        Some(mode) => mode_of(metadata).is_none_or(|actual| actual == mode),
    }
}
