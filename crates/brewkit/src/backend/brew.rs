//! Real Homebrew CLI backend using `brew` commands.

use crate::backend::Backend;
use crate::error::{Error, ErrorCategory, Result};
use crate::types::{Package, PackageType};
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

/// Locations checked before falling back to `PATH`
const BREW_LOCATIONS: &[&str] = &[
    "/opt/homebrew/bin/brew",              // Apple Silicon
    "/usr/local/bin/brew",                 // Intel
    "/home/linuxbrew/.linuxbrew/bin/brew", // Linux
];

/// Backend that executes real `brew` commands.
pub struct BrewBackend {
    brew_path: PathBuf,
}

impl BrewBackend {
    /// Create a new BrewBackend.
    ///
    /// Returns an error if Homebrew is not installed.
    pub fn new() -> Result<Self> {
        Ok(Self {
            brew_path: find_brew()?,
        })
    }

    /// Use a specific brew executable.
    pub fn with_path(brew_path: impl Into<PathBuf>) -> Self {
        Self {
            brew_path: brew_path.into(),
        }
    }

    /// Path of the brew executable in use.
    pub fn brew_path(&self) -> &Path {
        &self.brew_path
    }

    fn run_brew(&self, args: &[&str]) -> Result<Output> {
        log::debug!("brew {}", args.join(" "));
        Ok(Command::new(&self.brew_path)
            .args(args)
            .env("HOMEBREW_NO_AUTO_UPDATE", "1")
            .stdin(Stdio::null())
            .output()?)
    }
}

impl Backend for BrewBackend {
    fn is_available(&self) -> bool {
        self.run_brew(&["--version"])
            .is_ok_and(|o| o.status.success())
    }

    fn is_installed(&self, package: &Package) -> Result<bool> {
        match package.package_type.flag() {
            None => {
                let output = self.run_brew(&["tap"])?;
                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    return Err(Error::from_brew_output(&["tap"], &stderr, &package.name));
                }
                Ok(tap_listed(&String::from_utf8_lossy(&output.stdout), &package.name))
            }
            Some(flag) => {
                let args = ["info", "--json=v2", flag, package.name.as_str()];
                let output = self.run_brew(&args)?;
                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    let err = Error::from_brew_output(&args, &stderr, &package.name);
                    // an unknown name is simply not installed; anything else is a failed probe
                    if err.category() == ErrorCategory::NotFound {
                        return Ok(false);
                    }
                    return Err(err);
                }
                let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;
                Ok(installed_in_info(&json, package.package_type))
            }
        }
    }

    fn install(&self, package: &Package) -> Result<()> {
        let args = package.install_args();
        let output = self.run_brew(&args)?;
        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let err = Error::from_brew_output(&args, &stderr, &package.name);
        if err.is_ignorable() {
            log::debug!("{}: {err}", package.name);
            return Ok(());
        }
        Err(err)
    }
}

/// Find the brew executable path.
fn find_brew() -> Result<PathBuf> {
    if let Some(path) = BREW_LOCATIONS.iter().map(Path::new).find(|p| p.exists()) {
        return Ok(path.to_path_buf());
    }

    let output = Command::new("which")
        .arg("brew")
        .output()
        .map_err(|_| Error::BrewNotFound)?;

    let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if output.status.success() && !path.is_empty() {
        return Ok(PathBuf::from(path));
    }

    Err(Error::BrewNotFound)
}

/// Check `brew tap` output for a tap, ignoring case.
fn tap_listed(stdout: &str, name: &str) -> bool {
    stdout
        .lines()
        .any(|t| t.trim().eq_ignore_ascii_case(name))
}

/// Read the installed state out of `brew info --json=v2`.
fn installed_in_info(json: &serde_json::Value, package_type: PackageType) -> bool {
    match package_type {
        PackageType::Cask => json["casks"]
            .as_array()
            .and_then(|arr| arr.first())
            .is_some_and(|c| c["installed"].is_string()),
        PackageType::Brew => json["formulae"]
            .as_array()
            .and_then(|arr| arr.first())
            .and_then(|f| f["installed"].as_array())
            .is_some_and(|versions| !versions.is_empty()),
        PackageType::Tap => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// A `brew` stand-in that prints `stderr` and exits 1
    #[cfg(unix)]
    fn failing_brew(dir: &Path, stderr: &str) -> BrewBackend {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join("brew");
        std::fs::write(&path, format!("#!/bin/sh\necho '{stderr}' >&2\nexit 1\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        BrewBackend::with_path(path)
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_info_is_an_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let brew = failing_brew(
            dir.path(),
            "Error: Failed to download formula.jws.json: curl: (6) Could not resolve host",
        );

        let err = brew.is_installed(&Package::brew("wget")).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Network);
    }

    #[cfg(unix)]
    #[test]
    fn test_unknown_name_is_not_installed() {
        let dir = tempfile::TempDir::new().unwrap();
        let brew = failing_brew(
            dir.path(),
            "Error: No available formula with the name \"wgett\".",
        );

        assert!(!brew.is_installed(&Package::brew("wgett")).unwrap());
    }

    #[test]
    fn test_tap_listed() {
        let stdout = "homebrew/bundle\nHomebrew/cask-fonts\n";
        assert!(tap_listed(stdout, "homebrew/cask-fonts"));
        assert!(!tap_listed(stdout, "homebrew/services"));
    }

    #[test]
    fn test_formula_installed() {
        let installed = json!({
            "formulae": [{ "name": "zsh", "installed": [{ "version": "5.9" }] }],
            "casks": []
        });
        let missing = json!({
            "formulae": [{ "name": "zsh", "installed": [] }],
            "casks": []
        });
        assert!(installed_in_info(&installed, PackageType::Brew));
        assert!(!installed_in_info(&missing, PackageType::Brew));
    }

    #[test]
    fn test_cask_installed() {
        let installed = json!({ "formulae": [], "casks": [{ "token": "iterm2", "installed": "3.5.0" }] });
        let missing = json!({ "formulae": [], "casks": [{ "token": "iterm2", "installed": null }] });
        assert!(installed_in_info(&installed, PackageType::Cask));
        assert!(!installed_in_info(&missing, PackageType::Cask));
    }
}
