//! Apply context and collaborator traits
//!
//! These traits keep the engine free of any concrete package manager,
//! download client or preference store. The binary wires real
//! implementations in; tests wire fakes.

use crate::types::{CommandLine, CommandOutput, PackageSpec, ReportEntry};
use crate::value::TypedValue;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Package prober and installer
pub trait PackageManager {
    /// Check whether the package is already installed
    fn is_installed(&self, package: &PackageSpec) -> Result<bool>;

    /// Install the package with its options
    fn install(&self, package: &PackageSpec) -> Result<()>;
}

/// Fetches remote files to local paths
pub trait FileFetcher {
    /// Download `url` to `dest`
    ///
    /// When a checksum is given it must be verified before the fetch
    /// counts as successful. A failed fetch leaves nothing at `dest`.
    fn fetch(&self, url: &str, dest: &Path, checksum: Option<&str>) -> Result<()>;

    /// Check whether `dest` exists and, if a checksum is given, matches it
    fn matches(&self, dest: &Path, checksum: Option<&str>) -> Result<bool>;
}

/// Per-application settings store
pub trait PreferenceStore {
    /// Read the stored value, `None` when the key is unset
    fn get(&self, domain: &str, key: &str) -> Result<Option<TypedValue>>;

    /// Write a value with its declared type
    fn set(&self, domain: &str, key: &str, value: &TypedValue) -> Result<()>;
}

/// Runs external commands
pub trait ProcessRunner {
    fn run(&self, command: &CommandLine) -> Result<CommandOutput>;
}

/// Facts about the current user account
pub trait AccountProbe {
    /// The user's login shell, if the account database has one
    fn login_shell(&self) -> Result<Option<PathBuf>>;
}

/// Progress callback for execution operations
///
/// Implement this trait to receive progress updates during a run.
pub trait ProgressCallback {
    /// Called once before the first resource
    fn on_run_start(&mut self, total: usize, dry_run: bool);

    /// Called when starting to process a single resource
    fn on_resource_start(&mut self, name: &str, description: &str);

    /// Called when a resource has an outcome
    fn on_resource_complete(&mut self, entry: &ReportEntry);

    /// Called once after the last resource
    fn on_run_complete(&mut self);
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_run_start(&mut self, _total: usize, _dry_run: bool) {}
    fn on_resource_start(&mut self, _name: &str, _description: &str) {}
    fn on_resource_complete(&mut self, _entry: &ReportEntry) {}
    fn on_run_complete(&mut self) {}
}

/// Context passed to guards and actions
///
/// Everything a resource may touch outside the process goes through here.
#[derive(Clone, Copy)]
pub struct ApplyContext<'a> {
    pub packages: &'a dyn PackageManager,
    pub fetcher: &'a dyn FileFetcher,
    pub prefs: &'a dyn PreferenceStore,
    pub runner: &'a dyn ProcessRunner,
    pub account: &'a dyn AccountProbe,
}

impl<'a> ApplyContext<'a> {
    pub fn new(
        packages: &'a dyn PackageManager,
        fetcher: &'a dyn FileFetcher,
        prefs: &'a dyn PreferenceStore,
        runner: &'a dyn ProcessRunner,
        account: &'a dyn AccountProbe,
    ) -> Self {
        Self {
            packages,
            fetcher,
            prefs,
            runner,
            account,
        }
    }

    /// Run a command and fail unless it exits successfully
    pub fn run_checked(&self, command: &CommandLine) -> Result<CommandOutput> {
        let output = self.runner.run(command)?;
        if !output.success {
            let stderr = output.stderr_str();
            let code = output
                .code
                .map_or_else(|| "signal".to_string(), |c| c.to_string());
            anyhow::bail!("`{command}` failed (exit {code}): {}", stderr.trim());
        }
        Ok(output)
    }
}
