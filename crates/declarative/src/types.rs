//! Core types for declarative resource management

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::process::Output;

/// Kind of a declared resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Package,
    FileDownload,
    DirectoryExists,
    KeyValueSetting,
    CommandExecuted,
    FileCopy,
}

impl ResourceKind {
    /// Short label used in listings and logs
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Package => "package",
            Self::FileDownload => "download",
            Self::DirectoryExists => "directory",
            Self::KeyValueSetting => "setting",
            Self::CommandExecuted => "command",
            Self::FileCopy => "file_copy",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which stage of a resource failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Probing current state failed
    Guard,
    /// The action ran but did not complete
    Action,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Guard => f.write_str("guard"),
            Self::Action => f.write_str("action"),
        }
    }
}

/// Outcome of processing a single resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Guard held, nothing was done
    Unchanged,
    /// Action ran and succeeded
    Converged,
    /// Dry run: the guard did not hold
    WouldConverge,
    /// Not processed
    Skipped { reason: String },
    /// Guard or action failed
    Failed { kind: FailureKind, reason: String },
}

impl Outcome {
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self::Skipped {
            reason: reason.into(),
        }
    }

    pub fn failed(kind: FailureKind, error: &anyhow::Error) -> Self {
        Self::Failed {
            kind,
            reason: format!("{error:#}"),
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }

    /// Check if the outcome represents a change (made or pending)
    pub fn is_change(&self) -> bool {
        matches!(self, Self::Converged | Self::WouldConverge)
    }
}

/// One line of a run report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub name: String,
    pub kind: ResourceKind,
    #[serde(flatten)]
    pub outcome: Outcome,
    /// Set when this entry was produced by a notification
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notified_by: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub best_effort: bool,
}

/// Overall result of a run, used for exit codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    NothingToDo,
    Changed,
    Failed,
}

impl RunStatus {
    /// Process exit code for this status
    ///
    /// Plain mode only separates success from failure. Detailed mode
    /// returns 0 for nothing to do, 2 for changes and 1 for failure.
    pub fn exit_code(self, detailed: bool) -> u8 {
        match (self, detailed) {
            (Self::Failed, _) => 1,
            (Self::Changed, true) => 2,
            _ => 0,
        }
    }
}

/// The ordered outcome of one pass over a plan
///
/// Built by [`run`](crate::run) and read-only afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunReport {
    entries: Vec<ReportEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    aborted_by: Option<String>,
    dry_run: bool,
}

impl RunReport {
    pub(crate) fn new(dry_run: bool) -> Self {
        Self {
            entries: Vec::new(),
            aborted_by: None,
            dry_run,
        }
    }

    pub(crate) fn push(&mut self, entry: ReportEntry) -> &ReportEntry {
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    pub(crate) fn abort(&mut self, name: &str) {
        self.aborted_by = Some(name.to_string());
    }

    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// Entry names in report order
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name.as_str()).collect()
    }

    /// First entry recorded for a resource
    pub fn entry(&self, name: &str) -> Option<&ReportEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Outcome of the first entry recorded for a resource
    pub fn outcome(&self, name: &str) -> Option<&Outcome> {
        self.entry(name).map(|e| &e.outcome)
    }

    /// Resource whose failure stopped the run
    pub fn aborted_by(&self) -> Option<&str> {
        self.aborted_by.as_deref()
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn failures(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(|e| e.outcome.is_failure())
    }

    pub fn summary(&self) -> RunSummary {
        let mut summary = RunSummary::default();
        for entry in &self.entries {
            summary.add_outcome(&entry.outcome);
        }
        summary
    }

    /// Overall status
    ///
    /// Best-effort failures only count when `strict` is set.
    pub fn status(&self, strict: bool) -> RunStatus {
        let failed = self
            .failures()
            .any(|e| strict || !e.best_effort);
        if failed {
            RunStatus::Failed
        } else if self.entries.iter().any(|e| e.outcome.is_change()) {
            RunStatus::Changed
        } else {
            RunStatus::NothingToDo
        }
    }
}

/// Counts of outcomes in a report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub unchanged: usize,
    pub converged: usize,
    pub would_converge: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    /// Total number of actual changes made
    pub fn total_changes(&self) -> usize {
        self.converged
    }

    /// Check if execution was fully successful (no failures)
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    /// Total number of entries
    pub fn total(&self) -> usize {
        self.unchanged + self.converged + self.would_converge + self.skipped + self.failed
    }

    /// Add an outcome to the summary
    pub fn add_outcome(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Unchanged => self.unchanged += 1,
            Outcome::Converged => self.converged += 1,
            Outcome::WouldConverge => self.would_converge += 1,
            Outcome::Skipped { .. } => self.skipped += 1,
            Outcome::Failed { .. } => self.failed += 1,
        }
    }
}

/// Kind of package a package manager handles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageKind {
    Formula,
    Cask,
    Tap,
}

/// A package to probe or install
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSpec {
    pub name: String,
    pub kind: PackageKind,
    /// Extra arguments passed to the install command
    pub options: Vec<String>,
}

impl PackageSpec {
    pub fn new(name: impl Into<String>, kind: PackageKind) -> Self {
        Self {
            name: name.into(),
            kind,
            options: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: Vec<String>) -> Self {
        self.options = options;
        self
    }
}

impl fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            PackageKind::Formula => write!(f, "{}", self.name),
            PackageKind::Cask => write!(f, "cask {}", self.name),
            PackageKind::Tap => write!(f, "tap {}", self.name),
        }
    }
}

/// An external command to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    pub argv: Vec<String>,
    pub cwd: Option<PathBuf>,
    /// Give the child a null stdin so it can never prompt
    pub null_stdin: bool,
}

impl CommandLine {
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            cwd: None,
            null_stdin: false,
        }
    }

    #[must_use]
    pub fn current_dir(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    #[must_use]
    pub fn non_interactive(mut self) -> Self {
        self.null_stdin = true;
        self
    }

    pub fn program(&self) -> Option<&str> {
        self.argv.first().map(String::as_str)
    }

    pub fn args(&self) -> &[String] {
        self.argv.get(1..).unwrap_or_default()
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.argv.join(" "))
    }
}

/// Output from an external command
#[derive(Debug, Clone, Default)]
pub struct CommandOutput {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub success: bool,
    /// Exit code, `None` when killed by a signal
    pub code: Option<i32>,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: output.stdout,
            stderr: output.stderr,
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

impl CommandOutput {
    /// Get stdout as a string
    pub fn stdout_str(&self) -> String {
        String::from_utf8_lossy(&self.stdout).to_string()
    }

    /// Get stderr as a string
    pub fn stderr_str(&self) -> String {
        String::from_utf8_lossy(&self.stderr).to_string()
    }
}
