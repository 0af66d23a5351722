use declarative::TypedValue;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

use crate::sudo::SudoConfig;

// ============================================================================
// Main Config Schema
// ============================================================================

/// The provisioning declaration, as written in `provision.toml`
#[derive(Debug, Default, Deserialize)]
pub struct ProvisionConfig {
    /// Variables available to `$NAME` / `${NAME}` expansion
    #[serde(default)]
    pub vars: BTreeMap<String, String>,

    /// Sudo configuration
    #[serde(default)]
    pub sudo: SudoConfig,

    /// Retry policy for package installs and downloads
    #[serde(default)]
    pub retry: RetrySettings,

    /// Declared resources, in order
    #[serde(default, rename = "resource")]
    pub resources: Vec<ResourceEntry>,
}

// ============================================================================
// Retry
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Attempts per operation, including the first
    pub attempts: u32,
    /// Delay before the first retry, in seconds
    pub delay_secs: u64,
    /// Cap on the delay between retries, in seconds
    pub max_delay_secs: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay_secs: 5,
            max_delay_secs: 120,
        }
    }
}

impl RetrySettings {
    pub fn brew(&self) -> brewkit::RetryConfig {
        brewkit::RetryConfig {
            max_attempts: self.attempts.max(1),
            base_delay: Duration::from_secs(self.delay_secs),
            backoff_factor: 2.0,
            max_delay: Duration::from_secs(self.max_delay_secs),
        }
    }

    pub fn fetch(&self) -> fetchkit::RetryConfig {
        fetchkit::RetryConfig {
            max_attempts: self.attempts.max(1),
            base_delay: Duration::from_secs(self.delay_secs),
            max_delay: Duration::from_secs(self.max_delay_secs),
        }
    }
}

// ============================================================================
// Resources
// ============================================================================

/// One `[[resource]]` table, tagged by `type`
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResourceEntry {
    Package(PackageEntry),
    Packages(PackagesEntry),
    Download(DownloadEntry),
    Directory(DirectoryEntry),
    Setting(SettingEntry),
    Settings(SettingsEntry),
    Command(CommandEntry),
    FileCopy(FileCopyEntry),
}

impl ResourceEntry {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Package(_) => "package",
            Self::Packages(_) => "packages",
            Self::Download(_) => "download",
            Self::Directory(_) => "directory",
            Self::Setting(_) => "setting",
            Self::Settings(_) => "settings",
            Self::Command(_) => "command",
            Self::FileCopy(_) => "file_copy",
        }
    }

    pub fn common(&self) -> &Common {
        match self {
            Self::Package(e) => &e.common,
            Self::Packages(e) => &e.common,
            Self::Download(e) => &e.common,
            Self::Directory(e) => &e.common,
            Self::Setting(e) => &e.common,
            Self::Settings(e) => &e.common,
            Self::Command(e) => &e.common,
            Self::FileCopy(e) => &e.common,
        }
    }
}

/// Fields every resource accepts
#[derive(Debug, Default, Deserialize)]
pub struct Common {
    pub name: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub notifies: Vec<String>,
    #[serde(default)]
    pub depends_on: Vec<String>,
    #[serde(default)]
    pub best_effort: bool,
    /// Only runs when notified
    #[serde(default)]
    pub deferred: bool,

    // Guards
    pub not_if: Option<Vec<String>>,
    pub only_if: Option<Vec<String>>,
    /// Satisfied once the path exists
    pub creates: Option<String>,
    /// Satisfied while the path is absent
    pub unless_exists: Option<String>,
    pub file_contains: Option<FileContains>,
    pub login_shell: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileContains {
    pub path: String,
    pub line: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackageKindEntry {
    #[default]
    Formula,
    Cask,
    Tap,
}

#[derive(Debug, Deserialize)]
pub struct PackageEntry {
    pub package: String,
    #[serde(default)]
    pub kind: PackageKindEntry,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(flatten)]
    pub common: Common,
}

/// Several packages of one kind, expanded in place
#[derive(Debug, Deserialize)]
pub struct PackagesEntry {
    pub names: Vec<String>,
    #[serde(default)]
    pub kind: PackageKindEntry,
    #[serde(flatten)]
    pub common: Common,
}

#[derive(Debug, Deserialize)]
pub struct DownloadEntry {
    pub url: String,
    pub dest: String,
    /// SHA-256 hex digest, optionally prefixed with `sha256:`
    pub checksum: Option<String>,
    #[serde(flatten)]
    pub common: Common,
}

#[derive(Debug, Deserialize)]
pub struct DirectoryEntry {
    pub path: String,
    #[serde(default = "default_true")]
    pub recursive: bool,
    pub mode: Option<Mode>,
    #[serde(flatten)]
    pub common: Common,
}

#[derive(Debug, Deserialize)]
pub struct SettingEntry {
    pub domain: String,
    pub key: String,
    pub value: toml::Value,
    #[serde(flatten)]
    pub common: Common,
}

/// Several keys of one domain, expanded in key order
#[derive(Debug, Deserialize)]
pub struct SettingsEntry {
    pub domain: String,
    pub values: BTreeMap<String, toml::Value>,
    #[serde(flatten)]
    pub common: Common,
}

/// A command, given either as `argv` or as a `/bin/sh` script
#[derive(Debug, Deserialize)]
pub struct CommandEntry {
    /// Items expand like paths: `~`, `[vars]`, then the environment
    pub argv: Option<Vec<String>>,
    /// Only `[vars]` names are substituted; the shell resolves the rest
    pub shell: Option<String>,
    pub cwd: Option<String>,
    #[serde(default)]
    pub sudo: bool,
    #[serde(flatten)]
    pub common: Common,
}

#[derive(Debug, Deserialize)]
pub struct FileCopyEntry {
    pub source: String,
    pub dest: String,
    pub mode: Option<Mode>,
    #[serde(flatten)]
    pub common: Common,
}

fn default_true() -> bool {
    true
}

// ============================================================================
// Values
// ============================================================================

/// A unix mode: `0o755` as a TOML integer, or `"755"` / `"0755"` as a string
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Mode {
    Bits(u32),
    Octal(String),
}

impl Mode {
    pub fn bits(&self) -> Result<u32, ValueError> {
        let bits = match self {
            Self::Bits(bits) => *bits,
            Self::Octal(text) => {
                let digits = text.trim_start_matches("0o");
                u32::from_str_radix(digits, 8)
                    .map_err(|_| ValueError::InvalidMode(text.clone()))?
            }
        };
        if bits > 0o7777 {
            return Err(ValueError::InvalidMode(format!("{bits:o}")));
        }
        Ok(bits)
    }
}

#[derive(Debug, Error)]
pub enum ValueError {
    #[error("tables are not supported as preference values")]
    Table,

    #[error("dates are not supported as preference values")]
    Datetime,

    #[error("nan never compares equal, so it cannot be a preference value")]
    NotANumber,

    #[error("invalid mode '{0}': expected octal permission bits such as 755")]
    InvalidMode(String),
}

/// Convert a TOML value to a typed preference value
pub fn typed_value(value: &toml::Value) -> Result<TypedValue, ValueError> {
    Ok(match value {
        toml::Value::Boolean(b) => TypedValue::Bool(*b),
        toml::Value::Integer(i) => TypedValue::Int(*i),
        toml::Value::Float(x) if x.is_nan() => return Err(ValueError::NotANumber),
        toml::Value::Float(x) => TypedValue::Float(*x),
        toml::Value::String(s) => TypedValue::String(s.clone()),
        toml::Value::Array(items) => {
            TypedValue::List(items.iter().map(typed_value).collect::<Result<_, _>>()?)
        }
        toml::Value::Table(_) => return Err(ValueError::Table),
        toml::Value::Datetime(_) => return Err(ValueError::Datetime),
    })
}
