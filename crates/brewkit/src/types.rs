//! Packages and retry settings.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What `brew` is asked to manage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageType {
    /// A third-party repository (`brew tap`)
    Tap,
    /// A formula (`brew install --formula`)
    Brew,
    /// An application bundle (`brew install --cask`)
    Cask,
}

impl PackageType {
    /// The `brew` flag selecting this type, if any.
    pub fn flag(self) -> Option<&'static str> {
        match self {
            Self::Tap => None,
            Self::Brew => Some("--formula"),
            Self::Cask => Some("--cask"),
        }
    }
}

impl std::fmt::Display for PackageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Tap => write!(f, "tap"),
            Self::Brew => write!(f, "brew"),
            Self::Cask => write!(f, "cask"),
        }
    }
}

/// A tap, formula or cask, plus install options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    /// Formula name, cask token or `user/repo`
    pub name: String,
    /// Selects the install command
    pub package_type: PackageType,
    /// Extra arguments appended to the install command
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
}

impl Package {
    /// A package with no options.
    pub fn new(name: impl Into<String>, package_type: PackageType) -> Self {
        Self {
            name: name.into(),
            package_type,
            options: Vec::new(),
        }
    }

    /// A `user/repo` tap.
    pub fn tap(name: impl Into<String>) -> Self {
        Self::new(name, PackageType::Tap)
    }

    /// A formula; `brew` is Homebrew's own name for them.
    pub fn brew(name: impl Into<String>) -> Self {
        Self::new(name, PackageType::Brew)
    }

    /// An application bundle.
    pub fn cask(name: impl Into<String>) -> Self {
        Self::new(name, PackageType::Cask)
    }

    /// Add an install option such as `--with-pcre`.
    #[must_use]
    pub fn with_option(mut self, option: impl Into<String>) -> Self {
        self.options.push(option.into());
        self
    }

    /// Arguments for `brew` that install this package.
    pub fn install_args(&self) -> Vec<&str> {
        let mut args = match self.package_type.flag() {
            None => vec!["tap", self.name.as_str()],
            Some(flag) => vec!["install", flag, self.name.as_str()],
        };
        args.extend(self.options.iter().map(String::as_str));
        args
    }
}

/// Exponential backoff for retryable install failures.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Attempts in total; 1 disables retrying
    pub max_attempts: u32,
    /// Wait before the first retry
    pub base_delay: Duration,
    /// Growth of the wait per retry
    pub backoff_factor: f64,
    /// Upper bound on any single wait
    pub max_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(5),
            backoff_factor: 2.0,
            max_delay: Duration::from_secs(120),
        }
    }
}

impl RetryConfig {
    /// Custom attempts and backoff, default cap.
    pub fn new(max_attempts: u32, base_delay: Duration, backoff_factor: f64) -> Self {
        Self {
            max_attempts,
            base_delay,
            backoff_factor,
            ..Default::default()
        }
    }

    /// Wait after the zero-based `attempt`, capped at `max_delay`.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let delay = self.base_delay.as_secs_f64() * self.backoff_factor.powi(exponent);
        let capped = delay.min(self.max_delay.as_secs_f64());
        Duration::from_secs_f64(capped)
    }

    /// A single attempt.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Default::default()
        }
    }
}
