//! Real collaborators for the engine
//!
//! Thin adapters from the engine's traits onto the workspace crates:
//! `brewkit` for packages, `fetchkit` for downloads and `prefkit` for
//! preferences.

use anyhow::{Context, Result, anyhow};
use declarative::{FileFetcher, PackageKind, PackageManager, PackageSpec, PreferenceStore, TypedValue};
use std::path::Path;

// ============================================================================
// Packages
// ============================================================================

/// Homebrew, if it is installed
///
/// A missing `brew` is only an error once a package is actually probed, so
/// declarations without packages still run on a bare machine.
pub struct Homebrew {
    client: Option<brewkit::Client>,
    retry: brewkit::RetryConfig,
}

impl Homebrew {
    pub fn new(retry: brewkit::RetryConfig) -> Self {
        let client = match brewkit::Client::new() {
            Ok(client) => Some(client),
            Err(e) => {
                log::debug!("Homebrew unavailable: {e}");
                None
            }
        };
        Self { client, retry }
    }

    #[cfg(test)]
    pub fn with_client(client: brewkit::Client, retry: brewkit::RetryConfig) -> Self {
        Self {
            client: Some(client),
            retry,
        }
    }

    fn client(&self) -> Result<&brewkit::Client> {
        self.client.as_ref().ok_or_else(|| {
            anyhow!(
                "Homebrew is not installed. {}",
                brewkit::ErrorCategory::BrewNotFound.advice()
            )
        })
    }
}

fn brew_package(spec: &PackageSpec) -> brewkit::Package {
    let package = match spec.kind {
        PackageKind::Formula => brewkit::Package::brew(&spec.name),
        PackageKind::Cask => brewkit::Package::cask(&spec.name),
        PackageKind::Tap => brewkit::Package::tap(&spec.name),
    };
    spec.options
        .iter()
        .fold(package, |package, option| package.with_option(option))
}

impl PackageManager for Homebrew {
    fn is_installed(&self, package: &PackageSpec) -> Result<bool> {
        self.client()?
            .is_installed(&brew_package(package))
            .with_context(|| format!("Failed to check {package}"))
    }

    fn install(&self, package: &PackageSpec) -> Result<()> {
        self.client()?
            .install_with_retry(&brew_package(package), &self.retry)
            .map_err(|e| {
                let advice = e.category().advice();
                anyhow!(e).context(format!("Failed to install {package} ({advice})"))
            })
    }
}

// ============================================================================
// Downloads
// ============================================================================

pub struct Downloads {
    fetcher: fetchkit::Fetcher,
}

impl Downloads {
    pub fn new(fetcher: fetchkit::Fetcher) -> Self {
        Self { fetcher }
    }
}

impl FileFetcher for Downloads {
    fn fetch(&self, url: &str, dest: &Path, checksum: Option<&str>) -> Result<()> {
        self.fetcher
            .fetch(url, dest, checksum)
            .with_context(|| format!("Failed to download {url}"))
    }

    fn matches(&self, dest: &Path, checksum: Option<&str>) -> Result<bool> {
        self.fetcher
            .matches(dest, checksum)
            .with_context(|| format!("Failed to verify {}", dest.display()))
    }
}

// ============================================================================
// Preferences
// ============================================================================

pub struct Defaults {
    prefs: prefkit::Preferences,
}

impl Defaults {
    pub fn new(prefs: prefkit::Preferences) -> Self {
        Self { prefs }
    }
}

fn to_pref(value: &TypedValue) -> prefkit::Value {
    match value {
        TypedValue::Bool(b) => prefkit::Value::Bool(*b),
        TypedValue::Int(i) => prefkit::Value::Integer(*i),
        TypedValue::Float(x) => prefkit::Value::Real(*x),
        TypedValue::String(s) => prefkit::Value::String(s.clone()),
        TypedValue::List(items) => prefkit::Value::Array(items.iter().map(to_pref).collect()),
    }
}

fn from_pref(value: prefkit::Value) -> TypedValue {
    match value {
        prefkit::Value::Bool(b) => TypedValue::Bool(b),
        prefkit::Value::Integer(i) => TypedValue::Int(i),
        prefkit::Value::Real(x) => TypedValue::Float(x),
        prefkit::Value::String(s) => TypedValue::String(s),
        prefkit::Value::Array(items) => TypedValue::List(items.into_iter().map(from_pref).collect()),
    }
}

impl PreferenceStore for Defaults {
    fn get(&self, domain: &str, key: &str) -> Result<Option<TypedValue>> {
        let value = self
            .prefs
            .read(domain, key)
            .with_context(|| format!("Failed to read {domain} {key}"))?;
        Ok(value.map(from_pref))
    }

    fn set(&self, domain: &str, key: &str, value: &TypedValue) -> Result<()> {
        self.prefs
            .write(domain, key, &to_pref(value))
            .with_context(|| format!("Failed to write {domain} {key}"))
    }
}
