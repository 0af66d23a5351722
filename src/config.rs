//! Declaration loading
//!
//! Reads `provision.toml`, expands variables in string fields and turns
//! each `[[resource]]` table into engine declarations. Bulk tables expand
//! in place, so declaration order follows the file.

use anyhow::{Context, Result, bail};
use declarative::{BoxedResource, Declaration, Guard, PackageKind, PackageSpec};
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::resource::{BrewPackage, Directory, Download, Execute, FileCopy, MacOSDefault};
use crate::schema::{Common, PackageKindEntry, ProvisionConfig, ResourceEntry, typed_value};

/// Environment variable overriding the declaration path
pub const CONFIG_ENV: &str = "PROVISION_CONFIG";

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("provision"))
}

/// Default declaration path: ~/.config/provision/provision.toml
pub fn default_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("provision.toml"))
}

/// Load a declaration file
pub fn load(path: &Path) -> Result<ProvisionConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Could not read {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("Invalid declaration in {}", path.display()))
}

// ============================================================================
// Expansion
// ============================================================================

#[derive(Debug, Error)]
#[error("not defined in [vars] or the environment")]
pub struct Undefined;

/// Expands `~`, `$NAME` and `${NAME}` in string fields
///
/// Names resolve against `[vars]` first, then the environment. An unknown
/// name is an error rather than an empty string.
pub struct Expander {
    vars: BTreeMap<String, String>,
}

impl Expander {
    pub fn new(vars: &BTreeMap<String, String>) -> Self {
        let vars = vars
            .iter()
            .map(|(k, v)| (k.clone(), shellexpand::tilde(v).into_owned()))
            .collect();
        Self { vars }
    }

    pub fn expand(&self, input: &str) -> Result<String> {
        let home = || dirs::home_dir().map(|p| p.to_string_lossy().into_owned());
        let lookup = |name: &str| -> Result<Option<String>, Undefined> {
            self.vars
                .get(name)
                .cloned()
                .or_else(|| std::env::var(name).ok())
                .map(Some)
                .ok_or(Undefined)
        };
        shellexpand::full_with_context(input, home, lookup)
            .map(std::borrow::Cow::into_owned)
            .with_context(|| format!("Failed to expand '{input}'"))
    }

    pub fn path(&self, input: &str) -> Result<PathBuf> {
        self.expand(input).map(PathBuf::from)
    }

    pub fn all(&self, inputs: &[String]) -> Result<Vec<String>> {
        inputs.iter().map(|s| self.expand(s)).collect()
    }

    /// Substitute `[vars]` in a shell script
    ///
    /// Other names, `~` included, are left for the shell to resolve.
    pub fn script(&self, input: &str) -> Result<String> {
        let lookup = |name: &str| -> Result<Option<String>, Infallible> {
            Ok(self.vars.get(name).cloned())
        };
        shellexpand::env_with_context(input, lookup)
            .map(std::borrow::Cow::into_owned)
            .with_context(|| format!("Failed to expand '{input}'"))
    }
}

// ============================================================================
// Declarations
// ============================================================================

/// Build the ordered declaration list
pub fn declarations(config: &ProvisionConfig) -> Result<Vec<Declaration>> {
    let expander = Expander::new(&config.vars);
    let mut declarations = Vec::new();
    for (index, entry) in config.resources.iter().enumerate() {
        let built = build(entry, &expander).with_context(|| {
            let label = entry
                .common()
                .name
                .as_deref()
                .map_or_else(String::new, |n| format!(" '{n}'"));
            format!("In resource #{} ({}){label}", index + 1, entry.type_name())
        })?;
        declarations.extend(built);
    }
    Ok(declarations)
}

fn package_kind(kind: PackageKindEntry) -> PackageKind {
    match kind {
        PackageKindEntry::Formula => PackageKind::Formula,
        PackageKindEntry::Cask => PackageKind::Cask,
        PackageKindEntry::Tap => PackageKind::Tap,
    }
}

fn build(entry: &ResourceEntry, x: &Expander) -> Result<Vec<Declaration>> {
    let single = |default_name: String, resource: BoxedResource| -> Result<Vec<Declaration>> {
        let common = entry.common();
        let name = common.name.clone().unwrap_or(default_name);
        Ok(vec![finish(Declaration::boxed(name, resource), common, x)?])
    };

    match entry {
        ResourceEntry::Package(e) => {
            let spec = PackageSpec::new(&e.package, package_kind(e.kind)).with_options(e.options.clone());
            let package = BrewPackage::new(spec);
            single(package.default_name(), Box::new(package))
        }
        ResourceEntry::Packages(e) => {
            no_name(&e.common, entry.type_name())?;
            e.names
                .iter()
                .map(|name| {
                    let package = BrewPackage::new(PackageSpec::new(name, package_kind(e.kind)));
                    let decl = Declaration::new(package.default_name(), package);
                    finish(decl, &e.common, x)
                })
                .collect()
        }
        ResourceEntry::Download(e) => {
            let dest = x.path(&e.dest)?;
            let download = Download::new(x.expand(&e.url)?, &dest).with_checksum(e.checksum.clone());
            single(dest.display().to_string(), Box::new(download))
        }
        ResourceEntry::Directory(e) => {
            let path = x.path(&e.path)?;
            let mode = e.mode.as_ref().map(crate::schema::Mode::bits).transpose()?;
            let directory = Directory::new(&path).recursive(e.recursive).with_mode(mode);
            single(path.display().to_string(), Box::new(directory))
        }
        ResourceEntry::Setting(e) => {
            let domain = x.expand(&e.domain)?;
            let value = typed_value(&e.value).with_context(|| format!("Invalid value for {}", e.key))?;
            let setting = MacOSDefault::new(&domain, &e.key, value);
            single(setting.default_name(), Box::new(setting))
        }
        ResourceEntry::Settings(e) => {
            no_name(&e.common, entry.type_name())?;
            let domain = x.expand(&e.domain)?;
            e.values
                .iter()
                .map(|(key, value)| {
                    let value = typed_value(value).with_context(|| format!("Invalid value for {key}"))?;
                    let setting = MacOSDefault::new(&domain, key, value);
                    finish(Declaration::new(setting.default_name(), setting), &e.common, x)
                })
                .collect()
        }
        ResourceEntry::Command(e) => {
            let Some(name) = e.common.name.clone() else {
                bail!("command resources need a `name`");
            };
            let command = match (&e.argv, &e.shell) {
                (Some(argv), None) if !argv.is_empty() => Execute::new(x.all(argv)?),
                (None, Some(script)) => Execute::shell(&x.script(script)?),
                (Some(_), None) => bail!("`argv` is empty"),
                _ => bail!("give exactly one of `argv` or `shell`"),
            };
            let cwd = e.cwd.as_deref().map(|c| x.path(c)).transpose()?;
            let command = command.current_dir(cwd).with_sudo(e.sudo);
            single(name, Box::new(command))
        }
        ResourceEntry::FileCopy(e) => {
            let dest = x.path(&e.dest)?;
            let mode = e.mode.as_ref().map(crate::schema::Mode::bits).transpose()?;
            let copy = FileCopy::new(x.path(&e.source)?, &dest).with_mode(mode);
            single(dest.display().to_string(), Box::new(copy))
        }
    }
}

fn no_name(common: &Common, type_name: &str) -> Result<()> {
    if let Some(name) = &common.name {
        bail!("`name` ('{name}') is not allowed on `{type_name}`; each item is named after itself");
    }
    Ok(())
}

/// Attach the common fields to a declaration
fn finish(mut decl: Declaration, common: &Common, x: &Expander) -> Result<Declaration> {
    if let Some(path) = &common.creates {
        decl = decl.guard(Guard::Creates(x.path(path)?));
    }
    if let Some(path) = &common.unless_exists {
        decl = decl.guard(Guard::UnlessExists(x.path(path)?));
    }
    if let Some(contains) = &common.file_contains {
        decl = decl.guard(Guard::FileContains {
            path: x.path(&contains.path)?,
            line: contains.line.clone(),
        });
    }
    if let Some(shell) = &common.login_shell {
        decl = decl.guard(Guard::LoginShell(x.path(shell)?));
    }
    if let Some(argv) = &common.not_if {
        decl = decl.guard(Guard::NotIf(x.all(argv)?));
    }
    if let Some(argv) = &common.only_if {
        decl = decl.guard(Guard::OnlyIf(x.all(argv)?));
    }

    decl.notifies.extend(common.notifies.iter().cloned());
    decl.depends_on.extend(common.depends_on.iter().cloned());
    decl.tags.extend(common.tags.iter().cloned());
    decl.best_effort = common.best_effort;
    decl.deferred = common.deferred;
    Ok(decl)
}
