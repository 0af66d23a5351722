//! Homebrew package resource

use anyhow::Result;
use declarative::{ApplyContext, PackageKind, PackageSpec, Resource, ResourceKind};

/// A Homebrew formula, cask or tap
#[derive(Debug, Clone)]
pub struct BrewPackage {
    pub spec: PackageSpec,
}

impl BrewPackage {
    pub fn new(spec: PackageSpec) -> Self {
        Self { spec }
    }

    pub fn formula(name: &str) -> Self {
        Self::new(PackageSpec::new(name, PackageKind::Formula))
    }

    pub fn cask(name: &str) -> Self {
        Self::new(PackageSpec::new(name, PackageKind::Cask))
    }

    pub fn tap(name: &str) -> Self {
        Self::new(PackageSpec::new(name, PackageKind::Tap))
    }

    /// Name used when the declaration does not give one
    ///
    /// Formulae keep their bare name so they read naturally as dependency
    /// targets; casks and taps are prefixed to keep them apart.
    pub fn default_name(&self) -> String {
        match self.spec.kind {
            PackageKind::Formula => self.spec.name.clone(),
            PackageKind::Cask => format!("cask:{}", self.spec.name),
            PackageKind::Tap => format!("tap:{}", self.spec.name),
        }
    }
}

impl Resource for BrewPackage {
    fn kind(&self) -> ResourceKind {
        ResourceKind::Package
    }

    fn description(&self) -> String {
        let base = match self.spec.kind {
            PackageKind::Tap => format!("Tap {} via brew", self.spec.name),
            PackageKind::Formula => format!("Install formula {}", self.spec.name),
            PackageKind::Cask => format!("Install cask {}", self.spec.name),
        };
        if self.spec.options.is_empty() {
            base
        } else {
            format!("{base} ({})", self.spec.options.join(" "))
        }
    }

    fn is_satisfied(&self, ctx: &ApplyContext) -> Result<bool> {
        ctx.packages.is_installed(&self.spec)
    }

    fn apply(&self, ctx: &ApplyContext) -> Result<()> {
        ctx.packages.install(&self.spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::testing::{FakePackages, Fakes};

    #[test]
    fn test_default_names() {
        assert_eq!(BrewPackage::formula("zsh").default_name(), "zsh");
        assert_eq!(BrewPackage::cask("iterm2").default_name(), "cask:iterm2");
        assert_eq!(
            BrewPackage::tap("homebrew/cask-fonts").default_name(),
            "tap:homebrew/cask-fonts"
        );
    }

    #[test]
    fn test_probe_then_install() {
        let fakes = Fakes::default();
        let ctx = fakes.context();
        let zsh = BrewPackage::formula("zsh");

        assert!(!zsh.is_satisfied(&ctx).unwrap());
        zsh.apply(&ctx).unwrap();
        assert!(zsh.is_satisfied(&ctx).unwrap());
        assert_eq!(fakes.packages.installs(), vec!["zsh".to_string()]);
    }

    #[test]
    fn test_installed_package_is_satisfied() {
        let fakes = Fakes::default().with_packages(FakePackages::with_installed(&["git"]));
        assert!(BrewPackage::formula("git").is_satisfied(&fakes.context()).unwrap());
    }

    #[test]
    fn test_options_reach_the_installer() {
        let fakes = Fakes::default();
        let grep = BrewPackage::new(
            PackageSpec::new("grep", PackageKind::Formula)
                .with_options(vec!["--with-pcre".to_string()]),
        );

        grep.apply(&fakes.context()).unwrap();
        assert_eq!(fakes.packages.installs(), vec!["grep --with-pcre".to_string()]);
        assert_eq!(grep.description(), "Install formula grep (--with-pcre)");
    }
}
