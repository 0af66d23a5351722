//! In-memory collaborators for resource and scenario tests

use crate::providers::Downloads;
use anyhow::{Result, bail};
use declarative::{
    AccountProbe, ApplyContext, CommandLine, CommandOutput, PackageManager, PackageSpec,
    PreferenceStore, ProcessRunner, TypedValue,
};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::rc::Rc;

/// Package manager that installs into a set
#[derive(Default)]
pub struct FakePackages {
    installed: RefCell<BTreeSet<String>>,
    installs: RefCell<Vec<String>>,
    broken: BTreeSet<String>,
}

impl FakePackages {
    pub fn with_installed(names: &[&str]) -> Self {
        Self {
            installed: RefCell::new(names.iter().map(ToString::to_string).collect()),
            ..Self::default()
        }
    }

    /// Installs of this package fail
    pub fn broken(mut self, name: &str) -> Self {
        self.broken.insert(name.to_string());
        self
    }

    /// Every install performed, with its options
    pub fn installs(&self) -> Vec<String> {
        self.installs.borrow().clone()
    }
}

impl PackageManager for FakePackages {
    fn is_installed(&self, package: &PackageSpec) -> Result<bool> {
        Ok(self.installed.borrow().contains(&package.name))
    }

    fn install(&self, package: &PackageSpec) -> Result<()> {
        if self.broken.contains(&package.name) {
            bail!("No available formula with the name \"{}\"", package.name);
        }
        let mut line = package.name.clone();
        for option in &package.options {
            line.push(' ');
            line.push_str(option);
        }
        self.installs.borrow_mut().push(line);
        self.installed.borrow_mut().insert(package.name.clone());
        Ok(())
    }
}

/// Preference store backed by a map, type-preserving
#[derive(Default)]
pub struct FakePrefs {
    values: RefCell<BTreeMap<(String, String), TypedValue>>,
    writes: RefCell<usize>,
}

impl FakePrefs {
    pub fn with(self, domain: &str, key: &str, value: impl Into<TypedValue>) -> Self {
        self.values
            .borrow_mut()
            .insert((domain.to_string(), key.to_string()), value.into());
        self
    }

    pub fn value(&self, domain: &str, key: &str) -> Option<TypedValue> {
        self.values
            .borrow()
            .get(&(domain.to_string(), key.to_string()))
            .cloned()
    }

    pub fn writes(&self) -> usize {
        *self.writes.borrow()
    }
}

impl PreferenceStore for FakePrefs {
    fn get(&self, domain: &str, key: &str) -> Result<Option<TypedValue>> {
        Ok(self.value(domain, key))
    }

    fn set(&self, domain: &str, key: &str, value: &TypedValue) -> Result<()> {
        *self.writes.borrow_mut() += 1;
        self.values
            .borrow_mut()
            .insert((domain.to_string(), key.to_string()), value.clone());
        Ok(())
    }
}

/// Login shell shared between the account probe and the runner
pub type SharedShell = Rc<RefCell<Option<PathBuf>>>;

/// Account probe reading a shared login shell
pub struct FakeAccount {
    pub shell: SharedShell,
}

impl AccountProbe for FakeAccount {
    fn login_shell(&self) -> Result<Option<PathBuf>> {
        Ok(self.shell.borrow().clone())
    }
}

/// Records commands and emulates the few the scenarios need
///
/// `chsh -s PATH` (optionally behind sudo) changes the shared login shell.
/// `false` and any program listed as failing exit 1; everything else
/// exits 0.
pub struct FakeRunner {
    calls: RefCell<Vec<CommandLine>>,
    failing: BTreeSet<String>,
    shell: SharedShell,
}

impl FakeRunner {
    pub fn calls(&self) -> Vec<CommandLine> {
        self.calls.borrow().clone()
    }

    fn emulate_chsh(&self, argv: &[String]) {
        let argv = match argv.first().map(String::as_str) {
            Some("sudo") => &argv[1..],
            _ => argv,
        };
        if argv.first().is_some_and(|p| p == "chsh")
            && let Some(pos) = argv.iter().position(|a| a == "-s")
            && let Some(shell) = argv.get(pos + 1)
        {
            *self.shell.borrow_mut() = Some(PathBuf::from(shell));
        }
    }
}

impl ProcessRunner for FakeRunner {
    fn run(&self, command: &CommandLine) -> Result<CommandOutput> {
        self.calls.borrow_mut().push(command.clone());
        let program = command.program().unwrap_or_default();
        let success = program != "false" && !self.failing.contains(program);
        if success {
            self.emulate_chsh(&command.argv);
        }
        Ok(CommandOutput {
            success,
            code: Some(i32::from(!success)),
            stderr: if success {
                Vec::new()
            } else {
                format!("{program}: failed").into_bytes()
            },
            ..CommandOutput::default()
        })
    }
}

/// A full set of collaborators; downloads go through the real fetcher
pub struct Fakes {
    pub packages: FakePackages,
    pub prefs: FakePrefs,
    pub runner: FakeRunner,
    pub account: FakeAccount,
    pub downloads: Downloads,
}

impl Default for Fakes {
    fn default() -> Self {
        let shell: SharedShell = Rc::new(RefCell::new(Some(PathBuf::from("/bin/zsh"))));
        let retry = fetchkit::RetryConfig {
            max_attempts: 1,
            ..fetchkit::RetryConfig::default()
        };
        Self {
            packages: FakePackages::default(),
            prefs: FakePrefs::default(),
            runner: FakeRunner {
                calls: RefCell::new(Vec::new()),
                failing: BTreeSet::new(),
                shell: Rc::clone(&shell),
            },
            account: FakeAccount { shell },
            downloads: Downloads::new(fetchkit::Fetcher::new().with_retry(retry)),
        }
    }
}

impl Fakes {
    pub fn with_packages(mut self, packages: FakePackages) -> Self {
        self.packages = packages;
        self
    }

    pub fn with_prefs(mut self, prefs: FakePrefs) -> Self {
        self.prefs = prefs;
        self
    }

    pub fn with_login_shell(self, shell: &str) -> Self {
        *self.account.shell.borrow_mut() = Some(PathBuf::from(shell));
        self
    }

    /// Commands whose program is `program` exit 1
    pub fn failing(mut self, program: &str) -> Self {
        self.runner.failing.insert(program.to_string());
        self
    }

    pub fn login_shell(&self) -> Option<PathBuf> {
        self.account.shell.borrow().clone()
    }

    pub fn context(&self) -> ApplyContext<'_> {
        ApplyContext::new(
            &self.packages,
            &self.downloads,
            &self.prefs,
            &self.runner,
            &self.account,
        )
    }
}
