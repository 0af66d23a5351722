//! End-to-end runs: declaration text through to the report, against fakes

use crate::config;
use crate::resource::testing::{FakePackages, FakePrefs, Fakes};
use crate::schema::ProvisionConfig;
use declarative::{
    Guard, NoProgress, Outcome, Plan, ResourceKind, RunOptions, RunReport, RunStatus, Selector,
    TypedValue,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn plan(toml: &str) -> Plan {
    let config: ProvisionConfig = toml::from_str(toml).unwrap();
    Plan::new(config::declarations(&config).unwrap()).unwrap()
}

fn apply(plan: &Plan, fakes: &Fakes) -> RunReport {
    declarative::run(plan, &fakes.context(), &RunOptions::default(), &mut NoProgress)
}

fn preview(plan: &Plan, fakes: &Fakes) -> RunReport {
    declarative::dry_run(plan, &fakes.context())
}

fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

const SHELL: &str = r#"
[vars]
brew_zsh = "/opt/homebrew/bin/zsh"

[[resource]]
type = "package"
package = "zsh"

[[resource]]
type = "command"
name = "set default shell"
argv = ["chsh", "-s", "$brew_zsh"]
sudo = true
login_shell = "$brew_zsh"
depends_on = ["zsh"]
"#;

#[test]
fn test_shell_converges_then_settles() {
    let plan = plan(SHELL);
    let fakes = Fakes::default();

    let dry = preview(&plan, &fakes);
    assert_eq!(dry.outcome("zsh"), Some(&Outcome::WouldConverge));
    assert_eq!(dry.outcome("set default shell"), Some(&Outcome::WouldConverge));
    assert!(fakes.packages.installs().is_empty());
    assert!(fakes.runner.calls().is_empty());

    let first = apply(&plan, &fakes);
    assert_eq!(first.names(), vec!["zsh", "set default shell"]);
    assert_eq!(first.outcome("zsh"), Some(&Outcome::Converged));
    assert_eq!(first.outcome("set default shell"), Some(&Outcome::Converged));
    assert_eq!(first.status(false), RunStatus::Changed);
    assert_eq!(fakes.packages.installs(), vec!["zsh"]);
    assert_eq!(
        fakes.runner.calls()[0].argv,
        vec!["sudo", "chsh", "-s", "/opt/homebrew/bin/zsh"]
    );
    assert_eq!(
        fakes.login_shell().as_deref(),
        Some(Path::new("/opt/homebrew/bin/zsh"))
    );

    let second = apply(&plan, &fakes);
    assert_eq!(second.outcome("zsh"), Some(&Outcome::Unchanged));
    assert_eq!(second.outcome("set default shell"), Some(&Outcome::Unchanged));
    assert_eq!(second.status(false), RunStatus::NothingToDo);
    assert_eq!(second.status(false).exit_code(true), 0);
    assert_eq!(fakes.runner.calls().len(), 1);
}

#[test]
fn test_setting_stored_as_string_is_rewritten_as_bool() {
    let plan = plan(
        r#"
        [[resource]]
        type = "setting"
        domain = "com.apple.menuextra.battery"
        key = "ShowPercent"
        value = true
        "#,
    );
    let fakes = Fakes::default().with_prefs(FakePrefs::default().with(
        "com.apple.menuextra.battery",
        "ShowPercent",
        "YES",
    ));

    let report = apply(&plan, &fakes);
    let name = "com.apple.menuextra.battery:ShowPercent";
    assert_eq!(report.outcome(name), Some(&Outcome::Converged));
    assert_eq!(
        fakes.prefs.value("com.apple.menuextra.battery", "ShowPercent"),
        Some(TypedValue::Bool(true))
    );

    let again = apply(&plan, &fakes);
    assert_eq!(again.outcome(name), Some(&Outcome::Unchanged));
    assert_eq!(fakes.prefs.writes(), 1);
}

#[test]
fn test_bad_checksum_aborts_and_leaves_nothing() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("Hack.zip");
    fs::write(&source, "font bytes\n").unwrap();
    let dest = dir.path().join("fonts").join("Hack.zip");
    let later = dir.path().join("later");

    let plan = plan(&format!(
        r#"
        [[resource]]
        type = "download"
        name = "hack font"
        url = '{url}'
        dest = '{dest}'
        checksum = "sha256:{zeros}"

        [[resource]]
        type = "directory"
        name = "later"
        path = '{later}'
        "#,
        url = file_url(&source),
        dest = dest.display(),
        zeros = "0".repeat(64),
        later = later.display(),
    ));
    let fakes = Fakes::default();

    let report = apply(&plan, &fakes);
    assert!(report.outcome("hack font").unwrap().is_failure());
    assert_eq!(report.aborted_by(), Some("hack font"));
    assert!(report.entry("later").is_none());
    assert_eq!(report.status(false), RunStatus::Failed);
    assert_eq!(report.status(false).exit_code(false), 1);
    assert!(!dest.exists());
    assert!(!later.exists());
}

#[test]
fn test_notifications_cascade_through_deferred_commands() {
    let dir = TempDir::new().unwrap();
    let widgets = dir.path().join("widgets");

    let plan = plan(&format!(
        r#"
        [[resource]]
        type = "directory"
        name = "widget dir"
        path = '{widgets}'
        notifies = ["unpack"]

        [[resource]]
        type = "command"
        name = "unpack"
        argv = ["unzip", "-o", "widgets.zip"]
        deferred = true
        notifies = ["refresh"]

        [[resource]]
        type = "command"
        name = "refresh"
        argv = ["killall", "Dock"]
        deferred = true
        "#,
        widgets = widgets.display(),
    ));
    let fakes = Fakes::default();

    let first = apply(&plan, &fakes);
    assert_eq!(
        first.names(),
        vec!["widget dir", "unpack", "refresh", "unpack", "refresh"]
    );
    let unpack = first.entry("unpack").unwrap();
    assert_eq!(unpack.outcome, Outcome::Converged);
    assert_eq!(unpack.notified_by.as_deref(), Some("widget dir"));
    let refresh = first.entry("refresh").unwrap();
    assert_eq!(refresh.outcome, Outcome::Converged);
    assert_eq!(refresh.notified_by.as_deref(), Some("unpack"));
    assert_eq!(
        first.entries()[3].outcome,
        Outcome::skipped("runs only when notified")
    );
    assert_eq!(fakes.runner.calls().len(), 2);

    let second = apply(&plan, &fakes);
    assert_eq!(second.outcome("widget dir"), Some(&Outcome::Unchanged));
    assert_eq!(
        second.outcome("unpack"),
        Some(&Outcome::skipped("runs only when notified"))
    );
    assert_eq!(fakes.runner.calls().len(), 2);
}

#[test]
fn test_best_effort_failure_only_fails_strict_runs() {
    let plan = plan(
        r#"
        [[resource]]
        type = "package"
        package = "nonexistent-formula"
        best_effort = true

        [[resource]]
        type = "setting"
        domain = "com.apple.dock"
        key = "autohide"
        value = true
        "#,
    );
    let fakes = Fakes::default()
        .with_packages(FakePackages::default().broken("nonexistent-formula"));

    let report = apply(&plan, &fakes);
    let failed = report.entry("nonexistent-formula").unwrap();
    assert!(failed.outcome.is_failure());
    assert!(failed.best_effort);
    assert_eq!(report.outcome("com.apple.dock:autohide"), Some(&Outcome::Converged));
    assert_eq!(report.aborted_by(), None);

    assert_eq!(report.status(false), RunStatus::Changed);
    assert_eq!(report.status(false).exit_code(true), 2);
    assert_eq!(report.status(true), RunStatus::Failed);
}

#[test]
fn test_failed_dependency_skips_dependents() {
    let plan = plan(
        r#"
        [[resource]]
        type = "command"
        name = "build"
        argv = ["make"]
        creates = "/nonexistent/provision/build/out"
        best_effort = true

        [[resource]]
        type = "command"
        name = "install"
        argv = ["make", "install"]
        depends_on = ["build"]
        "#,
    );
    let fakes = Fakes::default().failing("make");

    let report = apply(&plan, &fakes);
    assert!(report.outcome("build").unwrap().is_failure());
    assert_eq!(
        report.outcome("install"),
        Some(&Outcome::skipped("dependency build failed"))
    );
    assert_eq!(fakes.runner.calls().len(), 1);
}

#[test]
fn test_selection_by_tag() {
    let plan = plan(
        r#"
        [[resource]]
        type = "packages"
        names = ["git", "ripgrep"]
        tags = ["cli"]

        [[resource]]
        type = "package"
        kind = "cask"
        package = "iterm2"
        tags = ["apps"]
        "#,
    );
    let fakes = Fakes::default().with_packages(FakePackages::with_installed(&["git"]));
    let opts = RunOptions {
        dry_run: false,
        selector: Selector {
            names: Vec::new(),
            tags: vec!["cli".to_string()],
        },
    };

    let report = declarative::run(&plan, &fakes.context(), &opts, &mut NoProgress);
    assert_eq!(report.names(), vec!["git", "ripgrep"]);
    assert_eq!(report.outcome("git"), Some(&Outcome::Unchanged));
    assert_eq!(report.entry("ripgrep").unwrap().kind, ResourceKind::Package);
    assert_eq!(fakes.packages.installs(), vec!["ripgrep"]);
}

#[test]
fn test_demo_declaration_validates() {
    let plan = plan(include_str!("../demos/provision.toml"));
    assert!(plan.get("set default shell").is_some());
    assert!(plan.get("ripgrep").is_some());
    assert!(plan.get("cask:iterm2").is_some());
    assert!(plan.get("com.apple.dock:autohide").unwrap().notifies == ["restart dock"]);
    assert!(plan.get("restart dock").unwrap().deferred);

    let fix = plan.get("fix zsh startup file").unwrap();
    assert_eq!(
        fix.guards,
        vec![
            Guard::Creates("/etc/zprofile".into()),
            Guard::OnlyIf(vec!["test".into(), "-e".into(), "/etc/zshenv".into()]),
        ]
    );
}

#[test]
fn test_move_into_place_never_clobbers_target() {
    let dir = TempDir::new().unwrap();
    let from = dir.path().join("zshenv");
    let to = dir.path().join("zprofile");
    let plan = plan(&format!(
        r#"
        [[resource]]
        type = "command"
        name = "fix zsh startup file"
        argv = ["mv", '{from}', '{to}']
        creates = '{to}'
        "#,
        from = from.display(),
        to = to.display(),
    ));
    let fakes = Fakes::default();

    fs::write(&to, "existing\n").unwrap();
    let report = apply(&plan, &fakes);
    assert_eq!(report.outcome("fix zsh startup file"), Some(&Outcome::Unchanged));
    assert!(fakes.runner.calls().is_empty());

    fs::remove_file(&to).unwrap();
    let report = apply(&plan, &fakes);
    assert_eq!(report.outcome("fix zsh startup file"), Some(&Outcome::Converged));
    assert_eq!(fakes.runner.calls().len(), 1);
}
