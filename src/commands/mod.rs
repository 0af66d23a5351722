//! Command implementations
//!
//! - `apply` - converge the machine to the declaration
//! - `plan` - dry run: evaluate guards, change nothing
//! - `list` - show the declared resources
//! - `validate` - check the declaration without probing

pub mod apply;
pub mod list;
pub mod plan;
pub mod validate;

use anyhow::{Context as _, Result, bail};
use chrono::{DateTime, Local};
use declarative::{ApplyContext, Plan, RunReport, Selector};
use std::path::PathBuf;

use crate::Context;
use crate::account::PasswdAccount;
use crate::cli::Filter;
use crate::config;
use crate::providers::{Defaults, Downloads, Homebrew};
use crate::report::{self, JsonReport};
use crate::runner::SystemRunner;
use crate::schema::ProvisionConfig;
use crate::ui;

/// A declaration that loaded and passed validation
pub struct Loaded {
    pub path: PathBuf,
    pub config: ProvisionConfig,
    pub plan: Plan,
}

/// Load, expand and validate the declaration
pub fn load(ctx: &Context) -> Result<Loaded> {
    let path = match &ctx.config {
        Some(path) => path.clone(),
        None => config::default_path()?,
    };
    log::debug!("loading declaration from {}", path.display());

    let config = config::load(&path)?;
    let declarations = config::declarations(&config)
        .with_context(|| format!("Invalid declaration in {}", path.display()))?;
    let plan = Plan::new(declarations)
        .with_context(|| format!("Invalid declaration in {}", path.display()))?;

    Ok(Loaded { path, config, plan })
}

/// Build the selector for a filter, rejecting names that match nothing
pub fn selector(filter: &Filter, plan: &Plan) -> Result<Selector> {
    let selector = Selector {
        names: filter.only.clone(),
        tags: filter.tags.clone(),
    };

    let unknown = selector.unknown_names(plan);
    if !unknown.is_empty() {
        bail!("Unknown resource: {}", unknown.join(", "));
    }
    for tag in &selector.tags {
        if !plan.iter().any(|d| d.tags.contains(tag)) {
            ui::warn(&format!("No resource is tagged '{tag}'"));
        }
    }
    Ok(selector)
}

/// The real collaborators, configured from the declaration
pub struct System {
    packages: Homebrew,
    downloads: Downloads,
    prefs: Defaults,
    runner: SystemRunner,
    account: PasswdAccount,
}

impl System {
    pub fn new(config: &ProvisionConfig) -> Self {
        let prefs =
            prefkit::Preferences::new().with_privileged_domains(config.sudo.defaults.clone());
        Self {
            packages: Homebrew::new(config.retry.brew()),
            downloads: Downloads::new(fetchkit::Fetcher::new().with_retry(config.retry.fetch())),
            prefs: Defaults::new(prefs),
            runner: SystemRunner,
            account: PasswdAccount,
        }
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

/// Print the finished report, as JSON or as a summary
pub fn emit(report: &RunReport, started_at: DateTime<Local>, json: bool, strict: bool) -> Result<()> {
    if json {
        let doc = JsonReport::new(report, started_at, Local::now(), strict);
        println!("{}", serde_json::to_string_pretty(&doc)?);
    } else {
        report::print_summary(report, strict);
    }
    Ok(())
}
