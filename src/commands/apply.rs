//! `provision apply` - converge the machine to the declaration
//!
//! A silent dry run comes first so the user sees what will change before
//! confirming. Guards are evaluated again by the real run.

use anyhow::Result;
use chrono::Local;
use colored::Colorize;
use declarative::{NoProgress, Outcome, RunOptions, RunReport};
use std::io::IsTerminal;
use std::process::ExitCode;

use super::{System, emit, load, selector};
use crate::Context;
use crate::cli::ApplyArgs;
use crate::progress::RunProgress;
use crate::sudo::CredentialScope;
use crate::{report, ui};

pub fn run(ctx: &Context, args: &ApplyArgs) -> Result<ExitCode> {
    let loaded = load(ctx)?;
    let selector = selector(&args.filter, &loaded.plan)?;
    let system = System::new(&loaded.config);
    let apply_ctx = system.context();
    let show = !args.json;

    if show && !ctx.quiet {
        ui::header("Applying Configuration");
        ui::kv("Declaration", &loaded.path.display().to_string());
    }

    let preview_opts = RunOptions {
        dry_run: true,
        selector: selector.clone(),
    };
    let preview = declarative::run(&loaded.plan, &apply_ctx, &preview_opts, &mut NoProgress);
    let pending = pending_count(&preview);

    if pending > 0 && show {
        print_pending(&preview);
        let interactive = console::user_attended() && std::io::stdin().is_terminal();
        if !args.yes && interactive && !confirm_proceed(pending)? {
            ui::info("Aborted, nothing was changed");
            return Ok(ExitCode::SUCCESS);
        }
    }
    if show {
        println!();
    }

    let _sudo = CredentialScope::new(loaded.config.sudo.invalidate_after_run);
    let opts = RunOptions {
        dry_run: false,
        selector,
    };
    let started_at = Local::now();
    let mut progress = RunProgress::new(args.json);
    let report = declarative::run(&loaded.plan, &apply_ctx, &opts, &mut progress);

    emit(&report, started_at, args.json, args.strict)?;
    Ok(ExitCode::from(
        report.status(args.strict).exit_code(args.detailed_exitcode),
    ))
}

fn pending_count(preview: &RunReport) -> usize {
    preview
        .entries()
        .iter()
        .filter(|e| e.outcome == Outcome::WouldConverge || e.outcome.is_failure())
        .count()
}

fn print_pending(preview: &RunReport) {
    ui::section("Pending changes");
    for entry in preview
        .entries()
        .iter()
        .filter(|e| e.outcome == Outcome::WouldConverge || e.outcome.is_failure())
    {
        println!("{}", report::entry_line(entry));
    }
    println!();
    ui::dim(&format!(
        "{} resources checked, {} need work",
        preview.entries().len(),
        pending_count(preview)
    ));
}

/// Confirm with user
fn confirm_proceed(pending: usize) -> Result<bool> {
    use dialoguer::Confirm;

    let confirmed = Confirm::new()
        .with_prompt(format!("Apply {pending} {}?", "change(s)".bold()))
        .default(true)
        .interact()?;

    Ok(confirmed)
}
