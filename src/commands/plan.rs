//! `provision plan` - evaluate guards and report what would change

use anyhow::Result;
use chrono::Local;
use declarative::RunOptions;
use std::process::ExitCode;

use super::{System, emit, load, selector};
use crate::Context;
use crate::cli::PlanArgs;
use crate::progress::RunProgress;
use crate::ui;

pub fn run(ctx: &Context, args: &PlanArgs) -> Result<ExitCode> {
    let loaded = load(ctx)?;
    let selector = selector(&args.filter, &loaded.plan)?;

    if !args.json && !ctx.quiet {
        ui::header("Plan");
        ui::kv("Declaration", &loaded.path.display().to_string());
        println!();
    }

    let system = System::new(&loaded.config);
    let opts = RunOptions {
        dry_run: true,
        selector,
    };
    let started_at = Local::now();
    let mut progress = RunProgress::new(args.json);
    let report = declarative::run(&loaded.plan, &system.context(), &opts, &mut progress);

    emit(&report, started_at, args.json, false)?;
    Ok(ExitCode::from(
        report.status(false).exit_code(args.detailed_exitcode),
    ))
}
