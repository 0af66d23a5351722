//! Execution engine - applies a plan sequentially in declaration order

use crate::context::{ApplyContext, ProgressCallback};
use crate::plan::{Declaration, Plan, Selector};
use crate::types::{FailureKind, Outcome, ReportEntry, RunReport};
use std::collections::HashSet;
use std::ops::ControlFlow;

/// Options for a run
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Evaluate guards only, execute nothing
    pub dry_run: bool,
    /// Which declarations to process
    pub selector: Selector,
}

/// Run a plan and return its report
///
/// Declarations are processed one at a time in order. A failure aborts the
/// run unless the failing declaration is best-effort. Actions never run
/// more than once per call.
pub fn run(
    plan: &Plan,
    ctx: &ApplyContext,
    opts: &RunOptions,
    progress: &mut dyn ProgressCallback,
) -> RunReport {
    let selected = plan.iter().filter(|d| opts.selector.accepts(d)).count();
    progress.on_run_start(selected, opts.dry_run);

    let mut run = Run {
        plan,
        ctx,
        progress,
        dry_run: opts.dry_run,
        report: RunReport::new(opts.dry_run),
        applied: HashSet::new(),
        failed: HashSet::new(),
    };

    for decl in plan.iter().filter(|d| opts.selector.accepts(d)) {
        if run.process(decl).is_break() {
            break;
        }
    }

    run.progress.on_run_complete();
    run.report
}

/// Simple dry run without callbacks
pub fn dry_run(plan: &Plan, ctx: &ApplyContext) -> RunReport {
    let opts = RunOptions {
        dry_run: true,
        ..RunOptions::default()
    };
    run(plan, ctx, &opts, &mut crate::context::NoProgress)
}

struct Run<'p, 'c> {
    plan: &'p Plan,
    ctx: &'p ApplyContext<'c>,
    progress: &'p mut dyn ProgressCallback,
    dry_run: bool,
    report: RunReport,
    /// Declarations whose action was attempted this run
    applied: HashSet<&'p str>,
    /// Declarations that failed, or were skipped because a dependency did
    failed: HashSet<&'p str>,
}

impl<'p> Run<'p, '_> {
    fn process(&mut self, decl: &'p Declaration) -> ControlFlow<()> {
        self.progress
            .on_resource_start(&decl.name, &decl.resource.description());

        let outcome = self.evaluate(decl);
        let converged = outcome == Outcome::Converged;
        let failed = outcome.is_failure();
        self.record(decl, None, outcome);

        if failed {
            return self.on_failure(decl);
        }
        if converged {
            return self.notify(decl);
        }
        ControlFlow::Continue(())
    }

    fn evaluate(&mut self, decl: &'p Declaration) -> Outcome {
        if decl.deferred {
            return Outcome::skipped("runs only when notified");
        }
        if self.applied.contains(decl.name.as_str()) {
            return Outcome::skipped("already applied this run");
        }
        if let Some(dep) = decl
            .depends_on
            .iter()
            .find(|d| self.failed.contains(d.as_str()))
        {
            self.failed.insert(&decl.name);
            return Outcome::skipped(format!("dependency {dep} failed"));
        }

        match decl.is_satisfied(self.ctx) {
            Err(e) => Outcome::failed(FailureKind::Guard, &e),
            Ok(true) => Outcome::Unchanged,
            Ok(false) if self.dry_run => Outcome::WouldConverge,
            Ok(false) => self.apply(decl),
        }
    }

    fn apply(&mut self, decl: &'p Declaration) -> Outcome {
        self.applied.insert(&decl.name);
        log::info!("{}: {}", decl.name, decl.resource.description());
        match decl.resource.apply(self.ctx) {
            Ok(()) => Outcome::Converged,
            Err(e) => Outcome::failed(FailureKind::Action, &e),
        }
    }

    /// Run the targets notified by a converged declaration, cascading
    fn notify(&mut self, source: &'p Declaration) -> ControlFlow<()> {
        let plan = self.plan;
        for target in &source.notifies {
            let Some(decl) = plan.get(target) else {
                continue;
            };
            if self.applied.contains(decl.name.as_str()) {
                log::debug!(
                    "{}: already applied this run, ignoring notification from {}",
                    decl.name,
                    source.name
                );
                continue;
            }

            self.progress
                .on_resource_start(&decl.name, &decl.resource.description());
            log::debug!("{}: notified by {}", decl.name, source.name);
            let outcome = self.apply(decl);
            let failed = outcome.is_failure();
            self.record(decl, Some(&source.name), outcome);

            if failed {
                self.on_failure(decl)?;
            } else {
                self.notify(decl)?;
            }
        }
        ControlFlow::Continue(())
    }

    fn on_failure(&mut self, decl: &'p Declaration) -> ControlFlow<()> {
        self.failed.insert(&decl.name);
        if decl.best_effort {
            log::warn!("{}: failed, continuing (best effort)", decl.name);
            ControlFlow::Continue(())
        } else {
            log::error!("{}: failed, aborting run", decl.name);
            self.report.abort(&decl.name);
            ControlFlow::Break(())
        }
    }

    fn record(&mut self, decl: &Declaration, notified_by: Option<&str>, outcome: Outcome) {
        if let Outcome::Failed { kind, reason } = &outcome {
            log::debug!("{}: {kind} failed: {reason}", decl.name);
        }
        let entry = self.report.push(ReportEntry {
            name: decl.name.clone(),
            kind: decl.resource.kind(),
            outcome,
            notified_by: notified_by.map(str::to_string),
            best_effort: decl.best_effort,
        });
        self.progress.on_resource_complete(entry);
    }
}
