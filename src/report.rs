//! Run report rendering - terminal lines, summary and JSON

use chrono::{DateTime, Local};
use colored::Colorize;
use declarative::{Outcome, ReportEntry, RunReport, RunStatus, RunSummary};
use serde::Serialize;

/// One formatted report line, without a trailing newline
pub fn entry_line(entry: &ReportEntry) -> String {
    let name = entry.name.as_str();
    let mut line = match &entry.outcome {
        Outcome::Unchanged => format!("  {} {}", "✓".dimmed(), name.dimmed()),
        Outcome::Converged => format!("  {} {}", "✓".green(), name),
        Outcome::WouldConverge => format!("  {} {} {}", "•".cyan(), name, "would change".cyan()),
        Outcome::Skipped { reason } => {
            format!("  {} {} {}", "-".dimmed(), name, format!("({reason})").dimmed())
        }
        Outcome::Failed { kind, reason } => {
            let symbol = if entry.best_effort {
                "✗".yellow()
            } else {
                "✗".red()
            };
            format!("  {symbol} {name} {}: {reason}", format!("{kind} failed").red())
        }
    };

    if let Some(trigger) = &entry.notified_by {
        line.push_str(&format!(" {}", format!("(notified by {trigger})").dimmed()));
    }
    if entry.best_effort && entry.outcome.is_failure() {
        line.push_str(&format!(" {}", "(best effort)".dimmed()));
    }
    line
}

/// Print final summary
pub fn print_summary(report: &RunReport, strict: bool) {
    let summary = report.summary();
    println!();

    let status = report.status(strict);
    match (status, report.is_dry_run()) {
        (RunStatus::Failed, _) => println!("  {} Run failed", "✗".red().bold()),
        (RunStatus::NothingToDo, _) => {
            println!("  {} Everything is up to date", "✓".green().bold());
        }
        (RunStatus::Changed, true) => {
            println!("  {} Changes pending", "•".cyan().bold());
        }
        (RunStatus::Changed, false) => {
            println!("  {} Converged successfully", "✓".green().bold());
        }
    }

    for line in summary_lines(&summary) {
        println!("    • {line}");
    }

    if let Some(name) = report.aborted_by() {
        println!(
            "    {} stopped at {name}; later resources were not processed",
            "⚠".yellow()
        );
    }
}

fn summary_lines(summary: &RunSummary) -> Vec<String> {
    let mut lines = Vec::new();
    if summary.unchanged > 0 {
        lines.push(format!("{} unchanged", summary.unchanged));
    }
    if summary.converged > 0 {
        lines.push(format!("{} converged", summary.converged));
    }
    if summary.would_converge > 0 {
        lines.push(format!("{} would change", summary.would_converge));
    }
    if summary.skipped > 0 {
        lines.push(format!("{} skipped", summary.skipped));
    }
    if summary.failed > 0 {
        lines.push(format!("{} {}", summary.failed, "failed".red()));
    }
    lines
}

// ============================================================================
// JSON
// ============================================================================

/// Report as printed by `--json`
#[derive(Serialize)]
pub struct JsonReport<'a> {
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub status: RunStatus,
    pub summary: RunSummary,
    #[serde(flatten)]
    pub report: &'a RunReport,
}

impl<'a> JsonReport<'a> {
    pub fn new(
        report: &'a RunReport,
        started_at: DateTime<Local>,
        finished_at: DateTime<Local>,
        strict: bool,
    ) -> Self {
        Self {
            started_at,
            finished_at,
            status: report.status(strict),
            summary: report.summary(),
            report,
        }
    }
}
