//! Terminal progress for runs
//!
//! A spinner shows the resource being processed; each finished resource
//! is printed above it as a report line.

use declarative::{ProgressCallback, ReportEntry};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::{report, ui};

const MESSAGE_WIDTH: usize = 60;

/// Progress shown while a plan runs
pub struct RunProgress {
    bar: Option<ProgressBar>,
    /// Print nothing at all (JSON output)
    silent: bool,
}

impl RunProgress {
    pub fn new(silent: bool) -> Self {
        Self { bar: None, silent }
    }

    fn print(&self, line: &str) {
        match &self.bar {
            Some(bar) => bar.suspend(|| println!("{line}")),
            None => println!("{line}"),
        }
    }
}

fn spinner(total: usize) -> ProgressBar {
    let bar = ProgressBar::new(total as u64);
    if let Ok(style) = ProgressStyle::default_spinner()
        .template("{spinner:.green} [{pos}/{len}] {msg}")
    {
        bar.set_style(style);
    }
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

impl ProgressCallback for RunProgress {
    fn on_run_start(&mut self, total: usize, _dry_run: bool) {
        if !self.silent && total > 0 {
            self.bar = Some(spinner(total));
        }
    }

    fn on_resource_start(&mut self, name: &str, description: &str) {
        log::debug!("start {name}");
        if let Some(bar) = &self.bar {
            bar.set_message(ui::truncate(&format!("{name}: {description}"), MESSAGE_WIDTH));
        }
    }

    fn on_resource_complete(&mut self, entry: &ReportEntry) {
        if self.silent {
            return;
        }
        self.print(&report::entry_line(entry));
        if entry.notified_by.is_none()
            && let Some(bar) = &self.bar
        {
            bar.inc(1);
        }
    }

    fn on_run_complete(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }
}
