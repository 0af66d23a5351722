//! `provision list` - show declared resources in order

use anyhow::Result;
use colored::Colorize;
use declarative::Declaration;

use super::load;
use crate::Context;
use crate::ui;

pub fn run(ctx: &Context) -> Result<()> {
    let loaded = load(ctx)?;

    ui::header(&format!("Resources ({})", loaded.plan.len()));
    for decl in loaded.plan.iter() {
        print_declaration(decl);
    }
    Ok(())
}

fn print_declaration(decl: &Declaration) {
    println!();
    println!(
        "  {} {}",
        decl.name.bold(),
        format!("[{}]", decl.resource.kind()).dimmed()
    );
    ui::dim(&format!("  {}", decl.resource.description()));

    for line in detail_lines(decl) {
        ui::dim(&format!("  {line}"));
    }
}

fn detail_lines(decl: &Declaration) -> Vec<String> {
    let mut lines = Vec::new();
    if !decl.tags.is_empty() {
        lines.push(format!("tags: {}", decl.tags.join(", ")));
    }
    if !decl.depends_on.is_empty() {
        lines.push(format!("depends on: {}", decl.depends_on.join(", ")));
    }
    if !decl.notifies.is_empty() {
        lines.push(format!("notifies: {}", decl.notifies.join(", ")));
    }
    for guard in &decl.guards {
        lines.push(format!("guard: {}", guard.describe()));
    }
    if decl.deferred {
        lines.push("deferred: runs only when notified".to_string());
    }
    if decl.best_effort {
        lines.push("best effort".to_string());
    }
    lines
}
