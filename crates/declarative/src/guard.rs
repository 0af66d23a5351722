//! Declarative guards attachable to any resource
//!
//! A declaration is satisfied when any of its guards holds, or when the
//! resource's own check does. Guards only probe; command guards are run
//! non-interactively so a probe can never prompt for a password.

use crate::context::ApplyContext;
use crate::types::CommandLine;
use anyhow::{Context, Result, bail};
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Guard {
    /// Satisfied when the command exits 0
    NotIf(Vec<String>),
    /// Satisfied when the command exits nonzero
    OnlyIf(Vec<String>),
    /// Satisfied when the path exists
    Creates(PathBuf),
    /// Satisfied when the path does not exist
    UnlessExists(PathBuf),
    /// Satisfied when some line of the file contains the text
    FileContains { path: PathBuf, line: String },
    /// Satisfied when the user's login shell is this path
    LoginShell(PathBuf),
}

impl Guard {
    pub fn is_satisfied(&self, ctx: &ApplyContext) -> Result<bool> {
        match self {
            Self::NotIf(argv) => Ok(probe(ctx, argv)?),
            Self::OnlyIf(argv) => Ok(!probe(ctx, argv)?),
            Self::Creates(path) => Ok(path.exists()),
            Self::UnlessExists(path) => Ok(!path.exists()),
            Self::FileContains { path, line } => match fs::read_to_string(path) {
                Ok(content) => Ok(content.lines().any(|l| l.contains(line.as_str()))),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
                Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
            },
            Self::LoginShell(shell) => Ok(ctx.account.login_shell()?.as_deref() == Some(shell.as_path())),
        }
    }

    pub fn describe(&self) -> String {
        match self {
            Self::NotIf(argv) => format!("not_if `{}`", argv.join(" ")),
            Self::OnlyIf(argv) => format!("only_if `{}`", argv.join(" ")),
            Self::Creates(path) => format!("creates {}", path.display()),
            Self::UnlessExists(path) => format!("unless_exists {}", path.display()),
            Self::FileContains { path, line } => {
                format!("file_contains {} '{line}'", path.display())
            }
            Self::LoginShell(shell) => format!("login_shell {}", shell.display()),
        }
    }
}

/// Run a guard command, returning whether it exited 0
fn probe(ctx: &ApplyContext, argv: &[String]) -> Result<bool> {
    let command = probe_command(argv)?;
    let output = ctx
        .runner
        .run(&command)
        .with_context(|| format!("Failed to run guard `{command}`"))?;
    log::debug!("guard `{command}` exited with {:?}", output.code);
    Ok(output.success)
}

/// Build the command line for a guard probe
///
/// A leading `sudo` gets `-n` so a missing credential fails instead of
/// prompting.
fn probe_command(argv: &[String]) -> Result<CommandLine> {
    let Some(program) = argv.first() else {
        bail!("guard command is empty");
    };

    let mut argv = argv.to_vec();
    if program == "sudo" && argv.get(1).map(String::as_str) != Some("-n") {
        argv.insert(1, "-n".to_string());
    }
    Ok(CommandLine::new(argv).non_interactive())
}
