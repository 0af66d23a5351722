//! Command resource - runs a one-off command

use anyhow::{Result, bail};
use declarative::{ApplyContext, CommandLine, Resource, ResourceKind};
use std::path::PathBuf;

/// A command to run once
///
/// A command has no state of its own to probe, so it always runs unless
/// one of its declaration's guards holds.
#[derive(Debug, Clone)]
pub struct Execute {
    pub argv: Vec<String>,
    pub cwd: Option<PathBuf>,
    /// Run through `sudo`
    pub sudo: bool,
}

impl Execute {
    pub fn new<I, S>(argv: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            argv: argv.into_iter().map(Into::into).collect(),
            cwd: None,
            sudo: false,
        }
    }

    /// Run a script through `/bin/sh -c`
    pub fn shell(script: &str) -> Self {
        Self::new(["/bin/sh", "-c", script])
    }

    pub fn current_dir(mut self, cwd: Option<PathBuf>) -> Self {
        self.cwd = cwd;
        self
    }

    pub fn with_sudo(mut self, sudo: bool) -> Self {
        self.sudo = sudo;
        self
    }

    /// The command line actually executed
    pub fn command_line(&self) -> CommandLine {
        let argv = self
            .sudo
            .then_some("sudo".to_string())
            .into_iter()
            .chain(self.argv.iter().cloned());
        let command = CommandLine::new(argv);
        match &self.cwd {
            Some(cwd) => command.current_dir(cwd),
            None => command,
        }
    }
}

impl Resource for Execute {
    fn kind(&self) -> ResourceKind {
        ResourceKind::CommandExecuted
    }

    fn description(&self) -> String {
        format!("Run `{}`", self.command_line())
    }

    fn is_satisfied(&self, _ctx: &ApplyContext) -> Result<bool> {
        Ok(false)
    }

    fn apply(&self, ctx: &ApplyContext) -> Result<()> {
        if self.argv.is_empty() {
            bail!("command is empty");
        }
        let output = ctx.run_checked(&self.command_line())?;
        let stdout = output.stdout_str();
        if !stdout.trim().is_empty() {
            log::info!("{}", stdout.trim_end());
        }
        Ok(())
    }
}
