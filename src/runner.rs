use anyhow::{Context, Result, bail};
use declarative::{CommandLine, CommandOutput, ProcessRunner};
use std::process::{Command, Stdio};

/// Runs commands on the host, capturing their output
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, command: &CommandLine) -> Result<CommandOutput> {
        let Some(program) = command.program() else {
            bail!("command is empty");
        };

        let mut cmd = Command::new(program);
        cmd.args(command.args());
        if let Some(cwd) = &command.cwd {
            cmd.current_dir(cwd);
        }
        if command.null_stdin {
            cmd.stdin(Stdio::null());
        }

        log::debug!("running `{command}`");
        let output = cmd
            .output()
            .with_context(|| format!("Failed to execute: {command}"))?;
        Ok(output.into())
    }
}

/// Run a command silently, returning success/failure
pub fn run_quiet(cmd: &str, args: &[&str]) -> bool {
    Command::new(cmd)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_captures_output_and_status() {
        let output = SystemRunner
            .run(&CommandLine::new(["sh", "-c", "echo hello; echo oops >&2; exit 3"]))
            .unwrap();
        assert!(!output.success);
        assert_eq!(output.code, Some(3));
        assert_eq!(output.stdout_str(), "hello\n");
        assert_eq!(output.stderr_str(), "oops\n");
    }

    #[test]
    fn test_runs_in_cwd() {
        let dir = TempDir::new().unwrap();
        let output = SystemRunner
            .run(&CommandLine::new(["pwd"]).current_dir(dir.path()))
            .unwrap();
        let printed = std::path::PathBuf::from(output.stdout_str().trim());
        assert_eq!(
            printed.canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_null_stdin_reads_eof() {
        let output = SystemRunner
            .run(&CommandLine::new(["sh", "-c", "cat; echo done"]).non_interactive())
            .unwrap();
        assert!(output.success);
        assert_eq!(output.stdout_str(), "done\n");
    }

    #[test]
    fn test_missing_program_is_an_error() {
        let err = SystemRunner
            .run(&CommandLine::new(["definitely-not-a-real-program-1234"]))
            .unwrap_err();
        assert!(err.to_string().contains("Failed to execute"));
    }

    #[test]
    fn test_run_quiet() {
        assert!(run_quiet("true", &[]));
        assert!(!run_quiet("false", &[]));
    }
}
