//! Backend that shells out to `/usr/bin/defaults`.

use crate::backend::Backend;
use crate::error::{Error, Result};
use std::process::{Command, Output, Stdio};

const DEFAULTS: &str = "/usr/bin/defaults";

/// Backend that executes real `defaults` commands.
#[derive(Debug, Default)]
pub struct DefaultsCli;

impl DefaultsCli {
    fn run(program: &str, args: &[&str]) -> Result<Output> {
        log::debug!("{program} {}", args.join(" "));
        Ok(Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()?)
    }
}

impl Backend for DefaultsCli {
    fn export(&self, domain: &str) -> Result<Option<Vec<u8>>> {
        let args = ["export", domain, "-"];
        let output = Self::run(DEFAULTS, &args)?;
        if output.status.success() {
            return Ok(Some(output.stdout));
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains("does not exist") {
            return Ok(None);
        }
        Err(Error::CommandFailed {
            args: args.join(" "),
            stderr: stderr.trim().to_string(),
        })
    }

    fn write(&self, domain: &str, key: &str, args: &[String], privileged: bool) -> Result<()> {
        let mut argv = vec!["write", domain, key];
        argv.extend(args.iter().map(String::as_str));

        let output = if privileged {
            let mut sudo_argv = vec!["-n", DEFAULTS];
            sudo_argv.extend(&argv);
            Self::run("sudo", &sudo_argv)?
        } else {
            Self::run(DEFAULTS, &argv)?
        };

        if !output.status.success() {
            return Err(Error::CommandFailed {
                args: argv.join(" "),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(())
    }
}
