use crate::error::{Result, ScaffoldError};
use std::path::PathBuf;
use std::process::{Command, Stdio};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
}

/// Runs external programs; blocks until they exit.
pub trait CommandRunner: Send + Sync {
    /// Runs with inherited stdio and returns the exit code.
    fn run(&self, program: &str, args: &[String]) -> Result<i32>;
    /// Runs with stdout/stderr captured.
    fn output(&self, program: &str, args: &[String]) -> Result<CommandOutput>;
}

impl<T: CommandRunner + ?Sized> CommandRunner for &T {
    fn run(&self, program: &str, args: &[String]) -> Result<i32> {
        (**self).run(program, args)
    }

    fn output(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        (**self).output(program, args)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SystemRunner {
    cwd: Option<PathBuf>,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self { cwd: Some(dir.into()) }
    }

    fn command(&self, program: &str, args: &[String]) -> Command {
        // npm and yarn ship as .cmd shims on windows
        let mut cmd = if cfg!(windows) {
            let mut cc = Command::new("cmd");
            cc.arg("/C").arg(program);
            cc
        } else {
            Command::new(program)
        };
        cmd.args(args);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        cmd
    }
}

impl CommandRunner for SystemRunner {
    fn run(&self, program: &str, args: &[String]) -> Result<i32> {
        let status = self
            .command(program, args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .map_err(|source| ScaffoldError::Spawn { program: program.to_string(), source })?;
        Ok(status.code().unwrap_or(1))
    }

    fn output(&self, program: &str, args: &[String]) -> Result<CommandOutput> {
        let out = self
            .command(program, args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| ScaffoldError::Spawn { program: program.to_string(), source })?;
        Ok(CommandOutput {
            status: out.status.code().unwrap_or(1),
            stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
        })
    }
}
