//! Subprocess execution
//!
//! Build steps describe what to run as a [`ToolCommand`] and hand it to a
//! [`CommandRunner`]. The system runner spawns real processes; tests swap in
//! a recording runner.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::error::NfBuildError;
use crate::utils::tools;

/// A fully described external tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    /// Program name or path
    pub program: String,
    pub args: Vec<OsString>,
    /// Working directory, inherited when `None`
    pub cwd: Option<PathBuf>,
    /// Extra environment for this child only
    pub env: Vec<(String, String)>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Value of an environment override, if set
    #[cfg(test)]
    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Arguments as lossy strings
    #[cfg(test)]
    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    fn to_command(&self, program: &Path) -> Command {
        let mut cmd = Command::new(program);
        cmd.args(&self.args);
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        cmd
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.env {
            write!(f, "{}={} ", key, value)?;
        }
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        if let Some(cwd) = &self.cwd {
            write!(f, " (in {})", cwd.display())?;
        }
        Ok(())
    }
}

/// Result of a subprocess execution
#[derive(Debug, Clone, Default)]
pub struct CommandResult {
    /// Whether the command succeeded (exit code 0)
    pub success: bool,

    /// Process exit code, 1 when killed by a signal
    pub exit_code: i32,

    /// Captured standard output (empty when inherited)
    pub stdout: String,

    /// Captured standard error (empty when inherited)
    pub stderr: String,

    /// Execution duration
    pub duration: Duration,
}

impl CommandResult {
    /// Create a CommandResult from an exit status
    pub fn from_status(
        status: ExitStatus,
        stdout: String,
        stderr: String,
        duration: Duration,
    ) -> Self {
        Self {
            success: status.success(),
            exit_code: status.code().unwrap_or(1),
            stdout,
            stderr,
            duration,
        }
    }

    /// Build a result from a bare exit code
    #[cfg(test)]
    pub fn from_code(exit_code: i32) -> Self {
        Self {
            success: exit_code == 0,
            exit_code,
            ..Default::default()
        }
    }

    /// Turn a non-zero exit into a [`NfBuildError::ToolFailure`]
    pub fn check(self, tool: &str) -> Result<Self> {
        if self.success {
            Ok(self)
        } else {
            Err(NfBuildError::tool_failure(tool, self.exit_code).into())
        }
    }
}

/// Something that can execute tool commands
pub trait CommandRunner {
    /// Run with inherited stdio, blocking until the process exits
    fn run(&mut self, command: &ToolCommand) -> Result<CommandResult>;

    /// Run capturing stdout and stderr
    fn capture(&mut self, command: &ToolCommand) -> Result<CommandResult>;
}

/// Runs commands as real child processes
#[derive(Debug, Default)]
pub struct SystemRunner {
    verbose: bool,
}

impl SystemRunner {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    fn prepare(&self, command: &ToolCommand) -> Result<Command> {
        let program = tools::resolve_program(&command.program)?;
        if self.verbose {
            eprintln!("Running: {}", command);
        }
        Ok(command.to_command(&program))
    }
}

impl CommandRunner for SystemRunner {
    fn run(&mut self, command: &ToolCommand) -> Result<CommandResult> {
        let start = Instant::now();
        let mut cmd = self.prepare(command)?;

        let status = cmd
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .with_context(|| format!("Failed to execute {}", command.program))?;

        let result =
            CommandResult::from_status(status, String::new(), String::new(), start.elapsed());
        if self.verbose {
            eprintln!(
                "Finished {} in {:.2?} (exit code {})",
                command.program, result.duration, result.exit_code
            );
        }
        Ok(result)
    }

    fn capture(&mut self, command: &ToolCommand) -> Result<CommandResult> {
        let start = Instant::now();
        let mut cmd = self.prepare(command)?;

        let output = cmd
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("Failed to execute {}", command.program))?;

        Ok(CommandResult::from_status(
            output.status,
            String::from_utf8_lossy(&output.stdout).into_owned(),
            String::from_utf8_lossy(&output.stderr).into_owned(),
            start.elapsed(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_command_display() {
        let cmd = ToolCommand::new("cmake")
            .arg("..")
            .arg("-GNinja")
            .env("CC", "clang")
            .current_dir("build");
        assert_eq!(cmd.to_string(), "CC=clang cmake .. -GNinja (in build)");
        assert_eq!(cmd.env_value("CC"), Some("clang"));
        assert_eq!(cmd.env_value("CXX"), None);
    }

    #[test]
    fn test_check_maps_failure() {
        let err = CommandResult::from_code(5).check("ninja").unwrap_err();
        assert_eq!(crate::error::exit_code_for(&err), 5);
        assert!(CommandResult::from_code(0).check("ninja").is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_reports_exit_code() {
        let mut runner = SystemRunner::new(false);
        let result = runner
            .run(&ToolCommand::new("sh").args(["-c", "exit 7"]))
            .unwrap();
        assert!(!result.success);
        assert_eq!(result.exit_code, 7);
    }

    #[cfg(unix)]
    #[test]
    fn test_verbose_runner_times_the_command() {
        let started = Instant::now();
        let mut runner = SystemRunner::new(true);
        let result = runner
            .run(&ToolCommand::new("sh").args(["-c", "exit 0"]))
            .unwrap();
        assert!(result.success);
        assert!(result.duration <= started.elapsed());
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_scopes_env_to_child() {
        let mut runner = SystemRunner::new(false);
        let result = runner
            .capture(
                &ToolCommand::new("sh")
                    .args(["-c", "printf %s \"$NFBUILD_TEST_CC\""])
                    .env("NFBUILD_TEST_CC", "clang"),
            )
            .unwrap();
        assert_eq!(result.stdout, "clang");
        assert!(std::env::var("NFBUILD_TEST_CC").is_err());
    }

    #[test]
    fn test_missing_program_is_missing_tool() {
        let mut runner = SystemRunner::new(false);
        let err = runner
            .run(&ToolCommand::new("nfbuild-definitely-not-installed"))
            .unwrap_err();
        assert_eq!(
            crate::error::exit_code_for(&err),
            crate::error::MISSING_TOOL_EXIT_CODE
        );
    }
}
