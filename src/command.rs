//! Command-line assembly and process execution for the Vault client.

use std::io;
use std::path::Path;
use std::process::{Command, Stdio};

use crate::settings::{ConnectionSettings, Masking};

#[derive(Clone, Debug, PartialEq, Eq)]
/// A single client invocation: `[connection args] COMMAND arg...`.
///
/// Arguments are joined with single spaces and are responsible for their own
/// quoting; use [`CommandInvocation::quoted_arg`] for values that may contain
/// spaces.
pub struct CommandInvocation {
    command: String,
    arguments: Vec<String>,
    login: bool,
}

impl CommandInvocation {
    /// Creates an invocation of `command` that includes connection arguments.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            arguments: Vec::new(),
            login: true,
        }
    }

    /// Appends a raw argument fragment.
    #[must_use]
    pub fn arg(mut self, fragment: impl Into<String>) -> Self {
        self.arguments.push(fragment.into());
        self
    }

    /// Appends a value wrapped in double quotes.
    #[must_use]
    pub fn quoted_arg(self, value: impl AsRef<str>) -> Self {
        let quoted = quote(value.as_ref());
        self.arg(quoted)
    }

    /// Appends `flag "value"` as a single fragment.
    #[must_use]
    pub fn option(self, flag: &str, value: impl AsRef<str>) -> Self {
        let fragment = format!("{flag} {}", quote(value.as_ref()));
        self.arg(fragment)
    }

    /// Omits the connection arguments from the command line.
    #[must_use]
    pub fn without_login(mut self) -> Self {
        self.login = false;
        self
    }

    /// Returns the command name.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// Returns the argument fragments in order.
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Returns whether connection arguments are prepended.
    pub fn includes_login(&self) -> bool {
        self.login
    }

    /// Renders the full command line passed to the client executable.
    pub fn command_line(&self, settings: &ConnectionSettings, masking: Masking) -> String {
        let mut line = if self.login {
            settings.connection_args(masking)
        } else {
            String::new()
        };
        line.push_str(&self.command);
        for fragment in &self.arguments {
            line.push(' ');
            line.push_str(fragment);
        }
        line
    }
}

fn quote(value: &str) -> String {
    format!("\"{value}\"")
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
/// Captured output of one client process.
pub struct CommandResult {
    /// Everything written to stdout.
    pub stdout: String,
    /// Everything written to stderr.
    pub stderr: String,
    /// Exit code, if the process exited normally.
    pub exit_code: Option<i32>,
}

impl CommandResult {
    /// Builds a result with the given stdout, empty stderr and exit code 0.
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            exit_code: Some(0),
        }
    }

    /// Builds a result with the given stderr and exit code 1.
    pub fn failure(stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            exit_code: Some(1),
        }
    }

    /// Returns `true` if the process exited with code 0.
    pub fn exited_successfully(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs an external program and captures its output.
///
/// The provider only talks to processes through this trait, so tests and
/// hosts with their own execution substrate (remote agents, sandboxes) can
/// supply an implementation.
pub trait ProcessRunner {
    /// Runs `program` with `command_line` and waits for it to finish.
    ///
    /// `command_line` is a single string using double quotes for grouping, as
    /// produced by [`CommandInvocation::command_line`].
    fn run(&self, program: &Path, command_line: &str) -> io::Result<CommandResult>;
}

impl<T: ProcessRunner + ?Sized> ProcessRunner for &T {
    fn run(&self, program: &Path, command_line: &str) -> io::Result<CommandResult> {
        (**self).run(program, command_line)
    }
}

impl<T: ProcessRunner + ?Sized> ProcessRunner for Box<T> {
    fn run(&self, program: &Path, command_line: &str) -> io::Result<CommandResult> {
        (**self).run(program, command_line)
    }
}

#[derive(Clone, Copy, Debug, Default)]
/// Runs processes on the local machine with [`std::process::Command`].
///
/// On Windows the command line is passed through verbatim; elsewhere it is
/// split into arguments with POSIX shell quoting rules.
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &Path, command_line: &str) -> io::Result<CommandResult> {
        let mut cmd = Command::new(program);
        push_command_line(&mut cmd, command_line)?;
        let output = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;
        Ok(CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        })
    }
}

#[cfg(windows)]
fn push_command_line(cmd: &mut Command, command_line: &str) -> io::Result<()> {
    use std::os::windows::process::CommandExt;

    cmd.raw_arg(command_line);
    Ok(())
}

#[cfg(not(windows))]
fn push_command_line(cmd: &mut Command, command_line: &str) -> io::Result<()> {
    cmd.args(split_command_line(command_line)?);
    Ok(())
}

/// Splits a command line into arguments, honouring double quotes.
pub(crate) fn split_command_line(command_line: &str) -> io::Result<Vec<String>> {
    shell_words::split(command_line).map_err(|err| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid command line: {err}"),
        )
    })
}
