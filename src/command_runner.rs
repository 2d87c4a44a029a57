//! Type-Safe Command Execution
//!
//! This module provides the ONLY sanctioned way to start external processes.
//! All execution goes through [`run_command_safe`] so that every invocation
//! is logged with its exact arguments and has its output captured.
//!
//! Calls are synchronous and have no timeout: a hung `systemctl` hangs the
//! run, which is the expected behaviour for a manual, interactive tool.

use anyhow::{Context, Result};
use std::io::Write;
use std::process::{Command, Stdio};
use tracing::{debug, info};

use crate::command_traits::CommandArgs;

/// Execute a command with type-safe arguments.
///
/// # Returns
///
/// - `Ok(output)` - Command ran to completion (check `output.success`)
/// - `Err` - Command could not be spawned, fed or awaited
pub fn run_command_safe<T: CommandArgs>(args: &T) -> Result<CommandOutput> {
    let program = args.program();
    let cli_args = args.to_cli_args();
    let env_vars = args.get_env_vars();
    let stdin_input = args.stdin_input();

    info!("run_command_safe: {} args={:?}", program, cli_args);
    debug!("run_command_safe: env={:?}", env_vars);

    let mut cmd = Command::new(program);
    cmd.args(&cli_args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .stdin(if stdin_input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        });

    for (key, value) in &env_vars {
        cmd.env(key, value);
    }

    let mut child = cmd
        .spawn()
        .with_context(|| format!("Failed to spawn command: {}", program))?;

    if let Some(input) = stdin_input {
        // Dropping the handle closes the pipe so the child sees EOF
        let mut stdin = child
            .stdin
            .take()
            .with_context(|| format!("No stdin handle for command: {}", program))?;
        stdin
            .write_all(input.as_bytes())
            .with_context(|| format!("Failed writing stdin of command: {}", program))?;
    }

    let output = child
        .wait_with_output()
        .with_context(|| format!("Failed waiting for command: {}", program))?;

    let result = CommandOutput {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code(),
        success: output.status.success(),
    };

    if result.success {
        debug!("Command {} executed successfully", program);
    } else {
        info!(
            "Command {} failed with exit code {}",
            program,
            result.exit_code.unwrap_or(-1)
        );
    }

    Ok(result)
}

/// Output from a command execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output from the command.
    pub stdout: String,
    /// Standard error from the command.
    pub stderr: String,
    /// Exit code (None if terminated by signal).
    pub exit_code: Option<i32>,
    /// Whether the command exited successfully (exit code 0).
    pub success: bool,
}

impl CommandOutput {
    /// Check if the command succeeded and return an error if not.
    pub fn ensure_success(&self, context: &str) -> Result<()> {
        if self.success {
            Ok(())
        } else {
            let code = self.exit_code.unwrap_or(-1);
            anyhow::bail!(
                "{} failed (exit code {}): {}",
                context,
                code,
                self.stderr.trim()
            )
        }
    }
}
