//! Activation command execution.
//!
//! # Responsibilities
//! - Run a link's activation command as an external process
//! - Capture its output for logging
//! - Map spawn failures and non-zero exits to `ActivationError`

use std::future::Future;
use std::process::{ExitStatus, Stdio};

use thiserror::Error;
use tokio::process::Command;

/// Errors from running an activation command.
#[derive(Debug, Error)]
pub enum ActivationError {
    #[error("activation command is empty")]
    EmptyCommand,

    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{program}' exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: ExitStatus,
        stderr: String,
    },
}

/// Something that can make a link the routed path.
pub trait Activator: Send + Sync {
    /// Enact `command`, returning its output on success.
    fn activate(
        &self,
        command: &[String],
    ) -> impl Future<Output = Result<String, ActivationError>> + Send;
}

/// Runs activation commands as child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandActivator;

impl Activator for CommandActivator {
    async fn activate(&self, command: &[String]) -> Result<String, ActivationError> {
        let (program, args) = command.split_first().ok_or(ActivationError::EmptyCommand)?;

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| ActivationError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(ActivationError::Failed {
                program: program.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(combined)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_string()).collect()
    }

    #[tokio::test]
    async fn test_successful_command_returns_combined_output() {
        let output = CommandActivator
            .activate(&argv(&["sh", "-c", "echo routed; echo note >&2"]))
            .await
            .unwrap();
        assert_eq!(output, "routed\nnote\n");
    }

    #[tokio::test]
    async fn test_non_zero_exit_is_failure() {
        let err = CommandActivator
            .activate(&argv(&["sh", "-c", "echo boom >&2; exit 3"]))
            .await
            .unwrap_err();
        match err {
            ActivationError::Failed { status, stderr, .. } => {
                assert_eq!(status.code(), Some(3));
                assert_eq!(stderr, "boom");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_missing_program_is_spawn_error() {
        let err = CommandActivator
            .activate(&argv(&["/nonexistent/rewansh-activate"]))
            .await
            .unwrap_err();
        assert!(matches!(err, ActivationError::Spawn { .. }));
    }

    #[tokio::test]
    async fn test_empty_command_rejected() {
        let err = CommandActivator.activate(&[]).await.unwrap_err();
        assert!(matches!(err, ActivationError::EmptyCommand));
    }

    #[tokio::test]
    async fn test_command_gets_no_stdin() {
        // `cat` would block forever on an inherited terminal.
        let output = CommandActivator.activate(&argv(&["cat"])).await.unwrap();
        assert_eq!(output, "");
    }
}
