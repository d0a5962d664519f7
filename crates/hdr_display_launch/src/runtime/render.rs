//! Run a composed command line and capture its output

use std::process::Stdio;
use tokio::process::Command;

/// What to do when the command writes to stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StderrPolicy {
    /// Treat any stderr output as a failure
    #[default]
    Fail,
    /// Log stderr output as warnings
    Warn,
    /// Discard stderr output
    Ignore,
}

/// Run `command_line` and return its standard output.
///
/// The line is split with POSIX shell word rules; no shell is spawned.
pub async fn render_command(
    command_line: &str,
    stderr_policy: StderrPolicy,
) -> Result<String, RenderError> {
    let words = shell_words::split(command_line)?;
    let (program, args) = words.split_first().ok_or(RenderError::EmptyCommand)?;

    log::info!("Rendering: {}", command_line);

    let output = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| RenderError::Spawn {
            program: program.clone(),
            source: e,
        })?;

    let stderr = String::from_utf8_lossy(&output.stderr);

    if !output.status.success() {
        return Err(RenderError::Failed {
            code: output.status.code(),
            stderr: stderr.trim().to_string(),
        });
    }

    if !stderr.trim().is_empty() {
        match stderr_policy {
            StderrPolicy::Fail => {
                return Err(RenderError::Stderr(stderr.trim().to_string()));
            }
            StderrPolicy::Warn => {
                for line in stderr.lines() {
                    log::warn!("[{}] {}", program, line);
                }
            }
            StderrPolicy::Ignore => {}
        }
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Errors that can occur while rendering
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Render command is empty")]
    EmptyCommand,

    #[error("Failed to split render command: {0}")]
    Split(#[from] shell_words::ParseError),

    #[error("Failed to spawn '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Render command exited with code {code:?}: {stderr}")]
    Failed { code: Option<i32>, stderr: String },

    #[error("Render command wrote to stderr: {0}")]
    Stderr(String),
}
