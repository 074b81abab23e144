//! Lifecycle hooks for transfer events
//!
//! Users configure shell commands in the settings document under `hooks`,
//! keyed by event name, with either a single command string or a list.
//! Hooks run via the platform shell in the local state directory, in order,
//! fail-fast: the first non-zero exit halts the sequence.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::process::Stdio;

use serde::{Deserialize, Serialize};
use tokio::process::Command;

use crate::error::{Error, Result};

/// Events that can trigger hooks
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum HookEvent {
    /// Before configuration is uploaded to the backend store
    PreUpload,
    /// After configuration is uploaded to the backend store
    PostUpload,
    /// Before configuration is downloaded from the backend store
    PreDownload,
    /// After configuration is downloaded from the backend store
    PostDownload,
}

impl fmt::Display for HookEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PreUpload => write!(f, "pre-upload"),
            Self::PostUpload => write!(f, "post-upload"),
            Self::PreDownload => write!(f, "pre-download"),
            Self::PostDownload => write!(f, "post-download"),
        }
    }
}

impl HookEvent {
    /// Parse a hook event from a string
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pre-upload" => Some(Self::PreUpload),
            "post-upload" => Some(Self::PostUpload),
            "pre-download" => Some(Self::PreDownload),
            "post-download" => Some(Self::PostDownload),
            _ => None,
        }
    }

    /// List all valid event names
    pub fn all_names() -> &'static [&'static str] {
        &["pre-upload", "post-upload", "pre-download", "post-download"]
    }
}

/// One or more shell commands configured for a hook event.
///
/// The document accepts both a bare string and a list of strings:
///
/// ```yaml
/// hooks:
///   pre-upload: make fmt
///   post-download:
///     - ./install-plugins.sh
///     - editor --refresh
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HookCommands {
    One(String),
    Many(Vec<String>),
}

impl HookCommands {
    /// View the configured commands as a slice, in execution order.
    pub fn as_slice(&self) -> &[String] {
        match self {
            Self::One(command) => std::slice::from_ref(command),
            Self::Many(commands) => commands,
        }
    }
}

/// The `hooks` mapping of a settings document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HookSet(BTreeMap<HookEvent, HookCommands>);

impl HookSet {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Commands configured for `event`, empty when none are.
    pub fn commands(&self, event: HookEvent) -> &[String] {
        self.0.get(&event).map(HookCommands::as_slice).unwrap_or(&[])
    }

    /// Insert commands for an event, replacing any existing entry.
    pub fn insert(&mut self, event: HookEvent, commands: HookCommands) {
        self.0.insert(event, commands);
    }

    /// Events that have at least one command configured.
    pub fn events(&self) -> impl Iterator<Item = HookEvent> + '_ {
        self.0.keys().copied()
    }
}

/// Result of running a single hook command
#[derive(Debug)]
pub struct HookOutcome {
    /// The event that triggered the command
    pub event: HookEvent,
    /// The command that was run
    pub command: String,
    /// Whether the command succeeded
    pub success: bool,
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
    /// Exit code
    pub exit_code: Option<i32>,
}

/// Run all commands configured for `event`, in order, in `cwd`.
///
/// Fail-fast: the first command exiting non-zero stops the sequence and
/// returns [`Error::HookFailed`] carrying the event, the command, and a
/// stderr snippet.
pub async fn run_hooks(hooks: &HookSet, event: HookEvent, cwd: &Path) -> Result<Vec<HookOutcome>> {
    let mut outcomes = Vec::new();

    for command in hooks.commands(event) {
        tracing::debug!(%event, command, "running hook");
        let outcome = execute_hook(event, command, cwd).await?;

        if !outcome.success {
            let stderr_snippet = outcome.stderr.trim();
            let message = if stderr_snippet.is_empty() {
                format!("exited with non-zero status (exit code: {:?})", outcome.exit_code)
            } else {
                format!(
                    "exited with non-zero status (exit code: {:?}): {}",
                    outcome.exit_code, stderr_snippet
                )
            };
            tracing::error!(%event, command, message, "hook failed");
            return Err(Error::HookFailed {
                event: event.to_string(),
                command: command.clone(),
                message,
            });
        }

        outcomes.push(outcome);
    }

    Ok(outcomes)
}

/// Execute a single hook command through the platform shell
async fn execute_hook(event: HookEvent, command: &str, cwd: &Path) -> Result<HookOutcome> {
    let output = shell_command(command)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .output()
        .await
        .map_err(Error::Io)?;

    Ok(HookOutcome {
        event,
        command: command.to_string(),
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        exit_code: output.status.code(),
    })
}

fn shell_command(command: &str) -> Command {
    if cfg!(windows) {
        let mut cmd = Command::new("cmd");
        cmd.args(["/C", command]);
        cmd
    } else {
        let mut cmd = Command::new("sh");
        cmd.args(["-c", command]);
        cmd
    }
}
