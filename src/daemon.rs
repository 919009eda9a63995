//! Hook daemon: the binary re-invoked by git (as sequence editor or editor)
//! with `LAZYGIT_DAEMON_KIND` set.

use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::app::Common;

pub const DAEMON_KIND_ENV: &str = "LAZYGIT_DAEMON_KIND";
pub const DAEMON_INSTRUCTION_ENV: &str = "LAZYGIT_DAEMON_INSTRUCTION";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonKind {
    /// Exit successfully without touching anything.
    ExitImmediately,
    /// Replace the rebase todo file git hands us.
    WriteRebaseTodo,
}

impl DaemonKind {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "exit-immediately" => Some(Self::ExitImmediately),
            "write-rebase-todo" => Some(Self::WriteRebaseTodo),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::ExitImmediately => "exit-immediately",
            Self::WriteRebaseTodo => "write-rebase-todo",
        }
    }
}

/// The one place that inspects the environment for the daemon sentinel.
/// Unrecognised values mean the process is not a daemon.
pub fn detect() -> Option<DaemonKind> {
    std::env::var(DAEMON_KIND_ENV)
        .ok()
        .as_deref()
        .and_then(DaemonKind::parse)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WriteRebaseTodoInstruction {
    todos_file_content: String,
}

/// Perform the daemon's job. `todo_file` is the file git passed on the
/// command line, if any.
pub fn handle(common: &Common, kind: DaemonKind, todo_file: Option<&Path>) -> Result<()> {
    let _enter = common.span().enter();
    info!(kind = kind.as_str(), todo_file = ?todo_file, "daemon:start");

    match kind {
        DaemonKind::ExitImmediately => Ok(()),
        DaemonKind::WriteRebaseTodo => {
            let todo_file =
                todo_file.ok_or_else(|| anyhow!("No rebase todo file was passed to the daemon"))?;
            let raw = std::env::var(DAEMON_INSTRUCTION_ENV)
                .with_context(|| format!("{} is not set", DAEMON_INSTRUCTION_ENV))?;
            write_rebase_todo(todo_file, &raw)
        }
    }
}

fn write_rebase_todo(todo_file: &Path, raw_instruction: &str) -> Result<()> {
    let instruction: WriteRebaseTodoInstruction = serde_json::from_str(raw_instruction)
        .context("Failed to parse daemon instruction")?;
    fs::write(todo_file, instruction.todos_file_content)
        .with_context(|| format!("Failed to write rebase todo '{}'", todo_file.display()))?;
    info!(todo_file = %todo_file.display(), "daemon:wrote rebase todo");
    Ok(())
}
