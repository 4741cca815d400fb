//! Handing a conflict to an external editor.
//!
//! The conflict is written with its markers to a temporary file named
//! after the source file's extension (so the editor picks a syntax), the
//! editor runs with the terminal to itself, and the buffer is read back.

use std::io::Write;
use std::path::Path;
use std::process::Command;

use tracing::{debug, info};

use crate::config::Settings;
use crate::conflict::Conflict;
use crate::errors::EditorError;
use crate::session::Editor;

const DEFAULT_EDITOR: &str = "vi";

/// Pick the editor command line: the configured value, then `$VISUAL`,
/// then `$EDITOR`, then `vi`. Blank values are skipped.
pub fn resolve_editor_command(configured: Option<&str>) -> Vec<String> {
    let from_env = |key: &str| std::env::var(key).ok();
    let chosen = configured
        .map(str::to_owned)
        .into_iter()
        .chain(from_env("VISUAL"))
        .chain(from_env("EDITOR"))
        .find(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_EDITOR.to_owned());
    chosen.split_whitespace().map(str::to_owned).collect()
}

/// Runs a real editor process.
#[derive(Debug, Clone)]
pub struct SystemEditor {
    command: Vec<String>,
}

impl SystemEditor {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(resolve_editor_command(settings.editor.as_deref()))
    }

    pub fn command(&self) -> &[String] {
        &self.command
    }

    fn suffix(file_name: &str) -> String {
        Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default()
    }
}

impl Editor for SystemEditor {
    fn open(&mut self, conflict: &Conflict) -> Result<Vec<String>, EditorError> {
        let (program, args) = self
            .command
            .split_first()
            .ok_or(EditorError::NotConfigured)?;

        let mut buffer = tempfile::Builder::new()
            .prefix("fac-")
            .suffix(&Self::suffix(conflict.file_name()))
            .tempfile()?;
        for line in conflict.marker_lines() {
            writeln!(buffer, "{line}")?;
        }
        buffer.flush()?;

        info!(editor = %program, buffer = %buffer.path().display(), "launching editor");
        let status = Command::new(program)
            .args(args)
            .arg(buffer.path())
            .status()
            .map_err(|source| EditorError::Spawn {
                editor: program.clone(),
                source,
            })?;
        if !status.success() {
            return Err(EditorError::Exited {
                editor: program.clone(),
                status: status.to_string(),
            });
        }

        // Editors commonly replace the file instead of writing in place.
        let contents = std::fs::read_to_string(buffer.path())?;
        let lines: Vec<String> = contents.lines().map(str::to_owned).collect();
        debug!(lines = lines.len(), "editor buffer read back");
        Ok(lines)
    }
}
