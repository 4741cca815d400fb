//! Error types for the fac core library.
//!
//! Each collaborator has its own error type derived with `thiserror`, and a
//! top-level [`CoreError`] enum unifies them for the session controller.
//! Control-flow signals (editor requests, quit, unknown commands) are not
//! errors and never appear here; see [`crate::dispatch::Outcome`].

use std::path::PathBuf;

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Editor(#[from] EditorError),

    #[error(transparent)]
    Ui(#[from] UiError),

    #[error(transparent)]
    Write(#[from] WriteError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from loading and validating the settings file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// TOML parse error.
    #[error("configuration parse error in '{path}': {detail}")]
    ParseError { path: String, detail: String },

    /// A config value is invalid.
    #[error("invalid configuration value for '{field}': {detail}")]
    InvalidValue { field: String, detail: String },

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Scan errors
// ---------------------------------------------------------------------------

/// Errors from locating conflicted files in the working tree.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The path is not inside a git repository.
    #[error("not a git repository (or any parent): {0}")]
    RepositoryNotFound(String),

    /// The repository has no working directory.
    #[error("cannot resolve conflicts in a bare repository at '{0}'")]
    BareRepository(String),

    /// A `git2` library error.
    #[error("git2 error: {0}")]
    Git2Error(#[from] git2::Error),

    /// A conflicted file could not be read.
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A conflicted file contains malformed markers.
    #[error("failed to parse conflicts in '{path}': {source}")]
    Parse { path: PathBuf, source: ParseError },
}

// ---------------------------------------------------------------------------
// Marker parse errors
// ---------------------------------------------------------------------------

/// Structural problems with conflict markers.
///
/// Line numbers are 1-indexed relative to the text being parsed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// A marker appeared where it is not allowed.
    #[error("unexpected '{marker}' marker on line {line}")]
    UnexpectedMarker { line: usize, marker: String },

    /// A conflict block was opened but never closed.
    #[error("conflict starting on line {line} is never closed")]
    Unterminated { line: usize },

    /// Editor output must contain exactly one conflict block.
    #[error("expected a single conflict block, found {0}")]
    BlockCount(usize),

    /// Editor output has text outside the conflict block.
    #[error("text outside the conflict block on line {line}")]
    StrayText { line: usize },
}

// ---------------------------------------------------------------------------
// Editor errors
// ---------------------------------------------------------------------------

/// Errors from handing a conflict to an external editor.
#[derive(Debug, Error)]
pub enum EditorError {
    /// The editor command was empty after resolution.
    #[error("no editor configured")]
    NotConfigured,

    /// The editor process could not be started.
    #[error("failed to launch editor '{editor}': {source}")]
    Spawn {
        editor: String,
        source: std::io::Error,
    },

    /// The editor exited unsuccessfully.
    #[error("editor '{editor}' exited with {status}")]
    Exited { editor: String, status: String },

    /// Temp file I/O failed.
    #[error("editor I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// UI errors
// ---------------------------------------------------------------------------

/// Errors from creating or driving a UI context.
#[derive(Debug, Error)]
pub enum UiError {
    /// Terminal setup, drawing, or input failed.
    #[error("terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Write-back errors
// ---------------------------------------------------------------------------

/// A resolved file could not be persisted.
#[derive(Debug, Error)]
#[error("failed to write '{path}': {source}")]
pub struct WriteError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

// ---------------------------------------------------------------------------
// Evaluator errors
// ---------------------------------------------------------------------------

/// Unrecoverable failures raised by a command evaluator.
#[derive(Debug, Error)]
pub enum EvalError {
    /// The command could not be carried out.
    #[error("command failed: {0}")]
    Failed(String),
}
