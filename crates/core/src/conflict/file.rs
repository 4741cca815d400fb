//! A conflicted file and its write back.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::model::{Conflict, ConflictId};
use super::parser;
use crate::errors::{ParseError, ScanError, WriteError};

/// A file containing one or more conflict blocks.
#[derive(Debug, Clone)]
pub struct ConflictFile {
    path: PathBuf,
    name: String,
    lines: Vec<String>,
    /// Whether each original line ended with `\r\n`.
    crlf: Vec<bool>,
    trailing_newline: bool,
    /// Conflicts in the order they appear in the file.
    pub conflicts: Vec<Conflict>,
}

impl ConflictFile {
    /// Parse `contents` as the file at `path`, the `index`-th in discovery order.
    pub fn parse(
        index: usize,
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        contents: &str,
    ) -> Result<Self, ParseError> {
        let name = name.into();
        let (lines, crlf): (Vec<String>, Vec<bool>) = contents
            .split_inclusive('\n')
            .map(|raw| match raw.strip_suffix("\r\n") {
                Some(line) => (line.to_owned(), true),
                None => (raw.strip_suffix('\n').unwrap_or(raw).to_owned(), false),
            })
            .unzip();
        let conflicts = parser::parse_blocks(&lines)?
            .into_iter()
            .enumerate()
            .map(|(ordinal, block)| {
                Conflict::from_block(ConflictId { file: index, ordinal }, name.clone(), block)
            })
            .collect();

        Ok(Self {
            path: path.into(),
            name,
            lines,
            crlf,
            trailing_newline: contents.ends_with('\n'),
            conflicts,
        })
    }

    /// Read and parse a file from disk.
    ///
    /// Returns `Ok(None)` when the file is missing or is not UTF-8 text.
    pub fn read(index: usize, path: &Path, name: &str) -> Result<Option<Self>, ScanError> {
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ScanError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let Ok(contents) = String::from_utf8(bytes) else {
            return Ok(None);
        };
        Self::parse(index, path, name, &contents)
            .map(Some)
            .map_err(|source| ScanError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path relative to the repository root.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Original line `index`, if it exists.
    pub fn line(&self, index: usize) -> Option<&str> {
        self.lines.get(index).map(String::as_str)
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// The file contents with every conflict replaced by its resolution.
    ///
    /// Lines outside conflicts keep their own line ending. Resolved lines
    /// take the ending of the block's start marker line.
    pub fn render(&self) -> String {
        let mut text = String::new();
        let mut emit = |line: &str, crlf: bool| {
            text.push_str(line);
            text.push_str(if crlf { "\r\n" } else { "\n" });
        };

        let mut next = 0;
        for conflict in &self.conflicts {
            let (start, end) = conflict.span();
            for i in next..start {
                emit(&self.lines[i], self.crlf[i]);
            }
            for line in conflict.resolved_lines() {
                emit(&line, self.crlf[start]);
            }
            next = end + 1;
        }
        for i in next..self.lines.len() {
            emit(&self.lines[i], self.crlf[i]);
        }

        if !self.trailing_newline {
            if text.ends_with("\r\n") {
                text.truncate(text.len() - 2);
            } else if text.ends_with('\n') {
                text.pop();
            }
        }
        text
    }

    /// Persist the resolved contents.
    pub fn write_changes(&self) -> Result<(), WriteError> {
        let resolved = self.conflicts.iter().filter(|c| c.is_resolved()).count();
        info!(
            path = %self.path.display(),
            resolved,
            total = self.conflicts.len(),
            "writing resolved file"
        );
        std::fs::write(&self.path, self.render()).map_err(|source| WriteError {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), "file written");
        Ok(())
    }
}
