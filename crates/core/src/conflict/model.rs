//! The in-memory conflict handle.

use std::fmt;

use tracing::debug;

use super::parser::{self, Block};
use crate::config::FallbackPolicy;
use crate::errors::ParseError;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Stable identity of a conflict for the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConflictId {
    /// Index of the owning file in discovery order.
    pub file: usize,
    /// Position of the conflict within its file.
    pub ordinal: usize,
}

impl fmt::Display for ConflictId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.file, self.ordinal)
    }
}

/// Resolution state of a conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// Nothing chosen yet; markers are written back as-is.
    Unresolved,
    /// The local ("ours") side.
    Local,
    /// The incoming ("theirs") side.
    Incoming,
    /// Local followed by incoming.
    Both,
    /// Hand-edited content from the external editor.
    Custom,
}

impl Resolution {
    pub fn is_resolved(self) -> bool {
        self != Self::Unresolved
    }
}

impl From<FallbackPolicy> for Resolution {
    fn from(policy: FallbackPolicy) -> Self {
        match policy {
            FallbackPolicy::Local => Self::Local,
            FallbackPolicy::Incoming => Self::Incoming,
            FallbackPolicy::Both => Self::Both,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unresolved => write!(f, "unresolved"),
            Self::Local => write!(f, "local"),
            Self::Incoming => write!(f, "incoming"),
            Self::Both => write!(f, "both"),
            Self::Custom => write!(f, "edited"),
        }
    }
}

/// One conflict region inside a file.
#[derive(Debug, Clone)]
pub struct Conflict {
    id: ConflictId,
    file_name: String,
    /// Line of the start marker in the original file (0-indexed).
    start: usize,
    /// Line of the end marker in the original file (0-indexed).
    end: usize,
    local_label: String,
    local: Vec<String>,
    base: Option<(String, Vec<String>)>,
    incoming_label: String,
    incoming: Vec<String>,
    resolution: Resolution,
    custom: Vec<String>,
    /// Extra context lines shown above the block.
    pub top_peek: usize,
    /// Extra context lines shown below the block.
    pub bottom_peek: usize,
}

impl Conflict {
    /// Build a conflict from a parsed marker block.
    pub fn from_block(id: ConflictId, file_name: impl Into<String>, block: Block) -> Self {
        Self {
            id,
            file_name: file_name.into(),
            start: block.start,
            end: block.end,
            local_label: block.local_label,
            local: block.local,
            base: block.base,
            incoming_label: block.incoming_label,
            incoming: block.incoming,
            resolution: Resolution::Unresolved,
            custom: Vec::new(),
            top_peek: 0,
            bottom_peek: 0,
        }
    }

    pub fn id(&self) -> ConflictId {
        self.id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Span of the marker block in the original file, inclusive.
    pub fn span(&self) -> (usize, usize) {
        (self.start, self.end)
    }

    pub fn local(&self) -> &[String] {
        &self.local
    }

    pub fn incoming(&self) -> &[String] {
        &self.incoming
    }

    pub fn base(&self) -> Option<&[String]> {
        self.base.as_ref().map(|(_, lines)| lines.as_slice())
    }

    pub fn local_label(&self) -> &str {
        &self.local_label
    }

    pub fn incoming_label(&self) -> &str {
        &self.incoming_label
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn is_resolved(&self) -> bool {
        self.resolution.is_resolved()
    }

    /// Choose a side. `Custom` is only reachable through [`Conflict::update`].
    pub fn resolve(&mut self, resolution: Resolution) {
        debug_assert!(resolution != Resolution::Custom);
        debug!(conflict = %self.id, %resolution, "conflict resolved");
        self.resolution = resolution;
    }

    /// The block as marker text, used for write back and editor buffers.
    pub fn marker_lines(&self) -> Vec<String> {
        let marker = |m: &str, label: &str| {
            if label.is_empty() {
                m.to_owned()
            } else {
                format!("{m} {label}")
            }
        };
        let mut out = Vec::with_capacity(self.local.len() + self.incoming.len() + 4);
        out.push(marker(parser::START, &self.local_label));
        out.extend(self.local.iter().cloned());
        if let Some((label, base)) = &self.base {
            out.push(marker(parser::BASE, label));
            out.extend(base.iter().cloned());
        }
        out.push(parser::SEPARATOR.to_owned());
        out.extend(self.incoming.iter().cloned());
        out.push(marker(parser::END, &self.incoming_label));
        out
    }

    /// Lines that replace the block when the file is written.
    pub fn resolved_lines(&self) -> Vec<String> {
        match self.resolution {
            Resolution::Unresolved => self.marker_lines(),
            Resolution::Local => self.local.clone(),
            Resolution::Incoming => self.incoming.clone(),
            Resolution::Both => self.local.iter().chain(&self.incoming).cloned().collect(),
            Resolution::Custom => self.custom.clone(),
        }
    }

    /// Replace the block with edited lines.
    ///
    /// Lines without markers become a [`Resolution::Custom`] resolution. A
    /// buffer that is exactly one marker block replaces both sides and
    /// leaves the conflict unresolved. Anything else is rejected and the
    /// conflict is left untouched.
    pub fn update(&mut self, lines: Vec<String>) -> Result<(), ParseError> {
        let mut blocks = parser::parse_blocks(&lines)?;
        match blocks.len() {
            0 => {
                if let Some((line, marker)) = parser::first_marker(&lines) {
                    return Err(ParseError::UnexpectedMarker {
                        line: line + 1,
                        marker: marker.to_owned(),
                    });
                }
                debug!(conflict = %self.id, lines = lines.len(), "conflict replaced with edited text");
                self.custom = lines;
                self.resolution = Resolution::Custom;
                Ok(())
            }
            1 => {
                let block = blocks.remove(0);
                if block.start != 0 {
                    return Err(ParseError::StrayText { line: 1 });
                }
                if block.end + 1 != lines.len() {
                    return Err(ParseError::StrayText {
                        line: block.end + 2,
                    });
                }
                debug!(conflict = %self.id, "conflict sides replaced from editor");
                self.local_label = block.local_label;
                self.local = block.local;
                self.base = block.base;
                self.incoming_label = block.incoming_label;
                self.incoming = block.incoming;
                self.custom.clear();
                self.resolution = Resolution::Unresolved;
                Ok(())
            }
            n => Err(ParseError::BlockCount(n)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_owned).collect()
    }

    fn sample() -> Conflict {
        let block = parser::parse_blocks(&lines("<<<<<<< HEAD\nours\n=======\ntheirs\n>>>>>>> topic"))
            .unwrap()
            .remove(0);
        Conflict::from_block(ConflictId { file: 0, ordinal: 0 }, "a.txt", block)
    }

    #[test]
    fn test_marker_lines_round_trip_the_block() {
        let c = sample();
        assert_eq!(
            c.marker_lines(),
            lines("<<<<<<< HEAD\nours\n=======\ntheirs\n>>>>>>> topic")
        );
        assert_eq!(c.resolved_lines(), c.marker_lines());
    }

    #[test]
    fn test_resolved_lines_per_resolution() {
        let mut c = sample();
        c.resolve(Resolution::Local);
        assert_eq!(c.resolved_lines(), vec!["ours"]);
        c.resolve(Resolution::Incoming);
        assert_eq!(c.resolved_lines(), vec!["theirs"]);
        c.resolve(Resolution::Both);
        assert_eq!(c.resolved_lines(), vec!["ours", "theirs"]);
    }

    #[test]
    fn test_update_without_markers_is_custom() {
        let mut c = sample();
        c.update(lines("merged\nby hand")).unwrap();
        assert_eq!(c.resolution(), Resolution::Custom);
        assert_eq!(c.resolved_lines(), vec!["merged", "by hand"]);
    }

    #[test]
    fn test_update_with_single_block_replaces_sides() {
        let mut c = sample();
        c.resolve(Resolution::Local);
        c.update(lines("<<<<<<< HEAD\nours v2\n=======\ntheirs v2\n>>>>>>> topic"))
            .unwrap();
        assert_eq!(c.resolution(), Resolution::Unresolved);
        assert_eq!(c.local(), ["ours v2"]);
        assert_eq!(c.incoming(), ["theirs v2"]);
    }

    #[test]
    fn test_update_rejects_partial_markers() {
        let mut c = sample();
        let err = c.update(lines("kept\n>>>>>>> topic")).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedMarker { line: 2, .. }));
        assert_eq!(c.resolution(), Resolution::Unresolved);
        assert_eq!(c.local(), ["ours"]);
    }

    #[test]
    fn test_update_rejects_text_around_block() {
        let mut c = sample();
        let err = c
            .update(lines("<<<<<<< a\nx\n=======\ny\n>>>>>>> b\ntrailing"))
            .unwrap_err();
        assert_eq!(err, ParseError::StrayText { line: 6 });
    }

    #[test]
    fn test_update_rejects_two_blocks() {
        let mut c = sample();
        let err = c
            .update(lines("<<<<<<< a\n=======\n>>>>>>> b\n<<<<<<< a\n=======\n>>>>>>> b"))
            .unwrap_err();
        assert_eq!(err, ParseError::BlockCount(2));
    }

    #[test]
    fn test_fallback_policy_maps_to_resolution() {
        assert_eq!(Resolution::from(FallbackPolicy::Local), Resolution::Local);
        assert_eq!(Resolution::from(FallbackPolicy::Both), Resolution::Both);
        assert_eq!(Resolution::Custom.to_string(), "edited");
    }
}
