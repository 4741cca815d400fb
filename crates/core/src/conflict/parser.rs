//! Conflict marker parsing.
//!
//! Recognizes the markers git writes into a conflicted file:
//!
//! ```text
//! <<<<<<< HEAD
//! local lines
//! ||||||| merged common ancestors      (diff3 style only)
//! base lines
//! =======
//! incoming lines
//! >>>>>>> feature
//! ```
//!
//! Outside a block only the start marker is significant, so a stray
//! `=======` underline in prose does not trip the parser.

use crate::errors::ParseError;

pub const START: &str = "<<<<<<<";
pub const BASE: &str = "|||||||";
pub const SEPARATOR: &str = "=======";
pub const END: &str = ">>>>>>>";

/// One marker block, with 0-indexed line positions in the parsed text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Line of the start marker.
    pub start: usize,
    /// Line of the end marker.
    pub end: usize,
    pub local_label: String,
    pub local: Vec<String>,
    /// Label and lines of the common ancestor, when present.
    pub base: Option<(String, Vec<String>)>,
    pub incoming_label: String,
    pub incoming: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker {
    Start,
    Base,
    Separator,
    End,
}

impl Marker {
    fn text(self) -> &'static str {
        match self {
            Self::Start => START,
            Self::Base => BASE,
            Self::Separator => SEPARATOR,
            Self::End => END,
        }
    }
}

fn classify(line: &str) -> Option<(Marker, &str)> {
    if line.trim_end() == SEPARATOR {
        return Some((Marker::Separator, ""));
    }
    [Marker::Start, Marker::Base, Marker::End]
        .into_iter()
        .find_map(|marker| {
            let rest = line.strip_prefix(marker.text())?;
            (rest.is_empty() || rest.starts_with(' ')).then(|| (marker, rest.trim()))
        })
}

/// Position and text of the first start, base, or end marker, if any.
///
/// Separators are ignored because `=======` is common in ordinary text.
pub fn first_marker(lines: &[String]) -> Option<(usize, &'static str)> {
    lines.iter().enumerate().find_map(|(i, line)| match classify(line) {
        Some((Marker::Separator, _)) | None => None,
        Some((marker, _)) => Some((i, marker.text())),
    })
}

#[derive(Clone, Copy)]
enum State {
    Outside,
    Local,
    Base,
    Incoming,
}

/// Split `lines` into marker blocks.
///
/// Returns an error for out-of-order or nested markers inside a block
/// and for a block that is still open at the end of input.
pub fn parse_blocks(lines: &[String]) -> Result<Vec<Block>, ParseError> {
    let mut blocks = Vec::new();
    let mut state = State::Outside;
    let mut current: Option<Block> = None;

    for (i, line) in lines.iter().enumerate() {
        let marker = classify(line);
        let unexpected = |m: Marker| ParseError::UnexpectedMarker {
            line: i + 1,
            marker: m.text().to_owned(),
        };

        match (state, marker) {
            (State::Outside, Some((Marker::Start, label))) => {
                current = Some(Block {
                    start: i,
                    end: i,
                    local_label: label.to_owned(),
                    local: Vec::new(),
                    base: None,
                    incoming_label: String::new(),
                    incoming: Vec::new(),
                });
                state = State::Local;
            }
            (State::Outside, _) => {}

            (State::Local, Some((Marker::Base, label))) => {
                if let Some(b) = current.as_mut() {
                    b.base = Some((label.to_owned(), Vec::new()));
                }
                state = State::Base;
            }
            (State::Local | State::Base, Some((Marker::Separator, _))) => {
                state = State::Incoming;
            }
            (State::Incoming, Some((Marker::End, label))) => {
                if let Some(mut b) = current.take() {
                    b.end = i;
                    b.incoming_label = label.to_owned();
                    blocks.push(b);
                }
                state = State::Outside;
            }
            (_, Some((m, _))) => return Err(unexpected(m)),

            (State::Local, None) => {
                if let Some(b) = current.as_mut() {
                    b.local.push(line.clone());
                }
            }
            (State::Base, None) => {
                if let Some((_, base)) = current.as_mut().and_then(|b| b.base.as_mut()) {
                    base.push(line.clone());
                }
            }
            (State::Incoming, None) => {
                if let Some(b) = current.as_mut() {
                    b.incoming.push(line.clone());
                }
            }
        }
    }

    if let Some(open) = current {
        return Err(ParseError::Unterminated {
            line: open.start + 1,
        });
    }
    Ok(blocks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_owned).collect()
    }

    #[test]
    fn test_single_block() {
        let input = lines("fn main() {\n<<<<<<< HEAD\n    a();\n=======\n    b();\n>>>>>>> feature\n}\n");
        let blocks = parse_blocks(&input).unwrap();
        assert_eq!(blocks.len(), 1);
        let b = &blocks[0];
        assert_eq!((b.start, b.end), (1, 5));
        assert_eq!(b.local_label, "HEAD");
        assert_eq!(b.incoming_label, "feature");
        assert_eq!(b.local, vec!["    a();"]);
        assert_eq!(b.incoming, vec!["    b();"]);
        assert!(b.base.is_none());
    }

    #[test]
    fn test_diff3_base_section() {
        let input = lines("<<<<<<< ours\nx\n||||||| base\norig\n=======\ny\n>>>>>>> theirs");
        let blocks = parse_blocks(&input).unwrap();
        let (label, base) = blocks[0].base.clone().unwrap();
        assert_eq!(label, "base");
        assert_eq!(base, vec!["orig"]);
    }

    #[test]
    fn test_multiple_blocks_and_empty_sides() {
        let input = lines("<<<<<<<\n=======\nnew\n>>>>>>>\nmid\n<<<<<<< a\nold\n=======\n>>>>>>> b");
        let blocks = parse_blocks(&input).unwrap();
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].local.is_empty());
        assert_eq!(blocks[0].local_label, "");
        assert!(blocks[1].incoming.is_empty());
        assert_eq!(blocks[1].start, 5);
    }

    #[test]
    fn test_separator_outside_block_is_text() {
        let input = lines("Title\n=======\n\nbody");
        assert!(parse_blocks(&input).unwrap().is_empty());
    }

    #[test]
    fn test_nested_start_is_error() {
        let input = lines("<<<<<<< a\n<<<<<<< b\n=======\n>>>>>>> c");
        assert_eq!(
            parse_blocks(&input),
            Err(ParseError::UnexpectedMarker {
                line: 2,
                marker: START.into()
            })
        );
    }

    #[test]
    fn test_end_before_separator_is_error() {
        let input = lines("<<<<<<< a\nx\n>>>>>>> c");
        assert!(matches!(
            parse_blocks(&input),
            Err(ParseError::UnexpectedMarker { line: 3, .. })
        ));
    }

    #[test]
    fn test_unterminated_block() {
        let input = lines("ok\n<<<<<<< a\nx\n=======\ny");
        assert_eq!(
            parse_blocks(&input),
            Err(ParseError::Unterminated { line: 2 })
        );
    }

    #[test]
    fn test_marker_prefix_needs_space_or_end() {
        let input = lines("<<<<<<<<<< not a marker\n>>>>>>>>>>");
        assert!(parse_blocks(&input).unwrap().is_empty());
        assert_eq!(first_marker(&input), None);
    }

    #[test]
    fn test_first_marker_skips_separator() {
        let input = lines("a\n=======\n>>>>>>> x");
        assert_eq!(first_marker(&input), Some((2, END)));
    }
}
