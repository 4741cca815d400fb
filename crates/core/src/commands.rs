//! The command evaluator.
//!
//! User input is a string of single-key commands applied left to right,
//! so `jjw` scrolls twice and then shows one more line above the block.
//! Evaluation stops at the first key that asks to leave the UI (edit,
//! quit) or that is not bound.

use tracing::debug;

use crate::config::Binding;
use crate::conflict::Resolution;
use crate::errors::EvalError;
use crate::presenter::{Presenter, Selection};
use crate::registry::ConflictRegistry;

/// What evaluating one line of input asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evaluation {
    /// Every command ran.
    Applied,
    /// This key is not bound; commands before it have run.
    UnknownCommand(char),
    /// Hand the active conflict to the external editor.
    OpenEditor,
    /// Leave the session, by request or because nothing is left.
    Quit,
}

/// Interprets raw input against the presenter and registry.
pub trait Evaluate {
    fn evaluate(
        &mut self,
        view: &mut Presenter,
        registry: &mut ConflictRegistry,
        input: &str,
    ) -> Result<Evaluation, EvalError>;
}

/// The key-binding driven evaluator.
#[derive(Debug, Clone)]
pub struct CommandEvaluator {
    binding: Binding,
}

impl CommandEvaluator {
    pub fn new(binding: Binding) -> Self {
        Self { binding }
    }

    fn resolve(
        view: &mut Presenter,
        registry: &mut ConflictRegistry,
        resolution: Resolution,
    ) -> Option<Evaluation> {
        registry.active_mut().resolve(resolution);
        match view.advance(registry) {
            Selection::AllResolved => Some(Evaluation::Quit),
            Selection::Showing(_) => None,
        }
    }
}

impl Evaluate for CommandEvaluator {
    fn evaluate(
        &mut self,
        view: &mut Presenter,
        registry: &mut ConflictRegistry,
        input: &str,
    ) -> Result<Evaluation, EvalError> {
        let b = self.binding;
        let n = registry.size();

        for key in input.chars().filter(|c| !c.is_whitespace()) {
            if key != b.help && key != '?' {
                view.show_help = false;
            }

            let cursor = registry.cursor();
            let early = match key {
                k if k == b.select_local => Self::resolve(view, registry, Resolution::Local),
                k if k == b.select_incoming => {
                    Self::resolve(view, registry, Resolution::Incoming)
                }
                k if k == b.select_both => Self::resolve(view, registry, Resolution::Both),
                k if k == b.next => {
                    view.select(registry, (cursor + 1) % n, false);
                    None
                }
                k if k == b.previous => {
                    view.select(registry, (cursor + n - 1) % n, false);
                    None
                }
                k if k == b.scroll_up => {
                    view.scroll = view.scroll.saturating_sub(1);
                    None
                }
                k if k == b.scroll_down => {
                    view.scroll += 1;
                    None
                }
                k if k == b.show_up => {
                    let (start, _) = registry.active().span();
                    let conflict = registry.active_mut();
                    conflict.top_peek = (conflict.top_peek + 1).min(start);
                    None
                }
                k if k == b.show_down => {
                    let (_, end) = registry.active().span();
                    let below = registry
                        .file_of(cursor)
                        .line_count()
                        .saturating_sub(end + 1);
                    let conflict = registry.active_mut();
                    conflict.bottom_peek = (conflict.bottom_peek + 1).min(below);
                    None
                }
                k if k == b.toggle_view => {
                    view.orientation = view.orientation.toggled();
                    None
                }
                k if k == b.help || k == '?' => {
                    view.show_help = !view.show_help;
                    None
                }
                k if k == b.edit => Some(Evaluation::OpenEditor),
                k if k == b.quit => Some(Evaluation::Quit),
                other => {
                    debug!(key = %other, "unknown command");
                    Some(Evaluation::UnknownCommand(other))
                }
            };

            if let Some(evaluation) = early {
                return Ok(evaluation);
            }
        }
        Ok(Evaluation::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Orientation, Settings};
    use crate::conflict::ConflictFile;

    const TEXT: &str = "top\n<<<<<<< a\n1\n=======\n2\n>>>>>>> b\nmid\n<<<<<<< a\n3\n=======\n4\n>>>>>>> b\nend\n";

    fn setup() -> (CommandEvaluator, Presenter, ConflictRegistry) {
        let settings = Settings::default();
        let reg = ConflictRegistry::new(vec![ConflictFile::parse(0, "/r/f", "f", TEXT).unwrap()]);
        (
            CommandEvaluator::new(settings.binding),
            Presenter::new(&settings),
            reg,
        )
    }

    #[test]
    fn test_resolve_advances_then_quits() {
        let (mut ev, mut view, mut reg) = setup();
        assert_eq!(ev.evaluate(&mut view, &mut reg, "a").unwrap(), Evaluation::Applied);
        assert_eq!(reg.at(0).resolution(), Resolution::Local);
        assert_eq!(reg.cursor(), 1);

        assert_eq!(ev.evaluate(&mut view, &mut reg, "d").unwrap(), Evaluation::Quit);
        assert_eq!(reg.at(1).resolution(), Resolution::Incoming);
    }

    #[test]
    fn test_unknown_key_stops_evaluation() {
        let (mut ev, mut view, mut reg) = setup();
        let result = ev.evaluate(&mut view, &mut reg, "vxa").unwrap();
        assert_eq!(result, Evaluation::UnknownCommand('x'));
        assert_eq!(view.orientation, Orientation::Horizontal);
        assert!(!reg.at(0).is_resolved());
    }

    #[test]
    fn test_empty_and_whitespace_input_is_applied() {
        let (mut ev, mut view, mut reg) = setup();
        assert_eq!(ev.evaluate(&mut view, &mut reg, "").unwrap(), Evaluation::Applied);
        assert_eq!(ev.evaluate(&mut view, &mut reg, "  ").unwrap(), Evaluation::Applied);
    }

    #[test]
    fn test_navigation_wraps() {
        let (mut ev, mut view, mut reg) = setup();
        ev.evaluate(&mut view, &mut reg, "p").unwrap();
        assert_eq!(reg.cursor(), 1);
        ev.evaluate(&mut view, &mut reg, "n").unwrap();
        assert_eq!(reg.cursor(), 0);
    }

    #[test]
    fn test_peek_is_clamped_to_file() {
        let (mut ev, mut view, mut reg) = setup();
        ev.evaluate(&mut view, &mut reg, "wwwsss").unwrap();
        assert_eq!(reg.at(0).top_peek, 1);
        assert_eq!(reg.at(0).bottom_peek, 3);
    }

    #[test]
    fn test_edit_and_quit_signals() {
        let (mut ev, mut view, mut reg) = setup();
        assert_eq!(ev.evaluate(&mut view, &mut reg, "je").unwrap(), Evaluation::OpenEditor);
        assert_eq!(ev.evaluate(&mut view, &mut reg, "q").unwrap(), Evaluation::Quit);
    }

    #[test]
    fn test_help_toggles_and_hides() {
        let (mut ev, mut view, mut reg) = setup();
        ev.evaluate(&mut view, &mut reg, "?").unwrap();
        assert!(view.show_help);
        ev.evaluate(&mut view, &mut reg, "k").unwrap();
        assert!(!view.show_help);
        assert_eq!(view.scroll, 1);
    }
}
