//! Presentation state shared by the evaluator and the terminal UI.
//!
//! The [`Presenter`] decides *what* is on screen: which conflict is
//! active, how the panes are arranged, the prompt and notice lines. The
//! UI context only draws it. Selection is the one place the registry
//! cursor moves.

use tracing::{debug, info};

use crate::config::{Binding, FallbackPolicy, Orientation, Settings};
use crate::conflict::Resolution;
use crate::registry::ConflictRegistry;

/// Result of selecting a conflict for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// The conflict at this index is now active.
    Showing(usize),
    /// Every conflict is resolved; the session should quit.
    AllResolved,
}

/// View state for the active UI context.
#[derive(Debug, Clone)]
pub struct Presenter {
    pub orientation: Orientation,
    /// Vertical scroll offset into the panes.
    pub scroll: usize,
    pub show_help: bool,
    binding: Binding,
    fallback: FallbackPolicy,
    prompt: String,
    notice: Option<String>,
}

impl Presenter {
    pub fn new(settings: &Settings) -> Self {
        Self {
            orientation: settings.orientation,
            scroll: 0,
            show_help: false,
            binding: settings.binding,
            fallback: settings.fallback,
            prompt: String::new(),
            notice: None,
        }
    }

    pub fn binding(&self) -> &Binding {
        &self.binding
    }

    /// Make the conflict at `index` active.
    ///
    /// With `force_fallback` the conflict is first resolved with the
    /// configured fallback policy (unless already resolved) and the
    /// selection moves on to the next unresolved conflict.
    pub fn select(
        &mut self,
        registry: &mut ConflictRegistry,
        index: usize,
        force_fallback: bool,
    ) -> Selection {
        let mut index = index;
        if force_fallback {
            let resolution = Resolution::from(self.fallback);
            let conflict = registry.at_mut(index);
            if !conflict.is_resolved() {
                info!(conflict = %conflict.id(), %resolution, "forcing fallback resolution");
                conflict.resolve(resolution);
            }
            self.notice = Some(format!(
                "Too many unknown commands: kept {resolution} for {}",
                conflict.file_name()
            ));
            match registry.next_unresolved(index) {
                Some(next) => index = next,
                None => {
                    registry.set_cursor(index);
                    return Selection::AllResolved;
                }
            }
        }

        registry.set_cursor(index);
        self.scroll = 0;
        debug!(index, "conflict selected");
        Selection::Showing(index)
    }

    /// Select the next unresolved conflict after the active one.
    pub fn advance(&mut self, registry: &mut ConflictRegistry) -> Selection {
        match registry.next_unresolved(registry.cursor()) {
            Some(next) => self.select(registry, next, false),
            None => Selection::AllResolved,
        }
    }

    /// Refresh the prompt line from the current bindings.
    pub fn print_prompt(&mut self) {
        let b = &self.binding;
        self.prompt = format!(
            "[{},{},{},{},{},?] >> ",
            b.show_up, b.select_local, b.show_down, b.select_incoming, b.edit
        );
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// Help rows as `(key, description)` pairs.
    pub fn help_rows(&self) -> Vec<(String, &'static str)> {
        let b = &self.binding;
        vec![
            (b.select_local.to_string(), "keep local version"),
            (b.select_incoming.to_string(), "keep incoming version"),
            (b.select_both.to_string(), "keep both (local first)"),
            (b.edit.to_string(), "edit in external editor"),
            (b.next.to_string(), "next conflict"),
            (b.previous.to_string(), "previous conflict"),
            (b.scroll_up.to_string(), "scroll up"),
            (b.scroll_down.to_string(), "scroll down"),
            (b.show_up.to_string(), "show more lines above"),
            (b.show_down.to_string(), "show more lines below"),
            (b.toggle_view.to_string(), "toggle orientation"),
            (format!("{} / ?", b.help), "toggle this help"),
            (b.quit.to_string(), "quit (unresolved conflicts keep their markers)"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::ConflictFile;

    fn registry() -> ConflictRegistry {
        let text = "<<<<<<< a\n1\n=======\n2\n>>>>>>> b\n<<<<<<< a\n3\n=======\n4\n>>>>>>> b\n";
        ConflictRegistry::new(vec![ConflictFile::parse(0, "/r/f", "f", text).unwrap()])
    }

    #[test]
    fn test_select_moves_cursor() {
        let mut reg = registry();
        let mut p = Presenter::new(&Settings::default());
        p.scroll = 4;
        assert_eq!(p.select(&mut reg, 1, false), Selection::Showing(1));
        assert_eq!(reg.cursor(), 1);
        assert_eq!(p.scroll, 0);
        assert!(!reg.at(1).is_resolved());
    }

    #[test]
    fn test_forced_select_resolves_and_advances() {
        let mut reg = registry();
        let mut p = Presenter::new(&Settings::default());
        assert_eq!(p.select(&mut reg, 0, true), Selection::Showing(1));
        assert_eq!(reg.at(0).resolution(), Resolution::Local);
        assert!(p.notice().unwrap().contains("local"));
    }

    #[test]
    fn test_forced_select_uses_policy_and_reports_done() {
        let mut reg = registry();
        let mut settings = Settings::default();
        settings.fallback = FallbackPolicy::Incoming;
        let mut p = Presenter::new(&settings);
        reg.at_mut(1).resolve(Resolution::Local);

        assert_eq!(p.select(&mut reg, 0, true), Selection::AllResolved);
        assert_eq!(reg.at(0).resolution(), Resolution::Incoming);
        assert_eq!(reg.at(1).resolution(), Resolution::Local);
    }

    #[test]
    fn test_prompt_uses_bindings() {
        let mut p = Presenter::new(&Settings::default());
        p.print_prompt();
        assert_eq!(p.prompt(), "[w,a,s,d,e,?] >> ");
        assert_eq!(p.help_rows().len(), 13);
    }
}
