//! The session controller.
//!
//! [`SessionLoop`] creates a UI context, drives it until it yields a
//! signal, drops it, and decides what happens next:
//!
//! ```text
//! Bootstrapping -> Active -> EditorHandoff -> Active -> ... -> Quitting
//!                     \______________________________________-> Aborted
//! ```
//!
//! A UI context is an owned value whose `Drop` releases the terminal, so
//! every exit path (signal, error, panic unwind) tears it down before the
//! next step runs. At most one context is alive at a time.

use tracing::{debug, info, warn};

use crate::commands::Evaluate;
use crate::config::Settings;
use crate::conflict::Conflict;
use crate::dispatch::{dispatch, Outcome};
use crate::errors::{CoreError, EditorError, UiError};
use crate::presenter::{Presenter, Selection};
use crate::registry::ConflictRegistry;
use crate::tracker::ErrorToleranceTracker;

// ---------------------------------------------------------------------------
// Collaborator seams
// ---------------------------------------------------------------------------

/// What a UI context hands back to the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// A line of input, trailing newline removed.
    Submit(String),
    /// The user asked to leave (Ctrl+C).
    Quit,
}

/// One live instantiation of the interactive display.
///
/// Dropping the context must release the terminal.
pub trait UiContext {
    /// Draw `ctx` and block until the user submits input or quits.
    fn next_event(&mut self, ctx: &SessionContext) -> Result<UiEvent, UiError>;
}

/// Creates UI contexts on demand.
pub trait UiFactory {
    type Context: UiContext;

    fn create(&mut self, ctx: &SessionContext) -> Result<Self::Context, UiError>;
}

/// Runs an external editor on a conflict and returns the edited lines.
pub trait Editor {
    fn open(&mut self, conflict: &Conflict) -> Result<Vec<String>, EditorError>;
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// States of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Bootstrapping,
    Active,
    EditorHandoff,
    Quitting,
    Aborted,
}

/// How the next UI context makes its first selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    /// Show the conflict under the cursor.
    Resume,
    /// Move past the conflict under the cursor if it is now resolved.
    Advance,
}

/// Everything that survives UI teardown.
#[derive(Debug)]
pub struct SessionContext {
    pub registry: ConflictRegistry,
    pub tracker: ErrorToleranceTracker,
    pub presenter: Presenter,
    settings: Settings,
    entry: Entry,
    transitions: Vec<Phase>,
}

impl SessionContext {
    pub fn new(registry: ConflictRegistry, settings: Settings) -> Self {
        Self {
            registry,
            tracker: ErrorToleranceTracker::new(),
            presenter: Presenter::new(&settings),
            settings,
            entry: Entry::Resume,
            transitions: vec![Phase::Bootstrapping],
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn phase(&self) -> Phase {
        self.transitions
            .last()
            .copied()
            .unwrap_or(Phase::Bootstrapping)
    }

    /// Every state entered so far, in order. An applied command counts as
    /// an `Active -> Active` transition.
    pub fn transitions(&self) -> &[Phase] {
        &self.transitions
    }

    fn enter(&mut self, phase: Phase) {
        debug!(from = ?self.phase(), to = ?phase, "session transition");
        self.transitions.push(phase);
    }
}

/// Why a UI scope ended without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeExit {
    EditorRequested,
    Quit,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Drives UI contexts, editor handoffs, and command dispatch.
pub struct SessionLoop<F, E, V> {
    factory: F,
    editor: E,
    evaluator: V,
}

impl<F, E, V> SessionLoop<F, E, V>
where
    F: UiFactory,
    E: Editor,
    V: Evaluate,
{
    pub fn new(factory: F, editor: E, evaluator: V) -> Self {
        Self {
            factory,
            editor,
            evaluator,
        }
    }

    /// Run until the user quits or something fatal happens.
    ///
    /// The registry must not be empty.
    pub fn run(&mut self, ctx: &mut SessionContext) -> Result<(), CoreError> {
        assert!(!ctx.registry.is_empty(), "session started with no conflicts");
        info!(conflicts = ctx.registry.size(), "session started");

        loop {
            let exit = match self.run_scope(ctx) {
                Ok(exit) => exit,
                Err(e) => return Err(Self::abort(ctx, e)),
            };

            match exit {
                ScopeExit::Quit => {
                    ctx.enter(Phase::Quitting);
                    info!("session finished");
                    return Ok(());
                }
                ScopeExit::EditorRequested => {
                    ctx.enter(Phase::EditorHandoff);
                    if let Err(e) = self.hand_off(ctx) {
                        return Err(Self::abort(ctx, e));
                    }
                }
            }
        }
    }

    fn abort(ctx: &mut SessionContext, error: CoreError) -> CoreError {
        warn!(%error, "session aborted");
        ctx.enter(Phase::Aborted);
        error
    }

    /// One UI context from creation to drop.
    fn run_scope(&mut self, ctx: &mut SessionContext) -> Result<ScopeExit, CoreError> {
        let mut ui = self.factory.create(ctx)?;
        ctx.enter(Phase::Active);

        if Self::initial_selection(ctx) == Selection::AllResolved {
            info!("all conflicts resolved");
            return Ok(ScopeExit::Quit);
        }
        ctx.presenter.print_prompt();

        loop {
            let input = match ui.next_event(ctx)? {
                UiEvent::Quit => return Ok(ScopeExit::Quit),
                UiEvent::Submit(input) => input,
            };

            match dispatch(&mut self.evaluator, ctx, &input) {
                Outcome::Applied => ctx.enter(Phase::Active),
                Outcome::UnknownCommand { fallback: false } => {}
                Outcome::UnknownCommand { fallback: true } => {
                    let cursor = ctx.registry.cursor();
                    if ctx.presenter.select(&mut ctx.registry, cursor, true)
                        == Selection::AllResolved
                    {
                        return Ok(ScopeExit::Quit);
                    }
                }
                Outcome::EditorRequested => return Ok(ScopeExit::EditorRequested),
                Outcome::Quit => return Ok(ScopeExit::Quit),
                Outcome::Fatal(e) => return Err(e.into()),
            }
            ctx.presenter.print_prompt();
        }
    }

    fn initial_selection(ctx: &mut SessionContext) -> Selection {
        let cursor = ctx.registry.cursor();
        let entry = std::mem::replace(&mut ctx.entry, Entry::Resume);
        let (registry, presenter) = (&mut ctx.registry, &mut ctx.presenter);
        match entry {
            Entry::Resume => presenter.select(registry, cursor, false),
            Entry::Advance if registry.active().is_resolved() => presenter.advance(registry),
            Entry::Advance => presenter.select(registry, cursor, false),
        }
    }

    /// Run the editor with no UI alive and apply its output.
    fn hand_off(&mut self, ctx: &mut SessionContext) -> Result<(), CoreError> {
        let conflict = ctx.registry.active();
        info!(conflict = %conflict.id(), file = conflict.file_name(), "opening editor");
        let lines = self.editor.open(conflict)?;

        match ctx.registry.active_mut().update(lines) {
            Ok(()) => {
                debug!("edited conflict accepted");
                ctx.entry = Entry::Advance;
            }
            Err(e) => {
                warn!(error = %e, "edited conflict rejected");
                ctx.presenter.set_notice(format!("Edit rejected: {e}"));
                ctx.tracker.record_rejected_edit();
                ctx.entry = Entry::Resume;
            }
        }
        Ok(())
    }
}
