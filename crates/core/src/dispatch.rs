//! Classifying evaluator results into session outcomes.

use tracing::debug;

use crate::commands::{Evaluate, Evaluation};
use crate::errors::EvalError;
use crate::session::SessionContext;

/// The result of dispatching one line of input.
#[derive(Debug)]
pub enum Outcome {
    /// State changed; the tracker was reset.
    Applied,
    /// The input was not understood. `fallback` is set when the tracker
    /// asks for a forced default resolution.
    UnknownCommand { fallback: bool },
    /// The UI must be torn down so the editor can take the terminal.
    EditorRequested,
    /// The session is over.
    Quit,
    /// The evaluator failed; the session must abort.
    Fatal(EvalError),
}

/// Forward `input` to the evaluator and update the tracker.
///
/// `input` has its trailing newline stripped already. The dispatcher does
/// not interpret command grammar.
pub fn dispatch<V: Evaluate + ?Sized>(
    evaluator: &mut V,
    ctx: &mut SessionContext,
    input: &str,
) -> Outcome {
    let evaluation = evaluator.evaluate(&mut ctx.presenter, &mut ctx.registry, input);
    match evaluation {
        Ok(Evaluation::Applied) => {
            ctx.tracker.record_success();
            ctx.presenter.clear_notice();
            Outcome::Applied
        }
        Ok(Evaluation::UnknownCommand(key)) => {
            let fallback = ctx.tracker.record_unknown();
            debug!(%key, count = ctx.tracker.count(), fallback, "unknown command");
            Outcome::UnknownCommand { fallback }
        }
        Ok(Evaluation::OpenEditor) => Outcome::EditorRequested,
        Ok(Evaluation::Quit) => Outcome::Quit,
        Err(e) => Outcome::Fatal(e),
    }
}
