//! Top-level bootstrap: scan, run the session, finalize.

use std::path::Path;

use tracing::info;

use crate::commands::Evaluate;
use crate::config::Settings;
use crate::conflict::finder;
use crate::errors::CoreError;
use crate::registry::ConflictRegistry;
use crate::session::{Editor, SessionContext, SessionLoop, UiFactory};
use crate::summary::{finalize, Summary};

/// How a run ended.
#[derive(Debug)]
pub enum RunReport {
    /// The repository has no conflicted files; no UI was created.
    NothingToResolve,
    /// The session quit and every file was written.
    Completed(Summary),
}

/// Scan the repository containing `root` and resolve its conflicts.
pub fn run<F, E, V>(
    root: &Path,
    settings: Settings,
    factory: F,
    editor: E,
    evaluator: V,
) -> Result<RunReport, CoreError>
where
    F: UiFactory,
    E: Editor,
    V: Evaluate,
{
    let files = finder::find(root)?;
    run_with(ConflictRegistry::new(files), settings, factory, editor, evaluator)
}

/// Run a session over an already populated registry.
pub fn run_with<F, E, V>(
    registry: ConflictRegistry,
    settings: Settings,
    factory: F,
    editor: E,
    evaluator: V,
) -> Result<RunReport, CoreError>
where
    F: UiFactory,
    E: Editor,
    V: Evaluate,
{
    if registry.is_empty() {
        info!("no conflicts detected");
        return Ok(RunReport::NothingToResolve);
    }

    let mut ctx = SessionContext::new(registry, settings);
    SessionLoop::new(factory, editor, evaluator).run(&mut ctx)?;

    Ok(RunReport::Completed(finalize(&ctx.registry)?))
}
