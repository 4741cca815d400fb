//! fac: fix all conflicts.
//!
//! Finds the conflicted files of the Git repository containing the
//! current directory, walks through every conflict in a terminal UI, and
//! writes the chosen resolutions back.

mod style;
mod tui;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use fac_core::app::{self, RunReport};
use fac_core::summary::Summary;
use fac_core::{CommandEvaluator, Settings, SystemEditor};

use crate::tui::TerminalUiFactory;

/// Environment variable holding the log filter (e.g. `debug`).
const LOG_ENV: &str = "FAC_LOG";

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// Resolve Git merge conflicts one at a time from the terminal.
#[derive(Parser, Debug)]
#[command(name = "fac", version, about = "Fix all conflicts in the current Git repository")]
struct Cli {
    /// Print a commented default settings file and exit.
    #[arg(long)]
    print_config: bool,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    // Held until exit so buffered log lines are flushed.
    let _guard = init_logging();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            println!("{}", style::error(&format!("fac: {e:#}")));
            ExitCode::FAILURE
        }
    }
}

/// Log to `fac.log` in the cache directory when `FAC_LOG` is set. The UI
/// owns the terminal, so nothing is logged to stderr.
fn init_logging() -> Option<WorkerGuard> {
    let filter = std::env::var(LOG_ENV).ok()?;
    let filter = EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new("info"));

    let dir = log_dir();
    std::fs::create_dir_all(&dir).ok()?;
    let appender = tracing_appender::rolling::never(&dir, "fac.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .ok()?;
    Some(guard)
}

fn log_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("fac")
}

fn run(cli: Cli) -> Result<()> {
    if cli.print_config {
        print!("{}", Settings::default_template());
        return Ok(());
    }

    let settings = Settings::load().context("failed to load settings")?;
    let root = std::env::current_dir().context("failed to read the current directory")?;
    tracing::info!(root = %root.display(), "fac starting");

    let editor = SystemEditor::from_settings(&settings);
    let evaluator = CommandEvaluator::new(settings.binding);
    match app::run(&root, settings, TerminalUiFactory, editor, evaluator)? {
        RunReport::NothingToResolve => println!("{}", style::success("No conflicts detected 🎉")),
        RunReport::Completed(summary) => print_summary(&summary),
    }
    Ok(())
}

fn print_summary(summary: &Summary) {
    println!(
        "{}",
        style::header(&format!(
            "Resolved {} of {} conflicts",
            summary.direct() + summary.edited(),
            summary.total()
        ))
    );
    for (label, count) in [
        ("local", summary.local),
        ("incoming", summary.incoming),
        ("both", summary.both),
        ("edited", summary.custom),
    ] {
        if count > 0 {
            println!("  {label:<10} {count}");
        }
    }
    if summary.unresolved > 0 {
        println!(
            "{}",
            style::warn(&format!("{} left unresolved", summary.unresolved))
        );
    }
    for file in &summary.files {
        let line = format!("{} ({}/{})", file.name, file.resolved, file.total);
        if file.resolved == file.total {
            println!("  {}", style::success(&line));
        } else {
            println!("  {}", style::dim(&line));
        }
    }
}
