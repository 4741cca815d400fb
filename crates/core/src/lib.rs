//! fac core library.
//!
//! This crate holds everything behind the `fac` binary except the
//! terminal: settings, the conflict model and marker parser, git index
//! scanning, the session controller with its UI and editor seams, and
//! the final write back.

pub mod app;
pub mod commands;
pub mod config;
pub mod conflict;
pub mod dispatch;
pub mod editor;
pub mod errors;
pub mod presenter;
pub mod registry;
pub mod session;
pub mod summary;
pub mod tracker;

// Re-exports for convenience.
pub use app::RunReport;
pub use commands::CommandEvaluator;
pub use config::Settings;
pub use editor::SystemEditor;
pub use registry::ConflictRegistry;
pub use session::{SessionContext, SessionLoop};
pub use summary::Summary;
