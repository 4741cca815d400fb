//! Conflict model, marker parsing, discovery, and write back.
//!
//! The conflict subsystem is responsible for:
//! 1. **Discovery** -- asking the git index which paths are conflicted.
//! 2. **Parsing** -- splitting each file into marker blocks.
//! 3. **Resolution** -- holding the chosen side and writing files back.

pub mod file;
pub mod finder;
pub mod model;
pub mod parser;

pub use file::ConflictFile;
pub use finder::find;
pub use model::{Conflict, ConflictId, Resolution};
