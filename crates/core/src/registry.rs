//! Ordered conflict handles plus the active-conflict cursor.

use crate::conflict::{Conflict, ConflictFile, ConflictId};

/// All conflicts of the session in discovery order.
///
/// The registry owns the files; handles address conflicts inside them.
/// While a session is active the cursor is always a valid index.
#[derive(Debug, Default)]
pub struct ConflictRegistry {
    files: Vec<ConflictFile>,
    handles: Vec<ConflictId>,
    cursor: usize,
}

impl ConflictRegistry {
    pub fn new(files: Vec<ConflictFile>) -> Self {
        let handles = files
            .iter()
            .enumerate()
            .flat_map(|(file, f)| {
                (0..f.conflicts.len()).map(move |ordinal| ConflictId { file, ordinal })
            })
            .collect();
        Self {
            files,
            handles,
            cursor: 0,
        }
    }

    pub fn size(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// # Panics
    ///
    /// Panics if `index >= self.size()`.
    pub fn at(&self, index: usize) -> &Conflict {
        let id = self.handles[index];
        &self.files[id.file].conflicts[id.ordinal]
    }

    /// # Panics
    ///
    /// Panics if `index >= self.size()`.
    pub fn at_mut(&mut self, index: usize) -> &mut Conflict {
        let id = self.handles[index];
        &mut self.files[id.file].conflicts[id.ordinal]
    }

    /// The conflict under the cursor.
    pub fn active(&self) -> &Conflict {
        self.at(self.cursor)
    }

    pub fn active_mut(&mut self) -> &mut Conflict {
        self.at_mut(self.cursor)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The file owning the conflict at `index`.
    pub fn file_of(&self, index: usize) -> &ConflictFile {
        &self.files[self.handles[index].file]
    }

    pub fn files(&self) -> &[ConflictFile] {
        &self.files
    }

    pub fn iter(&self) -> impl Iterator<Item = &Conflict> {
        self.handles
            .iter()
            .map(|id| &self.files[id.file].conflicts[id.ordinal])
    }

    /// Index of the first unresolved conflict after `from`, wrapping around
    /// and ending with `from` itself.
    pub fn next_unresolved(&self, from: usize) -> Option<usize> {
        let n = self.size();
        (1..=n)
            .map(|step| (from + step) % n)
            .find(|&i| !self.at(i).is_resolved())
    }

    pub fn all_resolved(&self) -> bool {
        self.iter().all(Conflict::is_resolved)
    }

    /// Move the cursor. Only the presenter's selection calls this.
    pub(crate) fn set_cursor(&mut self, index: usize) {
        assert!(index < self.size(), "cursor {index} out of range");
        self.cursor = index;
    }
}
