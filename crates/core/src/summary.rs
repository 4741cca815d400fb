//! Writing resolved files back and tallying the session.

use std::fmt;

use tracing::info;

use crate::conflict::Resolution;
use crate::errors::WriteError;
use crate::registry::ConflictRegistry;

/// Per-file resolution progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSummary {
    pub name: String,
    pub resolved: usize,
    pub total: usize,
}

/// Counts of how each conflict ended up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Summary {
    pub local: usize,
    pub incoming: usize,
    pub both: usize,
    pub custom: usize,
    pub unresolved: usize,
    pub files: Vec<FileSummary>,
}

impl Summary {
    pub fn from_registry(registry: &ConflictRegistry) -> Self {
        let mut summary = Summary::default();
        for conflict in registry.iter() {
            match conflict.resolution() {
                Resolution::Local => summary.local += 1,
                Resolution::Incoming => summary.incoming += 1,
                Resolution::Both => summary.both += 1,
                Resolution::Custom => summary.custom += 1,
                Resolution::Unresolved => summary.unresolved += 1,
            }
        }
        summary.files = registry
            .files()
            .iter()
            .map(|f| FileSummary {
                name: f.name().to_owned(),
                resolved: f.conflicts.iter().filter(|c| c.is_resolved()).count(),
                total: f.conflicts.len(),
            })
            .collect();
        summary
    }

    /// Conflicts resolved by picking a side.
    pub fn direct(&self) -> usize {
        self.local + self.incoming + self.both
    }

    /// Conflicts resolved in the editor.
    pub fn edited(&self) -> usize {
        self.custom
    }

    pub fn total(&self) -> usize {
        self.direct() + self.edited() + self.unresolved
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Resolved {} of {} conflicts ({} directly, {} edited)",
            self.direct() + self.edited(),
            self.total(),
            self.direct(),
            self.edited()
        )?;
        for (label, count) in [
            ("local", self.local),
            ("incoming", self.incoming),
            ("both", self.both),
            ("edited", self.custom),
            ("unresolved", self.unresolved),
        ] {
            if count > 0 {
                writeln!(f, "  {label:<10} {count}")?;
            }
        }
        for file in &self.files {
            writeln!(f, "  {} ({}/{})", file.name, file.resolved, file.total)?;
        }
        Ok(())
    }
}

/// Write every file in discovery order and summarize.
///
/// Stops at the first failed write; files before it stay written.
pub fn finalize(registry: &ConflictRegistry) -> Result<Summary, WriteError> {
    for file in registry.files() {
        file.write_changes()?;
    }
    let summary = Summary::from_registry(registry);
    info!(
        direct = summary.direct(),
        edited = summary.edited(),
        unresolved = summary.unresolved,
        "session summary"
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conflict::ConflictFile;

    fn registry() -> ConflictRegistry {
        let text = "<<<<<<< a\n1\n=======\n2\n>>>>>>> b\n<<<<<<< a\n3\n=======\n4\n>>>>>>> b\n";
        let other = "<<<<<<< a\nx\n=======\ny\n>>>>>>> b\n";
        ConflictRegistry::new(vec![
            ConflictFile::parse(0, "/r/one", "one", text).unwrap(),
            ConflictFile::parse(1, "/r/two", "two", other).unwrap(),
        ])
    }

    #[test]
    fn test_counts_by_kind() {
        let mut reg = registry();
        reg.at_mut(0).resolve(Resolution::Local);
        reg.at_mut(2).resolve(Resolution::Both);

        let summary = Summary::from_registry(&reg);
        assert_eq!(summary.direct(), 2);
        assert_eq!(summary.edited(), 0);
        assert_eq!(summary.unresolved, 1);
        assert_eq!(
            summary.files[0],
            FileSummary {
                name: "one".into(),
                resolved: 1,
                total: 2
            }
        );
    }

    #[test]
    fn test_display_lists_files() {
        let text = Summary::from_registry(&registry()).to_string();
        assert!(text.starts_with("Resolved 0 of 3 conflicts"));
        assert!(text.contains("  unresolved 3"));
        assert!(text.contains("  two (0/1)"));
    }

    #[test]
    fn test_finalize_writes_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        let text = "<<<<<<< a\nmine\n=======\nyours\n>>>>>>> b\n";
        std::fs::write(&path, text).unwrap();

        let mut reg =
            ConflictRegistry::new(vec![ConflictFile::parse(0, &path, "f.txt", text).unwrap()]);
        reg.at_mut(0).resolve(Resolution::Incoming);

        let summary = finalize(&reg).unwrap();
        assert_eq!(summary.incoming, 1);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "yours\n");
    }
}
