//! Locating conflicted files via the git index.

use std::path::Path;

use git2::Repository;
use tracing::{debug, info, warn};

use super::file::ConflictFile;
use crate::errors::ScanError;

/// Find every conflicted file in the repository containing `root`.
///
/// Paths come from the index's conflict entries in index order. Files
/// that are gone from the working tree, are not UTF-8, or no longer
/// contain markers are skipped.
pub fn find(root: &Path) -> Result<Vec<ConflictFile>, ScanError> {
    let repo = Repository::discover(root)
        .map_err(|_| ScanError::RepositoryNotFound(root.display().to_string()))?;
    let workdir = repo
        .workdir()
        .ok_or_else(|| ScanError::BareRepository(repo.path().display().to_string()))?
        .to_path_buf();
    info!(workdir = %workdir.display(), "scanning for conflicts");

    let paths = conflicted_paths(&repo)?;
    debug!(count = paths.len(), "conflicted paths in index");

    let mut files = Vec::new();
    for name in paths {
        let path = workdir.join(&name);
        match ConflictFile::read(files.len(), &path, &name)? {
            Some(file) if !file.conflicts.is_empty() => {
                debug!(path = %name, conflicts = file.conflicts.len(), "conflicted file");
                files.push(file);
            }
            Some(_) => debug!(path = %name, "no conflict markers left"),
            None => warn!(path = %name, "skipping missing or non-text file"),
        }
    }

    info!(
        files = files.len(),
        conflicts = files.iter().map(|f| f.conflicts.len()).sum::<usize>(),
        "conflict scan complete"
    );
    Ok(files)
}

fn conflicted_paths(repo: &Repository) -> Result<Vec<String>, ScanError> {
    let index = repo.index()?;
    let mut paths: Vec<String> = Vec::new();
    for conflict in index.conflicts()? {
        let conflict = conflict?;
        let Some(entry) = conflict.our.or(conflict.their).or(conflict.ancestor) else {
            continue;
        };
        let name = String::from_utf8_lossy(&entry.path).into_owned();
        if !paths.contains(&name) {
            paths.push(name);
        }
    }
    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_a_repository() {
        let dir = tempfile::tempdir().unwrap();
        let result = find(dir.path());
        assert!(matches!(result, Err(ScanError::RepositoryNotFound(_))));
    }

    #[test]
    fn test_clean_repository_has_no_conflicts() {
        let dir = tempfile::tempdir().unwrap();
        Repository::init(dir.path()).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "<<<<<<< not staged\n").unwrap();

        assert!(find(dir.path()).unwrap().is_empty());
    }

    #[test]
    fn test_bare_repository() {
        let dir = tempfile::tempdir().unwrap();
        Repository::init_bare(dir.path()).unwrap();
        assert!(matches!(
            find(dir.path()),
            Err(ScanError::BareRepository(_))
        ));
    }
}
