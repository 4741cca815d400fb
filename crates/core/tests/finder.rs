//! Conflict discovery against a real merge conflict built with git2.

use std::path::Path;

use git2::build::CheckoutBuilder;
use git2::{Oid, Repository, Signature};
use tempfile::TempDir;

use fac_core::conflict::finder;

// ===========================================================================
// Helpers
// ===========================================================================

fn commit_workdir_file(repo: &Repository, name: &str, contents: &str, parents: &[Oid]) -> Oid {
    let workdir = repo.workdir().unwrap();
    std::fs::write(workdir.join(name), contents).unwrap();

    let mut index = repo.index().unwrap();
    index.add_path(Path::new(name)).unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();

    let sig = Signature::now("fac", "fac@example.com").unwrap();
    let parents: Vec<_> = parents.iter().map(|p| repo.find_commit(*p).unwrap()).collect();
    let parent_refs: Vec<_> = parents.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, "commit", &tree, &parent_refs)
        .unwrap()
}

/// Commit `contents` for `name` on a side branch without touching the
/// working tree.
fn commit_on_branch(repo: &Repository, branch: &str, name: &str, contents: &str, parent: Oid) -> Oid {
    let parent = repo.find_commit(parent).unwrap();
    let blob = repo.blob(contents.as_bytes()).unwrap();
    let mut builder = repo.treebuilder(Some(&parent.tree().unwrap())).unwrap();
    builder.insert(name, blob, 0o100644).unwrap();
    let tree = repo.find_tree(builder.write().unwrap()).unwrap();

    let sig = Signature::now("fac", "fac@example.com").unwrap();
    repo.commit(
        Some(&format!("refs/heads/{branch}")),
        &sig,
        &sig,
        "feature change",
        &tree,
        &[&parent],
    )
    .unwrap()
}

fn conflicted_repo() -> TempDir {
    let dir = TempDir::new().unwrap();
    let repo = Repository::init(dir.path()).unwrap();

    let base = commit_workdir_file(&repo, "f.txt", "base\n", &[]);
    let feature = commit_on_branch(&repo, "feature", "f.txt", "theirs\n", base);
    commit_workdir_file(&repo, "f.txt", "ours\n", &[base]);

    let annotated = repo.find_annotated_commit(feature).unwrap();
    let mut checkout = CheckoutBuilder::new();
    checkout.force().allow_conflicts(true).conflict_style_merge(true);
    repo.merge(&[&annotated], None, Some(&mut checkout)).unwrap();

    dir
}

// ===========================================================================
// Tests
// ===========================================================================

#[test]
fn test_finds_merge_conflict() {
    let dir = conflicted_repo();

    let files = finder::find(dir.path()).unwrap();
    assert_eq!(files.len(), 1);

    let file = &files[0];
    assert_eq!(file.name(), "f.txt");
    assert_eq!(file.conflicts.len(), 1);
    assert_eq!(file.conflicts[0].local(), ["ours"]);
    assert_eq!(file.conflicts[0].incoming(), ["theirs"]);
}

#[test]
fn test_discovers_from_subdirectory() {
    let dir = conflicted_repo();
    let sub = dir.path().join("nested");
    std::fs::create_dir(&sub).unwrap();

    let files = finder::find(&sub).unwrap();
    assert_eq!(files.len(), 1);
    assert!(files[0].path().ends_with("f.txt"));
}

#[test]
fn test_hand_resolved_file_is_skipped() {
    let dir = conflicted_repo();
    std::fs::write(dir.path().join("f.txt"), "settled\n").unwrap();

    assert!(finder::find(dir.path()).unwrap().is_empty());
}
