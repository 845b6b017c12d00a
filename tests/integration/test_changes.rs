//! Integration tests for changed-file detection against real git history

use crate::helpers::{TestRepo, git};
use affected_paths::core::error::{GitError, InputError, PathsError};
use affected_paths::core::vcs::ChangeSetResolver;
use anyhow::Result;

fn changed(repo: &TestRepo, comparison: &str) -> Result<Vec<String>> {
  Ok(ChangeSetResolver::new(&repo.path, comparison)?.find_changed_files()?)
}

#[test]
fn test_modified_file_against_previous_commit() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write("library/src/main/java/Lib.java", "class Lib { int x; }\n")?;
  repo.commit("Touch library")?;

  assert_eq!(changed(&repo, "")?, vec!["library/src/main/java/Lib.java"]);
  Ok(())
}

#[test]
fn test_added_and_deleted_files() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write("app/src/main/java/Extra.java", "class Extra {}\n")?;
  repo.remove("library/src/test/java/LibTest.java")?;
  repo.commit("Add and delete")?;

  let mut files = changed(&repo, "")?;
  files.sort();
  assert_eq!(
    files,
    vec!["app/src/main/java/Extra.java", "library/src/test/java/LibTest.java"]
  );
  Ok(())
}

#[test]
fn test_rename_reports_both_paths() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write(
    "library/src/main/java/Big.java",
    "class Big {\n  int a;\n  int b;\n  int c;\n  int d;\n  int e;\n}\n",
  )?;
  repo.commit("Add Big")?;

  repo.rename("library/src/main/java/Big.java", "app/src/main/java/Big.java")?;
  repo.commit("Move Big to app")?;

  // Old path first, then the new one
  assert_eq!(
    changed(&repo, "")?,
    vec!["library/src/main/java/Big.java", "app/src/main/java/Big.java"]
  );
  Ok(())
}

#[test]
fn test_explicit_comparison_spans_commits() -> Result<()> {
  let repo = TestRepo::new()?;
  git(&repo.path, &["branch", "baseline"])?;

  repo.write("app/build.gradle", "// one\n")?;
  repo.commit("First")?;
  repo.write("library/build.gradle", "// two\n")?;
  repo.commit("Second")?;

  let mut files = changed(&repo, "baseline")?;
  files.sort();
  assert_eq!(files, vec!["app/build.gradle", "library/build.gradle"]);

  // Without a comparison only the last commit counts
  assert_eq!(changed(&repo, "")?, vec!["library/build.gradle"]);
  Ok(())
}

#[test]
fn test_unresolvable_comparison_falls_back_to_previous_commit() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write("app/build.gradle", "// changed\n")?;
  repo.commit("Change app")?;

  assert_eq!(changed(&repo, "no-such-branch")?, vec!["app/build.gradle"]);
  Ok(())
}

#[test]
fn test_comparison_equal_to_head_uses_parent() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write("app/build.gradle", "// changed\n")?;
  let head = repo.commit("Change app")?;

  assert_eq!(changed(&repo, &head)?, vec!["app/build.gradle"]);
  Ok(())
}

#[test]
fn test_initial_commit_has_no_changes() -> Result<()> {
  let repo = TestRepo::new()?;
  assert!(changed(&repo, "")?.is_empty());
  Ok(())
}

#[test]
fn test_repository_without_commits() -> Result<()> {
  let repo = TestRepo::empty()?;
  let err = ChangeSetResolver::new(&repo.path, "")?.find_changed_files().unwrap_err();

  assert!(matches!(err, PathsError::GitAccess(GitError::UnresolvableHead { .. })));
  Ok(())
}

#[test]
fn test_not_a_repository() -> Result<()> {
  let dir = tempfile::TempDir::new()?;
  let result = ChangeSetResolver::new(dir.path(), "");

  assert!(matches!(
    result,
    Err(PathsError::Input(InputError::RepositoryNotFound { .. }))
  ));
  Ok(())
}

#[test]
fn test_paths_with_spaces_and_unicode() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write("library/docs/read me.md", "x\n")?;
  repo.write("library/docs/straße.md", "y\n")?;
  repo.commit("Docs")?;

  let mut files = changed(&repo, "")?;
  files.sort();
  assert_eq!(files, vec!["library/docs/read me.md", "library/docs/straße.md"]);
  Ok(())
}

#[test]
fn test_file_changed_twice_is_listed_once() -> Result<()> {
  let repo = TestRepo::new()?;
  git(&repo.path, &["branch", "baseline"])?;

  repo.write("app/build.gradle", "// a\n")?;
  repo.commit("Edit")?;
  repo.write("app/build.gradle", "// b\n")?;
  repo.commit("Edit again")?;

  assert_eq!(changed(&repo, "baseline")?, vec!["app/build.gradle"]);
  Ok(())
}
