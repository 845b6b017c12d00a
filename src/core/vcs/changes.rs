//! Changed-file detection between a comparison commit and HEAD

use super::{DiffEntry, SystemGit};
use crate::core::error::PathsResult;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info, warn};

/// Resolves the set of files changed between a comparison commit and HEAD.
pub struct ChangeSetResolver {
  git: SystemGit,
  comparison_commit: String,
}

impl ChangeSetResolver {
  /// Open the repository at `root`.
  ///
  /// An empty `comparison_commit` means "diff against the previous commit".
  pub fn new(root: &Path, comparison_commit: impl Into<String>) -> PathsResult<Self> {
    Ok(Self {
      git: SystemGit::open(root)?,
      comparison_commit: comparison_commit.into(),
    })
  }

  /// The commit HEAD is compared against, falling back to HEAD itself when
  /// the configured reference does not resolve.
  pub fn comparison_commit(&self, head: &str) -> PathsResult<String> {
    match self.git.resolve_commit(&self.comparison_commit)? {
      Some(sha) => Ok(sha),
      None => {
        if !self.comparison_commit.trim().is_empty() {
          warn!(
            reference = %self.comparison_commit,
            "Comparison commit not found, falling back to the previous commit"
          );
        }
        Ok(head.to_string())
      }
    }
  }

  /// Repo-relative paths changed between the comparison commit and HEAD.
  ///
  /// Renames contribute both the old and new path. The list is deduplicated
  /// and keeps first-occurrence order.
  pub fn find_changed_files(&self) -> PathsResult<Vec<String>> {
    let head = self.git.head_commit()?;
    let mut comparison = self.comparison_commit(&head)?;

    if comparison == head {
      match self.git.parent_commit(&head)? {
        Some(parent) => comparison = parent,
        None => {
          warn!(head = %head, "HEAD has no parent commit, nothing to compare against");
          return Ok(Vec::new());
        }
      }
    }

    info!(head = %head, comparison = %comparison, "Comparing commits");
    if tracing::enabled!(tracing::Level::DEBUG) {
      debug!(branch = %self.git.current_branch()?, "Current branch");
      debug!(labels = ?self.git.branch_labels(&comparison), "Comparison branch labels");
    }

    let changed = changed_paths(&self.git.diff(&comparison, &head)?);
    debug!(count = changed.len(), "Changed files");
    Ok(changed)
  }
}

/// Every path touched by `entries`, old before new for renames,
/// each listed once at its first occurrence.
pub fn changed_paths(entries: &[DiffEntry]) -> Vec<String> {
  let mut seen = HashSet::new();
  let mut changed = Vec::new();
  for path in entries.iter().flat_map(DiffEntry::changed_paths) {
    if seen.insert(path) {
      changed.push(path.to_string());
    }
  }
  changed
}
