pub mod changes;
pub mod system_git;

pub use changes::ChangeSetResolver;
pub use system_git::SystemGit;

use crate::core::error::{GitError, PathsResult};

/// How a path changed between two trees
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
  Added,
  Copied,
  Modified,
  Renamed,
  Deleted,
}

impl ChangeKind {
  /// Parse a `--name-status` letter (`M`, `R100`, `C075`, ...)
  fn from_status(status: &str) -> Option<Self> {
    match status.chars().next()? {
      'A' => Some(ChangeKind::Added),
      'C' => Some(ChangeKind::Copied),
      // Type changes (file <-> symlink) are content changes for our purposes
      'M' | 'T' => Some(ChangeKind::Modified),
      'R' => Some(ChangeKind::Renamed),
      'D' => Some(ChangeKind::Deleted),
      _ => None,
    }
  }
}

/// One entry of a tree diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffEntry {
  pub kind: ChangeKind,
  pub old_path: String,
  pub new_path: String,
}

impl DiffEntry {
  /// Paths this entry contributes to a change set.
  ///
  /// Renames contribute both sides; deletions the old path; everything else the new path.
  pub fn changed_paths(&self) -> Vec<&str> {
    match self.kind {
      ChangeKind::Added | ChangeKind::Copied | ChangeKind::Modified => vec![&self.new_path],
      ChangeKind::Renamed => vec![&self.old_path, &self.new_path],
      ChangeKind::Deleted => vec![&self.old_path],
    }
  }
}

/// Parse `git diff --name-status -z` output.
///
/// Records are NUL separated: `<status>\0<path>\0`, or
/// `<status>\0<old>\0<new>\0` for renames and copies.
pub fn parse_name_status(raw: &[u8]) -> PathsResult<Vec<DiffEntry>> {
  let text = String::from_utf8_lossy(raw);
  let mut fields = text.split('\0').filter(|f| !f.is_empty());
  let mut entries = Vec::new();

  while let Some(status) = fields.next() {
    let kind = ChangeKind::from_status(status).ok_or_else(|| GitError::MalformedDiff {
      record: status.to_string(),
    })?;

    let mut next_path = || {
      fields.next().map(str::to_string).ok_or_else(|| GitError::MalformedDiff {
        record: format!("{} (missing path)", status),
      })
    };

    let entry = match kind {
      ChangeKind::Renamed | ChangeKind::Copied => {
        let old_path = next_path()?;
        let new_path = next_path()?;
        DiffEntry {
          kind,
          old_path,
          new_path,
        }
      }
      _ => {
        let path = next_path()?;
        DiffEntry {
          kind,
          old_path: path.clone(),
          new_path: path,
        }
      }
    };
    entries.push(entry);
  }

  Ok(entries)
}
