//! System git backend
//!
//! Every query is a single plumbing call run with an isolated environment, so
//! user config (pagers, external diff drivers, quoting) cannot leak into the
//! output we parse.

use super::{DiffEntry, parse_name_status};
use crate::core::error::{GitError, InputError, PathsError, PathsResult};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Git backend using the system `git` binary
pub struct SystemGit {
  /// Directory the analysis runs in (may be below the work tree root)
  pub(crate) repo_path: PathBuf,
}

impl SystemGit {
  /// Open the repository containing `path`
  pub fn open(path: &Path) -> PathsResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .map_err(|e| GitError::CommandFailed {
        command: "git rev-parse --show-toplevel".to_string(),
        stderr: e.to_string(),
      })?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("not a git repository") {
        return Err(PathsError::Input(InputError::RepositoryNotFound {
          path: path.to_path_buf(),
        }));
      }
      return Err(PathsError::GitAccess(GitError::CommandFailed {
        command: "git rev-parse --show-toplevel".to_string(),
        stderr: stderr.to_string(),
      }));
    }

    Ok(Self {
      repo_path: path.to_path_buf(),
    })
  }

  /// Full SHA of the commit HEAD points at
  pub fn head_commit(&self) -> PathsResult<String> {
    let output = self.run(&["rev-parse", "--verify", "HEAD^{commit}"])?;

    if !output.status.success() {
      return Err(PathsError::GitAccess(GitError::UnresolvableHead {
        stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      }));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Current branch name, `HEAD` when detached
  pub fn current_branch(&self) -> PathsResult<String> {
    let output = self.run(&["rev-parse", "--abbrev-ref", "HEAD"])?;

    if !output.status.success() {
      return Ok("HEAD".to_string());
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Resolve a revision expression to a commit SHA.
  ///
  /// Returns `None` for empty references and for anything git cannot resolve
  /// to a commit. Only a failure to run git at all is an error.
  pub fn resolve_commit(&self, reference: &str) -> PathsResult<Option<String>> {
    let reference = reference.trim();
    if reference.is_empty() || reference.starts_with('-') {
      return Ok(None);
    }

    let spec = format!("{}^{{commit}}", reference);
    let output = self.run(&["rev-parse", "--verify", "--quiet", &spec])?;

    if !output.status.success() {
      return Ok(None);
    }

    let sha = String::from_utf8_lossy(&output.stdout).trim().to_string();
    Ok(if sha.is_empty() { None } else { Some(sha) })
  }

  /// First parent of `commit`, `None` for a root commit
  pub fn parent_commit(&self, commit: &str) -> PathsResult<Option<String>> {
    self.resolve_commit(&format!("{}^1", commit))
  }

  /// Local branch names that point exactly at `commit`
  ///
  /// Only used for log output, so failures degrade to an empty list.
  pub fn branch_labels(&self, commit: &str) -> Vec<String> {
    let output = match self.run(&["name-rev", "--name-only", "--refs=refs/heads/*", commit]) {
      Ok(output) if output.status.success() => output,
      _ => return Vec::new(),
    };

    String::from_utf8_lossy(&output.stdout)
      .lines()
      .map(str::trim)
      .filter(|name| !name.is_empty() && *name != "undefined")
      .filter(|name| !name.contains('~') && !name.contains('^'))
      .map(str::to_string)
      .collect()
  }

  /// Tree diff between two commits with rename and copy detection
  pub fn diff(&self, old: &str, new: &str) -> PathsResult<Vec<DiffEntry>> {
    let args = [
      "diff",
      "--name-status",
      "-z",
      "--no-ext-diff",
      "--no-color",
      "--relative",
      "--find-renames",
      "--find-copies",
      old,
      new,
    ];
    let output = self.run(&args)?;

    if !output.status.success() {
      return Err(PathsError::GitAccess(GitError::CommandFailed {
        command: format!("git {}", args.join(" ")),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
      }));
    }

    parse_name_status(&output.stdout)
  }

  fn run(&self, args: &[&str]) -> PathsResult<Output> {
    self.git_cmd().args(args).output().map_err(|e| {
      PathsError::GitAccess(GitError::CommandFailed {
        command: format!("git {}", args.join(" ")),
        stderr: e.to_string(),
      })
    })
  }

  /// Create a git command with an isolated environment
  ///
  /// - Sets working directory to repo path
  /// - Clears environment variables
  /// - Whitelists only PATH and HOME
  /// - Adds config overrides for stable, parseable output
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(&self.repo_path);

    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    cmd.arg("-c").arg("core.quotePath=false");
    cmd.arg("-c").arg("diff.renames=true");
    cmd.arg("-c").arg("diff.renameLimit=0");

    cmd
  }
}
