//! Test helpers for integration tests

use affected_paths::model::{Dependency, Module, TestConfig, VariantConfig};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A git repository laid out like a small multi-module build
pub struct TestRepo {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestRepo {
  /// Empty repository on `main`, no commits yet
  pub fn empty() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;
    git(&path, &["config", "commit.gpgsign", "false"])?;

    Ok(Self { _root: root, path })
  }

  /// Repository with `app` depending on `library`, committed once
  pub fn new() -> Result<Self> {
    let repo = Self::empty()?;

    repo.write("settings.gradle", "include ':app', ':library'\n")?;
    repo.write("app/build.gradle", "dependencies { implementation project(':library') }\n")?;
    repo.write("app/src/main/java/App.java", "class App {}\n")?;
    repo.write("library/build.gradle", "apply plugin: 'java-library'\n")?;
    repo.write("library/src/main/java/Lib.java", "class Lib {}\n")?;
    repo.write("library/src/test/java/LibTest.java", "class LibTest {}\n")?;
    repo.commit("Initial build")?;

    Ok(repo)
  }

  /// Write a file, creating parent directories
  pub fn write(&self, file: &str, content: &str) -> Result<()> {
    let target = self.path.join(file);
    if let Some(parent) = target.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(target, content)?;
    Ok(())
  }

  pub fn remove(&self, file: &str) -> Result<()> {
    git(&self.path, &["rm", "-q", file])?;
    Ok(())
  }

  pub fn rename(&self, from: &str, to: &str) -> Result<()> {
    if let Some(parent) = self.path.join(to).parent() {
      std::fs::create_dir_all(parent)?;
    }
    git(&self.path, &["mv", from, to])?;
    Ok(())
  }

  /// Commit everything, returning the new HEAD SHA
  pub fn commit(&self, message: &str) -> Result<String> {
    git(&self.path, &["add", "-A"])?;
    git(&self.path, &["commit", "-q", "--allow-empty", "-m", message])?;
    self.head()
  }

  pub fn head(&self) -> Result<String> {
    let output = git(&self.path, &["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Export `modules` to the default model location (uncommitted)
  pub fn write_model(&self, modules: &[Module]) -> Result<()> {
    self.write(".affected-paths/modules.json", &serde_json::to_string_pretty(modules)?)
  }
}

/// Module with a `debug` variant rooted at `src/main/java`, a `unitTest` test
/// at `src/test/java`, depending on `deps`
pub fn module(address: &str, deps: &[&str]) -> Module {
  let mut variant = VariantConfig::default()
    .with_source("src/main/java")
    .with_test(
      "unitTest",
      TestConfig::default()
        .with_source("src/test/java")
        .with_dependency(Dependency::new(format!("/{}", address))),
    );
  for dep in deps {
    variant = variant.with_dependency(Dependency::new(format!("/{}", dep)));
  }
  Module::new(address).with_variant("debug", variant)
}

/// `app -> library`, the graph matching [`TestRepo::new`]
pub fn app_and_library() -> Vec<Module> {
  vec![module("app", &["library"]), module("library", &[])]
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run the affected-paths binary, whatever its exit status
pub fn run_affected_paths(cwd: &Path, args: &[&str]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_affected-paths");

  Command::new(bin)
    .current_dir(cwd)
    .args(args)
    .env_remove("AFFECTED_PATHS_LOG")
    .output()
    .context("Failed to run affected-paths")
}

/// Run the affected-paths binary and fail unless it succeeds
pub fn run_affected_paths_ok(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_affected_paths(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "affected-paths failed: affected-paths {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}
