//! Integration tests for the `affected-paths` binary

use crate::helpers::{TestRepo, app_and_library, run_affected_paths, run_affected_paths_ok};
use anyhow::{Context, Result};

#[test]
fn test_affected_text_output() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write_model(&app_and_library())?;
  repo.write("library/src/main/java/Lib.java", "class Lib { int z; }\n")?;
  repo.commit("Change library")?;

  let output = run_affected_paths_ok(&repo.path, &["--granularity", "module"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert_eq!(
    stdout,
    "Affected modules found.\n\n\
     Changed file: library/src/main/java/Lib.java\n\
     Modules affected by this changed file:\n    - app\n    - library\n\n"
  );
  Ok(())
}

#[test]
fn test_affected_no_changes() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write_model(&app_and_library())?;

  // Initial commit only: nothing to compare against
  let output = run_affected_paths_ok(&repo.path, &[])?;
  assert_eq!(String::from_utf8_lossy(&output.stdout), "No modules affected\n");
  Ok(())
}

#[test]
fn test_affected_json_output() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write_model(&app_and_library())?;
  repo.write("library/src/test/java/LibTest.java", "class LibTest { int t; }\n")?;
  repo.commit("Change library test")?;

  let output = run_affected_paths_ok(&repo.path, &["--format", "json"])?;
  let json: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  assert_eq!(json["granularity"], "target");
  assert_eq!(
    json["files"]["library/src/test/java/LibTest.java"],
    serde_json::json!(["library:debug:unitTest"])
  );
  assert_eq!(json["summary"]["affected_count"], 1);
  Ok(())
}

#[test]
fn test_affected_names_output() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write_model(&app_and_library())?;

  let output = run_affected_paths_ok(
    &repo.path,
    &[
      "--changed-files",
      "library/build.gradle app/build.gradle",
      "--format",
      "names",
      "--granularity",
      "module",
    ],
  )?;

  assert_eq!(String::from_utf8_lossy(&output.stdout), "app\nlibrary\n");
  Ok(())
}

#[test]
fn test_gradle_paths_output() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write_model(&app_and_library())?;
  repo.write("library/build.gradle", "// changed\n")?;
  repo.commit("Change library")?;

  let output = run_affected_paths_ok(&repo.path, &["--gradle-paths", "--granularity", "module"])?;
  assert_eq!(
    String::from_utf8_lossy(&output.stdout),
    "Affected modules found.\n\n\
     Changed file: library/build.gradle\n\
     Modules affected by this changed file:\n    - :app\n    - :library\n\n"
  );

  let output = run_affected_paths_ok(&repo.path, &["--gradle-paths", "--format", "names"])?;
  assert_eq!(
    String::from_utf8_lossy(&output.stdout),
    ":app\n:app:debug:unitTest\n:library\n:library:debug:unitTest\n"
  );
  Ok(())
}

#[test]
fn test_explicit_model_and_dir() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write("exports/graph.json", &serde_json::to_string(&app_and_library())?)?;
  let elsewhere = tempfile::TempDir::new()?;

  let dir = repo.path.to_string_lossy().to_string();
  let model = repo.path.join("exports/graph.json").to_string_lossy().to_string();
  let output = run_affected_paths_ok(
    elsewhere.path(),
    &[
      "--dir",
      &dir,
      "--model",
      &model,
      "--changed-files",
      "app/build.gradle",
      "--format",
      "names",
    ],
  )?;

  assert_eq!(String::from_utf8_lossy(&output.stdout), "app\napp:debug:unitTest\n");
  Ok(())
}

#[test]
fn test_model_command_sees_absolute_root_with_relative_dir() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write("export/graph.json", &serde_json::to_string(&app_and_library())?)?;
  // Leaves the working directory, so a relative root would no longer resolve
  repo.write(
    "export.sh",
    "case \"$AFFECTED_PATHS_GIT_ROOT\" in /*) ;; *) exit 9 ;; esac\n\
     cd / && cat \"$AFFECTED_PATHS_GIT_ROOT/export/graph.json\"\n",
  )?;

  let parent = repo.path.parent().context("repo has no parent")?;
  let name = repo.path.file_name().context("repo has no name")?.to_string_lossy().to_string();
  let output = run_affected_paths_ok(
    parent,
    &[
      "--dir",
      &name,
      "--model-command",
      "sh export.sh",
      "--changed-files",
      "library/build.gradle",
      "--format",
      "names",
      "--granularity",
      "module",
    ],
  )?;

  assert_eq!(String::from_utf8_lossy(&output.stdout), "app\nlibrary\n");
  Ok(())
}

#[test]
fn test_config_file_sets_defaults() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write_model(&app_and_library())?;
  repo.write(
    "affected-paths.toml",
    "[analysis]\ngranularity = \"module\"\nchanged_files = [\"library/build.gradle\"]\n",
  )?;

  let output = run_affected_paths_ok(&repo.path, &["--format", "names"])?;
  assert_eq!(String::from_utf8_lossy(&output.stdout), "app\nlibrary\n");
  Ok(())
}

#[test]
fn test_invalid_dir_exit_code() -> Result<()> {
  let repo = TestRepo::new()?;
  let output = run_affected_paths(&repo.path, &["--dir", "does/not/exist"])?;

  assert_eq!(output.status.code(), Some(3));
  assert!(String::from_utf8_lossy(&output.stderr).contains("Not a valid directory"));
  Ok(())
}

#[test]
fn test_missing_model_exit_code() -> Result<()> {
  let repo = TestRepo::new()?;
  let output = run_affected_paths(&repo.path, &[])?;

  assert_eq!(output.status.code(), Some(3));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("No module graph source"));
  assert!(stderr.contains("help:"));
  Ok(())
}

#[test]
fn test_malformed_model_exit_code() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write(".affected-paths/modules.json", "{ not json")?;

  let output = run_affected_paths(&repo.path, &[])?;
  assert_eq!(output.status.code(), Some(3));
  assert!(String::from_utf8_lossy(&output.stderr).contains("Malformed module graph"));
  Ok(())
}

#[test]
fn test_invalid_format_is_rejected() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write_model(&app_and_library())?;

  // Rejected while parsing arguments, like any other usage error
  let output = run_affected_paths(&repo.path, &["--format", "yaml"])?;
  assert_eq!(output.status.code(), Some(2));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("yaml"));
  assert!(stderr.contains("names"));
  Ok(())
}

#[test]
fn test_invalid_granularity_is_rejected() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write_model(&app_and_library())?;

  let output = run_affected_paths(&repo.path, &["--granularity", "file"])?;
  assert_eq!(output.status.code(), Some(2));
  assert!(output.stdout.is_empty());
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("file"));
  assert!(stderr.contains("module"));
  Ok(())
}

#[test]
fn test_granularity_and_format_aliases() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write_model(&app_and_library())?;

  let output = run_affected_paths_ok(
    &repo.path,
    &[
      "--changed-files",
      "library/build.gradle",
      "--format",
      "names-only",
      "--granularity",
      "modules",
    ],
  )?;
  assert_eq!(String::from_utf8_lossy(&output.stdout), "app\nlibrary\n");
  Ok(())
}

#[test]
fn test_logs_go_to_stderr() -> Result<()> {
  let repo = TestRepo::new()?;
  repo.write_model(&app_and_library())?;

  let output = run_affected_paths_ok(
    &repo.path,
    &["--logging", "debug", "--changed-files", "README.md", "--format", "names"],
  )?;

  assert!(output.stdout.is_empty());
  assert!(String::from_utf8_lossy(&output.stderr).contains("Selected module graph extractor"));
  Ok(())
}
