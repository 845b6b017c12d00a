//! `affected-paths` - Show which modules are affected by changed files
//!
//! Loads the config file from the root, applies command-line overrides, runs
//! the analysis and prints the report in the requested format.

use crate::core::analyzer::CoreAnalyzer;
use crate::core::cancel::CancellationToken;
use crate::core::config::{AnalysisOptions, Granularity, PathsConfig};
use crate::core::error::{PathsResult, ResultExt};
use crate::graph::AffectedReport;
use clap::ValueEnum;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Output format for the report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
  /// Per-file listing
  #[default]
  Text,
  /// Machine-readable report
  Json,
  /// One affected address per line
  #[value(name = "names", alias = "names-only")]
  NamesOnly,
}

/// Command-line overrides, applied on top of the config file
#[derive(Debug, Clone, Default)]
pub struct AffectedArgs {
  pub dir: PathBuf,
  pub comparison_commit: Option<String>,
  pub changed_files: Vec<String>,
  pub model: Option<PathBuf>,
  pub model_command: Option<String>,
  pub no_included_builds: bool,
  pub granularity: Option<Granularity>,
  pub format: OutputFormat,
  pub log_build_tool: bool,
  /// Print addresses as Gradle project paths
  pub gradle_paths: bool,
}

impl AffectedArgs {
  /// Merge these overrides into the config found under `dir`
  pub fn into_options(self) -> PathsResult<AnalysisOptions> {
    let config = PathsConfig::load_or_default(&self.dir)?;
    let mut options = AnalysisOptions::from_config(&self.dir, config);

    if let Some(reference) = self.comparison_commit {
      options.comparison_commit = reference;
    }
    if !self.changed_files.is_empty() {
      options.changed_files = split_changed_files(&self.changed_files);
    }
    if self.no_included_builds {
      options.include_included_builds = false;
    }
    if let Some(granularity) = self.granularity {
      options.granularity = granularity;
    }
    if let Some(path) = self.model {
      // An explicit model file wins over any configured command
      options.model.path = Some(absolute_from_cwd(&path)?);
      options.model.command.clear();
    }
    if let Some(command) = &self.model_command {
      options.model.command = command.split_whitespace().map(str::to_string).collect();
    }
    if self.log_build_tool {
      options.model.log_build_tool = true;
    }

    Ok(options)
  }
}

/// Run the affected command
pub fn run_affected(args: AffectedArgs) -> PathsResult<()> {
  let format = args.format;
  let gradle_paths = args.gradle_paths;
  let options = args.into_options()?;
  let granularity = options.granularity;

  let started = Instant::now();
  let result = CoreAnalyzer::new(options).analyze_with(&CancellationToken::new())?;
  info!(
    elapsed_ms = started.elapsed().as_millis() as u64,
    results = result.affected_results.len(),
    "Analysis finished"
  );

  let mut report = result.report(granularity);
  if gradle_paths {
    report = report.into_gradle_paths();
  }
  print!("{}", render(&report, &result.changed_files, format)?);

  Ok(())
}

/// Render a report in the requested format
pub fn render(report: &AffectedReport, changed_files: &[String], format: OutputFormat) -> PathsResult<String> {
  Ok(match format {
    OutputFormat::Text => report.render_text(),
    OutputFormat::Json => {
      let mut json = report.render_json(changed_files).context("Failed to serialize report")?;
      json.push('\n');
      json
    }
    OutputFormat::NamesOnly => report.render_names(),
  })
}

/// `--changed-files` takes either one value per file or a single
/// space-separated list.
fn split_changed_files(values: &[String]) -> Vec<String> {
  values
    .iter()
    .flat_map(|value| value.split_whitespace())
    .map(str::to_string)
    .collect()
}

fn absolute_from_cwd(path: &Path) -> PathsResult<PathBuf> {
  if path.is_absolute() {
    return Ok(path.to_path_buf());
  }
  let cwd = std::env::current_dir().context("Failed to get current directory")?;
  Ok(cwd.join(path))
}
