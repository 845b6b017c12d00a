//! Configuration for affected-paths
//!
//! Values come from an optional TOML file at the repository root and are then
//! overridden by command-line flags. The resolved [`AnalysisOptions`] is what
//! the analyzer consumes.

use crate::core::error::{InputError, PathsResult};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default location of an exported module graph, relative to the root
pub const DEFAULT_MODEL_PATH: &str = ".affected-paths/modules.json";

/// Configuration file contents.
///
/// Searched in order: affected-paths.toml, .affected-paths.toml, .config/affected-paths.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathsConfig {
  #[serde(default)]
  pub analysis: AnalysisConfig,
  #[serde(default)]
  pub model: ModelConfig,
}

/// `[analysis]` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
  /// Commit to diff against HEAD (empty = previous commit)
  #[serde(default)]
  pub comparison_commit: String,

  /// Explicit change set; bypasses git when non-empty
  #[serde(default)]
  pub changed_files: Vec<String>,

  /// Keep modules coming from included builds
  #[serde(default = "default_true")]
  pub include_included_builds: bool,

  #[serde(default)]
  pub granularity: Granularity,
}

impl Default for AnalysisConfig {
  fn default() -> Self {
    Self {
      comparison_commit: String::new(),
      changed_files: Vec::new(),
      include_included_builds: true,
      granularity: Granularity::default(),
    }
  }
}

fn default_true() -> bool {
  true
}

/// `[model]` table: where the module graph comes from
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelConfig {
  /// Exported JSON model, relative to the root (default: .affected-paths/modules.json)
  #[serde(default)]
  pub path: Option<PathBuf>,

  /// Command printing the JSON model on stdout
  #[serde(default)]
  pub command: Vec<String>,

  /// Pass the model command's stderr through to ours
  #[serde(default)]
  pub log_build_tool: bool,
}

/// Address granularity of the rendered report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
  /// Fold `module:variant:test` addresses into their module
  #[serde(alias = "modules")]
  #[value(alias = "modules")]
  Module,
  /// Keep addresses exactly as computed
  #[default]
  #[serde(alias = "targets")]
  #[value(alias = "targets")]
  Target,
}

impl PathsConfig {
  /// Find config file in search order
  pub fn find_config_path(root: &Path) -> Option<PathBuf> {
    let candidates = vec![
      root.join("affected-paths.toml"),
      root.join(".affected-paths.toml"),
      root.join(".config").join("affected-paths.toml"),
    ];

    candidates.into_iter().find(|p| p.is_file())
  }

  /// Load the config file, or defaults when none exists
  pub fn load_or_default(root: &Path) -> PathsResult<Self> {
    match Self::find_config_path(root) {
      Some(path) => Self::load_from(&path),
      None => Ok(Self::default()),
    }
  }

  pub fn load_from(path: &Path) -> PathsResult<Self> {
    let content = fs::read_to_string(path).map_err(|e| InputError::InvalidConfig {
      path: path.to_path_buf(),
      reason: e.to_string(),
    })?;
    Self::parse(&content).map_err(|reason| {
      InputError::InvalidConfig {
        path: path.to_path_buf(),
        reason,
      }
      .into()
    })
  }

  fn parse(content: &str) -> Result<Self, String> {
    toml_edit::de::from_str(content).map_err(|e| e.to_string())
  }
}

/// Fully resolved options for one analysis run
#[derive(Debug, Clone)]
pub struct AnalysisOptions {
  /// Repository / build root
  pub root: PathBuf,
  pub comparison_commit: String,
  pub changed_files: Vec<String>,
  pub include_included_builds: bool,
  pub granularity: Granularity,
  pub model: ModelConfig,
}

impl AnalysisOptions {
  /// Options with every value at its default
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self::from_config(root, PathsConfig::default())
  }

  pub fn from_config(root: impl Into<PathBuf>, config: PathsConfig) -> Self {
    Self {
      root: root.into(),
      comparison_commit: config.analysis.comparison_commit,
      changed_files: config.analysis.changed_files,
      include_included_builds: config.analysis.include_included_builds,
      granularity: config.analysis.granularity,
      model: config.model,
    }
  }

  /// Reject a root that is not a directory
  pub fn validate(&self) -> PathsResult<()> {
    if !self.root.is_dir() {
      return Err(InputError::InvalidDirectory { path: self.root.clone() }.into());
    }
    Ok(())
  }

  /// Absolute location of the exported model file
  pub fn model_path(&self) -> PathBuf {
    let relative = self
      .model
      .path
      .clone()
      .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_PATH));
    self.root.join(relative)
  }
}
