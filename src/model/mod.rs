//! Module graph records consumed by the analysis
//!
//! The graph is produced outside this crate (by a build-tool specific
//! exporter) and read here as JSON. Records are immutable once loaded.

pub mod extractor;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Prefix marking a dependency on another module of the build
pub const MODULE_PREFIX: char = '/';

/// A buildable unit identified by its repo-relative address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
  /// Unique repo-relative path, e.g. `library/foobar`
  #[serde(alias = "pathToProject")]
  pub address: String,

  #[serde(default)]
  pub name: String,

  #[serde(default)]
  pub namespace: String,

  /// Build plugin that configured the module (java, android-library, ...)
  #[serde(default, alias = "pluginUsed")]
  pub plugin: String,

  /// Module comes from a nested/included build
  #[serde(default, alias = "includedBuild")]
  pub included_build: bool,

  #[serde(default)]
  pub variants: BTreeMap<String, VariantConfig>,
}

/// A named build configuration of a module (debug, release, main, ...)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantConfig {
  #[serde(default, alias = "srcs")]
  pub sources: BTreeSet<String>,

  #[serde(default, alias = "deps")]
  pub dependencies: BTreeSet<Dependency>,

  #[serde(default)]
  pub tests: BTreeMap<String, TestConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestConfig {
  #[serde(default, alias = "srcs")]
  pub sources: BTreeSet<String>,

  #[serde(default, alias = "deps")]
  pub dependencies: BTreeSet<Dependency>,
}

/// What a variant or test depends on.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Dependency {
  /// `/path/to/module` or `@maven://group:artifact`
  pub target: String,

  #[serde(default)]
  pub tags: BTreeSet<String>,
}

impl Dependency {
  pub fn new(target: impl Into<String>) -> Self {
    Self {
      target: target.into(),
      tags: BTreeSet::new(),
    }
  }

  /// Normalized address of the module this points at, `None` for external packages
  pub fn module_address(&self) -> Option<&str> {
    if self.target.starts_with(MODULE_PREFIX) {
      Some(self.target.trim_matches(MODULE_PREFIX))
    } else {
      None
    }
  }
}

impl Module {
  pub fn new(address: impl Into<String>) -> Self {
    let address = address.into();
    let name = address.rsplit('/').next().unwrap_or_default().to_string();
    Self {
      address,
      name,
      namespace: String::new(),
      plugin: String::new(),
      included_build: false,
      variants: BTreeMap::new(),
    }
  }

  pub fn with_variant(mut self, name: impl Into<String>, variant: VariantConfig) -> Self {
    self.variants.insert(name.into(), variant);
    self
  }

  /// Composite address of a test target: `module:variant:test`
  pub fn test_address(&self, variant: &str, test: &str) -> String {
    test_address(&self.address, variant, test)
  }
}

impl VariantConfig {
  pub fn with_source(mut self, source: impl Into<String>) -> Self {
    self.sources.insert(source.into());
    self
  }

  pub fn with_dependency(mut self, dependency: Dependency) -> Self {
    self.dependencies.insert(dependency);
    self
  }

  pub fn with_test(mut self, name: impl Into<String>, test: TestConfig) -> Self {
    self.tests.insert(name.into(), test);
    self
  }
}

impl TestConfig {
  pub fn with_source(mut self, source: impl Into<String>) -> Self {
    self.sources.insert(source.into());
    self
  }

  pub fn with_dependency(mut self, dependency: Dependency) -> Self {
    self.dependencies.insert(dependency);
    self
  }
}

/// `module:variant:test`
pub fn test_address(module: &str, variant: &str, test: &str) -> String {
  format!("{}:{}:{}", module, variant, test)
}

/// Module part of an address (`library:debug:unitTest` -> `library`)
pub fn module_of(address: &str) -> &str {
  address.split_once(':').map(|(module, _)| module).unwrap_or(address)
}

/// Gradle project path for an address (`library/foobar` -> `:library:foobar`)
pub fn gradle_path(address: &str) -> String {
  format!(":{}", address.replace('/', ":"))
}

/// Parse a JSON module list, normalizing addresses like dependency targets
pub fn parse_modules(json: &str) -> serde_json::Result<Vec<Module>> {
  let mut modules: Vec<Module> = serde_json::from_str(json)?;
  for module in &mut modules {
    if module.address.starts_with(MODULE_PREFIX) || module.address.ends_with(MODULE_PREFIX) {
      module.address = module.address.trim_matches(MODULE_PREFIX).to_string();
    }
  }
  Ok(modules)
}
