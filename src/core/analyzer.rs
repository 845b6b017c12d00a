//! Analysis orchestration
//!
//! ```text
//!   changed files (git) ──┐                 ┌── reverse index ──┐
//!                         ├─ join ─ filter ─┤                   ├─ join ─ impact ─ report
//!   module graph ─────────┘                 └── ownership ──────┘
//! ```
//!
//! Both forks are `rayon::join` pairs. Git work is local and runs to
//! completion; the module graph extractor observes the cancellation token.

use crate::core::cancel::CancellationToken;
use crate::core::config::{AnalysisOptions, Granularity};
use crate::core::error::PathsResult;
use crate::core::vcs::ChangeSetResolver;
use crate::graph::affected::find_affected;
use crate::graph::ownership::resolve_owners;
use crate::graph::{AffectedReport, AffectedResult, ReverseDependencyIndex};
use crate::model::Module;
use crate::model::extractor::select_extractor;
use std::collections::{BTreeMap, HashSet};
use std::time::Instant;
use tracing::{debug, info, warn};

/// Everything one analysis run produced
#[derive(Debug, Clone)]
pub struct AnalysisResult {
  /// Changed files in first-occurrence order
  pub changed_files: Vec<String>,
  /// Modules considered by the run, keyed by address
  pub module_map: BTreeMap<String, Module>,
  /// One entry per owned changed file and variant of its module, unordered
  pub affected_results: Vec<AffectedResult>,
}

impl AnalysisResult {
  pub fn report(&self, granularity: Granularity) -> AffectedReport {
    AffectedReport::from_results(&self.affected_results, granularity)
  }
}

/// Runs change detection, graph acquisition and impact resolution
pub struct CoreAnalyzer {
  options: AnalysisOptions,
  modules: Option<Vec<Module>>,
}

impl CoreAnalyzer {
  pub fn new(options: AnalysisOptions) -> Self {
    Self { options, modules: None }
  }

  /// Use a caller-supplied module list instead of running an extractor
  pub fn with_modules(mut self, modules: Vec<Module>) -> Self {
    self.modules = Some(modules);
    self
  }

  pub fn analyze(&self) -> PathsResult<AnalysisResult> {
    self.analyze_with(&CancellationToken::new())
  }

  /// Run the analysis, abandoning graph acquisition once `cancel` is tripped.
  ///
  /// A failure while detecting changed files also trips `cancel`, stopping a
  /// model command still in flight.
  pub fn analyze_with(&self, cancel: &CancellationToken) -> PathsResult<AnalysisResult> {
    self.options.validate()?;
    cancel.check()?;

    let started = Instant::now();
    let (changed_files, modules) = rayon::join(
      || {
        let result = self.changed_files();
        if result.is_err() {
          cancel.cancel();
        }
        result
      },
      || self.acquire_modules(cancel),
    );
    let changed_files = changed_files?;
    let modules = modules?;
    debug!(elapsed_ms = started.elapsed().as_millis() as u64, "Inputs ready");

    let modules = self.filter_included_builds(modules);
    let module_map = module_map(&modules);

    let (index, owned_files) = rayon::join(
      || ReverseDependencyIndex::build(&modules),
      || resolve_owners(&changed_files, &module_map),
    );

    if tracing::enabled!(tracing::Level::DEBUG) {
      for variant in index.variants() {
        for cycle in index.cycles(variant) {
          debug!(variant, cycle = ?cycle, "Dependency cycle");
        }
      }
    }

    info!(
      changed = changed_files.len(),
      owned = owned_files.len(),
      modules = module_map.len(),
      edges = index.edge_count(),
      "Resolving affected modules"
    );

    let affected_results = find_affected(&index, &owned_files, &module_map);

    Ok(AnalysisResult {
      changed_files,
      module_map,
      affected_results,
    })
  }

  /// Explicit change set when configured, otherwise the git diff
  fn changed_files(&self) -> PathsResult<Vec<String>> {
    if !self.options.changed_files.is_empty() {
      debug!("Using explicit changed files");
      return Ok(normalize_changed_files(&self.options.changed_files));
    }

    ChangeSetResolver::new(&self.options.root, self.options.comparison_commit.clone())?.find_changed_files()
  }

  fn acquire_modules(&self, cancel: &CancellationToken) -> PathsResult<Vec<Module>> {
    cancel.check()?;
    if let Some(modules) = &self.modules {
      return Ok(modules.clone());
    }

    let extractor = select_extractor(&self.options)?;
    extractor.extract(&self.options.root, cancel)
  }

  fn filter_included_builds(&self, modules: Vec<Module>) -> Vec<Module> {
    if self.options.include_included_builds {
      return modules;
    }

    let before = modules.len();
    let kept: Vec<Module> = modules.into_iter().filter(|m| !m.included_build).collect();
    debug!(dropped = before - kept.len(), "Excluded included-build modules");
    kept
  }
}

/// Index modules by address; a repeated address keeps the last record.
fn module_map(modules: &[Module]) -> BTreeMap<String, Module> {
  let mut map = BTreeMap::new();
  for module in modules {
    if map.insert(module.address.clone(), module.clone()).is_some() {
      warn!(address = %module.address, "Duplicate module address in graph");
    }
  }
  map
}

/// Trim, drop empty entries and deduplicate, keeping first-occurrence order
fn normalize_changed_files(files: &[String]) -> Vec<String> {
  let mut seen = HashSet::new();
  files
    .iter()
    .map(|f| f.trim().trim_start_matches("./"))
    .filter(|f| !f.is_empty())
    .filter(|f| seen.insert(*f))
    .map(str::to_string)
    .collect()
}
