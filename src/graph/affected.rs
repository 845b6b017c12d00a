//! Affected address analysis
//!
//! Given the changed files and their owning modules, determine:
//! - Which addresses each file directly implicates (the seeds)
//! - Which addresses transitively depend on those seeds, per variant
//!
//! Algorithm, for every (file, module, variant):
//! 1. Seeds: module + all its tests if the file is a main source of the
//!    variant; only the matching tests if it is a test source; otherwise just
//!    the module (build scripts and other non-source files)
//! 2. Breadth-first walk of the variant's reverse slice from the seeds, with a
//!    visited set so cycles terminate
//! 3. The visited set (seeds included) is the affected set
//!
//! This step is pure and total: it never fails, whatever the shape of the graph.

use super::ownership::OwnedFile;
use super::reverse_index::{ReverseDependencyIndex, Slice};
use crate::model::{Module, VariantConfig, test_address};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};

/// Addresses affected by one changed file under one variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AffectedResult {
  /// Changed file (repo-relative)
  pub file: String,

  /// Variant whose slice was walked
  pub variant: String,

  /// Seeds plus everything reachable from them
  pub affected: BTreeSet<String>,
}

/// Whether `source` occurs in `file` on `/` segment boundaries.
///
/// Sources are usually module-relative (`src/main/java`) while files are
/// repo-relative (`library/src/main/java/Foo.java`), so this is containment
/// rather than a prefix test.
pub fn source_matches(file: &str, source: &str) -> bool {
  let file = file.trim_matches('/');
  let source = source.trim_matches('/');
  if source.is_empty() {
    return false;
  }

  std::iter::once(0)
    .chain(file.match_indices('/').map(|(i, _)| i + 1))
    .any(|start| {
      file[start..]
        .strip_prefix(source)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}

/// Addresses directly implicated by `file` in one variant of `module`.
pub fn seed_addresses(file: &str, module: &Module, variant_name: &str, variant: &VariantConfig) -> BTreeSet<String> {
  if variant.sources.iter().any(|src| source_matches(file, src)) {
    // Main source change: the module and every test of the variant
    let mut seeds: BTreeSet<String> = variant
      .tests
      .keys()
      .map(|test| test_address(&module.address, variant_name, test))
      .collect();
    seeds.insert(module.address.clone());
    return seeds;
  }

  let tests: BTreeSet<String> = variant
    .tests
    .iter()
    .filter(|(_, test)| test.sources.iter().any(|src| source_matches(file, src)))
    .map(|(test, _)| test_address(&module.address, variant_name, test))
    .collect();
  if !tests.is_empty() {
    return tests;
  }

  BTreeSet::from([module.address.clone()])
}

/// Walk `slice` breadth-first from `seeds`, returning addresses in visit order.
///
/// Every address appears once, seeds included. A missing slice means no edges.
pub fn breadth_first<I>(slice: Option<&Slice>, seeds: I) -> Vec<String>
where
  I: IntoIterator<Item = String>,
{
  let mut visited = HashSet::new();
  let mut order = Vec::new();
  let mut queue: VecDeque<String> = seeds.into_iter().collect();

  while let Some(address) = queue.pop_front() {
    if visited.contains(&address) {
      continue;
    }

    if let Some(dependents) = slice.and_then(|s| s.get(&address)) {
      queue.extend(dependents.iter().filter(|d| !visited.contains(*d)).cloned());
    }

    visited.insert(address.clone());
    order.push(address);
  }

  order
}

/// Seeds plus every address reachable from them through `slice`.
pub fn transitive_closure<I>(slice: Option<&Slice>, seeds: I) -> BTreeSet<String>
where
  I: IntoIterator<Item = String>,
{
  breadth_first(slice, seeds).into_iter().collect()
}

/// Compute affected sets for every owned file and every variant of its module.
///
/// Files are processed in parallel; the output order is unspecified.
pub fn find_affected(
  index: &ReverseDependencyIndex,
  owned_files: &[OwnedFile],
  modules: &BTreeMap<String, Module>,
) -> Vec<AffectedResult> {
  owned_files
    .par_iter()
    .flat_map_iter(|owned| {
      let Some(module) = modules.get(&owned.module) else {
        return Vec::new();
      };

      module
        .variants
        .iter()
        .map(|(variant_name, variant)| {
          let seeds = seed_addresses(&owned.file, module, variant_name, variant);
          AffectedResult {
            file: owned.file.clone(),
            variant: variant_name.clone(),
            affected: transitive_closure(index.slice(variant_name), seeds),
          }
        })
        .collect()
    })
    .collect()
}
