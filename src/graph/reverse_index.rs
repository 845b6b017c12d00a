//! Reverse dependency index, one slice per variant
//!
//! ## Graph Structure
//!
//! - **Slice**: variant name → (target address → addresses depending on it)
//! - **Addresses**: module addresses (`library/foobar`) or test targets
//!   (`library/foobar:debug:unitTest`)
//! - **Edges**: `target → dependent`, only for module dependencies; external
//!   packages (`@maven://...`) never produce edges
//!
//! Variants are independent dependency universes: an edge found under `debug`
//! is never visible under `release`.
//!
//! Construction is a rayon fold/reduce over modules. Each worker fills a
//! private partial index; partials are merged pairwise, and the index is only
//! handed out after the reduce finishes.

use crate::model::{Module, test_address};
use petgraph::algo;
use petgraph::graphmap::DiGraphMap;
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};

/// Reverse adjacency for one variant: target address → dependents
pub type Slice = HashMap<String, HashSet<String>>;

/// Per-variant reverse dependency graph of the whole build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReverseDependencyIndex {
  slices: HashMap<String, Slice>,
}

impl ReverseDependencyIndex {
  /// Build the index from the full module list.
  pub fn build(modules: &[Module]) -> Self {
    modules
      .par_iter()
      .fold(Self::default, |mut index, module| {
        index.add_module(module);
        index
      })
      .reduce(Self::default, Self::merge)
  }

  fn add_module(&mut self, module: &Module) {
    for (variant_name, variant) in &module.variants {
      for dep in &variant.dependencies {
        if let Some(target) = dep.module_address()
          && target != module.address
        {
          self.insert(variant_name, target, &module.address);
        }
      }

      for (test_name, test) in &variant.tests {
        let address = test_address(&module.address, variant_name, test_name);
        for dep in &test.dependencies {
          if let Some(target) = dep.module_address()
            && target != address
          {
            self.insert(variant_name, target, &address);
          }
        }
      }
    }
  }

  fn insert(&mut self, variant: &str, target: &str, dependent: &str) {
    self
      .slices
      .entry(variant.to_string())
      .or_default()
      .entry(target.to_string())
      .or_default()
      .insert(dependent.to_string());
  }

  fn merge(mut self, other: Self) -> Self {
    for (variant, slice) in other.slices {
      let ours = self.slices.entry(variant).or_default();
      for (target, dependents) in slice {
        ours.entry(target).or_default().extend(dependents);
      }
    }
    self
  }

  /// Reverse graph for one variant, if any edge was recorded under it
  pub fn slice(&self, variant: &str) -> Option<&Slice> {
    self.slices.get(variant)
  }

  /// Direct dependents of `address` under `variant`
  pub fn dependents(&self, variant: &str, address: &str) -> Option<&HashSet<String>> {
    self.slices.get(variant).and_then(|slice| slice.get(address))
  }

  /// Variant names with at least one edge, sorted
  pub fn variants(&self) -> Vec<&str> {
    let mut variants: Vec<_> = self.slices.keys().map(String::as_str).collect();
    variants.sort();
    variants
  }

  /// Total number of reverse edges across all slices
  pub fn edge_count(&self) -> usize {
    self
      .slices
      .values()
      .flat_map(|slice| slice.values())
      .map(HashSet::len)
      .sum()
  }

  /// Detect dependency cycles in one slice using Tarjan's SCC algorithm.
  ///
  /// Returns strongly connected components with more than one address, each
  /// sorted, in sorted order. Cycles are tolerated by the traversal; this is
  /// diagnostics only.
  pub fn cycles(&self, variant: &str) -> Vec<Vec<String>> {
    let Some(slice) = self.slice(variant) else {
      return vec![];
    };

    let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
    for (target, dependents) in slice {
      for dependent in dependents {
        graph.add_edge(target.as_str(), dependent.as_str(), ());
      }
    }

    let mut cycles: Vec<Vec<String>> = algo::tarjan_scc(&graph)
      .into_iter()
      .filter(|component| component.len() > 1)
      .map(|component| {
        let mut cycle: Vec<String> = component.into_iter().map(str::to_string).collect();
        cycle.sort();
        cycle
      })
      .collect();
    cycles.sort();
    cycles
  }
}
