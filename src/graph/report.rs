//! Folding per-variant results into the final, sorted report

use super::affected::AffectedResult;
use crate::core::config::Granularity;
use crate::model::{gradle_path, module_of};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as _;

/// Changed file → affected addresses, sorted by file then address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AffectedReport {
  pub granularity: Granularity,
  pub files: BTreeMap<String, BTreeSet<String>>,
}

impl AffectedReport {
  /// Merge results across variants and tests.
  ///
  /// With [`Granularity::Module`] every `module:variant:test` address is folded
  /// into its module before deduplication.
  pub fn from_results(results: &[AffectedResult], granularity: Granularity) -> Self {
    let mut files: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();

    for result in results {
      let entry = files.entry(result.file.clone()).or_default();
      match granularity {
        Granularity::Target => entry.extend(result.affected.iter().cloned()),
        Granularity::Module => entry.extend(result.affected.iter().map(|a| module_of(a).to_string())),
      }
    }

    Self { granularity, files }
  }

  /// Rewrite every address as a Gradle project path (`:library:foobar`)
  pub fn into_gradle_paths(self) -> Self {
    let files = self
      .files
      .into_iter()
      .map(|(file, addresses)| (file, addresses.iter().map(|a| gradle_path(a)).collect()))
      .collect();
    Self { files, ..self }
  }

  pub fn is_empty(&self) -> bool {
    self.files.is_empty()
  }

  /// Every affected address across all files, sorted
  pub fn all_affected(&self) -> BTreeSet<&str> {
    self
      .files
      .values()
      .flat_map(|addresses| addresses.iter().map(String::as_str))
      .collect()
  }

  /// Human-readable rendering
  pub fn render_text(&self) -> String {
    if self.is_empty() {
      return "No modules affected\n".to_string();
    }

    let mut out = String::from("Affected modules found.\n\n");
    for (file, addresses) in &self.files {
      let _ = writeln!(out, "Changed file: {}", file);
      let _ = writeln!(out, "Modules affected by this changed file:");
      for address in addresses {
        let _ = writeln!(out, "    - {}", address);
      }
      out.push('\n');
    }
    out
  }

  /// One affected address per line, for piping into CI scripts
  pub fn render_names(&self) -> String {
    let mut out = String::new();
    for address in self.all_affected() {
      out.push_str(address);
      out.push('\n');
    }
    out
  }

  pub fn render_json(&self, changed_files: &[String]) -> serde_json::Result<String> {
    let all: Vec<&str> = self.all_affected().into_iter().collect();
    let output = serde_json::json!({
      "changed_files": changed_files,
      "granularity": self.granularity,
      "files": self.files,
      "affected": all,
      "summary": {
        "changed_files_count": changed_files.len(),
        "owned_files_count": self.files.len(),
        "affected_count": all.len(),
      }
    });
    serde_json::to_string_pretty(&output)
  }
}
