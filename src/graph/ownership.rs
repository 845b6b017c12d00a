//! Changed file → owning module
//!
//! A file belongs to the module whose address is the deepest `/`-segment
//! prefix of the file path. Nested modules therefore win over their parents:
//! with modules `library` and `library/foobar`, `library/foobar/build.gradle`
//! belongs to `library/foobar`.

use crate::model::Module;
use std::collections::BTreeMap;
use tracing::debug;

/// A changed file together with the address of the module owning it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedFile {
  pub file: String,
  pub module: String,
}

/// Find the module owning `file`, if any.
pub fn owner_of<'a>(file: &str, modules: &'a BTreeMap<String, Module>) -> Option<&'a Module> {
  let mut prefix = String::with_capacity(file.len());
  let mut owner = None;

  for segment in file.split('/').filter(|s| !s.is_empty()) {
    if !prefix.is_empty() {
      prefix.push('/');
    }
    prefix.push_str(segment);

    if let Some(module) = modules.get(&prefix) {
      owner = Some(module);
    }
  }

  owner
}

/// Resolve owners for a whole change set, keeping changed-file order.
///
/// Files without an owner (root build files, settings, docs) are dropped.
pub fn resolve_owners(changed_files: &[String], modules: &BTreeMap<String, Module>) -> Vec<OwnedFile> {
  changed_files
    .iter()
    .filter_map(|file| match owner_of(file, modules) {
      Some(module) => Some(OwnedFile {
        file: file.clone(),
        module: module.address.clone(),
      }),
      None => {
        debug!(file = %file, "No owning module, skipping");
        None
      }
    })
    .collect()
}
