//! Change-impact analysis for multi-module builds
//!
//! Given the files changed between two commits and the module graph of a
//! build, compute every module (and test target) that may be affected.
//!
//! ```no_run
//! use affected_paths::core::analyzer::CoreAnalyzer;
//! use affected_paths::core::config::{AnalysisOptions, Granularity};
//!
//! let options = AnalysisOptions::new(".");
//! let result = CoreAnalyzer::new(options).analyze()?;
//! print!("{}", result.report(Granularity::Module).render_text());
//! # Ok::<(), affected_paths::core::error::PathsError>(())
//! ```

pub mod commands;
pub mod core;
pub mod graph;
pub mod model;
