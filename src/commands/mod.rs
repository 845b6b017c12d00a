//! CLI commands for affected-paths
//!
//! - **affected**: Report the modules affected by a change set

pub mod affected;

pub use affected::{AffectedArgs, OutputFormat, run_affected};
