//! Core engine for affected-paths
//!
//! - **analyzer**: Orchestrates change detection, graph acquisition and impact resolution
//! - **cancel**: Cancellation token shared with long-running acquisition
//! - **config**: affected-paths.toml parsing and resolved analysis options
//! - **error**: Error types with contextual help messages and exit codes
//! - **vcs**: Git operations (SystemGit) and changed-file detection

pub mod analyzer;
pub mod cancel;
pub mod config;
pub mod error;
pub mod vcs;
