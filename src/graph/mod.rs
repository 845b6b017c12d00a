//! Change-impact graph engine
//!
//! Plain maps and sets over string addresses; petgraph is only pulled in for
//! cycle diagnostics.

pub mod affected;
pub mod ownership;
pub mod report;
pub mod reverse_index;

pub use affected::AffectedResult;
pub use ownership::OwnedFile;
pub use report::AffectedReport;
pub use reverse_index::ReverseDependencyIndex;
