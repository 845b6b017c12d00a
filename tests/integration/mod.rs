//! Integration tests for affected-paths

mod helpers;
mod test_affected;
mod test_changes;
