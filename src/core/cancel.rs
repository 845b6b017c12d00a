//! Cooperative cancellation shared between analysis tasks

use crate::core::error::{AcquisitionError, PathsResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cloneable cancellation flag.
///
/// All clones observe the same state. Once cancelled a token stays cancelled.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
  cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
  pub fn new() -> Self {
    Self::default()
  }

  /// Request cancellation of every task holding a clone of this token
  pub fn cancel(&self) {
    self.cancelled.store(true, Ordering::SeqCst);
  }

  pub fn is_cancelled(&self) -> bool {
    self.cancelled.load(Ordering::SeqCst)
  }

  /// Bail out with `AcquisitionError::Cancelled` if cancellation was requested
  pub fn check(&self) -> PathsResult<()> {
    if self.is_cancelled() {
      return Err(AcquisitionError::Cancelled.into());
    }
    Ok(())
  }
}
