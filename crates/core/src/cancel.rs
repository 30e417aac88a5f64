//! Cooperative cancellation shared between a caller and a running generator.

use crate::error::EngineError;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Clonable cancellation flag.
///
/// Every clone observes the same flag. Generators poll [`CancelToken::check`]
/// at coarse points (per sample, per pixel, per streamline) and unwind with
/// [`EngineError::CancellationRequested`] once it is set.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation. Idempotent.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// `Err(CancellationRequested)` once [`CancelToken::cancel`] has been called.
    pub fn check(&self) -> Result<(), EngineError> {
        if self.is_cancelled() {
            Err(EngineError::CancellationRequested)
        } else {
            Ok(())
        }
    }
}
