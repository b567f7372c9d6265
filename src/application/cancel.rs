//! Cooperative cancellation for batch runs.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag checked between units of work.
///
/// Clones observe the same flag, so a signal handler can hold one clone
/// while the batch holds another.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_clone_when_cancelled_then_original_sees_it() {
        let token = CancellationToken::new();
        let handle = token.clone();

        assert!(!token.is_cancelled());
        handle.cancel();

        assert!(token.is_cancelled());
    }
}
