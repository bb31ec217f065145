use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cooperative cancellation handle for the receive loop.
///
/// Clones share one flag. The receive loop polls the flag at the top of
/// each iteration, so triggering it takes effect at the next iteration and
/// does not interrupt a read already blocked on the device — closing the
/// device handle is the actual interruption mechanism.
#[derive(Clone, Debug, Default)]
pub struct ShutdownFlag {
    inner: Arc<AtomicBool>,
}

impl ShutdownFlag {
    /// Create a new, untriggered flag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request shutdown. Idempotent.
    pub fn trigger(&self) {
        self.inner.store(true, Ordering::SeqCst);
    }

    /// Whether shutdown has been requested.
    pub fn is_triggered(&self) -> bool {
        self.inner.load(Ordering::SeqCst)
    }
}
