use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Run-in-progress flag shared by the trigger paths of one process.
///
/// Clones share the same flag. At most one [`RunPermit`] exists at a time.
/// Runs in other processes are kept out by the sink's store-wide lock
/// ([`crate::GrantSink::try_lock_run`]).
#[derive(Debug, Clone, Default)]
pub struct RunGuard {
    running: Arc<AtomicBool>,
}

impl RunGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the permit, or `None` when a run is already active.
    #[must_use]
    pub fn try_acquire(&self) -> Option<RunPermit> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunPermit {
                running: Arc::clone(&self.running),
            })
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Releases the guard on drop.
#[derive(Debug)]
pub struct RunPermit {
    running: Arc<AtomicBool>,
}

impl Drop for RunPermit {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}
