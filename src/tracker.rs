use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

/// Counts outstanding background work and wakes waiters when it drains.
///
/// Every asynchronous side effect the controller spawns (a retired file's
/// flush-and-close, a compression job) registers exactly one unit before it
/// starts and deregisters exactly once when it finishes, whether or not the
/// work itself succeeded. When the count returns to zero, every thread
/// blocked in [`wait_drained`](CompletionTracker::wait_drained) wakes up.
///
/// Handles are cheap clones sharing one counter, so completion callbacks on
/// background threads can deregister in any order.
///
/// # Panics
///
/// Deregistering with no pending work panics: the count going negative means
/// the register/deregister pairing is broken, which is an internal defect
/// rather than a runtime condition to tolerate.
#[derive(Clone)]
pub struct CompletionTracker {
    inner: Arc<Inner>,
}

struct Inner {
    pending: Mutex<usize>,
    drained: Condvar,
}

impl CompletionTracker {
    /// Create a tracker with no pending work.
    pub fn new() -> CompletionTracker {
        CompletionTracker {
            inner: Arc::new(Inner {
                pending: Mutex::new(0),
                drained: Condvar::new(),
            }),
        }
    }

    /// Record one unit of background work as outstanding.
    pub fn register(&self) {
        *self.inner.pending.lock().unwrap() += 1;
    }

    /// Record one unit of background work as finished.
    pub fn deregister(&self) {
        let mut pending = self.inner.pending.lock().unwrap();
        if *pending == 0 {
            panic!("completion tracker deregistered with no pending work");
        }
        *pending -= 1;
        if *pending == 0 {
            self.inner.drained.notify_all();
        }
    }

    /// Number of units currently outstanding.
    pub fn pending(&self) -> usize {
        *self.inner.pending.lock().unwrap()
    }

    /// Block until no work is outstanding.
    ///
    /// Returns immediately if nothing is pending.
    pub fn wait_drained(&self) {
        let mut pending = self.inner.pending.lock().unwrap();
        while *pending > 0 {
            pending = self.inner.drained.wait(pending).unwrap();
        }
    }

    /// Block until no work is outstanding or `timeout` elapses.
    ///
    /// Returns `true` if the tracker drained within the timeout.
    pub fn wait_drained_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut pending = self.inner.pending.lock().unwrap();
        while *pending > 0 {
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, _) = self
                .inner
                .drained
                .wait_timeout(pending, deadline - now)
                .unwrap();
            pending = guard;
        }
        true
    }
}

impl Default for CompletionTracker {
    fn default() -> CompletionTracker {
        CompletionTracker::new()
    }
}
