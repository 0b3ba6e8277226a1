//! Fixed-period background loop shared by the assembler and the scheduler.
//!
//! The worker owns its state behind a mutex. The loop holds that mutex while it ticks and
//! releases it only while sleeping on the paired condition variable, so a mutation made through
//! [`PollingWorker::with_state`] is never observed half-applied and always wakes the loop early.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, error};

use crate::foundation::error::SegResult;

pub(crate) fn lock<S>(m: &Mutex<S>) -> MutexGuard<'_, S> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

struct Shared<S> {
    state: Mutex<S>,
    cv: Condvar,
    running: AtomicBool,
    shutdown: AtomicBool,
}

trait Wake: Send + Sync {
    fn wake(&self);
}

impl<S: Send> Wake for Shared<S> {
    fn wake(&self) {
        // Taking the lock orders the notify after the loop has started waiting.
        let _guard = lock(&self.state);
        self.cv.notify_all();
    }
}

/// Cloneable handle that wakes a worker's loop before its period elapses.
///
/// Must not be called from inside the worker's own tick.
#[derive(Clone)]
pub struct Waker {
    target: Arc<dyn Wake>,
}

impl Waker {
    pub fn wake(&self) {
        self.target.wake();
    }
}

impl std::fmt::Debug for Waker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Waker").finish_non_exhaustive()
    }
}

pub struct PollingWorker<S> {
    name: String,
    shared: Arc<Shared<S>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl<S: Send + 'static> PollingWorker<S> {
    /// Create a stopped worker around `state`.
    pub fn new(name: impl Into<String>, state: S) -> Self {
        Self {
            name: name.into(),
            shared: Arc::new(Shared {
                state: Mutex::new(state),
                cv: Condvar::new(),
                running: AtomicBool::new(false),
                shutdown: AtomicBool::new(false),
            }),
            handle: Mutex::new(None),
        }
    }

    /// Spawn the loop. Calling `start` on a worker that was already started is a no-op.
    pub fn start<F>(&self, period: Duration, mut tick: F) -> SegResult<()>
    where
        F: FnMut(&mut S) + Send + 'static,
    {
        let mut handle = lock(&self.handle);
        if handle.is_some() {
            return Ok(());
        }

        self.shared.running.store(true, Ordering::Release);
        let shared = Arc::clone(&self.shared);
        let name = self.name.clone();
        let spawned = thread::Builder::new().name(name.clone()).spawn(move || {
            debug!(worker = %name, "starting thread");
            let outcome = catch_unwind(AssertUnwindSafe(|| {
                let mut guard = lock(&shared.state);
                while shared.running.load(Ordering::Acquire) {
                    tick(&mut guard);
                    if !shared.running.load(Ordering::Acquire) {
                        break;
                    }
                    guard = match shared.cv.wait_timeout(guard, period) {
                        Ok((g, _)) => g,
                        Err(poisoned) => poisoned.into_inner().0,
                    };
                }
            }));
            if outcome.is_err() {
                error!(worker = %name, "thread panicked, exiting");
            }
            shared.running.store(false, Ordering::Release);
            shared.shutdown.store(true, Ordering::Release);
            debug!(worker = %name, "exiting thread");
        });

        match spawned {
            Ok(h) => {
                *handle = Some(h);
                Ok(())
            }
            Err(e) => {
                self.shared.running.store(false, Ordering::Release);
                Err(e.into())
            }
        }
    }

    /// Signal the loop to stop, wake it and join the thread. Later calls are no-ops.
    pub fn stop(&self) {
        let Some(handle) = lock(&self.handle).take() else {
            return;
        };
        self.shared.running.store(false, Ordering::Release);
        self.shared.wake();
        if handle.join().is_err() {
            error!(worker = %self.name, "thread terminated abnormally");
        }
        self.shared.shutdown.store(true, Ordering::Release);
    }

    /// Run `f` against the state under the loop's lock, then wake the loop.
    pub fn with_state<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let mut guard = lock(&self.shared.state);
        let out = f(&mut guard);
        self.shared.cv.notify_all();
        out
    }

    pub fn waker(&self) -> Waker {
        Waker {
            target: self.shared.clone(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
            && lock(&self.handle).as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn is_shutdown(&self) -> bool {
        self.shared.shutdown.load(Ordering::Acquire)
    }
}

impl<S> Drop for PollingWorker<S> {
    fn drop(&mut self) {
        let handle = self
            .handle
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            self.shared.running.store(false, Ordering::Release);
            {
                let _guard = lock(&self.shared.state);
                self.shared.cv.notify_all();
            }
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/worker.rs"]
mod tests;
