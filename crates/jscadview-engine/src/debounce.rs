//! Cancellable trailing-edge scheduler
//!
//! Scheduling a task replaces any task that has not fired yet, so a burst of
//! calls shorter than the quiet period runs only the last one. The task
//! itself should read the state it needs when it runs, not capture it when
//! scheduled.

use parking_lot::Mutex;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Runs at most one pending task after a quiet period
pub struct Debouncer {
    quiet: Duration,
    runtime: Handle,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    /// Create a debouncer that spawns its timers on `runtime`
    pub fn new(quiet: Duration, runtime: Handle) -> Self {
        Self {
            quiet,
            runtime,
            pending: Mutex::new(None),
        }
    }

    /// Run `task` once the quiet period passes without another call
    pub fn schedule<F>(&self, task: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let deadline = Instant::now() + self.quiet;
        let mut pending = self.pending.lock();
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        *pending = Some(self.runtime.spawn(async move {
            tokio::time::sleep_until(deadline).await;
            task();
        }));
    }

    /// Drop the pending task, if any
    pub fn cancel(&self) {
        if let Some(previous) = self.pending.lock().take() {
            previous.abort();
        }
    }

    /// Whether a task is waiting for its quiet period to end
    pub fn is_pending(&self) -> bool {
        self.pending
            .lock()
            .as_ref()
            .is_some_and(|task| !task.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
