//! Tokio-backed timer scheduler
//!
//! Every armed timer is a sleeping task. When it wakes it reports its
//! handle on the fired channel, unless it was cancelled first. The session
//! loop reads that channel and hands each handle back to the trackers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use honk_core::{TimerHandle, TimerScheduler};
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::trace;

/// Receiving end of a scheduler's fired timers
pub type FiredTimers = mpsc::UnboundedReceiver<TimerHandle>;

/// Timer scheduler running on the tokio clock
#[derive(Debug)]
pub struct TokioScheduler {
    next_id: AtomicU64,
    /// Armed timers. The abort handle is filled in right after spawning.
    armed: Arc<DashMap<TimerHandle, Option<AbortHandle>>>,
    fired: mpsc::UnboundedSender<TimerHandle>,
}

impl TokioScheduler {
    /// Create a scheduler together with the channel its timers fire into
    pub fn new() -> (Arc<Self>, FiredTimers) {
        let (fired, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            next_id: AtomicU64::new(1),
            armed: Arc::new(DashMap::new()),
            fired,
        };
        (Arc::new(scheduler), rx)
    }

    /// Number of timers armed and not yet fired or cancelled
    pub fn pending(&self) -> usize {
        self.armed.len()
    }
}

impl TimerScheduler for TokioScheduler {
    /// Must be called from within a tokio runtime
    fn arm(&self, delay: Duration) -> TimerHandle {
        let handle = TimerHandle::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.armed.insert(handle, None);

        let armed = Arc::clone(&self.armed);
        let fired = self.fired.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if armed.remove(&handle).is_some() {
                trace!(timer = %handle, "Timer fired");
                // Receiver gone means the session is shutting down
                let _ = fired.send(handle);
            }
        });

        // Already fired if the entry is gone
        if let Some(mut entry) = self.armed.get_mut(&handle) {
            *entry = Some(task.abort_handle());
        }
        handle
    }

    fn cancel(&self, handle: TimerHandle) {
        if let Some((_, task)) = self.armed.remove(&handle) {
            if let Some(task) = task {
                task.abort();
            }
            trace!(timer = %handle, "Timer cancelled");
        }
    }
}
