//! Single-shot timer scheduling
//!
//! Trackers never own a concrete timer. They arm and cancel through a
//! [`TimerScheduler`], and the host routes fired handles back to them.
//! [`ManualScheduler`] is a virtual clock for deterministic tests.

use parking_lot::Mutex;
use std::fmt;
use std::time::Duration;

/// Identifier of one armed timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerHandle(u64);

impl TimerHandle {
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Cancellable single-shot timers
///
/// Implementations deliver each armed handle at most once, and never after
/// `cancel` returned for it.
pub trait TimerScheduler: Send + Sync {
    /// Arm a timer that fires once after `delay`
    fn arm(&self, delay: Duration) -> TimerHandle;

    /// Cancel a timer; unknown or already fired handles are ignored
    fn cancel(&self, handle: TimerHandle);
}

#[derive(Debug, Default)]
struct ManualState {
    now: Duration,
    next_id: u64,
    /// (deadline, handle)
    armed: Vec<(Duration, TimerHandle)>,
}

/// Virtual-clock scheduler, advanced explicitly by tests
#[derive(Debug, Default)]
pub struct ManualScheduler {
    state: Mutex<ManualState>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time elapsed on the virtual clock
    pub fn now(&self) -> Duration {
        self.state.lock().now
    }

    /// Number of timers armed and not yet fired or cancelled
    pub fn pending(&self) -> usize {
        self.state.lock().armed.len()
    }

    /// Move the clock forward and return every timer whose deadline was
    /// reached, in deadline order
    pub fn advance(&self, by: Duration) -> Vec<TimerHandle> {
        let mut state = self.state.lock();
        state.now += by;
        let now = state.now;

        let mut fired: Vec<(Duration, TimerHandle)> = Vec::new();
        state.armed.retain(|&(deadline, handle)| {
            if deadline <= now {
                fired.push((deadline, handle));
                false
            } else {
                true
            }
        });
        fired.sort_unstable();
        fired.into_iter().map(|(_, handle)| handle).collect()
    }
}

impl TimerScheduler for ManualScheduler {
    fn arm(&self, delay: Duration) -> TimerHandle {
        let mut state = self.state.lock();
        state.next_id += 1;
        let handle = TimerHandle::new(state.next_id);
        let deadline = state.now + delay;
        state.armed.push((deadline, handle));
        handle
    }

    fn cancel(&self, handle: TimerHandle) {
        self.state.lock().armed.retain(|&(_, h)| h != handle);
    }
}
