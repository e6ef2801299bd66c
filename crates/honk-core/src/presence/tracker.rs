//! Presence tracker - trailing-edge debounce over text changes
//!
//! Two states, Idle (initial) and Active. Non-blank text activates and
//! re-arms the deactivation timer; blank text deactivates immediately; the
//! timer firing deactivates. At most one timer is outstanding per tracker.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

use super::scheduler::{TimerHandle, TimerScheduler};
use crate::error::DomainError;

/// Which participant a tracker follows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceSource {
    /// Fed by local input events
    Local,
    /// Fed by text mutations observed on the other slot
    Remote,
}

impl fmt::Display for PresenceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local => write!(f, "local"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

/// Edge produced by a tracker input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceTransition {
    /// Idle -> Active
    Activated,
    /// Active -> Idle
    Deactivated,
}

/// Transient per-bubble presence state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenceState {
    pub last_text: String,
    pub is_active: bool,
    pub pending_timer: Option<TimerHandle>,
}

/// Debounced typing detector for one bubble
pub struct PresenceTracker {
    source: PresenceSource,
    debounce: Duration,
    scheduler: Arc<dyn TimerScheduler>,
    state: PresenceState,
}

impl fmt::Debug for PresenceTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PresenceTracker")
            .field("source", &self.source)
            .field("debounce", &self.debounce)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl PresenceTracker {
    /// Create an idle tracker; `debounce` must be non-zero
    pub fn new(
        source: PresenceSource,
        debounce: Duration,
        scheduler: Arc<dyn TimerScheduler>,
    ) -> Result<Self, DomainError> {
        if debounce.is_zero() {
            return Err(DomainError::InvalidDebounce);
        }
        Ok(Self {
            source,
            debounce,
            scheduler,
            state: PresenceState::default(),
        })
    }

    /// Record a new text snapshot and update the typing signal
    pub fn on_text_changed(&mut self, text: impl Into<String>) -> Option<PresenceTransition> {
        let text = text.into();
        let has_content = !text.trim().is_empty();
        self.state.last_text = text;
        self.cancel_pending();

        if has_content {
            let handle = self.scheduler.arm(self.debounce);
            self.state.pending_timer = Some(handle);
            trace!(source = %self.source, timer = %handle, "Deactivation timer armed");
            self.set_active(true)
        } else {
            self.set_active(false)
        }
    }

    /// Handle a fired timer. Handles other than the one currently armed
    /// are stale and ignored.
    pub fn on_timer_fired(&mut self, handle: TimerHandle) -> Option<PresenceTransition> {
        if self.state.pending_timer != Some(handle) {
            return None;
        }
        self.state.pending_timer = None;
        self.set_active(false)
    }

    /// Clear the bubble: empty text, no timer, idle
    pub fn reset(&mut self) -> Option<PresenceTransition> {
        self.state.last_text.clear();
        self.cancel_pending();
        self.set_active(false)
    }

    /// Take a text snapshot without treating it as typing activity
    pub fn observe_snapshot(&mut self, text: impl Into<String>) {
        self.state.last_text = text.into();
    }

    /// Cancel any outstanding timer; text and activity are left as they are
    pub fn dispose(&mut self) {
        self.cancel_pending();
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.state.is_active
    }

    #[inline]
    pub fn last_text(&self) -> &str {
        &self.state.last_text
    }

    pub fn pending_timer(&self) -> Option<TimerHandle> {
        self.state.pending_timer
    }

    pub fn state(&self) -> &PresenceState {
        &self.state
    }

    pub fn source(&self) -> PresenceSource {
        self.source
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    fn cancel_pending(&mut self) {
        if let Some(handle) = self.state.pending_timer.take() {
            self.scheduler.cancel(handle);
        }
    }

    fn set_active(&mut self, active: bool) -> Option<PresenceTransition> {
        if self.state.is_active == active {
            return None;
        }
        self.state.is_active = active;
        let transition = if active {
            PresenceTransition::Activated
        } else {
            PresenceTransition::Deactivated
        };
        trace!(source = %self.source, ?transition, "Presence changed");
        Some(transition)
    }
}

impl Drop for PresenceTracker {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}
