//! Typing presence - debounced "is typing" signal per tracked bubble

mod layout;
mod scheduler;
mod tracker;

pub use layout::BubbleLayout;
pub use scheduler::{ManualScheduler, TimerHandle, TimerScheduler};
pub use tracker::{PresenceSource, PresenceState, PresenceTracker, PresenceTransition};
