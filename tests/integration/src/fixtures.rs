//! Test fixtures and data generators

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use honk_core::{DisplayName, ParticipantId};
use honk_session::{FixedIdentity, SessionOptions};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Participant id that orders after every id built with a smaller `rank`
pub fn ranked_id(rank: u8) -> String {
    format!("co_{rank:03}_{}", unique_suffix())
}

pub fn participant(id: &str) -> ParticipantId {
    ParticipantId::parse(id).expect("fixture ids are never blank")
}

pub fn identity(id: &str) -> FixedIdentity {
    FixedIdentity::new(id, DisplayName::random()).expect("fixture ids are never blank")
}

/// Default windows: 3000 ms local, 2000 ms remote
pub fn default_options() -> SessionOptions {
    SessionOptions::default()
}

/// Short windows for tests that run on the real clock
pub fn fast_options() -> SessionOptions {
    SessionOptions {
        local_debounce: Duration::from_millis(150),
        remote_debounce: Duration::from_millis(100),
        ..SessionOptions::default()
    }
}
