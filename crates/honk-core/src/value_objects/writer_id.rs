//! Writer tag attached to text writes

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one writing session, so a session can tell its own text
/// echoes apart from writes made by another session on the same slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WriterId(u64);

impl WriterId {
    #[inline]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Fresh random tag
    pub fn random() -> Self {
        Self(rand::random())
    }

    #[inline]
    pub const fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WriterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
