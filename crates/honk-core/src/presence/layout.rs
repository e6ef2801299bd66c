//! Bubble height split derived from both presence signals

use serde::{Deserialize, Serialize};

/// Share of the chat body given to each bubble, in percent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BubbleLayout {
    pub other_percent: u8,
    pub mine_percent: u8,
}

impl BubbleLayout {
    const COLLAPSED: u8 = 15;
    const EXPANDED: u8 = 70;
    const SHARED: u8 = 50;

    const fn new(other_percent: u8, mine_percent: u8) -> Self {
        Self {
            other_percent,
            mine_percent,
        }
    }

    /// Grow whichever side is live: the local bubble while the local
    /// participant types, the other bubble while it has content.
    pub fn compute(local_typing: bool, other_text: &str) -> Self {
        let other_has_content = !other_text.trim().is_empty();
        match (local_typing, other_has_content) {
            (true, false) => Self::new(Self::COLLAPSED, Self::EXPANDED),
            (false, true) => Self::new(Self::EXPANDED, Self::COLLAPSED),
            (true, true) => Self::new(Self::SHARED, Self::SHARED),
            (false, false) => Self::new(Self::COLLAPSED, Self::COLLAPSED),
        }
    }
}
