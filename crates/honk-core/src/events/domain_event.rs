//! Domain events - events emitted when session state changes
//!
//! These events are used for:
//! - Driving the presentation layer (typing indicators, bubble sizes)
//! - Structured logging of slot resolution

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assignment::Occupancy;
use crate::entities::Slot;
use crate::presence::PresenceSource;
use crate::value_objects::{ParticipantId, RoomId};

/// All possible domain events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HonkEvent {
    SlotResolved(SlotResolvedEvent),
    TypingStarted(TypingStartedEvent),
    TypingStopped(TypingStoppedEvent),
    BubbleCleared(BubbleClearedEvent),
    SessionClosed(SessionClosedEvent),
}

impl HonkEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::SlotResolved(_) => "SLOT_RESOLVED",
            Self::TypingStarted(_) => "TYPING_STARTED",
            Self::TypingStopped(_) => "TYPING_STOPPED",
            Self::BubbleCleared(_) => "BUBBLE_CLEARED",
            Self::SessionClosed(_) => "SESSION_CLOSED",
        }
    }

    /// Get the timestamp of the event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::SlotResolved(e) => e.timestamp,
            Self::TypingStarted(e) => e.timestamp,
            Self::TypingStopped(e) => e.timestamp,
            Self::BubbleCleared(e) => e.timestamp,
            Self::SessionClosed(e) => e.timestamp,
        }
    }

    /// Get the room the event belongs to
    pub fn room_id(&self) -> &RoomId {
        match self {
            Self::SlotResolved(e) => &e.room_id,
            Self::TypingStarted(e) => &e.room_id,
            Self::TypingStopped(e) => &e.room_id,
            Self::BubbleCleared(e) => &e.room_id,
            Self::SessionClosed(e) => &e.room_id,
        }
    }

    // =========================================================================
    // Constructors
    // =========================================================================

    pub fn slot_resolved(
        room_id: RoomId,
        participant_id: ParticipantId,
        slot: Slot,
        occupancy: Occupancy,
    ) -> Self {
        Self::SlotResolved(SlotResolvedEvent {
            room_id,
            participant_id,
            slot,
            occupancy,
            timestamp: Utc::now(),
        })
    }

    pub fn typing(room_id: RoomId, source: PresenceSource, active: bool) -> Self {
        let timestamp = Utc::now();
        if active {
            Self::TypingStarted(TypingStartedEvent {
                room_id,
                source,
                timestamp,
            })
        } else {
            Self::TypingStopped(TypingStoppedEvent {
                room_id,
                source,
                timestamp,
            })
        }
    }

    pub fn bubble_cleared(room_id: RoomId, slot: Slot) -> Self {
        Self::BubbleCleared(BubbleClearedEvent {
            room_id,
            slot,
            timestamp: Utc::now(),
        })
    }

    pub fn session_closed(room_id: RoomId, participant_id: ParticipantId) -> Self {
        Self::SessionClosed(SessionClosedEvent {
            room_id,
            participant_id,
            timestamp: Utc::now(),
        })
    }
}

// ============================================================================
// Event Structs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotResolvedEvent {
    pub room_id: RoomId,
    pub participant_id: ParticipantId,
    pub slot: Slot,
    pub occupancy: Occupancy,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingStartedEvent {
    pub room_id: RoomId,
    pub source: PresenceSource,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingStoppedEvent {
    pub room_id: RoomId,
    pub source: PresenceSource,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BubbleClearedEvent {
    pub room_id: RoomId,
    pub slot: Slot,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClosedEvent {
    pub room_id: RoomId,
    pub participant_id: ParticipantId,
    pub timestamp: DateTime<Utc>,
}
