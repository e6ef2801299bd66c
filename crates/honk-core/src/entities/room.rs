//! Room entity - two owner fields and two live text bubbles

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;
use crate::value_objects::{ParticipantId, RoomId, WriterId};

/// One of the two text slots of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Slot {
    A,
    B,
}

impl Slot {
    /// The slot held by the other participant
    #[inline]
    pub const fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }

    /// Store field holding this slot's owner
    pub const fn owner_field(self) -> &'static str {
        match self {
            Self::A => "slot_a_owner",
            Self::B => "slot_b_owner",
        }
    }

    /// Store field holding this slot's text
    pub const fn text_field(self) -> &'static str {
        match self {
            Self::A => "slot_a_text",
            Self::B => "slot_b_text",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::A => write!(f, "a"),
            Self::B => write!(f, "b"),
        }
    }
}

/// Shared room state as last observed from the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub slot_a_owner: Option<ParticipantId>,
    pub slot_b_owner: Option<ParticipantId>,
    pub slot_a_text: String,
    pub slot_b_text: String,
}

impl Room {
    /// Create an empty room (no owners, empty bubbles)
    pub fn new(id: RoomId) -> Self {
        Self {
            id,
            slot_a_owner: None,
            slot_b_owner: None,
            slot_a_text: String::new(),
            slot_b_text: String::new(),
        }
    }

    /// Owner of a slot, if claimed
    pub fn owner(&self, slot: Slot) -> Option<&ParticipantId> {
        match slot {
            Slot::A => self.slot_a_owner.as_ref(),
            Slot::B => self.slot_b_owner.as_ref(),
        }
    }

    /// Current text of a slot
    pub fn text(&self, slot: Slot) -> &str {
        match slot {
            Slot::A => &self.slot_a_text,
            Slot::B => &self.slot_b_text,
        }
    }

    /// Replace a slot's text
    pub fn set_text(&mut self, slot: Slot, text: impl Into<String>) {
        match slot {
            Slot::A => self.slot_a_text = text.into(),
            Slot::B => self.slot_b_text = text.into(),
        }
    }

    /// Claim an unowned slot. Returns `false` and leaves the room untouched
    /// when the slot already has an owner.
    pub fn claim(&mut self, slot: Slot, participant: &ParticipantId) -> bool {
        let field = match slot {
            Slot::A => &mut self.slot_a_owner,
            Slot::B => &mut self.slot_b_owner,
        };
        if field.is_some() {
            return false;
        }
        *field = Some(participant.clone());
        true
    }

    /// Check if both slots have an owner
    pub fn is_full(&self) -> bool {
        self.slot_a_owner.is_some() && self.slot_b_owner.is_some()
    }

    /// Slot owned by a participant, if any
    pub fn slot_of(&self, participant: &ParticipantId) -> Option<Slot> {
        if self.slot_a_owner.as_ref() == Some(participant) {
            Some(Slot::A)
        } else if self.slot_b_owner.as_ref() == Some(participant) {
            Some(Slot::B)
        } else {
            None
        }
    }

    /// Fold a store notification into this snapshot.
    ///
    /// Owner values coming from the store are authoritative: they reflect
    /// the store's per-field resolution and replace whatever was seen before.
    pub fn apply_change(&mut self, change: &RoomChange) {
        match change {
            RoomChange::Owner { slot, owner } => match slot {
                Slot::A => self.slot_a_owner.clone_from(owner),
                Slot::B => self.slot_b_owner.clone_from(owner),
            },
            RoomChange::Text { slot, text, .. } => self.set_text(*slot, text.as_str()),
        }
    }
}

/// A single field mutation observed on a room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RoomChange {
    Owner {
        slot: Slot,
        owner: Option<ParticipantId>,
    },
    Text {
        slot: Slot,
        text: String,
        /// Session that made the write
        writer: WriterId,
    },
}

impl RoomChange {
    /// Slot the change applies to
    pub fn slot(&self) -> Slot {
        match self {
            Self::Owner { slot, .. } | Self::Text { slot, .. } => *slot,
        }
    }
}

/// Outcome of asking the store for a room
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomLoad {
    /// Room fully materialised
    Ready(Room),
    /// Room exists but has not finished syncing
    Pending,
    /// No such room
    NotFound,
}

impl RoomLoad {
    /// Extract the room, mapping the unresolvable states to domain errors
    pub fn into_room(self, id: &RoomId) -> Result<Room, DomainError> {
        match self {
            Self::Ready(room) => Ok(room),
            Self::Pending => Err(DomainError::RoomNotLoaded(id.clone())),
            Self::NotFound => Err(DomainError::RoomNotFound(id.clone())),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}
