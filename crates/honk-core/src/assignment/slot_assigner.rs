//! Slot assigner - binds a participant to one of the two room slots
//!
//! Resolution is evaluated in a fixed priority order:
//!
//! 1. caller already owns slot A
//! 2. caller already owns slot B
//! 3. both slots free: claim A
//! 4. only A owned: claim B
//! 5. only B owned: claim A
//! 6. both owned by others: lexicographic guess, no write
//!
//! Cases 3-5 prefer slot A so that two racers on an empty room write the
//! same field. The store keeps one of the two writes (last writer wins per
//! scalar field); the loser sees a foreign owner on slot A at its next read
//! and falls into case 4. No consensus happens here.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::entities::{Room, Slot};
use crate::error::DomainError;
use crate::value_objects::ParticipantId;

/// How the caller came to hold its slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Occupancy {
    /// Caller was already the recorded owner
    Owner,
    /// Caller just claimed a free slot; the owner field must be written
    Claimed,
    /// Room full of other owners; fallback slot, owner fields untouched
    Guest,
}

/// Result of resolving a participant's slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotResolution {
    pub slot: Slot,
    pub occupancy: Occupancy,
}

impl SlotResolution {
    const fn new(slot: Slot, occupancy: Occupancy) -> Self {
        Self { slot, occupancy }
    }

    /// Slot whose owner field has to be persisted, if any
    pub fn claim(&self) -> Option<Slot> {
        match self.occupancy {
            Occupancy::Claimed => Some(self.slot),
            Occupancy::Owner | Occupancy::Guest => None,
        }
    }

    /// Check if the slot is really held (not a fallback guess)
    pub fn is_authoritative(&self) -> bool {
        !matches!(self.occupancy, Occupancy::Guest)
    }
}

/// Stateless slot assignment service
#[derive(Debug, Clone, Copy, Default)]
pub struct SlotAssigner;

impl SlotAssigner {
    pub fn new() -> Self {
        Self
    }

    /// Resolve the slot of `participant_id` in `room`.
    ///
    /// May claim one free owner field on the room snapshot; the returned
    /// resolution says which one so the caller can write it to the store.
    /// An owner field that is already set is never overwritten.
    pub fn resolve(
        &self,
        room: &mut Room,
        participant_id: &str,
    ) -> Result<SlotResolution, DomainError> {
        let participant = ParticipantId::parse(participant_id)?;
        Ok(self.resolve_participant(room, &participant))
    }

    /// Same as [`resolve`](Self::resolve) for an already validated identity
    pub fn resolve_participant(
        &self,
        room: &mut Room,
        participant: &ParticipantId,
    ) -> SlotResolution {
        if room.slot_a_owner.as_ref() == Some(participant) {
            return SlotResolution::new(Slot::A, Occupancy::Owner);
        }
        if room.slot_b_owner.as_ref() == Some(participant) {
            return SlotResolution::new(Slot::B, Occupancy::Owner);
        }

        let free = match (&room.slot_a_owner, &room.slot_b_owner) {
            (None, None) | (None, Some(_)) => Some(Slot::A),
            (Some(_), None) => Some(Slot::B),
            (Some(_), Some(_)) => None,
        };

        if let Some(slot) = free {
            room.claim(slot, participant);
            debug!(
                room_id = %room.id,
                participant = %participant,
                slot = %slot,
                "Claimed free slot"
            );
            return SlotResolution::new(slot, Occupancy::Claimed);
        }

        let slot = match &room.slot_a_owner {
            Some(owner_a) if participant < owner_a => Slot::A,
            _ => Slot::B,
        };
        warn!(
            room_id = %room.id,
            participant = %participant,
            slot = %slot,
            "Room already has two owners; using fallback slot"
        );
        SlotResolution::new(slot, Occupancy::Guest)
    }
}
