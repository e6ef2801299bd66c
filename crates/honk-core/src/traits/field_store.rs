//! Collaborative store and identity traits (ports)
//!
//! The domain layer defines what it needs from the real-time store; adapters
//! in `honk-store` provide it.
//!
//! # Consistency assumption
//!
//! Every write targets exactly one scalar field and is applied atomically.
//! Concurrent writes to the same field resolve last-writer-wins: exactly one
//! value survives and it is one of the written values, never a merge.
//! Slot assignment converges only under this assumption.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::entities::{RoomChange, RoomLoad, Slot};
use crate::error::DomainError;
use crate::value_objects::{ParticipantId, RoomId, WriterId};

/// Result type for store operations
pub type StoreResult<T> = Result<T, DomainError>;

#[async_trait]
pub trait FieldStore: Send + Sync {
    /// Create a room with no owners and empty bubbles
    async fn create_room(&self) -> StoreResult<RoomId>;

    /// Load a room; `Pending` while it has not finished syncing
    async fn load_room(&self, id: &RoomId) -> StoreResult<RoomLoad>;

    /// Write one owner field (last writer wins)
    async fn write_owner(&self, id: &RoomId, slot: Slot, owner: &ParticipantId)
        -> StoreResult<()>;

    /// Replace a bubble's full text; propagation to peers is asynchronous.
    /// `writer` is carried on the resulting change so sessions can
    /// recognise their own echoes.
    async fn apply_text_diff(
        &self,
        id: &RoomId,
        slot: Slot,
        text: &str,
        writer: WriterId,
    ) -> StoreResult<()>;

    /// Subscribe to field mutations on a room, including the caller's own
    async fn subscribe(&self, id: &RoomId) -> StoreResult<broadcast::Receiver<RoomChange>>;
}

/// Source of the local participant's identity
pub trait IdentityProvider: Send + Sync {
    fn current_participant_id(&self) -> ParticipantId;
}
