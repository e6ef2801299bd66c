//! In-memory field store.
//!
//! Every field write replaces the previous value under the room's map shard
//! lock, so concurrent writers to one field resolve last-writer-wins and
//! the change feed observes writes in the order they were applied.

use async_trait::async_trait;
use dashmap::DashMap;
use honk_core::{
    DomainError, FieldStore, ParticipantId, Room, RoomChange, RoomId, RoomLoad, Slot,
    StoreResult, WriterId,
};
use tokio::sync::broadcast;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Default change feed buffer per room
const DEFAULT_FEED_CAPACITY: usize = 256;

#[derive(Debug)]
struct RoomEntry {
    room: Room,
    synced: bool,
    changes: broadcast::Sender<RoomChange>,
}

impl RoomEntry {
    fn new(room: Room, synced: bool, capacity: usize) -> Self {
        let (changes, _) = broadcast::channel(capacity);
        Self {
            room,
            synced,
            changes,
        }
    }
}

/// Process-local collaborative store
#[derive(Debug)]
pub struct MemoryStore {
    rooms: DashMap<RoomId, RoomEntry>,
    feed_capacity: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_feed_capacity(DEFAULT_FEED_CAPACITY)
    }

    /// Create a store whose per-room change feeds buffer `capacity` changes
    #[must_use]
    pub fn with_feed_capacity(capacity: usize) -> Self {
        Self {
            rooms: DashMap::new(),
            feed_capacity: capacity.max(1),
        }
    }

    /// Register a room that is known but still syncing; loads answer
    /// `Pending` until [`mark_synced`](Self::mark_synced) is called
    pub fn insert_pending(&self) -> RoomId {
        let id = RoomId::new(Uuid::new_v4().to_string());
        self.rooms.insert(
            id.clone(),
            RoomEntry::new(Room::new(id.clone()), false, self.feed_capacity),
        );
        id
    }

    /// Finish syncing a pending room. Returns false for unknown rooms.
    pub fn mark_synced(&self, id: &RoomId) -> bool {
        match self.rooms.get_mut(id) {
            Some(mut entry) => {
                entry.synced = true;
                true
            }
            None => false,
        }
    }

    /// Administrative clear of an owner field
    pub fn clear_owner(&self, id: &RoomId, slot: Slot) -> StoreResult<()> {
        self.mutate(id, RoomChange::Owner { slot, owner: None })
    }

    /// Current state of a room, whatever its sync status
    pub fn snapshot(&self, id: &RoomId) -> Option<Room> {
        self.rooms.get(id).map(|entry| entry.room.clone())
    }

    /// Number of known rooms
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    fn mutate(&self, id: &RoomId, change: RoomChange) -> StoreResult<()> {
        let mut entry = self
            .rooms
            .get_mut(id)
            .ok_or_else(|| DomainError::RoomNotFound(id.clone()))?;
        if !entry.synced {
            return Err(DomainError::RoomNotLoaded(id.clone()));
        }

        entry.room.apply_change(&change);
        // No subscribers is fine
        let _ = entry.changes.send(change);
        Ok(())
    }
}

#[async_trait]
impl FieldStore for MemoryStore {
    #[instrument(skip(self))]
    async fn create_room(&self) -> StoreResult<RoomId> {
        let id = RoomId::new(Uuid::new_v4().to_string());
        self.rooms.insert(
            id.clone(),
            RoomEntry::new(Room::new(id.clone()), true, self.feed_capacity),
        );
        debug!(room_id = %id, "Room created");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn load_room(&self, id: &RoomId) -> StoreResult<RoomLoad> {
        Ok(match self.rooms.get(id) {
            Some(entry) if entry.synced => RoomLoad::Ready(entry.room.clone()),
            Some(_) => RoomLoad::Pending,
            None => RoomLoad::NotFound,
        })
    }

    #[instrument(skip(self))]
    async fn write_owner(
        &self,
        id: &RoomId,
        slot: Slot,
        owner: &ParticipantId,
    ) -> StoreResult<()> {
        self.mutate(
            id,
            RoomChange::Owner {
                slot,
                owner: Some(owner.clone()),
            },
        )
    }

    #[instrument(skip(self, text), fields(len = text.len()))]
    async fn apply_text_diff(
        &self,
        id: &RoomId,
        slot: Slot,
        text: &str,
        writer: WriterId,
    ) -> StoreResult<()> {
        self.mutate(
            id,
            RoomChange::Text {
                slot,
                text: text.to_string(),
                writer,
            },
        )
    }

    async fn subscribe(&self, id: &RoomId) -> StoreResult<broadcast::Receiver<RoomChange>> {
        self.rooms
            .get(id)
            .map(|entry| entry.changes.subscribe())
            .ok_or_else(|| DomainError::RoomNotFound(id.clone()))
    }
}
