//! [`FieldStore`] over Redis hashes.

use std::collections::HashMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use honk_core::{
    DomainError, FieldStore, ParticipantId, Room, RoomChange, RoomId, RoomLoad, Slot,
    StoreResult, WriterId,
};
use redis::{AsyncCommands, Script};
use tokio::sync::broadcast;
use tracing::instrument;
use uuid::Uuid;

use super::change_feed::spawn_change_feed;
use super::pool::{RedisPool, RedisPoolConfig};
use super::{room_channel, room_key};
use crate::error::{StoreError, StoreErrorResult};

const CREATED_AT_FIELD: &str = "created_at";

/// KEYS[1] room hash; ARGV field, value, set (1) or delete (0), channel,
/// change payload. Returns 0 without writing when the room is gone.
const WRITE_FIELD_LUA: &str = r"
if redis.call('EXISTS', KEYS[1]) == 0 then
    return 0
end
if ARGV[3] == '1' then
    redis.call('HSET', KEYS[1], ARGV[1], ARGV[2])
else
    redis.call('HDEL', KEYS[1], ARGV[1])
end
redis.call('PUBLISH', ARGV[4], ARGV[5])
return 1
";

static WRITE_FIELD_SCRIPT: LazyLock<Script> = LazyLock::new(|| Script::new(WRITE_FIELD_LUA));
const DEFAULT_FEED_CAPACITY: usize = 256;

/// Redis field store
#[derive(Debug, Clone)]
pub struct RedisFieldStore {
    pool: RedisPool,
    feed_capacity: usize,
}

impl RedisFieldStore {
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self {
            pool,
            feed_capacity: DEFAULT_FEED_CAPACITY,
        }
    }

    /// Create a store from the application's Redis settings
    pub fn from_config(config: &honk_common::RedisConfig) -> StoreErrorResult<Self> {
        Ok(Self::new(RedisPool::new(&RedisPoolConfig::from(config))?))
    }

    /// Administrative clear of an owner field
    pub async fn clear_owner(&self, id: &RoomId, slot: Slot) -> StoreResult<()> {
        self.write_field(id, slot.owner_field(), None, &RoomChange::Owner { slot, owner: None })
            .await
    }

    pub fn pool(&self) -> &RedisPool {
        &self.pool
    }

    async fn room_exists(&self, id: &RoomId) -> StoreErrorResult<bool> {
        let mut conn = self.pool.get().await?;
        let exists: bool = conn.exists(room_key(id)).await?;
        Ok(exists)
    }

    /// Set (or delete) one hash field and publish the change, in one
    /// script so a room that disappeared is never partially recreated
    async fn write_field(
        &self,
        id: &RoomId,
        field: &str,
        value: Option<&str>,
        change: &RoomChange,
    ) -> StoreResult<()> {
        if !self.publish_write(id, field, value, change).await? {
            return Err(DomainError::RoomNotFound(id.clone()));
        }
        Ok(())
    }

    async fn publish_write(
        &self,
        id: &RoomId,
        field: &str,
        value: Option<&str>,
        change: &RoomChange,
    ) -> StoreErrorResult<bool> {
        let payload = serde_json::to_string(change)?;
        let mut conn = self.pool.get().await?;

        let written: i64 = WRITE_FIELD_SCRIPT
            .key(room_key(id))
            .arg(field)
            .arg(value.unwrap_or_default())
            .arg(u8::from(value.is_some()))
            .arg(room_channel(id))
            .arg(payload)
            .invoke_async(&mut conn)
            .await?;

        tracing::trace!(room_id = %id, field = field, written, "Field written");
        Ok(written == 1)
    }
}

/// Rebuild a room from its hash fields
fn room_from_fields(id: &RoomId, mut fields: HashMap<String, String>) -> StoreErrorResult<Room> {
    let mut owner = |slot: Slot| -> StoreErrorResult<Option<ParticipantId>> {
        match fields.remove(slot.owner_field()) {
            Some(raw) if !raw.is_empty() => ParticipantId::parse(raw)
                .map(Some)
                .map_err(|e| StoreError::CorruptRecord(e.to_string())),
            _ => Ok(None),
        }
    };
    let slot_a_owner = owner(Slot::A)?;
    let slot_b_owner = owner(Slot::B)?;

    let mut room = Room::new(id.clone());
    room.slot_a_owner = slot_a_owner;
    room.slot_b_owner = slot_b_owner;
    room.slot_a_text = fields.remove(Slot::A.text_field()).unwrap_or_default();
    room.slot_b_text = fields.remove(Slot::B.text_field()).unwrap_or_default();
    Ok(room)
}

#[async_trait]
impl FieldStore for RedisFieldStore {
    #[instrument(skip(self))]
    async fn create_room(&self) -> StoreResult<RoomId> {
        let id = RoomId::new(Uuid::new_v4().to_string());
        let created_at = chrono::Utc::now().timestamp_millis().to_string();

        let mut conn = self.pool.get().await.map_err(StoreError::from)?;
        conn.hset_multiple::<_, _, _, ()>(
            room_key(&id),
            &[
                (Slot::A.text_field(), ""),
                (Slot::B.text_field(), ""),
                (CREATED_AT_FIELD, created_at.as_str()),
            ],
        )
        .await
        .map_err(StoreError::from)?;

        tracing::debug!(room_id = %id, "Room created");
        Ok(id)
    }

    #[instrument(skip(self))]
    async fn load_room(&self, id: &RoomId) -> StoreResult<RoomLoad> {
        let mut conn = self.pool.get().await.map_err(StoreError::from)?;
        let fields: HashMap<String, String> = conn
            .hgetall(room_key(id))
            .await
            .map_err(StoreError::from)?;

        if fields.is_empty() {
            return Ok(RoomLoad::NotFound);
        }
        Ok(RoomLoad::Ready(room_from_fields(id, fields)?))
    }

    #[instrument(skip(self))]
    async fn write_owner(
        &self,
        id: &RoomId,
        slot: Slot,
        owner: &ParticipantId,
    ) -> StoreResult<()> {
        let change = RoomChange::Owner {
            slot,
            owner: Some(owner.clone()),
        };
        self.write_field(id, slot.owner_field(), Some(owner.as_str()), &change)
            .await
    }

    #[instrument(skip(self, text), fields(len = text.len()))]
    async fn apply_text_diff(
        &self,
        id: &RoomId,
        slot: Slot,
        text: &str,
        writer: WriterId,
    ) -> StoreResult<()> {
        let change = RoomChange::Text {
            slot,
            text: text.to_string(),
            writer,
        };
        self.write_field(id, slot.text_field(), Some(text), &change)
            .await
    }

    async fn subscribe(&self, id: &RoomId) -> StoreResult<broadcast::Receiver<RoomChange>> {
        if !self.room_exists(id).await? {
            return Err(DomainError::RoomNotFound(id.clone()));
        }
        let (changes, _task) =
            spawn_change_feed(self.pool.client(), id, self.feed_capacity).await?;
        Ok(changes)
    }
}
