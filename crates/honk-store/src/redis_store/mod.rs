//! Redis-backed field store.
//!
//! Layout:
//! - `honk:room:{id}` hash holding `slot_a_owner`, `slot_b_owner`,
//!   `slot_a_text`, `slot_b_text` and `created_at`
//! - `honk:room:{id}:changes` Pub/Sub channel carrying JSON [`RoomChange`]s
//!
//! `HSET` on a single field is atomic and last-writer-wins, which is the
//! consistency the slot assigner relies on.
//!
//! [`RoomChange`]: honk_core::RoomChange

mod change_feed;
mod field_store;
mod pool;

pub use change_feed::spawn_change_feed;
pub use field_store::RedisFieldStore;
pub use pool::{RedisPool, RedisPoolConfig};

/// Key prefix for room hashes
pub const ROOM_KEY_PREFIX: &str = "honk:room:";
/// Suffix of the per-room change channel
pub const ROOM_CHANNEL_SUFFIX: &str = ":changes";

/// Hash key of a room
pub(crate) fn room_key(id: &honk_core::RoomId) -> String {
    format!("{ROOM_KEY_PREFIX}{id}")
}

/// Pub/Sub channel of a room
pub(crate) fn room_channel(id: &honk_core::RoomId) -> String {
    format!("{ROOM_KEY_PREFIX}{id}{ROOM_CHANNEL_SUFFIX}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use honk_core::RoomId;

    #[test]
    fn test_key_names() {
        let id = RoomId::new("abc");
        assert_eq!(room_key(&id), "honk:room:abc");
        assert_eq!(room_channel(&id), "honk:room:abc:changes");
    }
}
