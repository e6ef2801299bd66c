//! # honk-store
//!
//! Adapters implementing [`honk_core::FieldStore`].
//!
//! ## Features
//!
//! - **Memory**: in-process store with last-writer-wins fields and a
//!   broadcast change feed, used by tests and the single-process demo
//! - **Redis**: one hash per room, field writes published over Pub/Sub
//!
//! ## Example
//!
//! ```ignore
//! use honk_core::FieldStore;
//! use honk_store::MemoryStore;
//!
//! let store = MemoryStore::new();
//! let room_id = store.create_room().await?;
//! let load = store.load_room(&room_id).await?;
//! ```

pub mod error;
pub mod memory;
pub mod redis_store;

pub use error::{StoreError, StoreErrorResult};
pub use memory::MemoryStore;
pub use redis_store::{
    RedisFieldStore, RedisPool, RedisPoolConfig, ROOM_CHANNEL_SUFFIX, ROOM_KEY_PREFIX,
};
