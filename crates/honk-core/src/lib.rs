//! # honk-core
//!
//! Domain layer for the two-party honk chat: the room entity with its two
//! text slots, the slot assignment protocol, the typing-presence state
//! machine, and the traits through which the collaborative store and the
//! timer primitive are injected.
//! This crate has zero dependencies on infrastructure (Redis, sockets, etc.);
//! it only uses tokio's `sync` channels for the change feed type.

pub mod assignment;
pub mod entities;
pub mod error;
pub mod events;
pub mod presence;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use assignment::{Occupancy, SlotAssigner, SlotResolution};
pub use entities::{Room, RoomChange, RoomLoad, Slot};
pub use error::DomainError;
pub use events::HonkEvent;
pub use presence::{
    BubbleLayout, ManualScheduler, PresenceSource, PresenceState, PresenceTracker,
    PresenceTransition, TimerHandle, TimerScheduler,
};
pub use traits::{FieldStore, IdentityProvider, StoreResult};
pub use value_objects::{DisplayName, ParticipantId, RoomId, WriterId};
