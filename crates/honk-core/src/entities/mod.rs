//! Domain entities - core business objects

mod room;

pub use room::{Room, RoomChange, RoomLoad, Slot};
