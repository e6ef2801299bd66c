//! Two-party slot assignment

mod slot_assigner;

pub use slot_assigner::{Occupancy, SlotAssigner, SlotResolution};
