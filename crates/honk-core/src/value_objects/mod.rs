//! Value objects - immutable types that represent domain concepts

mod display_name;
mod participant_id;
mod room_id;
mod writer_id;

pub use display_name::DisplayName;
pub use participant_id::ParticipantId;
pub use room_id::RoomId;
pub use writer_id::WriterId;
