//! # honk-session
//!
//! Application layer: joins a room, resolves the caller's slot, feeds the
//! local and remote presence trackers, and drives everything from one
//! event loop.

pub mod identity;
pub mod scheduler;
pub mod session;

pub use identity::FixedIdentity;
pub use scheduler::TokioScheduler;
pub use session::{ChatSession, SessionDriver, SessionInput, SessionOptions, SessionResult};
