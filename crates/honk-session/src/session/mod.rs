//! Session lifecycle and its event loop

mod chat_session;
mod driver;
mod text_writer;

pub use chat_session::{ChatSession, SessionOptions, SessionResult};
pub use driver::{SessionDriver, SessionInput};
