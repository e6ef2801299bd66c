//! Event loop owning a session
//!
//! Local input, room changes, and fired timers arrive on three channels.
//! The driver serializes them onto the session so tracker state is only
//! ever touched from one task.

use honk_core::{RoomChange, TimerHandle};
use tokio::sync::{broadcast, mpsc};
use tracing::{info, warn};

use super::chat_session::{ChatSession, SessionResult};
use crate::scheduler::FiredTimers;

/// Input from the local participant
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInput {
    /// Full new content of the local bubble
    Type(String),
    /// Empty the local bubble
    Clear,
    /// Leave the room and stop the loop
    Leave,
}

/// Drives one [`ChatSession`] until the participant leaves
#[derive(Debug)]
pub struct SessionDriver {
    session: ChatSession,
    inputs: mpsc::Receiver<SessionInput>,
    changes: broadcast::Receiver<RoomChange>,
    timers: FiredTimers,
}

impl SessionDriver {
    /// Build a driver. Returns `None` if the session's change feed was
    /// already taken by someone else.
    pub fn new(
        mut session: ChatSession,
        inputs: mpsc::Receiver<SessionInput>,
        timers: FiredTimers,
    ) -> Option<Self> {
        let changes = session.take_changes()?;
        Some(Self {
            session,
            inputs,
            changes,
            timers,
        })
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    /// Process events until `Leave`, the input channel closing, or the
    /// room feed ending. Store failures are logged and the loop goes on.
    /// The session is disposed on every exit path.
    pub async fn run(mut self) -> SessionResult<ChatSession> {
        loop {
            tokio::select! {
                input = self.inputs.recv() => match input {
                    Some(SessionInput::Type(text)) => self.session.on_local_input(&text)?,
                    Some(SessionInput::Clear) => self.session.clear_my_bubble()?,
                    Some(SessionInput::Leave) | None => break,
                },
                change = self.changes.recv() => match change {
                    Ok(change) => {
                        if let Err(e) = self.session.on_remote_change(change).await {
                            warn!(room_id = %self.session.room_id(), error = %e, code = e.code(), "Failed to apply room change");
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(room_id = %self.session.room_id(), skipped, "Change feed lagged, resyncing");
                        if let Err(e) = self.session.resync().await {
                            warn!(room_id = %self.session.room_id(), error = %e, code = e.code(), "Resync failed");
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        warn!(room_id = %self.session.room_id(), "Change feed closed");
                        break;
                    }
                },
                Some(handle) = self.timers.recv() => self.fire(handle),
            }
        }

        info!(room_id = %self.session.room_id(), "Session loop finished");
        // Queued text writes land before the caller gets the session back
        self.session.flush().await;
        self.session.dispose();
        Ok(self.session)
    }

    fn fire(&mut self, handle: TimerHandle) {
        self.session.on_timer_fired(handle);
    }
}
