//! One participant's session in a room
//!
//! A session joins a room through the [`FieldStore`], settles which slot
//! belongs to the caller, and feeds two presence trackers: the local one
//! from keystrokes and the remote one from text changes on the other slot.
//! Owner changes observed on the feed trigger a fresh resolution so a
//! participant whose claim was overwritten moves to the free slot.
//!
//! Text writes go through a per-session [`TextWriter`] and are tagged with
//! the session's [`WriterId`]. Feed changes carrying that id are echoes;
//! own-slot changes from any other writer (another tab with the same
//! identity, or a guest) are adopted as the new local baseline.

use std::sync::Arc;
use std::time::Duration;

use honk_common::PresenceConfig;
use honk_core::{
    BubbleLayout, DomainError, FieldStore, HonkEvent, IdentityProvider, Occupancy,
    ParticipantId, PresenceSource, PresenceTracker, PresenceTransition, Room, RoomChange,
    RoomId, Slot, SlotAssigner, SlotResolution, TimerHandle, TimerScheduler, WriterId,
};
use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};

use super::text_writer::TextWriter;

/// Result type for session operations
pub type SessionResult<T> = Result<T, DomainError>;

const DEFAULT_EVENT_CAPACITY: usize = 64;

/// Tunables for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub local_debounce: Duration,
    pub remote_debounce: Duration,
    pub event_capacity: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from(&PresenceConfig::default())
    }
}

impl From<&PresenceConfig> for SessionOptions {
    fn from(config: &PresenceConfig) -> Self {
        Self {
            local_debounce: config.local_debounce(),
            remote_debounce: config.remote_debounce(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

/// A joined room, seen from one participant
pub struct ChatSession {
    store: Arc<dyn FieldStore>,
    assigner: SlotAssigner,
    participant: ParticipantId,
    writer: WriterId,
    text_writer: TextWriter,
    room: Room,
    resolution: SlotResolution,
    local: PresenceTracker,
    remote: PresenceTracker,
    changes: Option<broadcast::Receiver<RoomChange>>,
    events: broadcast::Sender<HonkEvent>,
    closed: bool,
}

impl std::fmt::Debug for ChatSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("participant", &self.participant)
            .field("writer", &self.writer)
            .field("writer_running", &!self.text_writer.is_finished())
            .field("room", &self.room.id)
            .field("resolution", &self.resolution)
            .field("local", &self.local)
            .field("remote", &self.remote)
            .field("closed", &self.closed)
            .finish_non_exhaustive()
    }
}

impl ChatSession {
    /// Join a room as the participant named by `identity`
    ///
    /// Fails with `RoomNotFound` for unknown rooms and `RoomNotLoaded`
    /// while the store is still syncing the room.
    #[instrument(skip_all, fields(room_id = %room_id))]
    pub async fn join(
        store: Arc<dyn FieldStore>,
        identity: &dyn IdentityProvider,
        scheduler: Arc<dyn TimerScheduler>,
        room_id: &RoomId,
        options: SessionOptions,
    ) -> SessionResult<Self> {
        let participant = identity.current_participant_id();

        // Subscribe before loading so no write between the two is missed
        let changes = store.subscribe(room_id).await?;
        let mut room = store.load_room(room_id).await?.into_room(room_id)?;

        let assigner = SlotAssigner::new();
        let resolution = assigner.resolve_participant(&mut room, &participant);
        if let Some(slot) = resolution.claim() {
            store.write_owner(room_id, slot, &participant).await?;
        }

        let mut local = PresenceTracker::new(
            PresenceSource::Local,
            options.local_debounce,
            Arc::clone(&scheduler),
        )?;
        let mut remote =
            PresenceTracker::new(PresenceSource::Remote, options.remote_debounce, scheduler)?;
        local.observe_snapshot(room.text(resolution.slot));
        remote.observe_snapshot(room.text(resolution.slot.other()));

        let (events, _) = broadcast::channel(options.event_capacity.max(1));
        let writer = WriterId::random();
        let text_writer = TextWriter::spawn(Arc::clone(&store), room_id.clone(), writer);

        info!(
            participant_id = %participant,
            %writer,
            slot = %resolution.slot,
            occupancy = ?resolution.occupancy,
            "Joined room"
        );
        if resolution.occupancy == Occupancy::Guest {
            warn!(participant_id = %participant, "Room already has two owners, joining as guest");
        }

        Ok(Self {
            store,
            assigner,
            participant,
            writer,
            text_writer,
            room,
            resolution,
            local,
            remote,
            changes: Some(changes),
            events,
            closed: false,
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn room_id(&self) -> &RoomId {
        &self.room.id
    }

    pub fn participant(&self) -> &ParticipantId {
        &self.participant
    }

    /// Tag carried by this session's text writes
    pub fn writer(&self) -> WriterId {
        self.writer
    }

    /// The slot whose text this participant writes
    pub fn slot(&self) -> Slot {
        self.resolution.slot
    }

    pub fn resolution(&self) -> SlotResolution {
        self.resolution
    }

    /// Local view of the room
    pub fn room(&self) -> &Room {
        &self.room
    }

    pub fn my_text(&self) -> &str {
        self.local.last_text()
    }

    pub fn other_text(&self) -> &str {
        self.room.text(self.slot().other())
    }

    pub fn is_typing(&self) -> bool {
        self.local.is_active()
    }

    pub fn is_other_typing(&self) -> bool {
        self.remote.is_active()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Bubble split for the current presence signals
    pub fn layout(&self) -> BubbleLayout {
        BubbleLayout::compute(self.local.is_active(), self.other_text())
    }

    /// Listen to presence and lifecycle events from now on
    pub fn subscribe_events(&self) -> broadcast::Receiver<HonkEvent> {
        self.events.subscribe()
    }

    /// Hand the room change feed to whoever drives this session.
    /// Returns `None` once taken.
    pub fn take_changes(&mut self) -> Option<broadcast::Receiver<RoomChange>> {
        self.changes.take()
    }

    // =========================================================================
    // Inputs
    // =========================================================================

    /// The local participant edited their bubble. The store write is
    /// queued; failures are logged by the writer task.
    #[instrument(skip(self, text), fields(room_id = %self.room.id, len = text.len()))]
    pub fn on_local_input(&mut self, text: &str) -> SessionResult<()> {
        self.ensure_open()?;
        let slot = self.slot();
        self.room.set_text(slot, text);
        let transition = self.local.on_text_changed(text);
        self.emit_transition(PresenceSource::Local, transition);

        self.text_writer.write(slot, text);
        Ok(())
    }

    /// Empty the local bubble and stop the typing signal
    #[instrument(skip(self), fields(room_id = %self.room.id))]
    pub fn clear_my_bubble(&mut self) -> SessionResult<()> {
        self.ensure_open()?;
        let slot = self.slot();
        self.room.set_text(slot, "");
        let transition = self.local.reset();
        self.emit_transition(PresenceSource::Local, transition);
        self.emit(HonkEvent::bubble_cleared(self.room.id.clone(), slot));

        self.text_writer.write(slot, "");
        Ok(())
    }

    /// Wait until every text write queued so far has reached the store
    pub async fn flush(&self) {
        self.text_writer.flush().await;
    }

    /// Apply one change observed on the room feed
    pub async fn on_remote_change(&mut self, change: RoomChange) -> SessionResult<()> {
        self.ensure_open()?;
        match &change {
            RoomChange::Text { slot, text, writer } if *slot == self.slot().other() => {
                self.room.set_text(*slot, text.as_str());
                // Skip presence for our own late write to a slot we left
                if *writer != self.writer {
                    let transition = self.remote.on_text_changed(text.clone());
                    self.emit_transition(PresenceSource::Remote, transition);
                }
                Ok(())
            }
            RoomChange::Text { writer, .. } if *writer == self.writer => Ok(()),
            RoomChange::Text { slot, text, writer } => {
                // Someone else wrote our slot; no typing signal for it
                debug!(room_id = %self.room.id, %slot, %writer, "Own slot written elsewhere");
                self.room.set_text(*slot, text.as_str());
                self.local.observe_snapshot(text.clone());
                Ok(())
            }
            RoomChange::Owner { slot, owner } => {
                debug!(
                    room_id = %self.room.id,
                    %slot,
                    owner = ?owner.as_ref().map(ParticipantId::as_str),
                    "Owner changed"
                );
                self.room.apply_change(&change);
                self.reconcile().await
            }
        }
    }

    /// Route a fired timer to whichever tracker armed it
    pub fn on_timer_fired(&mut self, handle: TimerHandle) {
        if self.closed {
            return;
        }
        let transition = self.local.on_timer_fired(handle);
        self.emit_transition(PresenceSource::Local, transition);
        let transition = self.remote.on_timer_fired(handle);
        self.emit_transition(PresenceSource::Remote, transition);
    }

    /// Reload the room after the feed dropped changes
    #[instrument(skip(self), fields(room_id = %self.room.id))]
    pub async fn resync(&mut self) -> SessionResult<()> {
        self.ensure_open()?;
        let previous_other = self.other_text().to_string();
        self.reconcile().await?;

        if self.other_text() != previous_other {
            let text = self.other_text().to_string();
            let transition = self.remote.on_text_changed(text);
            self.emit_transition(PresenceSource::Remote, transition);
        }
        Ok(())
    }

    /// Stop both trackers and close the session; later calls are no-ops
    pub fn dispose(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.local.dispose();
        self.remote.dispose();
        self.text_writer.close();
        self.changes = None;
        self.emit(HonkEvent::session_closed(
            self.room.id.clone(),
            self.participant.clone(),
        ));
        info!(room_id = %self.room.id, participant_id = %self.participant, "Left room");
    }

    /// Leave the room
    pub fn leave(mut self) {
        self.dispose();
    }

    // =========================================================================
    // Internals
    // =========================================================================

    /// Re-read the room and move slots if our claim was overwritten
    async fn reconcile(&mut self) -> SessionResult<()> {
        let mut room = self
            .store
            .load_room(&self.room.id)
            .await?
            .into_room(&self.room.id)?;

        let previous = self.resolution;
        if previous.is_authoritative() && room.owner(previous.slot) == Some(&self.participant) {
            self.room = room;
            return Ok(());
        }

        let resolution = self.assigner.resolve_participant(&mut room, &self.participant);
        if let Some(slot) = resolution.claim() {
            self.store
                .write_owner(&self.room.id, slot, &self.participant)
                .await?;
        }
        self.room = room;
        self.resolution = resolution;

        if resolution.slot == previous.slot {
            return Ok(());
        }

        info!(
            room_id = %self.room.id,
            participant_id = %self.participant,
            from = %previous.slot,
            to = %resolution.slot,
            "Slot reassigned"
        );
        self.emit(HonkEvent::slot_resolved(
            self.room.id.clone(),
            self.participant.clone(),
            resolution.slot,
            resolution.occupancy,
        ));

        // Carry what we typed so far over to the new slot
        let mine = self.local.last_text().to_string();
        self.room.set_text(resolution.slot, mine.as_str());
        let other = self.room.text(resolution.slot.other()).to_string();
        self.remote.observe_snapshot(other);
        if !mine.is_empty() {
            self.text_writer.write(resolution.slot, mine);
        }
        Ok(())
    }

    fn ensure_open(&self) -> SessionResult<()> {
        if self.closed {
            return Err(DomainError::InternalError(format!(
                "session for room {} is closed",
                self.room.id
            )));
        }
        Ok(())
    }

    fn emit_transition(&self, source: PresenceSource, transition: Option<PresenceTransition>) {
        if let Some(transition) = transition {
            let active = transition == PresenceTransition::Activated;
            debug!(room_id = %self.room.id, %source, active, "Typing changed");
            self.emit(HonkEvent::typing(self.room.id.clone(), source, active));
        }
    }

    fn emit(&self, event: HonkEvent) {
        // No listeners is fine
        let _ = self.events.send(event);
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.dispose();
    }
}
