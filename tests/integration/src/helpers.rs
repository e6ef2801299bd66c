//! Test helpers for integration tests
//!
//! Spawns driven sessions on a shared store and collects their events.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use honk_core::{
    DomainError, FieldStore, HonkEvent, ParticipantId, PresenceSource, RoomChange, RoomId,
    RoomLoad, Slot, StoreResult, WriterId,
};
use honk_session::{
    ChatSession, SessionDriver, SessionInput, SessionOptions, SessionResult, TokioScheduler,
};
use honk_store::{MemoryStore, RedisFieldStore, RedisPool, RedisPoolConfig};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

use crate::fixtures::identity;

/// Longest a helper waits for an event before failing
pub const EVENT_TIMEOUT: Duration = Duration::from_secs(10);

/// A room on a fresh in-memory store
pub struct TestRoom {
    pub store: Arc<MemoryStore>,
    pub room_id: RoomId,
}

impl TestRoom {
    pub async fn new() -> Result<Self> {
        let store = Arc::new(MemoryStore::new());
        let room_id = store.create_room().await?;
        Ok(Self { store, room_id })
    }

    pub fn field_store(&self) -> Arc<dyn FieldStore> {
        self.store.clone()
    }

    /// Join and start a driver for `id`
    pub async fn spawn(&self, id: &str, options: SessionOptions) -> Result<TestParticipant> {
        TestParticipant::spawn(self.field_store(), &self.room_id, id, options).await
    }
}

/// Store whose first `failures` text writes fail with a transient error
pub struct FlakyStore {
    inner: Arc<MemoryStore>,
    failures: AtomicUsize,
}

impl FlakyStore {
    pub fn new(inner: Arc<MemoryStore>, failures: usize) -> Self {
        Self {
            inner,
            failures: AtomicUsize::new(failures),
        }
    }

    /// Text writes still due to fail
    pub fn remaining_failures(&self) -> usize {
        self.failures.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FieldStore for FlakyStore {
    async fn create_room(&self) -> StoreResult<RoomId> {
        self.inner.create_room().await
    }

    async fn load_room(&self, id: &RoomId) -> StoreResult<RoomLoad> {
        self.inner.load_room(id).await
    }

    async fn write_owner(
        &self,
        id: &RoomId,
        slot: Slot,
        owner: &ParticipantId,
    ) -> StoreResult<()> {
        self.inner.write_owner(id, slot, owner).await
    }

    async fn apply_text_diff(
        &self,
        id: &RoomId,
        slot: Slot,
        text: &str,
        writer: WriterId,
    ) -> StoreResult<()> {
        let failing = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(DomainError::Store("transient".to_string()));
        }
        self.inner.apply_text_diff(id, slot, text, writer).await
    }

    async fn subscribe(&self, id: &RoomId) -> StoreResult<broadcast::Receiver<RoomChange>> {
        self.inner.subscribe(id).await
    }
}

/// A session running on its own driver task
pub struct TestParticipant {
    pub inputs: mpsc::Sender<SessionInput>,
    pub events: broadcast::Receiver<HonkEvent>,
    driver: JoinHandle<SessionResult<ChatSession>>,
}

impl TestParticipant {
    pub async fn spawn(
        store: Arc<dyn FieldStore>,
        room_id: &RoomId,
        id: &str,
        options: SessionOptions,
    ) -> Result<Self> {
        let (scheduler, timers) = TokioScheduler::new();
        let session = ChatSession::join(store, &identity(id), scheduler, room_id, options).await?;
        let events = session.subscribe_events();
        let (inputs, rx) = mpsc::channel(64);
        let driver = SessionDriver::new(session, rx, timers)
            .ok_or_else(|| anyhow!("change feed already taken"))?;

        Ok(Self {
            inputs,
            events,
            driver: tokio::spawn(driver.run()),
        })
    }

    pub async fn type_text(&self, text: &str) -> Result<()> {
        self.inputs
            .send(SessionInput::Type(text.to_string()))
            .await
            .map_err(|_| anyhow!("session loop stopped"))
    }

    pub async fn clear(&self) -> Result<()> {
        self.inputs
            .send(SessionInput::Clear)
            .await
            .map_err(|_| anyhow!("session loop stopped"))
    }

    /// Wait for the next event matching `pred`, skipping others
    pub async fn wait_for<F>(&mut self, pred: F) -> Result<HonkEvent>
    where
        F: Fn(&HonkEvent) -> bool,
    {
        let events = &mut self.events;
        tokio::time::timeout(EVENT_TIMEOUT, async {
            loop {
                let event = events.recv().await?;
                if pred(&event) {
                    return Ok::<_, broadcast::error::RecvError>(event);
                }
            }
        })
        .await
        .map_err(|_| anyhow!("timed out waiting for event"))?
        .map_err(Into::into)
    }

    /// Wait until `source` starts (`true`) or stops (`false`) typing
    pub async fn wait_typing(&mut self, source: PresenceSource, active: bool) -> Result<()> {
        self.wait_for(|event| match event {
            HonkEvent::TypingStarted(e) => active && e.source == source,
            HonkEvent::TypingStopped(e) => !active && e.source == source,
            _ => false,
        })
        .await
        .map(|_| ())
    }

    /// Leave and return the closed session for inspection
    pub async fn leave(self) -> Result<ChatSession> {
        // The loop may already have stopped on an error; the join reports it
        let _ = self.inputs.send(SessionInput::Leave).await;
        Ok(self.driver.await??)
    }
}

/// Let spawned tasks drain their queues
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

/// Connect to the test Redis, if configured
pub async fn redis_store() -> Option<RedisFieldStore> {
    let _ = dotenvy::dotenv();
    let url = std::env::var("REDIS_URL").ok()?;
    let pool = RedisPool::new(&RedisPoolConfig {
        url,
        max_connections: 4,
    })
    .ok()?;
    pool.health_check().await.ok()?;
    Some(RedisFieldStore::new(pool))
}
