//! Honk demo entry point
//!
//! Creates a room and plays a short scripted conversation between two
//! participants, logging slot resolution, typing signals, and bubble
//! layouts.
//!
//! Run with:
//! ```bash
//! cargo run -p honk-session --bin honk-demo
//! ```
//!
//! Configuration is loaded from environment variables.

use std::sync::Arc;
use std::time::Duration;

use honk_common::{
    try_init_tracing_with_config, AppConfig, AppError, AppResult, StoreBackend, TracingConfig,
};
use honk_core::{DisplayName, DomainError, FieldStore, HonkEvent, RoomId};
use honk_session::{
    ChatSession, FixedIdentity, SessionDriver, SessionInput, SessionOptions, TokioScheduler,
};
use honk_store::{MemoryStore, RedisFieldStore};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

const KEYSTROKE: Duration = Duration::from_millis(150);

#[tokio::main]
async fn main() {
    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = try_init_tracing_with_config(TracingConfig::from_settings(&config.app)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run(config).await {
        error!(error = %e, code = e.error_code(), "Demo failed");
        std::process::exit(1);
    }
}

async fn run(config: AppConfig) -> AppResult<()> {
    info!(app = %config.app.name, env = ?config.app.env, store = ?config.store.backend, "Starting honk demo");

    let store = connect_store(&config).await?;
    let room_id = store.create_room().await?;
    info!(room_id = %room_id, share_path = %room_id.share_path(), "Room created");

    let options = SessionOptions::from(&config.presence);
    let alice_name = DisplayName::or_random(config.app.display_name.as_deref());
    let alice = Participant::join(&store, &room_id, alice_name, options).await?;
    let bob = Participant::join(&store, &room_id, DisplayName::random(), options).await?;

    alice.type_out("honk").await;
    bob.type_out("HONK HONK").await;
    alice.type_out("honk honk honk").await;

    // Let both debounce windows run out
    let settle = options.local_debounce.max(options.remote_debounce) + Duration::from_millis(250);
    tokio::time::sleep(settle).await;

    alice.send(SessionInput::Clear).await;
    tokio::time::sleep(KEYSTROKE).await;

    bob.leave().await?;
    alice.leave().await?;
    info!("Demo finished");
    Ok(())
}

async fn connect_store(config: &AppConfig) -> AppResult<Arc<dyn FieldStore>> {
    match (config.store.backend, config.store.redis.as_ref()) {
        (StoreBackend::Redis, Some(redis)) => {
            let store = RedisFieldStore::from_config(redis).map_err(DomainError::from)?;
            store
                .pool()
                .health_check()
                .await
                .map_err(DomainError::from)?;
            info!("Connected to Redis");
            Ok(Arc::new(store))
        }
        _ => Ok(Arc::new(MemoryStore::new())),
    }
}

/// One scripted participant with its own driver task
struct Participant {
    name: DisplayName,
    inputs: mpsc::Sender<SessionInput>,
    driver: JoinHandle<AppResult<()>>,
    listener: JoinHandle<()>,
}

impl Participant {
    async fn join(
        store: &Arc<dyn FieldStore>,
        room_id: &RoomId,
        name: DisplayName,
        options: SessionOptions,
    ) -> AppResult<Self> {
        let identity = FixedIdentity::anonymous_named(name.clone());
        let (scheduler, timers) = TokioScheduler::new();
        let session =
            ChatSession::join(Arc::clone(store), &identity, scheduler, room_id, options).await?;
        info!(name = %name, slot = %session.slot(), occupancy = ?session.resolution().occupancy, "Participant joined");

        let listener = tokio::spawn(log_events(name.clone(), session.subscribe_events()));
        let (inputs, rx) = mpsc::channel(32);
        let driver = SessionDriver::new(session, rx, timers)
            .ok_or_else(|| anyhow::anyhow!("change feed already taken"))?;

        let driver_name = name.clone();
        let driver = tokio::spawn(async move {
            let session = driver.run().await?;
            let layout = session.layout();
            info!(
                name = %driver_name,
                mine = layout.mine_percent,
                other = layout.other_percent,
                other_text = session.other_text(),
                "Final layout"
            );
            Ok::<(), AppError>(())
        });

        Ok(Self {
            name,
            inputs,
            driver,
            listener,
        })
    }

    async fn send(&self, input: SessionInput) {
        if self.inputs.send(input).await.is_err() {
            error!(name = %self.name, "Session loop already stopped");
        }
    }

    /// Type `text` one character at a time
    async fn type_out(&self, text: &str) {
        let mut typed = String::with_capacity(text.len());
        for ch in text.chars() {
            typed.push(ch);
            self.send(SessionInput::Type(typed.clone())).await;
            tokio::time::sleep(KEYSTROKE).await;
        }
    }

    async fn leave(self) -> AppResult<()> {
        self.send(SessionInput::Leave).await;
        let result = self
            .driver
            .await
            .map_err(|e| anyhow::anyhow!("session task failed: {e}"))?;
        // The event channel closes with the session
        let _ = self.listener.await;
        result
    }
}

async fn log_events(name: DisplayName, mut events: broadcast::Receiver<HonkEvent>) {
    loop {
        match events.recv().await {
            Ok(event) => info!(name = %name, event = event.event_type(), "Session event"),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                warn!(name = %name, skipped, "Event listener lagged");
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}
