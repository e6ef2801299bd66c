//! Sessions over Redis
//!
//! These tests require a running Redis server.
//! Set REDIS_URL environment variable before running:
//!
//! ```bash
//! export REDIS_URL="redis://127.0.0.1:6379"
//! cargo test -p integration-tests --test redis_session_tests
//! ```

use std::sync::Arc;

use honk_core::{FieldStore, PresenceSource, Slot};
use integration_tests::{fast_options, participant, redis_store, TestParticipant};

#[tokio::test]
async fn test_typing_reaches_other_participant() -> anyhow::Result<()> {
    let Some(store) = redis_store().await else {
        eprintln!("Skipping test: REDIS_URL not set");
        return Ok(());
    };
    let store: Arc<dyn FieldStore> = Arc::new(store);
    let room_id = store.create_room().await?;

    let alice = TestParticipant::spawn(store.clone(), &room_id, "alice", fast_options()).await?;
    let mut bob = TestParticipant::spawn(store.clone(), &room_id, "bob", fast_options()).await?;

    alice.type_text("honk").await?;
    bob.wait_typing(PresenceSource::Remote, true).await?;
    bob.wait_typing(PresenceSource::Remote, false).await?;

    let session = bob.leave().await?;
    assert_eq!(session.slot(), Slot::B);
    assert_eq!(session.other_text(), "honk");
    alice.leave().await?;

    let room = store.load_room(&room_id).await?.into_room(&room_id)?;
    assert_eq!(room.slot_a_owner, Some(participant("alice")));
    assert_eq!(room.slot_b_owner, Some(participant("bob")));
    assert_eq!(room.slot_a_text, "honk");
    Ok(())
}
