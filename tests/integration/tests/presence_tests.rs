//! Typing presence across live sessions
//!
//! Time is paused, so debounce windows elapse on tokio's virtual clock.
//!
//! Run with: cargo test -p integration-tests --test presence_tests

use std::sync::Arc;
use std::time::Duration;

use honk_core::{HonkEvent, PresenceSource, Slot};
use integration_tests::{default_options, settle, FlakyStore, TestParticipant, TestRoom};
use tokio::time::Instant;

fn assert_close(elapsed: Duration, expected_ms: u64) {
    let expected = Duration::from_millis(expected_ms);
    let slack = Duration::from_millis(50);
    assert!(
        elapsed + slack >= expected && elapsed <= expected + slack,
        "expected ~{expected:?}, got {elapsed:?}"
    );
}

// ============================================================================
// Local presence
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_local_typing_stops_after_three_seconds() -> anyhow::Result<()> {
    let room = TestRoom::new().await?;
    let mut alice = room.spawn("alice", default_options()).await?;

    let started = Instant::now();
    alice.type_text("h").await?;
    alice.wait_typing(PresenceSource::Local, true).await?;
    alice.wait_typing(PresenceSource::Local, false).await?;
    assert_close(started.elapsed(), 3000);

    alice.leave().await?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_keystroke_restarts_window() -> anyhow::Result<()> {
    let room = TestRoom::new().await?;
    let mut alice = room.spawn("alice", default_options()).await?;

    let started = Instant::now();
    alice.type_text("h").await?;
    tokio::time::sleep(Duration::from_millis(2000)).await;
    alice.type_text("ho").await?;

    alice.wait_typing(PresenceSource::Local, false).await?;
    assert_close(started.elapsed(), 5000);

    alice.leave().await?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_blank_input_stops_immediately() -> anyhow::Result<()> {
    let room = TestRoom::new().await?;
    let mut alice = room.spawn("alice", default_options()).await?;

    alice.type_text("h").await?;
    alice.wait_typing(PresenceSource::Local, true).await?;

    let started = Instant::now();
    alice.type_text("   ").await?;
    alice.wait_typing(PresenceSource::Local, false).await?;
    assert_close(started.elapsed(), 0);

    let session = alice.leave().await?;
    assert!(!session.is_typing());
    assert_eq!(session.my_text(), "   ");
    Ok(())
}

// ============================================================================
// Remote presence
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_remote_typing_stops_after_two_seconds() -> anyhow::Result<()> {
    let room = TestRoom::new().await?;
    let alice = room.spawn("alice", default_options()).await?;
    let mut bob = room.spawn("bob", default_options()).await?;

    let started = Instant::now();
    alice.type_text("honk").await?;
    bob.wait_typing(PresenceSource::Remote, true).await?;
    bob.wait_typing(PresenceSource::Remote, false).await?;
    assert_close(started.elapsed(), 2000);

    let session = bob.leave().await?;
    assert_eq!(session.other_text(), "honk");
    // Content keeps the other bubble large once typing has stopped
    assert_eq!(session.layout().other_percent, 70);
    alice.leave().await?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_clear_propagates_to_other_side() -> anyhow::Result<()> {
    let room = TestRoom::new().await?;
    let mut alice = room.spawn("alice", default_options()).await?;
    let mut bob = room.spawn("bob", default_options()).await?;

    alice.type_text("honk").await?;
    bob.wait_typing(PresenceSource::Remote, true).await?;

    let started = Instant::now();
    alice.clear().await?;
    let cleared = alice
        .wait_for(|event| matches!(event, HonkEvent::BubbleCleared(_)))
        .await?;
    let HonkEvent::BubbleCleared(cleared) = cleared else {
        unreachable!("filtered above");
    };
    assert_eq!(cleared.slot, Slot::A);

    bob.wait_typing(PresenceSource::Remote, false).await?;
    assert_close(started.elapsed(), 0);

    let session = bob.leave().await?;
    assert_eq!(session.other_text(), "");
    assert_eq!(session.layout().other_percent, 15);
    assert_eq!(session.layout().mine_percent, 15);
    alice.leave().await?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_both_typing_shares_the_body() -> anyhow::Result<()> {
    let room = TestRoom::new().await?;
    let alice = room.spawn("alice", default_options()).await?;
    let bob = room.spawn("bob", default_options()).await?;

    alice.type_text("honk").await?;
    bob.type_text("honk honk").await?;
    settle().await;

    let session = alice.leave().await?;
    assert!(session.is_typing());
    assert_eq!(session.layout().other_percent, 50);
    assert_eq!(session.layout().mine_percent, 50);

    bob.leave().await?;
    Ok(())
}

// ============================================================================
// Lifecycle
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_leave_emits_session_closed() -> anyhow::Result<()> {
    let room = TestRoom::new().await?;
    let mut alice = room.spawn("alice", default_options()).await?;
    alice.type_text("h").await?;
    settle().await;

    alice
        .inputs
        .send(honk_session::SessionInput::Leave)
        .await?;
    let closed = alice
        .wait_for(|event| matches!(event, HonkEvent::SessionClosed(_)))
        .await?;
    assert_eq!(closed.room_id(), &room.room_id);

    let json = serde_json::to_value(&closed)?;
    assert_eq!(json["type"], "SESSION_CLOSED");
    assert_eq!(json["participant_id"], "alice");
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_no_typing_event_after_leave() -> anyhow::Result<()> {
    let room = TestRoom::new().await?;
    let mut alice = room.spawn("alice", default_options()).await?;
    alice.type_text("h").await?;
    alice.wait_typing(PresenceSource::Local, true).await?;

    let mut events = alice.events.resubscribe();
    let session = alice.leave().await?;
    assert!(session.is_closed());
    // Leaving closed the timer; only the close event follows
    tokio::time::sleep(Duration::from_millis(4000)).await;

    let kinds: Vec<_> = std::iter::from_fn(|| events.try_recv().ok())
        .map(|event| event.event_type())
        .collect();
    assert_eq!(kinds, vec!["SESSION_CLOSED"]);
    drop(session);
    Ok(())
}

// ============================================================================
// Store failures
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_failed_write_keeps_session_running() -> anyhow::Result<()> {
    let room = TestRoom::new().await?;
    let flaky = Arc::new(FlakyStore::new(room.store.clone(), 1));
    let mut alice =
        TestParticipant::spawn(flaky.clone(), &room.room_id, "alice", default_options()).await?;
    let mut bob = room.spawn("bob", default_options()).await?;

    // First write is lost, local presence still starts
    alice.type_text("h").await?;
    alice.wait_typing(PresenceSource::Local, true).await?;
    alice.type_text("ho").await?;
    bob.wait_typing(PresenceSource::Remote, true).await?;

    assert_eq!(flaky.remaining_failures(), 0);
    assert_eq!(room.store.snapshot(&room.room_id).unwrap().slot_a_text, "ho");

    let alice = alice.leave().await?;
    assert_eq!(alice.my_text(), "ho");
    let bob = bob.leave().await?;
    assert_eq!(bob.other_text(), "ho");
    Ok(())
}
