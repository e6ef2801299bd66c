//! Slot assignment across live sessions
//!
//! Run with: cargo test -p integration-tests --test slot_race_tests

use honk_core::{FieldStore, HonkEvent, Occupancy, Slot};
use integration_tests::{default_options, participant, ranked_id, settle, TestRoom};

// ============================================================================
// Joining
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_two_joiners_split_the_room() -> anyhow::Result<()> {
    let room = TestRoom::new().await?;
    let first = room.spawn("alice", default_options()).await?;
    let second = room.spawn("bob", default_options()).await?;
    settle().await;

    let snapshot = room.store.snapshot(&room.room_id).expect("room exists");
    assert_eq!(snapshot.slot_a_owner, Some(participant("alice")));
    assert_eq!(snapshot.slot_b_owner, Some(participant("bob")));

    let alice = first.leave().await?;
    let bob = second.leave().await?;
    assert_eq!(alice.slot(), Slot::A);
    assert_eq!(bob.slot(), Slot::B);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_returning_owner_gets_same_slot_and_text() -> anyhow::Result<()> {
    let room = TestRoom::new().await?;
    let alice = room.spawn("alice", default_options()).await?;
    let bob = room.spawn("bob", default_options()).await?;

    bob.type_text("back soon").await?;
    settle().await;
    bob.leave().await?;

    let returning = room.spawn("bob", default_options()).await?;
    let session = returning.leave().await?;
    assert_eq!(session.slot(), Slot::B);
    assert_eq!(session.resolution().occupancy, Occupancy::Owner);
    assert_eq!(session.my_text(), "back soon");

    alice.leave().await?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_existing_text_is_not_typing() -> anyhow::Result<()> {
    let room = TestRoom::new().await?;
    let bob = room.spawn("bob", default_options()).await?;
    bob.type_text("hello?").await?;
    settle().await;
    bob.leave().await?;

    // bob is slot A here, so alice is B and sees A's text
    let alice = room.spawn("alice", default_options()).await?;
    let session = alice.leave().await?;
    assert_eq!(session.slot(), Slot::B);
    assert_eq!(session.other_text(), "hello?");
    assert!(!session.is_other_typing());
    assert_eq!(session.layout().other_percent, 70);
    assert_eq!(session.layout().mine_percent, 15);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_third_participant_does_not_claim() -> anyhow::Result<()> {
    let room = TestRoom::new().await?;
    let (low, mid, high) = (ranked_id(1), ranked_id(2), ranked_id(3));
    let owner_a = room.spawn(&mid, default_options()).await?;
    let owner_b = room.spawn(&high, default_options()).await?;

    let guest = room.spawn(&low, default_options()).await?;
    settle().await;

    let snapshot = room.store.snapshot(&room.room_id).expect("room exists");
    assert_eq!(snapshot.slot_a_owner, Some(participant(&mid)));
    assert_eq!(snapshot.slot_b_owner, Some(participant(&high)));

    let session = guest.leave().await?;
    assert_eq!(session.resolution().occupancy, Occupancy::Guest);
    assert_eq!(session.slot(), Slot::A);

    owner_a.leave().await?;
    owner_b.leave().await?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_two_tabs_with_same_identity_share_text() -> anyhow::Result<()> {
    let room = TestRoom::new().await?;
    let tab1 = room.spawn("alice", default_options()).await?;
    let tab2 = room.spawn("alice", default_options()).await?;
    let mut tab2_events = tab2.events.resubscribe();

    tab1.type_text("hi from tab1").await?;
    settle().await;

    let tab2 = tab2.leave().await?;
    assert_eq!(tab2.slot(), Slot::A);
    assert_eq!(tab2.my_text(), "hi from tab1");
    assert_eq!(tab2.room().slot_a_text, "hi from tab1");
    // The other tab's keystrokes are not our typing
    let typing = std::iter::from_fn(|| tab2_events.try_recv().ok())
        .filter(|event| matches!(event, HonkEvent::TypingStarted(_)))
        .count();
    assert_eq!(typing, 0);

    let tab1 = tab1.leave().await?;
    assert_eq!(tab1.my_text(), "hi from tab1");
    Ok(())
}

// ============================================================================
// Races
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_overwritten_claim_converges() -> anyhow::Result<()> {
    let room = TestRoom::new().await?;
    let (p1, p2) = (ranked_id(1), ranked_id(2));

    let mut first = room.spawn(&p1, default_options()).await?;
    // p2 read the room before p1's claim landed and wrote its own claim last
    room.store
        .write_owner(&room.room_id, Slot::A, &participant(&p2))
        .await?;
    let second = room.spawn(&p2, default_options()).await?;

    let event = first
        .wait_for(|event| matches!(event, HonkEvent::SlotResolved(_)))
        .await?;
    let HonkEvent::SlotResolved(resolved) = event else {
        unreachable!("filtered above");
    };
    assert_eq!(resolved.slot, Slot::B);
    assert_eq!(resolved.participant_id, participant(&p1));
    settle().await;

    let snapshot = room.store.snapshot(&room.room_id).expect("room exists");
    assert_eq!(snapshot.slot_a_owner, Some(participant(&p2)));
    assert_eq!(snapshot.slot_b_owner, Some(participant(&p1)));

    let loser = first.leave().await?;
    let winner = second.leave().await?;
    assert_eq!(loser.slot(), Slot::B);
    assert_eq!(winner.slot(), Slot::A);
    assert_eq!(winner.resolution().occupancy, Occupancy::Owner);
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_text_typed_during_race_follows_the_loser() -> anyhow::Result<()> {
    let room = TestRoom::new().await?;
    let (p1, p2) = (ranked_id(1), ranked_id(2));

    let first = room.spawn(&p1, default_options()).await?;
    first.type_text("hi").await?;
    settle().await;

    room.store
        .write_owner(&room.room_id, Slot::A, &participant(&p2))
        .await?;
    settle().await;

    let snapshot = room.store.snapshot(&room.room_id).expect("room exists");
    assert_eq!(snapshot.slot_b_owner, Some(participant(&p1)));
    assert_eq!(snapshot.slot_b_text, "hi");

    first.leave().await?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_cleared_slot_is_reclaimed() -> anyhow::Result<()> {
    let room = TestRoom::new().await?;
    let alice = room.spawn("alice", default_options()).await?;
    let bob = room.spawn("bob", default_options()).await?;
    settle().await;

    // Administrative clear of alice's slot; her session claims it again
    room.store.clear_owner(&room.room_id, Slot::A)?;
    settle().await;

    let snapshot = room.store.snapshot(&room.room_id).expect("room exists");
    assert_eq!(snapshot.slot_a_owner, Some(participant("alice")));
    assert_eq!(snapshot.slot_b_owner, Some(participant("bob")));

    alice.leave().await?;
    bob.leave().await?;
    Ok(())
}
