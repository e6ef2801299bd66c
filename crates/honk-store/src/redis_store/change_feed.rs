//! Redis Pub/Sub change feed.
//!
//! Each subscription opens a dedicated Pub/Sub connection and forwards
//! decoded [`RoomChange`]s to a broadcast channel. The forwarding task ends
//! once every receiver is gone, checked on each message and on a periodic
//! tick, which also drops the Redis subscription.

use std::time::Duration;

use futures_util::{Stream, StreamExt};
use honk_core::{RoomChange, RoomId};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::room_channel;
use crate::error::StoreErrorResult;

/// How often an idle feed checks whether anyone still listens
pub const FEED_IDLE_CHECK: Duration = Duration::from_secs(1);

/// Subscribe to a room's change channel
///
/// Returns the receiver and the forwarding task, which finishes on its own
/// at most [`FEED_IDLE_CHECK`] after the last receiver is dropped.
pub async fn spawn_change_feed(
    client: &redis::Client,
    id: &RoomId,
    capacity: usize,
) -> StoreErrorResult<(broadcast::Receiver<RoomChange>, JoinHandle<()>)> {
    let mut pubsub = client.get_async_pubsub().await?;
    let channel = room_channel(id);
    pubsub.subscribe(&channel).await?;

    let (tx, rx) = broadcast::channel(capacity.max(1));
    let payloads = pubsub
        .into_on_message()
        .map(|msg| msg.get_payload::<String>());
    let task = tokio::spawn(forward_changes(payloads, tx, id.clone(), FEED_IDLE_CHECK));

    tracing::debug!(room_id = %id, channel = %channel, "Subscribed to room changes");
    Ok((rx, task))
}

/// Decode payloads into the broadcast channel until the stream ends or no
/// receiver is left
pub(crate) async fn forward_changes<S>(
    payloads: S,
    tx: broadcast::Sender<RoomChange>,
    room_id: RoomId,
    idle_check: Duration,
) where
    S: Stream<Item = redis::RedisResult<String>>,
{
    let mut payloads = std::pin::pin!(payloads);
    let mut idle = tokio::time::interval_at(tokio::time::Instant::now() + idle_check, idle_check);
    idle.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            next = payloads.next() => {
                let Some(payload) = next else { break };
                let payload = match payload {
                    Ok(payload) => payload,
                    Err(e) => {
                        tracing::warn!(room_id = %room_id, error = %e, "Unreadable change payload");
                        continue;
                    }
                };

                match serde_json::from_str::<RoomChange>(&payload) {
                    Ok(change) => {
                        if tx.send(change).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!(room_id = %room_id, error = %e, "Malformed room change");
                    }
                }
            }
            _ = idle.tick() => {
                if tx.receiver_count() == 0 {
                    break;
                }
            }
        }
    }
    tracing::debug!(room_id = %room_id, "Change feed closed");
}
