//! Background writer for bubble text
//!
//! Keystrokes update the session synchronously and hand the store write to
//! a per-session task. Writes are applied in the order they were queued. A
//! failed write is logged and the next one is attempted.

use std::sync::Arc;

use honk_core::{FieldStore, RoomId, Slot, WriterId};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{trace, warn};

#[derive(Debug)]
enum WriteOp {
    Text { slot: Slot, text: String },
    Flush(oneshot::Sender<()>),
}

/// Queue of text writes for one session
#[derive(Debug)]
pub(crate) struct TextWriter {
    queue: Option<mpsc::UnboundedSender<WriteOp>>,
    task: JoinHandle<()>,
}

impl TextWriter {
    /// Start the writer task. Must be called from within a tokio runtime.
    pub(crate) fn spawn(store: Arc<dyn FieldStore>, room_id: RoomId, writer: WriterId) -> Self {
        let (queue, mut rx) = mpsc::unbounded_channel::<WriteOp>();

        let task = tokio::spawn(async move {
            while let Some(op) = rx.recv().await {
                match op {
                    WriteOp::Text { slot, text } => {
                        match store.apply_text_diff(&room_id, slot, &text, writer).await {
                            Ok(()) => trace!(room_id = %room_id, %slot, "Text written"),
                            Err(e) => warn!(
                                room_id = %room_id,
                                %slot,
                                error = %e,
                                code = e.code(),
                                "Failed to write bubble text"
                            ),
                        }
                    }
                    WriteOp::Flush(done) => {
                        let _ = done.send(());
                    }
                }
            }
        });

        Self {
            queue: Some(queue),
            task,
        }
    }

    /// Queue `text` for `slot`; never waits on the store
    pub(crate) fn write(&self, slot: Slot, text: impl Into<String>) {
        let Some(queue) = &self.queue else {
            return;
        };
        if queue
            .send(WriteOp::Text {
                slot,
                text: text.into(),
            })
            .is_err()
        {
            warn!(%slot, "Text writer stopped, dropping write");
        }
    }

    /// Wait until every write queued so far has been attempted
    pub(crate) async fn flush(&self) {
        let Some(queue) = &self.queue else {
            return;
        };
        let (done, wait) = oneshot::channel();
        if queue.send(WriteOp::Flush(done)).is_ok() {
            let _ = wait.await;
        }
    }

    /// Stop accepting writes. Already queued writes still go out.
    pub(crate) fn close(&mut self) {
        self.queue = None;
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
