//! Per-conversation reply queues.
//!
//! Every user message spawns its own reply task, so replies are computed
//! concurrently. Each conversation owns one worker that receives the pending
//! replies in trigger order and appends them one at a time, so a fast reply
//! never overtakes a slower one queued before it. Queues of different
//! conversations share nothing but the store lock.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use dashmap::DashMap;
use tokio::sync::{RwLock, mpsc, oneshot};
use tracing::{debug, warn};

use crate::core::flight::FlightContext;
use crate::core::ids::{ConversationId, MessageId};
use crate::core::message::NewMessage;
use crate::engine::responder::Responder;
use crate::store::state::StoreState;

enum QueueItem {
    Reply {
        trigger: MessageId,
        text: oneshot::Receiver<String>,
    },
    Flush(oneshot::Sender<()>),
}

struct ReplyQueue {
    tx: mpsc::UnboundedSender<QueueItem>,
    pending: Arc<AtomicUsize>,
}

/// Routes replies back to the conversation that triggered them.
pub(crate) struct ReplyDispatcher {
    state: Arc<RwLock<StoreState>>,
    responder: Arc<dyn Responder>,
    queues: DashMap<ConversationId, ReplyQueue>,
}

impl ReplyDispatcher {
    pub(crate) fn new(state: Arc<RwLock<StoreState>>, responder: Arc<dyn Responder>) -> Self {
        Self {
            state,
            responder,
            queues: DashMap::new(),
        }
    }

    /// Start computing the reply to `trigger` and queue it behind earlier replies.
    ///
    /// Callers hold the store write lock so queue order matches append order.
    pub(crate) fn enqueue(
        &self,
        conversation: ConversationId,
        trigger: MessageId,
        question: String,
        flight: Arc<FlightContext>,
    ) {
        let (text_tx, text_rx) = oneshot::channel();
        let responder = Arc::clone(&self.responder);
        tokio::spawn(async move {
            let reply = responder.reply(question, flight).await;
            // Receiver is gone once the worker has stopped.
            let _ = text_tx.send(reply);
        });

        let queue = self
            .queues
            .entry(conversation)
            .or_insert_with(|| self.spawn_worker(conversation));
        queue.pending.fetch_add(1, Ordering::SeqCst);
        if queue
            .tx
            .send(QueueItem::Reply {
                trigger,
                text: text_rx,
            })
            .is_err()
        {
            queue.pending.fetch_sub(1, Ordering::SeqCst);
            warn!(%conversation, %trigger, "Reply worker stopped; reply dropped");
        }
    }

    /// Wait until every reply queued so far for `conversation` has been appended.
    pub(crate) async fn flush(&self, conversation: ConversationId) {
        let done = {
            let Some(queue) = self.queues.get(&conversation) else {
                return;
            };
            let (done_tx, done_rx) = oneshot::channel();
            if queue.tx.send(QueueItem::Flush(done_tx)).is_err() {
                return;
            }
            done_rx
        };
        let _ = done.await;
    }

    /// Replies queued but not yet appended.
    pub(crate) fn pending(&self, conversation: ConversationId) -> usize {
        self.queues
            .get(&conversation)
            .map_or(0, |queue| queue.pending.load(Ordering::SeqCst))
    }

    /// Drop the queue; the worker discards whatever is still in flight.
    pub(crate) fn forget(&self, conversation: ConversationId) {
        if let Some((_, queue)) = self.queues.remove(&conversation) {
            let pending = queue.pending.load(Ordering::SeqCst);
            if pending > 0 {
                debug!(%conversation, pending, "Discarding replies of removed conversation");
            }
        }
    }

    /// Flush every queue, then stop all workers.
    pub(crate) async fn drain(&self) -> usize {
        let ids: Vec<ConversationId> = self.queues.iter().map(|entry| *entry.key()).collect();
        for id in &ids {
            self.flush(*id).await;
        }
        self.queues.clear();
        ids.len()
    }

    fn spawn_worker(&self, conversation: ConversationId) -> ReplyQueue {
        let (tx, rx) = mpsc::unbounded_channel();
        let pending = Arc::new(AtomicUsize::new(0));
        tokio::spawn(run_queue(
            conversation,
            rx,
            Arc::clone(&self.state),
            Arc::clone(&pending),
        ));
        debug!(%conversation, "Started reply worker");
        ReplyQueue { tx, pending }
    }
}

async fn run_queue(
    conversation: ConversationId,
    mut rx: mpsc::UnboundedReceiver<QueueItem>,
    state: Arc<RwLock<StoreState>>,
    pending: Arc<AtomicUsize>,
) {
    while let Some(item) = rx.recv().await {
        match item {
            QueueItem::Reply { trigger, text } => {
                match text.await {
                    Ok(reply) => {
                        let mut guard = state.write().await;
                        if let Some(target) = guard.get_mut(conversation) {
                            let message = target.push(NewMessage::assistant(reply));
                            debug!(%conversation, %trigger, position = message.position, "Appended reply");
                        } else {
                            debug!(%conversation, %trigger, "Conversation removed; reply dropped");
                        }
                    }
                    Err(_) => warn!(%conversation, %trigger, "Reply task ended without an answer"),
                }
                pending.fetch_sub(1, Ordering::SeqCst);
            }
            QueueItem::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!(%conversation, "Reply worker stopped");
}
