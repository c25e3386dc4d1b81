//! In-process conversation store.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::core::config::AssistantConfig;
use crate::core::conversation::{Conversation, ConversationSummary};
use crate::core::errors::AssistantResult;
use crate::core::flight::{FlightSubmission, FlightValidator};
use crate::core::ids::ConversationId;
use crate::core::message::{Message, NewMessage, Role};
use crate::engine::responder::{DelayedResponder, Responder};
use crate::engine::rules::ResponseEngine;
use crate::store::replies::ReplyDispatcher;
use crate::store::state::StoreState;

/// A message committed to the current conversation.
#[derive(Clone, Debug, Serialize)]
pub struct AppendedMessage {
    /// Conversation the message was appended to.
    pub conversation_id: ConversationId,
    /// The committed message.
    pub message: Message,
}

struct StoreInner {
    state: Arc<RwLock<StoreState>>,
    replies: ReplyDispatcher,
    validator: FlightValidator,
}

/// Handle on the conversation store.
///
/// Cloning is cheap and every clone sees the same conversations. The store
/// lives until the last handle is dropped; call [`ConversationStore::shutdown`]
/// first to let pending replies land.
#[derive(Clone)]
pub struct ConversationStore {
    inner: Arc<StoreInner>,
}

impl ConversationStore {
    /// Build a store answering with the rule engine after the configured latency.
    ///
    /// # Errors
    /// Returns an error if the engine configuration is invalid.
    pub fn new(config: &AssistantConfig) -> AssistantResult<Self> {
        let validator = FlightValidator::new(config.engine.default_departure()?)?;
        let responder = DelayedResponder::new(
            ResponseEngine::new(&config.engine),
            config.replies.latency(),
        );
        Ok(Self::with_responder(Arc::new(responder), validator))
    }

    /// Build a store around a custom responder.
    #[must_use]
    pub fn with_responder(responder: Arc<dyn Responder>, validator: FlightValidator) -> Self {
        let state = Arc::new(RwLock::new(StoreState::default()));
        let replies = ReplyDispatcher::new(Arc::clone(&state), responder);
        Self {
            inner: Arc::new(StoreInner {
                state,
                replies,
                validator,
            }),
        }
    }

    /// Validator used for flight submissions.
    #[must_use]
    pub fn validator(&self) -> &FlightValidator {
        &self.inner.validator
    }

    /// Open a conversation for a flight and make it current.
    ///
    /// # Errors
    /// Returns `Validation` if required flight details are missing or malformed.
    pub async fn create_conversation(
        &self,
        submission: &FlightSubmission,
    ) -> AssistantResult<ConversationId> {
        let flight = self.inner.validator.validate(submission)?;
        let conversation = Conversation::open(flight);
        let title = conversation.title().to_owned();
        let id = self.inner.state.write().await.insert(conversation);
        info!(%id, %title, "Created conversation");
        Ok(id)
    }

    /// Point the store at an existing conversation.
    ///
    /// # Errors
    /// Returns `NotFound` if `id` is not in the store; the pointer is left unchanged.
    pub async fn set_current_conversation(&self, id: ConversationId) -> AssistantResult<()> {
        self.inner.state.write().await.set_current(id)?;
        debug!(%id, "Switched conversation");
        Ok(())
    }

    /// Clear the current pointer.
    pub async fn clear_current_conversation(&self) {
        self.inner.state.write().await.clear_current();
    }

    /// Append a message to the current conversation.
    ///
    /// A `user` message also queues an assistant reply bound to the same
    /// conversation, whichever conversation is current when it lands.
    ///
    /// # Errors
    /// Returns `NoActiveConversation` if no conversation is current.
    pub async fn add_message(&self, message: NewMessage) -> AssistantResult<AppendedMessage> {
        let mut state = self.inner.state.write().await;
        let conversation = state.current_mut()?;
        let conversation_id = conversation.id();
        let flight = conversation.flight_handle();
        let question = (message.role == Role::User).then(|| message.content.clone());
        let committed = conversation.push(message).clone();

        if let Some(question) = question {
            self.inner
                .replies
                .enqueue(conversation_id, committed.id, question, flight);
        }
        drop(state);

        debug!(
            conversation = %conversation_id,
            role = %committed.role,
            position = committed.position,
            "Appended message"
        );
        Ok(AppendedMessage {
            conversation_id,
            message: committed,
        })
    }

    /// Remove a conversation, resetting the pointer if it was current.
    ///
    /// Replies still pending for it are discarded.
    ///
    /// # Errors
    /// Returns `NotFound` if `id` is not in the store.
    pub async fn remove_conversation(&self, id: ConversationId) -> AssistantResult<()> {
        let removed = self.inner.state.write().await.remove(id)?;
        self.inner.replies.forget(id);
        info!(%id, title = removed.title(), "Removed conversation");
        Ok(())
    }

    /// Snapshot of one conversation.
    ///
    /// # Errors
    /// Returns `NotFound` if `id` is not in the store.
    pub async fn conversation(&self, id: ConversationId) -> AssistantResult<Conversation> {
        self.inner.state.read().await.get(id).cloned()
    }

    /// Messages of one conversation in append order.
    ///
    /// # Errors
    /// Returns `NotFound` if `id` is not in the store.
    pub async fn messages(&self, id: ConversationId) -> AssistantResult<Vec<Message>> {
        Ok(self.inner.state.read().await.get(id)?.messages().to_vec())
    }

    /// Summaries of all conversations in creation order.
    pub async fn list_conversations(&self) -> Vec<ConversationSummary> {
        self.inner.state.read().await.summaries()
    }

    /// Number of conversations.
    pub async fn conversation_count(&self) -> usize {
        self.inner.state.read().await.len()
    }

    /// Current conversation id, if any.
    pub async fn current_conversation_id(&self) -> Option<ConversationId> {
        self.inner.state.read().await.current()
    }

    /// Snapshot of the current conversation, if any.
    pub async fn current_conversation(&self) -> Option<Conversation> {
        let state = self.inner.state.read().await;
        state.current().and_then(|id| state.get(id).ok().cloned())
    }

    /// Replies queued for `id` that have not landed yet.
    #[must_use]
    pub fn pending_replies(&self, id: ConversationId) -> usize {
        self.inner.replies.pending(id)
    }

    /// Wait until every reply queued so far for `id` has been appended.
    ///
    /// # Errors
    /// Returns `NotFound` if `id` is not in the store.
    pub async fn wait_for_replies(&self, id: ConversationId) -> AssistantResult<()> {
        self.inner.state.read().await.get(id)?;
        self.inner.replies.flush(id).await;
        Ok(())
    }

    /// Let pending replies land and stop the reply workers.
    pub async fn shutdown(&self) {
        let drained = self.inner.replies.drain().await;
        info!(queues = drained, "Conversation store shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::NaiveTime;

    use crate::core::errors::AssistantError;
    use crate::core::flight::{DisruptionKind, FlightContext};
    use crate::engine::responder::ReplyFuture;

    /// Echoes the question; questions containing "slow" take longer.
    struct EchoResponder;

    impl Responder for EchoResponder {
        fn reply(&self, question: String, _flight: Arc<FlightContext>) -> ReplyFuture<'_> {
            Box::pin(async move {
                if question.contains("slow") {
                    tokio::time::sleep(Duration::from_millis(80)).await;
                }
                format!("re: {question}")
            })
        }
    }

    fn echo_store() -> ConversationStore {
        let eight = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        let validator = FlightValidator::new(eight).unwrap();
        ConversationStore::with_responder(Arc::new(EchoResponder), validator)
    }

    fn instant_store() -> ConversationStore {
        let mut config = AssistantConfig::default();
        config.replies.latency_ms = 0;
        ConversationStore::new(&config).unwrap()
    }

    fn submission(number: &str) -> FlightSubmission {
        FlightSubmission::new(number, "JFK", "LAX", "2024-05-01").with_airline("JetBlue Airways")
    }

    async fn create(store: &ConversationStore, number: &str) -> ConversationId {
        store
            .create_conversation(&submission(number))
            .await
            .unwrap()
    }

    fn contents(messages: &[Message]) -> Vec<&str> {
        messages.iter().map(|m| m.content.as_str()).collect()
    }

    #[tokio::test]
    async fn test_create_seeds_greeting_and_sets_current() {
        let store = echo_store();
        let id = create(&store, "B6123").await;

        assert_eq!(store.current_conversation_id().await, Some(id));
        let conversation = store.conversation(id).await.unwrap();
        assert_eq!(conversation.title(), "Flight B6123");
        let messages = conversation.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::Assistant);
        for part in ["B6123", "JFK", "LAX"] {
            assert!(messages[0].content.contains(part));
        }
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_flight() {
        let store = echo_store();
        let result = store
            .create_conversation(&FlightSubmission::new("", "JFK", "LAX", "2024-05-01"))
            .await;
        assert!(matches!(result, Err(AssistantError::Validation(_))));
        assert_eq!(store.conversation_count().await, 0);
        assert_eq!(store.current_conversation_id().await, None);
    }

    #[tokio::test]
    async fn test_create_accepts_free_text_flight_number() {
        let store = echo_store();
        let id = store
            .create_conversation(&FlightSubmission::new(
                "Charter 2024 Spring Special",
                "JFK",
                "LAX",
                "2024-05-01",
            ))
            .await
            .unwrap();
        let conversation = store.conversation(id).await.unwrap();
        assert_eq!(conversation.title(), "Flight Charter 2024 Spring Special");
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let store = echo_store();
        let mut ids = Vec::new();
        for n in 0..25 {
            ids.push(create(&store, &format!("AA{n}")).await);
        }
        let mut deduped = ids.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), ids.len());

        let listed: Vec<ConversationId> = store
            .list_conversations()
            .await
            .into_iter()
            .map(|summary| summary.id)
            .collect();
        assert_eq!(listed, ids);
    }

    #[tokio::test]
    async fn test_add_message_without_current_fails() {
        let store = echo_store();
        let id = create(&store, "AA1").await;
        store.clear_current_conversation().await;
        store.clear_current_conversation().await;

        let result = store.add_message(NewMessage::user("hello")).await;
        assert!(matches!(result, Err(AssistantError::NoActiveConversation)));
        assert_eq!(store.current_conversation_id().await, None);
        assert_eq!(store.messages(id).await.unwrap().len(), 1);
        assert_eq!(store.pending_replies(id), 0);
    }

    #[tokio::test]
    async fn test_set_current_unknown_keeps_pointer() {
        let store = echo_store();
        let id = create(&store, "AA1").await;
        let unknown = ConversationId::new();

        let result = store.set_current_conversation(unknown).await;
        assert!(matches!(result, Err(AssistantError::NotFound(missing)) if missing == unknown));
        assert_eq!(store.current_conversation_id().await, Some(id));
    }

    #[tokio::test]
    async fn test_non_user_messages_get_no_reply() {
        let store = echo_store();
        let id = create(&store, "AA1").await;
        store
            .add_message(NewMessage::system("flight data refreshed"))
            .await
            .unwrap();
        store
            .add_message(NewMessage::assistant("manual note"))
            .await
            .unwrap();
        store.wait_for_replies(id).await.unwrap();

        let messages = store.messages(id).await.unwrap();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].role, Role::System);
        assert_eq!(messages[2].role, Role::Assistant);
    }

    #[tokio::test]
    async fn test_replies_keep_trigger_order() {
        let store = echo_store();
        let id = create(&store, "AA1").await;

        store
            .add_message(NewMessage::user("slow first"))
            .await
            .unwrap();
        store
            .add_message(NewMessage::user("fast second"))
            .await
            .unwrap();
        assert_eq!(store.pending_replies(id), 2);
        store.wait_for_replies(id).await.unwrap();

        let messages = store.messages(id).await.unwrap();
        assert_eq!(
            contents(&messages)[1..],
            ["slow first", "fast second", "re: slow first", "re: fast second"]
        );
        for (index, message) in messages.iter().enumerate() {
            assert_eq!(message.position, index);
        }
        assert_eq!(store.pending_replies(id), 0);
    }

    #[tokio::test]
    async fn test_reply_lands_in_original_conversation() {
        let store = echo_store();
        let first = create(&store, "AA1").await;
        store
            .add_message(NewMessage::user("slow question"))
            .await
            .unwrap();

        let second = create(&store, "AA2").await;
        assert_eq!(store.current_conversation_id().await, Some(second));
        store.wait_for_replies(first).await.unwrap();

        let first_messages = store.messages(first).await.unwrap();
        assert_eq!(first_messages.len(), 3);
        assert_eq!(first_messages[2].content, "re: slow question");
        assert_eq!(store.messages(second).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_switching_and_clearing_do_not_redirect_reply() {
        let store = echo_store();
        let first = create(&store, "AA1").await;
        let second = create(&store, "AA2").await;

        store.set_current_conversation(first).await.unwrap();
        store
            .add_message(NewMessage::user("slow question"))
            .await
            .unwrap();
        assert_eq!(store.pending_replies(first), 1);

        store.set_current_conversation(second).await.unwrap();
        store.clear_current_conversation().await;
        store.set_current_conversation(second).await.unwrap();
        store.wait_for_replies(first).await.unwrap();

        let first_messages = store.messages(first).await.unwrap();
        assert_eq!(
            contents(&first_messages),
            [
                first_messages[0].content.as_str(),
                "slow question",
                "re: slow question"
            ]
        );
        assert_eq!(store.messages(second).await.unwrap().len(), 1);
        assert_eq!(store.current_conversation_id().await, Some(second));
        assert_eq!(store.pending_replies(first), 0);
    }

    #[tokio::test]
    async fn test_conversations_are_independent() {
        let store = echo_store();
        let first = create(&store, "AA1").await;
        store
            .add_message(NewMessage::user("slow question"))
            .await
            .unwrap();

        let second = create(&store, "AA2").await;
        store
            .add_message(NewMessage::user("quick question"))
            .await
            .unwrap();
        store.wait_for_replies(second).await.unwrap();

        let second_messages = store.messages(second).await.unwrap();
        assert_eq!(second_messages.len(), 3);
        assert_eq!(store.pending_replies(first), 1);

        store.wait_for_replies(first).await.unwrap();
        assert_eq!(store.messages(first).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_remove_conversation() {
        let store = echo_store();
        let keep = create(&store, "AA1").await;
        let doomed = create(&store, "AA2").await;
        store
            .add_message(NewMessage::user("slow question"))
            .await
            .unwrap();

        store
            .remove_conversation(doomed)
            .await
            .unwrap();
        assert_eq!(store.current_conversation_id().await, None);
        assert!(matches!(
            store.remove_conversation(doomed).await,
            Err(AssistantError::NotFound(_))
        ));
        assert!(matches!(
            store.wait_for_replies(doomed).await,
            Err(AssistantError::NotFound(_))
        ));

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(store.conversation_count().await, 1);
        assert_eq!(store.messages(keep).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_removing_other_conversation_keeps_pointer() {
        let store = echo_store();
        let first = create(&store, "AA1").await;
        let second = create(&store, "AA2").await;
        store
            .remove_conversation(first)
            .await
            .unwrap();
        assert_eq!(store.current_conversation_id().await, Some(second));
    }

    #[tokio::test]
    async fn test_rule_engine_replies() {
        let store = instant_store();
        let id = store
            .create_conversation(
                &FlightSubmission::new("DL77", "ATL", "ORD", "2024-05-01")
                    .with_disruption(DisruptionKind::Staffing),
            )
            .await
            .unwrap();
        store
            .add_message(NewMessage::user("Is my flight delayed?"))
            .await
            .unwrap();
        store.wait_for_replies(id).await.unwrap();

        let current = store.current_conversation().await;
        let messages = current.unwrap().messages().to_vec();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].role, Role::Assistant);
        assert!(messages[2].content.contains("Cancelled"));
    }

    #[tokio::test]
    async fn test_shutdown_drains_pending_replies() {
        let store = echo_store();
        let id = create(&store, "AA1").await;
        store
            .add_message(NewMessage::user("slow question"))
            .await
            .unwrap();

        store.shutdown().await;
        assert_eq!(store.messages(id).await.unwrap().len(), 3);
    }
}
