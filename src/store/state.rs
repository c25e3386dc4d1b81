//! Shared store state: the conversation set and the current pointer.

use std::collections::HashMap;

use crate::core::conversation::{Conversation, ConversationSummary};
use crate::core::errors::{AssistantError, AssistantResult};
use crate::core::ids::ConversationId;

/// Conversations plus the current-conversation pointer.
///
/// Always mutated under one lock so the pointer can never reference a
/// conversation that is not in the set.
#[derive(Debug, Default)]
pub(crate) struct StoreState {
    conversations: HashMap<ConversationId, Conversation>,
    order: Vec<ConversationId>,
    current: Option<ConversationId>,
}

impl StoreState {
    pub(crate) fn insert(&mut self, conversation: Conversation) -> ConversationId {
        let id = conversation.id();
        self.order.push(id);
        self.conversations.insert(id, conversation);
        self.current = Some(id);
        id
    }

    pub(crate) fn remove(&mut self, id: ConversationId) -> AssistantResult<Conversation> {
        let removed = self
            .conversations
            .remove(&id)
            .ok_or(AssistantError::NotFound(id))?;
        self.order.retain(|other| *other != id);
        if self.current == Some(id) {
            self.current = None;
        }
        Ok(removed)
    }

    pub(crate) fn get(&self, id: ConversationId) -> AssistantResult<&Conversation> {
        self.conversations
            .get(&id)
            .ok_or(AssistantError::NotFound(id))
    }

    pub(crate) fn get_mut(&mut self, id: ConversationId) -> Option<&mut Conversation> {
        self.conversations.get_mut(&id)
    }

    pub(crate) fn set_current(&mut self, id: ConversationId) -> AssistantResult<()> {
        if !self.conversations.contains_key(&id) {
            return Err(AssistantError::NotFound(id));
        }
        self.current = Some(id);
        Ok(())
    }

    pub(crate) const fn clear_current(&mut self) {
        self.current = None;
    }

    pub(crate) const fn current(&self) -> Option<ConversationId> {
        self.current
    }

    pub(crate) fn current_mut(&mut self) -> AssistantResult<&mut Conversation> {
        let id = self.current.ok_or(AssistantError::NoActiveConversation)?;
        self.conversations
            .get_mut(&id)
            .ok_or(AssistantError::NoActiveConversation)
    }

    pub(crate) fn summaries(&self) -> Vec<ConversationSummary> {
        self.order
            .iter()
            .filter_map(|id| self.conversations.get(id))
            .map(Conversation::summary)
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.conversations.len()
    }
}
