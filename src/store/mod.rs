//! Conversation store: owned state container plus ordered reply delivery.

pub mod conversation_store;
mod replies;
mod state;

pub use conversation_store::{AppendedMessage, ConversationStore};
