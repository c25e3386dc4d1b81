//! Conversation model and its sidebar summary.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::flight::{FlightContext, FlightStatus};
use crate::core::ids::ConversationId;
use crate::core::message::{Message, NewMessage};

/// A chat session bound to one flight.
#[derive(Clone, Debug, Serialize)]
pub struct Conversation {
    id: ConversationId,
    title: String,
    flight: Arc<FlightContext>,
    messages: Vec<Message>,
    created_at: DateTime<Utc>,
}

impl Conversation {
    /// Open a conversation seeded with the assistant greeting.
    pub(crate) fn open(flight: FlightContext) -> Self {
        let greeting = greeting(&flight);
        let mut conversation = Self {
            id: ConversationId::new(),
            title: format!("Flight {}", flight.flight_number()),
            flight: Arc::new(flight),
            messages: Vec::new(),
            created_at: Utc::now(),
        };
        conversation.push(NewMessage::assistant(greeting));
        conversation
    }

    /// Append a message at the next position.
    pub(crate) fn push(&mut self, message: NewMessage) -> &Message {
        let position = self.messages.len();
        self.messages.push(Message::commit(message, position));
        &self.messages[position]
    }

    /// Conversation identifier.
    #[must_use]
    pub const fn id(&self) -> ConversationId {
        self.id
    }

    /// Display title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Flight this conversation is anchored to.
    #[must_use]
    pub fn flight(&self) -> &FlightContext {
        &self.flight
    }

    /// Shared handle on the flight, for reply tasks.
    #[must_use]
    pub fn flight_handle(&self) -> Arc<FlightContext> {
        Arc::clone(&self.flight)
    }

    /// Messages in append order.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Sidebar summary.
    #[must_use]
    pub fn summary(&self) -> ConversationSummary {
        ConversationSummary {
            id: self.id,
            title: self.title.clone(),
            flight_number: self.flight.flight_number().to_owned(),
            status: self.flight.status(),
            message_count: self.messages.len(),
            created_at: self.created_at,
        }
    }
}

/// Metadata for a conversation displayed in a list.
#[derive(Clone, Debug, Serialize)]
pub struct ConversationSummary {
    /// Conversation identifier.
    pub id: ConversationId,
    /// Display title.
    pub title: String,
    /// Flight number.
    pub flight_number: String,
    /// Derived flight status.
    pub status: FlightStatus,
    /// Number of messages.
    pub message_count: usize,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

fn greeting(flight: &FlightContext) -> String {
    format!(
        "Welcome! I'm your flight assistant for flight {} from {} to {}. How can I help you today?",
        flight.flight_number(),
        flight.origin(),
        flight.destination()
    )
}
