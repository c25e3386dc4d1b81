//! Core types: configuration, errors, identifiers, flights, messages, conversations.

pub mod config;
pub mod conversation;
pub mod errors;
pub mod flight;
pub mod ids;
pub mod message;

pub use config::{AssistantConfig, EngineConfig, ReplyConfig, ServerConfig};
pub use conversation::{Conversation, ConversationSummary};
pub use errors::{AssistantError, AssistantResult};
pub use flight::{DisruptionKind, FlightContext, FlightStatus, FlightSubmission, FlightValidator};
pub use ids::{ConversationId, MessageId};
pub use message::{Message, NewMessage, Role};
