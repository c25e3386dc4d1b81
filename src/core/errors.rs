//! Error types for the flight assistant.

use thiserror::Error;

use crate::core::ids::ConversationId;

/// Flight assistant error type.
#[derive(Debug, Error)]
pub enum AssistantError {
    /// Malformed or missing flight details at conversation creation.
    #[error("invalid flight details: {0}")]
    Validation(String),
    /// The referenced conversation does not exist in the store.
    #[error("conversation not found: {0}")]
    NotFound(ConversationId),
    /// A message was appended while no conversation is current.
    #[error("no active conversation")]
    NoActiveConversation,
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// Validation pattern failed to compile.
    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),
    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl AssistantError {
    /// Whether the caller can surface the error to the user and retry.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::NotFound(_) | Self::NoActiveConversation
        )
    }
}

/// Convenience result alias for assistant operations.
pub type AssistantResult<T> = Result<T, AssistantError>;
