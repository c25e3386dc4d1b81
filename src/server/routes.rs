//! HTTP route handlers for the flight assistant API.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::core::conversation::{Conversation, ConversationSummary};
use crate::core::errors::AssistantError;
use crate::core::flight::FlightSubmission;
use crate::core::ids::ConversationId;
use crate::core::message::{Message, NewMessage, Role};
use crate::engine::lookups::{self, AirportWeather, AlternativeRoutes, FlightStatusReport};
use crate::engine::rules::{RuleKind, classify};

use super::state::AppState;

/// Create the API router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route(
            "/api/conversations",
            get(list_conversations).post(create_conversation),
        )
        .route(
            "/api/conversations/{id}",
            get(get_conversation).delete(remove_conversation),
        )
        .route("/api/conversations/{id}/messages", get(list_messages))
        .route(
            "/api/current",
            put(set_current_conversation).delete(clear_current_conversation),
        )
        .route("/api/messages", post(add_message))
        .route("/api/respond", post(respond))
        .route("/api/weather/{airport_code}", get(weather))
        .route("/api/flight/status", post(flight_status))
        .route("/api/flight/alternatives", post(flight_alternatives))
        .with_state(state)
}

fn error_response(err: AssistantError) -> (StatusCode, String) {
    if !err.is_user_facing() {
        tracing::error!("Unexpected error: {err}");
        return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string());
    }
    let status = match &err {
        AssistantError::NotFound(_) => StatusCode::NOT_FOUND,
        AssistantError::NoActiveConversation => StatusCode::CONFLICT,
        _ => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (status, err.to_string())
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "flight-assistant",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Conversation list response.
#[derive(Debug, Serialize)]
pub struct ConversationListResponse {
    /// Current conversation, if any.
    pub current: Option<ConversationId>,
    /// Summaries in creation order.
    pub conversations: Vec<ConversationSummary>,
}

/// A conversation plus its reply backlog.
#[derive(Debug, Serialize)]
pub struct ConversationView {
    /// The conversation snapshot.
    #[serde(flatten)]
    pub conversation: Conversation,
    /// Replies queued but not yet appended.
    pub pending_replies: usize,
}

async fn list_conversations(State(state): State<Arc<AppState>>) -> Json<ConversationListResponse> {
    Json(ConversationListResponse {
        current: state.store.current_conversation_id().await,
        conversations: state.store.list_conversations().await,
    })
}

async fn view(state: &AppState, id: ConversationId) -> Result<ConversationView, AssistantError> {
    let conversation = state.store.conversation(id).await?;
    Ok(ConversationView {
        pending_replies: state.store.pending_replies(id),
        conversation,
    })
}

/// Handle flight submissions by opening a conversation.
async fn create_conversation(
    State(state): State<Arc<AppState>>,
    Json(submission): Json<FlightSubmission>,
) -> Result<(StatusCode, Json<ConversationView>), (StatusCode, String)> {
    let id = state
        .store
        .create_conversation(&submission)
        .await
        .map_err(error_response)?;
    let view = view(&state, id).await.map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn get_conversation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ConversationId>,
) -> Result<Json<ConversationView>, (StatusCode, String)> {
    view(&state, id).await.map(Json).map_err(error_response)
}

async fn remove_conversation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ConversationId>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .store
        .remove_conversation(id)
        .await
        .map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_messages(
    State(state): State<Arc<AppState>>,
    Path(id): Path<ConversationId>,
) -> Result<Json<Vec<Message>>, (StatusCode, String)> {
    state
        .store
        .messages(id)
        .await
        .map(Json)
        .map_err(error_response)
}

/// Select-conversation request.
#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    /// Conversation to make current.
    pub id: ConversationId,
}

async fn set_current_conversation(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SelectRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .store
        .set_current_conversation(request.id)
        .await
        .map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn clear_current_conversation(State(state): State<Arc<AppState>>) -> StatusCode {
    state.store.clear_current_conversation().await;
    StatusCode::NO_CONTENT
}

/// Message request for the current conversation.
#[derive(Debug, Deserialize)]
pub struct MessageRequest {
    /// Author; defaults to `user`.
    #[serde(default)]
    pub role: Role,
    /// Text content.
    pub content: String,
    /// Wait for queued replies before answering.
    #[serde(default)]
    pub wait: bool,
}

/// Message response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Conversation the message was appended to.
    pub conversation_id: ConversationId,
    /// The committed message.
    pub message: Message,
    /// Full history, present when the request asked to wait.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<Message>>,
}

/// Handle chat messages for the current conversation.
async fn add_message(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MessageRequest>,
) -> Result<Json<MessageResponse>, (StatusCode, String)> {
    if request.content.trim().is_empty() {
        return Err(error_response(AssistantError::Validation(
            "message content must not be empty".to_string(),
        )));
    }

    let appended = state
        .store
        .add_message(NewMessage {
            role: request.role,
            content: request.content,
        })
        .await
        .map_err(error_response)?;

    let messages = if request.wait {
        let id = appended.conversation_id;
        state.store.wait_for_replies(id).await.map_err(error_response)?;
        Some(state.store.messages(id).await.map_err(error_response)?)
    } else {
        None
    };

    Ok(Json(MessageResponse {
        conversation_id: appended.conversation_id,
        message: appended.message,
        messages,
    }))
}

/// Stateless question request.
#[derive(Debug, Deserialize)]
pub struct RespondRequest {
    /// The traveller's question.
    pub question: String,
    /// Flight the question is about.
    pub flight: FlightSubmission,
}

/// Stateless question response.
#[derive(Debug, Serialize)]
pub struct RespondResponse {
    /// The assistant's answer.
    pub response: String,
    /// Rule that produced the answer.
    pub rule: RuleKind,
}

/// Answer a single question without touching the store.
async fn respond(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RespondRequest>,
) -> Result<Json<RespondResponse>, (StatusCode, String)> {
    let flight = state
        .store
        .validator()
        .validate(&request.flight)
        .map_err(error_response)?;

    Ok(Json(RespondResponse {
        response: state.engine.respond(&request.question, &flight),
        rule: classify(&request.question),
    }))
}

/// Conditions at one airport.
async fn weather(Path(airport_code): Path<String>) -> Json<AirportWeather> {
    Json(lookups::airport_weather(&airport_code, Utc::now()))
}

/// Status report for a submitted flight.
async fn flight_status(
    State(state): State<Arc<AppState>>,
    Json(submission): Json<FlightSubmission>,
) -> Result<Json<FlightStatusReport>, (StatusCode, String)> {
    let flight = state
        .store
        .validator()
        .validate(&submission)
        .map_err(error_response)?;
    Ok(Json(lookups::flight_status(&flight)))
}

/// Alternative routes for a submitted flight.
async fn flight_alternatives(
    State(state): State<Arc<AppState>>,
    Json(submission): Json<FlightSubmission>,
) -> Result<Json<AlternativeRoutes>, (StatusCode, String)> {
    let flight = state
        .store
        .validator()
        .validate(&submission)
        .map_err(error_response)?;
    Ok(Json(lookups::alternative_routes(&flight)))
}
