//! HTTP API v1 — the widget's JSON surface.
//!
//! Endpoints:
//!
//! - `GET  /v1/settings`    — Model and cost controls, available roles
//! - `GET  /v1/chat`        — Turns recorded since the last clear
//! - `POST /v1/chat`        — Send a message, get the reply
//! - `POST /v1/chat/clear`  — Hide the conversation so far (store untouched)

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use deskmate_agent::SessionConfig;
use deskmate_core::persona::Persona;
use deskmate_core::turn::Turn;

use crate::SharedState;

// ── Router ────────────────────────────────────────────────────────────────

/// Build the v1 API router. Nest this under "/v1" in the main router.
pub fn v1_router(state: SharedState) -> Router {
    Router::new()
        .route("/settings", get(settings_handler))
        .route("/chat", get(get_chat_handler).post(chat_handler))
        .route("/chat/clear", post(clear_chat_handler))
        .with_state(state)
}

// ── DTOs ──────────────────────────────────────────────────────────────────

/// Read-only view of the run's model parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsResponse {
    pub model: String,
    pub max_output_tokens: u32,
    pub temperature: f32,
    pub max_turns_to_keep: i64,
    pub roles: Vec<String>,
    pub default_role: String,
}

impl SettingsResponse {
    pub fn from_config(config: &deskmate_config::AppConfig) -> Self {
        Self {
            model: config.model.clone(),
            max_output_tokens: config.max_output_tokens,
            temperature: config.temperature,
            max_turns_to_keep: config.max_turns_to_keep,
            roles: Persona::ALL.iter().map(|p| p.as_str().to_string()).collect(),
            default_role: Persona::default().as_str().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
    #[serde(default)]
    business_context: String,
    #[serde(default)]
    role: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatResponse {
    reply: String,
    failed: bool,
    role: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct TranscriptResponse {
    turns: Vec<Turn>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ClearResponse {
    cleared: usize,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: &str) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn settings_handler(State(state): State<SharedState>) -> Json<SettingsResponse> {
    Json(state.settings.clone())
}

async fn get_chat_handler(State(state): State<SharedState>) -> Json<TranscriptResponse> {
    let chat = state.chat.lock().await;
    Json(TranscriptResponse {
        turns: chat.visible_turns().to_vec(),
    })
}

async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let business_context = payload.business_context.trim();
    if business_context.is_empty() {
        return Err(api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "business_context is required",
        ));
    }

    let message = payload.message.trim();
    if message.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "message is empty"));
    }

    let config = SessionConfig::new(business_context, Persona::parse_or_default(&payload.role));
    info!(persona = %config.persona, message_len = message.len(), "v1/chat request");

    // One turn at a time; the lock is held for the whole exchange.
    let mut chat = state.chat.lock().await;
    let (next, outcome) = state
        .session
        .process_turn(chat.clone(), &config, message, |_| async {})
        .await;
    *chat = next;

    Ok(Json(ChatResponse {
        reply: outcome.reply,
        failed: outcome.failed,
        role: config.persona.as_str().to_string(),
    }))
}

async fn clear_chat_handler(State(state): State<SharedState>) -> Json<ClearResponse> {
    let mut chat = state.chat.lock().await;
    let cleared = chat.visible_turns().len();
    chat.clear_display();
    info!(cleared, "Chat cleared");
    Json(ClearResponse { cleared })
}
