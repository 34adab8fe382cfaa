//! Axum handlers for `/api/*` routes.
//!
//! Each handler receives [`AxumState`] via [`axum::extract::State`] and
//! returns an axum [`Response`]. Errors use the `{ "error", "message" }`
//! body shape throughout.

use std::time::Duration;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::conversation::{Turn, Speaker};
use crate::llm::GenerationConfig;
use crate::pipeline::TurnResult;

use super::{AxumState, greeting};

/// Upper bound on one turn, generation included.
const TURN_TIMEOUT: Duration = Duration::from_secs(120);

// ── Request / response types ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct MessageRequest {
    message: String,
    session_id: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    top_p: Option<f32>,
}

#[derive(Serialize)]
struct MessageResponse {
    session_id: String,
    #[serde(flatten)]
    turn: TurnResult,
}

#[derive(Serialize)]
struct Slider<T> {
    min: T,
    max: T,
    step: T,
    default: T,
}

#[derive(Serialize)]
struct Settings {
    temperature: Slider<f32>,
    max_tokens: Slider<u32>,
    top_p: Slider<f32>,
}

#[derive(Serialize)]
struct SessionMessage<'a> {
    role: Speaker,
    content: &'a str,
    timestamp: chrono::DateTime<chrono::Utc>,
}

impl<'a> From<&'a Turn> for SessionMessage<'a> {
    fn from(turn: &'a Turn) -> Self {
        Self { role: turn.role, content: &turn.text, timestamp: turn.timestamp }
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Build a JSON error response body.
fn json_error(code: &str, msg: impl std::fmt::Display) -> Json<serde_json::Value> {
    Json(json!({ "error": code, "message": format!("{msg}") }))
}

fn session_not_found(session_id: &str) -> Response {
    (StatusCode::NOT_FOUND, json_error("not_found", format!("no session '{session_id}'"))).into_response()
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// GET /api/health
pub(super) async fn health(State(state): State<AxumState>) -> Response {
    let blueprint = state.comms.blueprint();
    let body = json!({
        "status": "ok",
        "bot_name": state.comms.bot_name(),
        "provider": blueprint.provider().name(),
        "pattern": blueprint.pattern_kind().key(),
        "secure": blueprint.is_secure(),
        "sessions": state.sessions.len().await,
    });
    (StatusCode::OK, Json(body)).into_response()
}

/// GET /api/settings: slider ranges and defaults for the widget sidebar.
pub(super) async fn settings(State(state): State<AxumState>) -> Response {
    let defaults = state.comms.blueprint().generation_config();
    let body = Settings {
        temperature: Slider { min: 0.0, max: 2.0, step: 0.1, default: defaults.temperature() },
        max_tokens: Slider { min: 50, max: 500, step: 50, default: defaults.max_output_tokens() },
        top_p: Slider { min: 0.1, max: 1.0, step: 0.1, default: defaults.top_p() },
    };
    (StatusCode::OK, Json(body)).into_response()
}

/// POST /api/message
pub(super) async fn message(State(state): State<AxumState>, Json(req): Json<MessageRequest>) -> Response {
    if req.message.trim().is_empty() {
        return (StatusCode::BAD_REQUEST, json_error("bad_request", "message must not be empty")).into_response();
    }

    let defaults = state.comms.blueprint().generation_config();
    let config = match GenerationConfig::new(
        req.temperature.unwrap_or(defaults.temperature()),
        req.max_tokens.unwrap_or(defaults.max_output_tokens()),
        req.top_p.unwrap_or(defaults.top_p()),
    ) {
        Ok(c) => c,
        Err(e) => return (StatusCode::BAD_REQUEST, json_error("invalid_settings", e)).into_response(),
    };

    let requested = req.session_id.as_deref().filter(|s| !s.is_empty());
    let (session_id, pipeline) = match requested {
        Some(id) => match state.sessions.get(id).await {
            Some(p) => (id.to_string(), p),
            None => return session_not_found(id),
        },
        None => {
            let id = Uuid::new_v4().to_string();
            let p = state.sessions.create(id.clone(), &state.comms).await;
            (id, p)
        }
    };

    debug!(channel_id = %state.channel_id, %session_id, "web message received");

    let mut guard = pipeline.lock().await;
    match tokio::time::timeout(TURN_TIMEOUT, guard.process_with(&req.message, config)).await {
        Ok(turn) => (StatusCode::OK, Json(MessageResponse { session_id, turn })).into_response(),
        Err(_) => {
            warn!(channel_id = %state.channel_id, %session_id, "turn timed out");
            (StatusCode::GATEWAY_TIMEOUT, json_error("timeout", "LLM request timed out")).into_response()
        }
    }
}

/// GET /api/session/{session_id}
pub(super) async fn session_detail(State(state): State<AxumState>, Path(session_id): Path<String>) -> Response {
    let Some(pipeline) = state.sessions.get(&session_id).await else {
        return session_not_found(&session_id);
    };
    let guard = pipeline.lock().await;
    let messages: Vec<SessionMessage<'_>> = guard.buffer().history().iter().map(SessionMessage::from).collect();
    let body = json!({
        "session_id": session_id,
        "pattern": guard.pattern().key(),
        "messages": messages,
    });
    (StatusCode::OK, Json(body)).into_response()
}

/// POST /api/session/{session_id}/clear: drop history, keep the greeting.
pub(super) async fn session_clear(State(state): State<AxumState>, Path(session_id): Path<String>) -> Response {
    let Some(pipeline) = state.sessions.get(&session_id).await else {
        return session_not_found(&session_id);
    };
    {
        let mut guard = pipeline.lock().await;
        guard.clear();
        guard.seed(greeting());
    }
    info!(channel_id = %state.channel_id, %session_id, "web session cleared");
    (StatusCode::OK, Json(json!({ "session_id": session_id, "cleared": true }))).into_response()
}
