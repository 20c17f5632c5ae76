//! Solo DM HTTP REST API
//!
//! Axum-based HTTP server exposing the game store and the DM chat
//! orchestrator over JSON, with permissive CORS for browser clients.
//!
//! Architecture: each endpoint has a thin axum handler that delegates to a
//! pure inner function. The inner functions are directly testable without
//! axum dispatch machinery.
//!
//! Endpoints:
//! - GET  /                                        — welcome banner
//! - GET  /health                                  — health + OpenAI key status
//! - POST /api/characters                          — create character
//! - GET  /api/characters                          — list characters
//! - GET  /api/characters/:id                      — fetch character
//! - POST /api/dm/chat                             — DM chat turn
//! - GET  /api/characters/:id/game-sessions        — sessions for a character
//! - GET  /api/game-sessions/:id                   — fetch session
//! - GET  /api/quests                              — list quests
//! - POST /api/quests                              — create quest
//! - GET  /api/spells                              — list spells

use std::sync::Arc;

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};

use solodm_core::{DmNarrator, GameError, GameStore};

use crate::subsystems::chat::{self, ChatRequest};

/// Shared state for all HTTP handlers
pub struct HttpState {
    pub store: Arc<GameStore>,
    pub narrator: DmNarrator,
}

/// Build the Axum router with all endpoints and a permissive CORS layer.
pub fn build_router(state: Arc<HttpState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers(Any)
        .allow_methods(Any);

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/api/characters", post(create_character_handler).get(list_characters_handler))
        .route("/api/characters/:id", get(get_character_handler))
        .route("/api/characters/:id/game-sessions", get(character_sessions_handler))
        .route("/api/dm/chat", post(chat_handler))
        .route("/api/game-sessions/:id", get(get_session_handler))
        .route("/api/quests", get(list_quests_handler).post(create_quest_handler))
        .route("/api/spells", get(list_spells_handler))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server on the configured address.
/// Gracefully shuts down when the broadcast shutdown signal fires.
pub async fn start_http_server(
    state: Arc<HttpState>,
    host: &str,
    port: u16,
    mut shutdown: broadcast::Receiver<()>,
) -> Result<()> {
    let addr = format!("{}:{}", host, port);
    let app = build_router(state);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Solo DM API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTP server shutting down...");
        })
        .await?;

    Ok(())
}

// ============================================================================
// Error mapping
// ============================================================================

/// Total mapping from the error taxonomy to HTTP status codes. Upstream
/// errors are normally absorbed by the narrator's fallback and never reach
/// this function; the 502 arm keeps the mapping total anyway.
pub fn error_status(err: &GameError) -> StatusCode {
    match err {
        GameError::Validation(_) => StatusCode::BAD_REQUEST,
        GameError::NotFound(_) => StatusCode::NOT_FOUND,
        GameError::Upstream(_) => StatusCode::BAD_GATEWAY,
        GameError::Config(_) | GameError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_body(err: &GameError) -> serde_json::Value {
    json!({ "error": err.to_string() })
}

fn json_body<T: Serialize>(value: &T) -> serde_json::Value {
    serde_json::to_value(value).unwrap_or_else(|e| json!({ "error": e.to_string() }))
}

// ============================================================================
// Inner (directly testable) business logic functions
// ============================================================================

/// Inner health check — reports whether the OpenAI key is configured.
pub fn health_inner(narrator: &DmNarrator) -> (StatusCode, serde_json::Value) {
    (
        StatusCode::OK,
        json!({
            "status": "ok",
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "openaiConfigured": narrator.upstream_configured(),
        }),
    )
}

/// Inner character creation — accepts any JSON object as the stat block.
pub fn create_character_inner(
    store: &GameStore,
    payload: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let attrs = match payload.as_object() {
        Some(map) => map.clone(),
        None => {
            let err = GameError::Validation("Request body must be a JSON object".to_string());
            return (error_status(&err), error_body(&err));
        }
    };

    let character = store.add_character(attrs);
    (StatusCode::OK, json_body(&character))
}

pub fn list_characters_inner(store: &GameStore) -> (StatusCode, serde_json::Value) {
    (StatusCode::OK, json_body(&store.characters()))
}

pub fn get_character_inner(store: &GameStore, id: &str) -> (StatusCode, serde_json::Value) {
    match store.character(id) {
        Some(character) => (StatusCode::OK, json_body(&character)),
        None => {
            let err = GameError::NotFound("Character");
            (error_status(&err), error_body(&err))
        }
    }
}

/// Inner DM chat — delegates to the orchestrator and maps its errors.
pub async fn chat_inner(
    store: &GameStore,
    narrator: &DmNarrator,
    request: ChatRequest,
) -> (StatusCode, serde_json::Value) {
    match chat::handle_chat(store, narrator, request).await {
        Ok(response) => (StatusCode::OK, json_body(&response)),
        Err(err) => (error_status(&err), error_body(&err)),
    }
}

pub fn character_sessions_inner(
    store: &GameStore,
    character_id: &str,
) -> (StatusCode, serde_json::Value) {
    (StatusCode::OK, json_body(&store.sessions_for_character(character_id)))
}

pub fn get_session_inner(store: &GameStore, id: &str) -> (StatusCode, serde_json::Value) {
    match store.session(id) {
        Some(session) => (StatusCode::OK, json_body(&session)),
        None => {
            let err = GameError::NotFound("Session");
            (error_status(&err), error_body(&err))
        }
    }
}

pub fn list_quests_inner(store: &GameStore) -> (StatusCode, serde_json::Value) {
    (StatusCode::OK, json_body(&store.quests()))
}

pub fn create_quest_inner(
    store: &GameStore,
    payload: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let attrs = match payload.as_object() {
        Some(map) => map.clone(),
        None => {
            let err = GameError::Validation("Request body must be a JSON object".to_string());
            return (error_status(&err), error_body(&err));
        }
    };

    let quest = store.add_quest(attrs);
    (StatusCode::OK, json_body(&quest))
}

pub fn list_spells_inner(store: &GameStore) -> (StatusCode, serde_json::Value) {
    (StatusCode::OK, json_body(&store.spells()))
}

// ============================================================================
// Axum handler wrappers (thin — delegate to inner functions)
// ============================================================================

async fn root_handler() -> &'static str {
    "Welcome to Solo DM! The server is live. Try hitting /health or /api/characters."
}

async fn health_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = health_inner(&state.narrator);
    (status, Json(body))
}

async fn create_character_handler(
    State(state): State<Arc<HttpState>>,
    Json(payload): Json<serde_json::Value>,
) -> impl IntoResponse {
    let (status, body) = create_character_inner(&state.store, payload);
    (status, Json(body))
}

async fn list_characters_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = list_characters_inner(&state.store);
    (status, Json(body))
}

async fn get_character_handler(
    State(state): State<Arc<HttpState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let (status, body) = get_character_inner(&state.store, &id);
    (status, Json(body))
}

async fn chat_handler(
    State(state): State<Arc<HttpState>>,
    Json(request): Json<ChatRequest>,
) -> impl IntoResponse {
    let (status, body) = chat_inner(&state.store, &state.narrator, request).await;
    (status, Json(body))
}

async fn character_sessions_handler(
    State(state): State<Arc<HttpState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let (status, body) = character_sessions_inner(&state.store, &id);
    (status, Json(body))
}

async fn get_session_handler(
    State(state): State<Arc<HttpState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let (status, body) = get_session_inner(&state.store, &id);
    (status, Json(body))
}

async fn list_quests_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = list_quests_inner(&state.store);
    (status, Json(body))
}

async fn create_quest_handler(
    State(state): State<Arc<HttpState>>,
    Json(payload): Json<serde_json::Value>,
) -> impl IntoResponse {
    let (status, body) = create_quest_inner(&state.store, payload);
    (status, Json(body))
}

async fn list_spells_handler(State(state): State<Arc<HttpState>>) -> impl IntoResponse {
    let (status, body) = list_spells_inner(&state.store);
    (status, Json(body))
}

// ============================================================================
// Unit Tests — call inner functions directly
// ============================================================================
