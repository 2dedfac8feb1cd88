use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Path, Query, State};
use axum::http::{Extensions, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

use crate::brain::Brain;
use crate::error::{ErrorPayload, StoreError, TokenError};
use crate::memory::{Session, SessionStore};
use crate::token::{self, TokenIssuer, TokenRequest};
use crate::types::Action;

const SERVICE_NAME: &str = "Smart Grocery Assistant API";

#[derive(Clone)]
pub struct AppState {
    pub brain: Arc<Brain>,
    pub sessions: SessionStore,
    pub tokens: Arc<TokenIssuer>,
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/getToken", get(get_token_handler))
        .route("/api/getToken", get(api_get_token_handler))
        .route("/web-automation/decide", post(decide_handler))
        .route(
            "/web-automation/sessions/{session_id}",
            get(get_session_handler).delete(delete_session_handler),
        )
        .route("/favicon.ico", get(|| async { StatusCode::NO_CONTENT }))
        .layer(cors)
        .with_state(state)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecideRequest {
    pub task: String,
    pub page_data: Value,
    #[serde(default)]
    pub session_id: Option<String>,
    #[serde(default)]
    pub step_count: Option<i64>,
}

/// Body of a decide response. Engine failures still go out as 200.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum DecideReply {
    Action(Action),
    Error(ErrorPayload),
}

async fn decide_handler(
    State(state): State<AppState>,
    Json(req): Json<DecideRequest>,
) -> Json<DecideReply> {
    let session_id = req.session_id.as_deref().filter(|id| !id.is_empty());
    let recorded = session_id.map(|session_id| {
        let index = state.sessions.record(
            session_id,
            &req.task,
            req.step_count.unwrap_or(0),
            req.page_data.clone(),
        );
        (session_id, index)
    });

    let decision = state.brain.decide(&req.task, &req.page_data).await;

    match decision {
        Ok(action) => {
            if let Some((session_id, index)) = recorded {
                if let Err(e) = state.sessions.attach_decision(session_id, index, action.clone()) {
                    warn!(session_id, error = %e, "could not attach decision to session");
                }
                if action.is_final() {
                    info!(session_id, "automation task reported finished");
                }
            }
            Json(DecideReply::Action(action))
        }
        Err(e) => Json(DecideReply::Error(e.payload())),
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Session not found"})),
        )
            .into_response()
    }
}

impl IntoResponse for TokenError {
    fn into_response(self) -> Response {
        error!(error = %self, "token issuance failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": self.to_string()})),
        )
            .into_response()
    }
}

async fn get_session_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Session>, StoreError> {
    state.sessions.get(&session_id).map(Json)
}

async fn delete_session_handler(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<Value>, StoreError> {
    state.sessions.delete(&session_id)?;
    info!(%session_id, "session deleted");
    Ok(Json(json!({
        "message": "Session deleted",
        "session_id": session_id,
    })))
}

#[derive(Debug, Deserialize)]
struct TokenQuery {
    name: Option<String>,
    room: Option<String>,
}

/// Plain-text token; a fresh room is generated when none is given.
async fn get_token_handler(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Result<String, TokenError> {
    state.tokens.issue(&TokenRequest {
        identity: query.name.unwrap_or_else(|| token::DEFAULT_IDENTITY.to_string()),
        room: query.room.unwrap_or_else(token::generate_room_name),
        can_publish_data: false,
    })
}

/// JSON token for the fixed assistant room, identity defaulting to the caller's address.
async fn api_get_token_handler(
    State(state): State<AppState>,
    extensions: Extensions,
    Query(query): Query<TokenQuery>,
) -> Result<Json<Value>, TokenError> {
    let identity = query.name.unwrap_or_else(|| {
        match extensions.get::<ConnectInfo<SocketAddr>>() {
            Some(ConnectInfo(addr)) => format!("user-{}", addr.ip()),
            None => "user-unknown".to_string(),
        }
    });
    let jwt = state.tokens.issue(&TokenRequest {
        identity,
        room: query.room.unwrap_or_else(|| token::DEFAULT_ROOM.to_string()),
        can_publish_data: true,
    })?;
    Ok(Json(json!({"token": jwt})))
}

async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": SERVICE_NAME,
        "sessions": state.sessions.len(),
    }))
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>Smart Grocery Assistant API</title>
<style>
  body { background: #0a0a0f; color: #e0e0e0; font-family: system-ui, sans-serif; padding: 32px; }
  h1 { color: #fff; font-size: 22px; }
  code { background: #111118; padding: 2px 6px; border-radius: 4px; }
  li { margin: 6px 0; }
</style>
</head>
<body>
  <h1>Smart Grocery Assistant API</h1>
  <h2>Available Endpoints:</h2>
  <ul>
    <li><strong>GET /getToken</strong> - Generate voice room tokens</li>
    <li><strong>GET /api/getToken</strong> - Generate a voice room token as JSON</li>
    <li><strong>POST /web-automation/decide</strong> - Decide the next page action</li>
    <li><strong>GET /web-automation/sessions/{session_id}</strong> - Get automation session details</li>
    <li><strong>DELETE /web-automation/sessions/{session_id}</strong> - Delete an automation session</li>
    <li><strong>GET /health</strong> - Health check</li>
  </ul>
  <p>Example: <code>/getToken?name=username&amp;room=roomname</code></p>
</body>
</html>
"##;
