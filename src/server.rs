//! HTTP server for the browser chat interface
//!
//! Routes:
//! - `GET /` chat page
//! - `GET /api/health` liveness probe
//! - `GET /api/modes` available modes
//! - `POST /api/sessions` start a session
//! - `POST /api/chat` submit a message
//! - `GET /api/sessions/:id/history` session turns
//! - `DELETE /api/sessions/:id` end a session

use crate::chat_mode::Mode;
use crate::engine::ChatEngine;
use crate::error::ChatError;
use crate::knowledge::KnowledgeLookup;
use crate::render::{render_history, INDEX_HTML};
use crate::session::{SessionStore, Turn};
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

/// Application state shared with all routes
#[derive(Clone)]
pub struct AppState {
    engine: Arc<ChatEngine>,
    sessions: Arc<SessionStore>,
}

impl AppState {
    /// Bundle the engine with a session store sized for it
    pub fn new(engine: Arc<ChatEngine>, session_ttl_seconds: u64) -> Self {
        let sessions = Arc::new(SessionStore::new(engine.memory_size(), session_ttl_seconds));
        Self { engine, sessions }
    }

    /// Live sessions
    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }
}

/// Body of `POST /api/sessions`
#[derive(Debug, Default, Deserialize)]
pub struct CreateSessionRequest {
    /// Initial mode name; unknown names fall back to chat
    #[serde(default)]
    pub mode: Option<String>,
}

/// Response of `POST /api/sessions`
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
    pub mode: Mode,
}

/// Body of `POST /api/chat`
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// Existing session; a new one is created when absent
    #[serde(default)]
    pub session_id: Option<Uuid>,
    /// User text
    pub message: String,
    /// Mode name; the session's current mode is kept when absent
    #[serde(default)]
    pub mode: Option<String>,
}

/// Response of `POST /api/chat`
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub session_id: Uuid,
    pub reply: String,
    pub mode: Mode,
    pub fallback: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge: Option<KnowledgeLookup>,
    /// Rendered chat bubbles for the whole history
    pub html: String,
    pub history: Vec<Turn>,
}

/// Response of `GET /api/sessions/:id/history`
#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub session_id: Uuid,
    pub mode: Mode,
    pub turns: Vec<Turn>,
    pub html: String,
}

/// Entry of `GET /api/modes`
#[derive(Debug, Serialize, Deserialize)]
pub struct ModeInfo {
    pub name: String,
    pub description: String,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Error returned by handlers
///
/// Validation failures map to 400, unknown sessions to 404, everything
/// else to 500.
#[derive(Debug)]
pub struct ApiError(anyhow::Error);

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0.downcast_ref::<ChatError>() {
            Some(ChatError::Validation(_)) => StatusCode::BAD_REQUEST,
            Some(ChatError::SessionNotFound(_)) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "Request failed");
        } else {
            tracing::debug!(error = %self.0, "Request rejected");
        }
        let body = Json(ErrorBody {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

fn rejected_json(rejection: JsonRejection) -> ApiError {
    ChatError::Validation(format!("invalid request body: {}", rejection.body_text())).into()
}

fn rejected_path(rejection: PathRejection) -> ApiError {
    ChatError::Validation(format!("invalid session id: {}", rejection.body_text())).into()
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/health", get(|| async { "OK" }))
        .route("/api/modes", get(list_modes))
        .route("/api/sessions", post(create_session))
        .route("/api/chat", post(chat))
        .route("/api/sessions/:id/history", get(session_history))
        .route("/api/sessions/:id", axum::routing::delete(end_session))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the chat interface until Ctrl-C
///
/// # Errors
///
/// Returns error if the address cannot be bound or the server fails
pub async fn run_server(host: &str, port: u16, state: AppState) -> anyhow::Result<()> {
    let app = router(state);

    let listener = TcpListener::bind((host, port)).await?;
    tracing::info!("Chat interface listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn list_modes() -> Json<Vec<ModeInfo>> {
    Json(
        Mode::ALL
            .iter()
            .map(|mode| ModeInfo {
                name: mode.to_string(),
                description: mode.description().to_string(),
            })
            .collect(),
    )
}

async fn create_session(
    State(state): State<AppState>,
    body: Option<Json<CreateSessionRequest>>,
) -> (StatusCode, Json<CreateSessionResponse>) {
    let request = body.map(|Json(r)| r).unwrap_or_default();
    let mode = request.mode.as_deref().map(Mode::normalize).unwrap_or_default();

    let handle = state.sessions.create(mode).await;
    let session_id = handle.lock().await.id();

    (
        StatusCode::CREATED,
        Json(CreateSessionResponse { session_id, mode }),
    )
}

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = payload.map_err(rejected_json)?;
    if request.message.trim().is_empty() {
        return Err(ChatError::Validation("message cannot be empty".to_string()).into());
    }

    let requested_mode = request.mode.as_deref().map(Mode::normalize);
    let handle = state
        .sessions
        .get_or_create(request.session_id, requested_mode.unwrap_or_default())
        .await?;

    let mut session = handle.lock().await;
    let mode = requested_mode.unwrap_or_else(|| session.mode());

    let reply = state
        .engine
        .respond(&mut session, &request.message, mode)
        .await?;

    Ok(Json(ChatResponse {
        session_id: session.id(),
        reply: reply.text,
        mode: reply.mode,
        fallback: reply.fallback,
        knowledge: reply.knowledge,
        html: render_history(session.history()),
        history: session.history().to_vec(),
    }))
}

async fn session_history(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let Path(id) = id.map_err(rejected_path)?;
    let handle = state.sessions.get(id).await?;
    let session = handle.lock().await;

    Ok(Json(HistoryResponse {
        session_id: session.id(),
        mode: session.mode(),
        turns: session.history().to_vec(),
        html: render_history(session.history()),
    }))
}

async fn end_session(
    State(state): State<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id.map_err(rejected_path)?;
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ChatError::SessionNotFound(id.to_string()).into())
    }
}
