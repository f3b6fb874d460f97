//! HTTP request handlers

use super::types::{
    ActionResponse, ChatRequest, CreateSessionResponse, ErrorResponse, LoginRequest,
    SessionView, SuccessResponse, TopicRequest, TopicsResponse,
};
use super::AppState;
use crate::runtime::{ActionReport, SessionRuntime};
use crate::state_machine::TransitionError;
use crate::system_prompt::Topic;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Session lifecycle
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/:id", get(get_session).delete(delete_session))
        // User actions
        .route("/api/sessions/:id/login", post(login))
        .route("/api/sessions/:id/topic", post(select_topic))
        .route("/api/sessions/:id/messages", post(send_message))
        .route("/api/sessions/:id/credits", post(add_credit))
        .route("/api/sessions/:id/logout", post(logout))
        // Static data
        .route("/api/topics", get(list_topics))
        .route("/version", get(get_version))
        .with_state(state)
}

// ============================================================
// Session lifecycle
// ============================================================

async fn create_session(State(state): State<AppState>) -> Json<CreateSessionResponse> {
    let (session_id, runtime) = state.sessions.create().await;
    let runtime = runtime.lock().await;
    Json(CreateSessionResponse {
        session_id,
        session: SessionView::from_runtime(&runtime),
    })
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, AppError> {
    let runtime = lookup(&state, &id).await?;
    let runtime = runtime.lock().await;
    Ok(Json(SessionView::from_runtime(&runtime)))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AppError> {
    if state.sessions.remove(&id).await {
        Ok(Json(SuccessResponse { success: true }))
    } else {
        Err(AppError::NotFound(format!("Session not found: {id}")))
    }
}

// ============================================================
// User actions
// ============================================================

async fn login(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, AppError> {
    let Json(req) = payload?;
    let runtime = lookup(&state, &id).await?;
    let mut runtime = runtime.lock().await;
    let report = runtime.login(&req.username).await?;
    Ok(respond(&runtime, report))
}

async fn select_topic(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<TopicRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, AppError> {
    let Json(req) = payload?;
    let runtime = lookup(&state, &id).await?;
    let mut runtime = runtime.lock().await;
    let report = runtime.select_topic(req.topic).await?;
    Ok(respond(&runtime, report))
}

async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ActionResponse>, AppError> {
    let Json(req) = payload?;
    let runtime = lookup(&state, &id).await?;
    let mut runtime = runtime.lock().await;
    let report = runtime.send_message(&req.text).await?;
    Ok(respond(&runtime, report))
}

async fn add_credit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    let runtime = lookup(&state, &id).await?;
    let mut runtime = runtime.lock().await;
    let report = runtime.add_credit().await?;
    Ok(respond(&runtime, report))
}

async fn logout(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ActionResponse>, AppError> {
    let runtime = lookup(&state, &id).await?;
    let mut runtime = runtime.lock().await;
    let report = runtime.logout().await?;
    Ok(respond(&runtime, report))
}

// ============================================================
// Static data
// ============================================================

async fn list_topics() -> Json<TopicsResponse> {
    Json(TopicsResponse {
        topics: Topic::ALL.to_vec(),
    })
}

async fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

// ============================================================
// Helpers
// ============================================================

async fn lookup(state: &AppState, id: &str) -> Result<Arc<Mutex<SessionRuntime>>, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session not found: {id}")))
}

fn respond(runtime: &SessionRuntime, report: ActionReport) -> Json<ActionResponse> {
    Json(ActionResponse {
        session: SessionView::from_runtime(runtime),
        notices: report.notices,
    })
}

// ============================================================
// Error Handling
// ============================================================

enum AppError {
    BadRequest(String),
    Conflict(String),
    NotFound(String),
}

impl From<TransitionError> for AppError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::Validation(e) => AppError::BadRequest(e.to_string()),
            e @ (TransitionError::Busy | TransitionError::InvalidTransition(_)) => {
                AppError::Conflict(e.to_string())
            }
        }
    }
}

// Malformed bodies get the same JSON error shape as everything else
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };

        let body = Json(ErrorResponse::new(message));
        (status, body).into_response()
    }
}
