use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use validator::Validate;

use crate::{
    dto::{
        session::{CreateSessionRequest, CreateSessionResponse, PinLookupResponse},
        snapshot::SessionSnapshot,
    },
    error::AppError,
    identity::Identity,
    services::session_service,
    state::{SharedState, state_machine::SessionEvent},
};

/// Routes handling the host-side session lifecycle.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/sessions", post(create_session))
        .route("/sessions/pin/{pin}", get(lookup_pin))
        .route("/sessions/{id}", get(session_snapshot))
        .route("/sessions/{id}/start", post(start_session))
        .route("/sessions/{id}/reveal", post(reveal_question))
        .route("/sessions/{id}/next", post(next_question))
        .route("/sessions/{id}/end", post(end_session))
}

/// Create a fresh session in the lobby state.
#[utoipa::path(
    post,
    path = "/sessions",
    tag = "session",
    request_body = CreateSessionRequest,
    responses(
        (status = 200, description = "Session created", body = CreateSessionResponse)
    )
)]
pub async fn create_session(
    State(state): State<SharedState>,
    identity: Identity,
    Json(payload): Json<CreateSessionRequest>,
) -> Result<Json<CreateSessionResponse>, AppError> {
    payload.validate()?;
    let created = session_service::create_session(&state, &identity, payload).await?;
    Ok(Json(created))
}

/// Resolve a PIN to its session.
#[utoipa::path(
    get,
    path = "/sessions/pin/{pin}",
    tag = "session",
    params(("pin" = String, Path, description = "Six-digit join code")),
    responses(
        (status = 200, description = "Session found", body = PinLookupResponse)
    )
)]
pub async fn lookup_pin(
    State(state): State<SharedState>,
    Path(pin): Path<String>,
) -> Result<Json<PinLookupResponse>, AppError> {
    let lookup = session_service::lookup_pin(&state, &pin).await?;
    Ok(Json(lookup))
}

/// Fetch the current presentation snapshot of a session.
#[utoipa::path(
    get,
    path = "/sessions/{id}",
    tag = "session",
    params(("id" = String, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Current snapshot", body = SessionSnapshot)
    )
)]
pub async fn session_snapshot(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = session_service::session_snapshot(&state, &id).await?;
    Ok(Json(snapshot))
}

/// Open the first question (host only).
#[utoipa::path(
    post,
    path = "/sessions/{id}/start",
    tag = "session",
    params(("id" = String, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Session started", body = SessionSnapshot)
    )
)]
pub async fn start_session(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    apply(&state, &identity, &id, SessionEvent::Start).await
}

/// Reveal the answer for the active question (host only).
#[utoipa::path(
    post,
    path = "/sessions/{id}/reveal",
    tag = "session",
    params(("id" = String, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Answer revealed", body = SessionSnapshot)
    )
)]
pub async fn reveal_question(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    apply(&state, &identity, &id, SessionEvent::Reveal).await
}

/// Advance past the reveal, finishing after the last question (host only).
#[utoipa::path(
    post,
    path = "/sessions/{id}/next",
    tag = "session",
    params(("id" = String, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Advanced to next question or finished", body = SessionSnapshot)
    )
)]
pub async fn next_question(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    apply(&state, &identity, &id, SessionEvent::Next).await
}

/// Force the session to finished from any state (host only).
#[utoipa::path(
    post,
    path = "/sessions/{id}/end",
    tag = "session",
    params(("id" = String, Path, description = "Session identifier")),
    responses(
        (status = 200, description = "Session ended", body = SessionSnapshot)
    )
)]
pub async fn end_session(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<String>,
) -> Result<Json<SessionSnapshot>, AppError> {
    apply(&state, &identity, &id, SessionEvent::End).await
}

async fn apply(
    state: &SharedState,
    identity: &Identity,
    session_id: &str,
    event: SessionEvent,
) -> Result<Json<SessionSnapshot>, AppError> {
    let snapshot = session_service::apply_event(state, identity, session_id, event).await?;
    Ok(Json(snapshot))
}
