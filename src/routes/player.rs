use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use validator::Validate;

use crate::{
    dto::player::{JoinRequest, JoinResponse, SubmitAnswerRequest, SubmitAnswerResponse},
    error::AppError,
    identity::Identity,
    services::player_service,
    state::SharedState,
};

/// Routes handling the player join/answer protocol.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/join", post(join))
        .route("/sessions/{id}/answers", post(submit_answer))
}

/// Join a session by its PIN.
#[utoipa::path(
    post,
    path = "/join",
    tag = "player",
    request_body = JoinRequest,
    responses(
        (status = 200, description = "Joined the session", body = JoinResponse)
    )
)]
pub async fn join(
    State(state): State<SharedState>,
    identity: Identity,
    Json(payload): Json<JoinRequest>,
) -> Result<Json<JoinResponse>, AppError> {
    payload.validate()?;
    let joined = player_service::join_by_pin(&state, &identity, payload).await?;
    Ok(Json(joined))
}

/// Submit an answer for the active question.
#[utoipa::path(
    post,
    path = "/sessions/{id}/answers",
    tag = "player",
    params(("id" = String, Path, description = "Session identifier")),
    request_body = SubmitAnswerRequest,
    responses(
        (status = 200, description = "Answer accepted and scored", body = SubmitAnswerResponse)
    )
)]
pub async fn submit_answer(
    State(state): State<SharedState>,
    identity: Identity,
    Path(id): Path<String>,
    Json(payload): Json<SubmitAnswerRequest>,
) -> Result<Json<SubmitAnswerResponse>, AppError> {
    let feedback = player_service::submit_answer(&state, &identity, &id, payload).await?;
    Ok(Json(feedback))
}
