use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};

use crate::{
    dto::content::{ContentSetResponse, ContentSetSummary, RegisterContentSetRequest},
    error::AppError,
    identity::Identity,
    services::content_service,
    state::SharedState,
};

/// Routes handling the content set registry.
pub fn router() -> Router<SharedState> {
    Router::new()
        .route("/content-sets", post(register_content_set))
        .route("/content-sets/{id}", get(get_content_set))
}

/// Register a content set for later session creation.
#[utoipa::path(
    post,
    path = "/content-sets",
    tag = "content",
    request_body = RegisterContentSetRequest,
    responses(
        (status = 200, description = "Content set registered", body = ContentSetSummary)
    )
)]
pub async fn register_content_set(
    State(state): State<SharedState>,
    _identity: Identity,
    Json(payload): Json<RegisterContentSetRequest>,
) -> Result<Json<ContentSetSummary>, AppError> {
    let summary = content_service::register_content_set(&state, payload).await?;
    Ok(Json(summary))
}

/// Fetch a registered content set.
#[utoipa::path(
    get,
    path = "/content-sets/{id}",
    tag = "content",
    params(("id" = String, Path, description = "Content set identifier")),
    responses(
        (status = 200, description = "Content set", body = ContentSetResponse)
    )
)]
pub async fn get_content_set(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ContentSetResponse>, AppError> {
    let items = content_service::get_content_set(&state, &id).await?;
    Ok(Json(ContentSetResponse {
        content_set_id: id,
        items,
    }))
}
