use axum::Router;

use crate::state::SharedState;

/// Content set registry routes.
pub mod content;
/// Swagger UI wiring.
pub mod docs;
/// Health check route.
pub mod health;
/// Player join and answer routes.
pub mod player;
/// Host-side session lifecycle routes.
pub mod session;
/// Session SSE stream route.
pub mod sse;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(session::router())
        .merge(player::router())
        .merge(content::router())
        .merge(sse::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}
