use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for Quizpin Back.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::session::create_session,
        crate::routes::session::lookup_pin,
        crate::routes::session::session_snapshot,
        crate::routes::session::start_session,
        crate::routes::session::reveal_question,
        crate::routes::session::next_question,
        crate::routes::session::end_session,
        crate::routes::player::join,
        crate::routes::player::submit_answer,
        crate::routes::content::register_content_set,
        crate::routes::content::get_content_set,
        crate::routes::sse::session_events,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::session::CreateSessionRequest,
            crate::dto::session::CreateSessionResponse,
            crate::dto::session::PinLookupResponse,
            crate::dto::player::JoinRequest,
            crate::dto::player::JoinResponse,
            crate::dto::player::SubmitAnswerRequest,
            crate::dto::player::SubmitAnswerResponse,
            crate::dto::content::RegisterContentSetRequest,
            crate::dto::content::ContentSetSummary,
            crate::dto::content::ContentSetResponse,
            crate::dto::snapshot::SessionSnapshot,
            crate::dto::snapshot::CurrentItemView,
            crate::dto::snapshot::LeaderboardEntry,
            crate::state::session::QuizItem,
            crate::state::session::SessionStatus,
            crate::state::session::SessionPhase,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "session", description = "Host-side session lifecycle"),
        (name = "player", description = "Player join and answer protocol"),
        (name = "content", description = "Content set registry"),
        (name = "sse", description = "Server-sent events streams"),
    )
)]
pub struct ApiDoc;
