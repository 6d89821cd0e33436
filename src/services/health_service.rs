use crate::dto::health::HealthResponse;

/// Respond with a static health payload; the in-process store has no
/// connectivity to probe.
pub fn health_status() -> HealthResponse {
    HealthResponse::ok()
}
