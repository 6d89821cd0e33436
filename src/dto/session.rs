use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::state::session::SessionStatus;

/// Payload used to create a brand-new session.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateSessionRequest {
    /// Content set the session snapshots its questions from.
    #[validate(length(min = 1, message = "content_set_id must not be empty"))]
    pub content_set_id: String,
    /// Optional exercise kind label (e.g. `grammar`, `vocab`), echoed back to
    /// clients but not interpreted by the protocol.
    #[serde(default)]
    pub kind: Option<String>,
}

/// Returned once a session has been created.
#[derive(Debug, Serialize, ToSchema)]
pub struct CreateSessionResponse {
    /// Identifier of the new session.
    pub session_id: String,
    /// Six-digit join code.
    pub pin: String,
}

/// Result of a PIN lookup.
#[derive(Debug, Serialize, ToSchema)]
pub struct PinLookupResponse {
    /// Identifier of the matching session.
    pub session_id: String,
    /// Lifecycle status of the matching session.
    pub status: SessionStatus,
}
