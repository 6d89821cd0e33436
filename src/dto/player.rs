use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Payload used to join a session by its PIN.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct JoinRequest {
    /// Six-digit join code.
    #[validate(length(equal = 6, message = "pin must be exactly 6 digits"))]
    pub pin: String,
}

/// Returned once the caller has been registered as a player.
#[derive(Debug, Serialize, ToSchema)]
pub struct JoinResponse {
    /// Session the player joined.
    pub session_id: String,
}

/// Payload used to submit an answer for the active question.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitAnswerRequest {
    /// Question the answer targets; must equal the session's current index.
    pub question_index: usize,
    /// Option the player selected.
    pub selected_index: usize,
}

/// Feedback returned to the submitting player.
#[derive(Debug, Serialize, ToSchema)]
pub struct SubmitAnswerResponse {
    /// Whether the selection matched the canonical answer.
    pub correct: bool,
    /// Points awarded by this submission.
    pub score_delta: u32,
    /// The player's total score after accrual.
    pub score: u32,
}
