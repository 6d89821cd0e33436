use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::state::session::QuizItem;

/// Payload used to register a content set.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterContentSetRequest {
    /// Ordered question items; each is validated before being stored.
    pub items: Vec<QuizItem>,
}

/// Returned once a content set has been registered.
#[derive(Debug, Serialize, ToSchema)]
pub struct ContentSetSummary {
    /// Identifier to reference from session creation.
    pub content_set_id: String,
    /// Number of items in the set.
    pub item_count: usize,
}

/// A registered content set as returned by the fetch endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct ContentSetResponse {
    /// Identifier of the set.
    pub content_set_id: String,
    /// The stored items.
    pub items: Vec<QuizItem>,
}
