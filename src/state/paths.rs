//! Wire paths of the session subtree inside the store.

/// Collection holding all session documents.
pub const SESSIONS: &str = "sessions";
/// Collection holding registered content sets.
pub const CONTENT_SETS: &str = "content_sets";

/// `sessions/{id}`
pub fn session(session_id: &str) -> String {
    format!("{SESSIONS}/{session_id}")
}

/// `sessions/{id}/state`
pub fn session_state(session_id: &str) -> String {
    format!("{SESSIONS}/{session_id}/state")
}

/// `sessions/{id}/items`
pub fn session_items(session_id: &str) -> String {
    format!("{SESSIONS}/{session_id}/items")
}

/// `sessions/{id}/players/{playerId}`
pub fn player(session_id: &str, player_id: &str) -> String {
    format!("{SESSIONS}/{session_id}/players/{player_id}")
}

/// `sessions/{id}/answers/{questionIndex}/{playerId}`
pub fn answer(session_id: &str, question_index: usize, player_id: &str) -> String {
    format!("{SESSIONS}/{session_id}/answers/{question_index}/{player_id}")
}

/// `content_sets/{id}`
pub fn content_set(content_set_id: &str) -> String {
    format!("{CONTENT_SETS}/{content_set_id}")
}
