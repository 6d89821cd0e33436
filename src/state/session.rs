use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;

/// Top-level lifecycle of a session. Monotonic, except the host may force
/// `Finished` from any point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    /// Players can join; the quiz has not started.
    Lobby,
    /// The quiz is running (see [`SessionPhase`] for the sub-state).
    InProgress,
    /// The quiz ended; the session is read-only.
    Finished,
}

/// Sub-state of an in-progress session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum SessionPhase {
    /// Mirrors `status == lobby` before the first question.
    Lobby,
    /// A question is open for answers until its deadline.
    Question,
    /// The answer for the current question is being shown.
    Reveal,
    /// Mirrors `status == finished`.
    Finished,
}

/// The `state` subtree of a session document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    /// Current gameplay phase.
    pub phase: SessionPhase,
    /// Index into the items snapshot of the active question.
    pub question_index: usize,
    /// Allotted answering time per question.
    pub question_duration_seconds: u32,
    /// Absolute deadline (unix milliseconds) of the active question, absent
    /// outside of question phases.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_deadline: Option<i64>,
}

/// One quiz item from the snapshotted content set.
///
/// Items are loosely structured per exercise type but all expose the common
/// prompt/options/answer capability used by the answer protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuizItem {
    /// Gap-fill grammar exercise built around a sentence.
    Grammar {
        /// Sentence containing the gap.
        sentence: String,
        /// Candidate fillers.
        options: Vec<String>,
        /// Index of the correct option.
        answer_index: usize,
        /// Optional per-option explanations shown at reveal.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        explanations: Vec<String>,
    },
    /// Vocabulary exercise built around a text fragment.
    Vocab {
        /// Prompt text.
        text: String,
        /// Candidate answers.
        options: Vec<String>,
        /// Index of the correct option.
        answer_index: usize,
        /// Optional per-option explanations shown at reveal.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        explanations: Vec<String>,
    },
}

impl QuizItem {
    /// Prompt shown to players regardless of the item type.
    pub fn prompt(&self) -> &str {
        match self {
            QuizItem::Grammar { sentence, .. } => sentence,
            QuizItem::Vocab { text, .. } => text,
        }
    }

    /// Candidate answers.
    pub fn options(&self) -> &[String] {
        match self {
            QuizItem::Grammar { options, .. } | QuizItem::Vocab { options, .. } => options,
        }
    }

    /// Index of the correct option.
    pub fn answer_index(&self) -> usize {
        match self {
            QuizItem::Grammar { answer_index, .. } | QuizItem::Vocab { answer_index, .. } => {
                *answer_index
            }
        }
    }

    /// Per-option explanations, empty when the author provided none.
    pub fn explanations(&self) -> &[String] {
        match self {
            QuizItem::Grammar { explanations, .. } | QuizItem::Vocab { explanations, .. } => {
                explanations
            }
        }
    }
}

/// One participant's record within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerDoc {
    /// Display name supplied by the identity provider.
    pub name: String,
    /// Accumulated score; every delta is non-negative.
    pub score: u32,
    /// Unix milliseconds of the (most recent) join.
    pub joined_at: i64,
    /// Question index of the most recent submission, for UI feedback only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_answer_index: Option<usize>,
    /// Whether the most recent submission was correct, for UI feedback only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_answer_correct: Option<bool>,
}

/// One (question, player) submission. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerDoc {
    /// Option the player selected.
    pub selected_index: usize,
    /// Server-recomputed correctness.
    pub correct: bool,
    /// Server arrival time, unix milliseconds.
    pub timestamp: i64,
    /// Points actually awarded by this submission.
    pub score_delta: u32,
}

/// Full session document as stored under `sessions/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionDoc {
    /// Identity of the creating host; immutable.
    pub owner_id: String,
    /// Six-digit join code.
    pub pin: String,
    /// Content set this session was snapshotted from.
    pub content_set_id: String,
    /// Optional exercise kind label supplied at creation, echoed to clients.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Top-level lifecycle status.
    pub status: SessionStatus,
    /// Gameplay sub-state.
    pub state: SessionState,
    /// Canonical shuffled item snapshot; write-once, never rewritten. An
    /// empty snapshot is not serialised so the write-once claim in
    /// `ensure_items_snapshot` sees the path as absent until it commits.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<QuizItem>,
    /// Participants keyed by player id.
    #[serde(default)]
    pub players: IndexMap<String, PlayerDoc>,
    /// Submissions keyed by question index (stringified), then player id.
    #[serde(default)]
    pub answers: IndexMap<String, IndexMap<String, AnswerDoc>>,
}

impl SessionDoc {
    /// Whether the session still accepts joins or answers.
    pub fn is_active(&self) -> bool {
        matches!(self.status, SessionStatus::Lobby | SessionStatus::InProgress)
    }
}

/// Current wall-clock time in unix milliseconds, the timestamp unit used on
/// the wire.
pub fn unix_ms_now() -> i64 {
    let now = OffsetDateTime::now_utc();
    (now.unix_timestamp_nanos() / 1_000_000) as i64
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn status_and_phase_use_wire_spelling() {
        assert_eq!(
            serde_json::to_value(SessionStatus::InProgress).unwrap(),
            json!("in-progress")
        );
        assert_eq!(
            serde_json::to_value(SessionPhase::Question).unwrap(),
            json!("question")
        );
    }

    #[test]
    fn quiz_item_tagged_roundtrip() {
        let item: QuizItem = serde_json::from_value(json!({
            "kind": "grammar",
            "sentence": "She ___ to school.",
            "options": ["go", "goes"],
            "answer_index": 1,
        }))
        .unwrap();
        assert_eq!(item.prompt(), "She ___ to school.");
        assert_eq!(item.answer_index(), 1);
        assert!(item.explanations().is_empty());

        let vocab = QuizItem::Vocab {
            text: "A synonym of happy".into(),
            options: vec!["glad".into(), "sad".into()],
            answer_index: 0,
            explanations: vec![],
        };
        let value = serde_json::to_value(&vocab).unwrap();
        assert_eq!(value["kind"], json!("vocab"));
    }

    #[test]
    fn empty_items_are_not_serialised() {
        let doc: SessionDoc = serde_json::from_value(json!({
            "owner_id": "host-1",
            "pin": "123456",
            "content_set_id": "set-1",
            "status": "lobby",
            "state": {
                "phase": "lobby",
                "question_index": 0,
                "question_duration_seconds": 20,
            },
        }))
        .unwrap();
        let value = serde_json::to_value(&doc).unwrap();
        assert!(value.get("items").is_none());
    }

    #[test]
    fn session_doc_defaults_optional_subtrees() {
        let doc: SessionDoc = serde_json::from_value(json!({
            "owner_id": "host-1",
            "pin": "123456",
            "content_set_id": "set-1",
            "status": "lobby",
            "state": {
                "phase": "lobby",
                "question_index": 0,
                "question_duration_seconds": 20,
            },
        }))
        .unwrap();
        assert!(doc.items.is_empty());
        assert!(doc.players.is_empty());
        assert!(doc.answers.is_empty());
        assert!(doc.is_active());
    }
}
