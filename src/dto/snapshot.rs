use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    services::leaderboard,
    state::session::{SessionDoc, SessionPhase, SessionStatus},
};

/// One leaderboard row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardEntry {
    /// Stable player id.
    pub player_id: String,
    /// Display name.
    pub name: String,
    /// Accumulated score.
    pub score: u32,
    /// Whether the player's latest submission was correct, when any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_answer_correct: Option<bool>,
}

/// Projection of the active item, withholding the answer while the question
/// is still open.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CurrentItemView {
    /// Prompt shown to players.
    pub prompt: String,
    /// Candidate answers.
    pub options: Vec<String>,
    /// Correct option, present only from reveal onwards.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub answer_index: Option<usize>,
    /// Per-option explanations, present only from reveal onwards.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub explanations: Vec<String>,
}

/// Full presentation state derived from one session document.
///
/// Every store notification produces a fresh snapshot; observers replace
/// their whole view rather than diffing.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionSnapshot {
    /// Session identifier.
    pub session_id: String,
    /// Join code.
    pub pin: String,
    /// Lifecycle status.
    pub status: SessionStatus,
    /// Gameplay phase.
    pub phase: SessionPhase,
    /// Index of the active question.
    pub question_index: usize,
    /// Total number of questions in the snapshot.
    pub total_items: usize,
    /// Answering time per question.
    pub question_duration_seconds: u32,
    /// Absolute deadline of the active question (unix milliseconds).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question_deadline: Option<i64>,
    /// The active item, absent in the lobby.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_item: Option<CurrentItemView>,
    /// Submissions per option for the active question, absent in the lobby.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tally: Option<Vec<u32>>,
    /// Players ranked for podium rendering.
    pub leaderboard: Vec<LeaderboardEntry>,
}

impl SessionSnapshot {
    /// Derive the presentation state from a session document.
    pub fn from_doc(session_id: &str, doc: &SessionDoc) -> Self {
        let revealed = matches!(
            doc.state.phase,
            SessionPhase::Reveal | SessionPhase::Finished
        );
        // In the lobby no question is active yet; leaking the first item
        // would show players the prompt before the host starts.
        let active_item = if doc.state.phase == SessionPhase::Lobby {
            None
        } else {
            doc.items.get(doc.state.question_index)
        };

        let current_item = active_item.map(|item| CurrentItemView {
            prompt: item.prompt().to_owned(),
            options: item.options().to_vec(),
            answer_index: revealed.then(|| item.answer_index()),
            explanations: if revealed {
                item.explanations().to_vec()
            } else {
                Vec::new()
            },
        });

        let tally = active_item.map(|item| {
            let index_key = doc.state.question_index.to_string();
            match doc.answers.get(&index_key) {
                Some(answers) => leaderboard::tally(answers, item.options().len()),
                None => vec![0; item.options().len()],
            }
        });

        Self {
            session_id: session_id.to_owned(),
            pin: doc.pin.clone(),
            status: doc.status,
            phase: doc.state.phase,
            question_index: doc.state.question_index,
            total_items: doc.items.len(),
            question_duration_seconds: doc.state.question_duration_seconds,
            question_deadline: doc.state.question_deadline,
            current_item,
            tally,
            leaderboard: leaderboard::rank(&doc.players),
        }
    }
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use crate::state::session::{AnswerDoc, PlayerDoc, QuizItem, SessionState};

    use super::*;

    fn doc(phase: SessionPhase) -> SessionDoc {
        let mut players = IndexMap::new();
        players.insert(
            "p1".to_string(),
            PlayerDoc {
                name: "Ana".into(),
                score: 625,
                joined_at: 0,
                last_answer_index: Some(0),
                last_answer_correct: Some(true),
            },
        );

        let mut answers_q0 = IndexMap::new();
        answers_q0.insert(
            "p1".to_string(),
            AnswerDoc {
                selected_index: 0,
                correct: true,
                timestamp: 0,
                score_delta: 625,
            },
        );
        let mut answers = IndexMap::new();
        answers.insert("0".to_string(), answers_q0);

        SessionDoc {
            owner_id: "host".into(),
            pin: "123456".into(),
            content_set_id: "set".into(),
            kind: None,
            status: SessionStatus::InProgress,
            state: SessionState {
                phase,
                question_index: 0,
                question_duration_seconds: 20,
                question_deadline: Some(99_000),
            },
            items: vec![QuizItem::Grammar {
                sentence: "She ___ fast.".into(),
                options: vec!["run".into(), "runs".into()],
                answer_index: 1,
                explanations: vec!["plural".into(), "third person".into()],
            }],
            players,
            answers,
        }
    }

    #[test]
    fn lobby_snapshot_withholds_the_item_entirely() {
        let mut lobby_doc = doc(SessionPhase::Lobby);
        lobby_doc.status = SessionStatus::Lobby;

        let snapshot = SessionSnapshot::from_doc("s1", &lobby_doc);
        assert!(snapshot.current_item.is_none());
        assert!(snapshot.tally.is_none());
        assert_eq!(snapshot.total_items, 1);
    }

    #[test]
    fn question_phase_withholds_the_answer() {
        let snapshot = SessionSnapshot::from_doc("s1", &doc(SessionPhase::Question));
        let item = snapshot.current_item.unwrap();
        assert_eq!(item.answer_index, None);
        assert!(item.explanations.is_empty());
        assert_eq!(snapshot.tally, Some(vec![1, 0]));
    }

    #[test]
    fn reveal_phase_exposes_answer_and_explanations() {
        let snapshot = SessionSnapshot::from_doc("s1", &doc(SessionPhase::Reveal));
        let item = snapshot.current_item.unwrap();
        assert_eq!(item.answer_index, Some(1));
        assert_eq!(item.explanations.len(), 2);
        assert_eq!(snapshot.leaderboard[0].name, "Ana");
    }
}
