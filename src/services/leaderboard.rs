//! Deterministic leaderboard and response-tally derivation.
//!
//! Host and player screens receive the same snapshot at possibly different
//! times; the ordering here must therefore be a pure function of the
//! score/name multiset so every observer renders the same podium.

use std::cmp::Reverse;

use indexmap::IndexMap;

use crate::{
    dto::snapshot::LeaderboardEntry,
    state::session::{AnswerDoc, PlayerDoc},
};

/// Rank players: score descending, then name ascending case-insensitively,
/// then exact name, then player id as the final total-order tie-break.
pub fn rank(players: &IndexMap<String, PlayerDoc>) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = players
        .iter()
        .map(|(player_id, player)| LeaderboardEntry {
            player_id: player_id.clone(),
            name: player.name.clone(),
            score: player.score,
            last_answer_correct: player.last_answer_correct,
        })
        .collect();

    entries.sort_by_key(|entry| {
        (
            Reverse(entry.score),
            entry.name.to_lowercase(),
            entry.name.clone(),
            entry.player_id.clone(),
        )
    });

    entries
}

/// Count submissions per option for one question.
pub fn tally(answers: &IndexMap<String, AnswerDoc>, option_count: usize) -> Vec<u32> {
    let mut counts = vec![0u32; option_count];
    for answer in answers.values() {
        if let Some(slot) = counts.get_mut(answer.selected_index) {
            *slot += 1;
        }
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(name: &str, score: u32) -> PlayerDoc {
        PlayerDoc {
            name: name.into(),
            score,
            joined_at: 0,
            last_answer_index: None,
            last_answer_correct: None,
        }
    }

    #[test]
    fn orders_by_score_then_name_case_insensitively() {
        let mut players = IndexMap::new();
        players.insert("p1".to_string(), player("Ana", 500));
        players.insert("p2".to_string(), player("ana", 500));
        players.insert("p3".to_string(), player("Bo", 900));

        let ranked = rank(&players);
        let names: Vec<&str> = ranked.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Bo", "Ana", "ana"]);
        assert_eq!(ranked[0].score, 900);
    }

    #[test]
    fn identical_multisets_rank_identically() {
        let mut a = IndexMap::new();
        a.insert("x".to_string(), player("Cleo", 100));
        a.insert("y".to_string(), player("ben", 300));

        // Same multiset, different insertion order.
        let mut b = IndexMap::new();
        b.insert("y".to_string(), player("ben", 300));
        b.insert("x".to_string(), player("Cleo", 100));

        assert_eq!(rank(&a), rank(&b));
    }

    #[test]
    fn tally_counts_selections_per_option() {
        let mut answers = IndexMap::new();
        answers.insert(
            "p1".to_string(),
            AnswerDoc {
                selected_index: 0,
                correct: true,
                timestamp: 0,
                score_delta: 1000,
            },
        );
        answers.insert(
            "p2".to_string(),
            AnswerDoc {
                selected_index: 2,
                correct: false,
                timestamp: 0,
                score_delta: 0,
            },
        );
        answers.insert(
            "p3".to_string(),
            AnswerDoc {
                selected_index: 2,
                correct: false,
                timestamp: 0,
                score_delta: 0,
            },
        );

        assert_eq!(tally(&answers, 3), vec![1, 0, 2]);
    }
}
