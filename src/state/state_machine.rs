use thiserror::Error;

use crate::state::session::{SessionPhase, SessionStatus};

/// The (status, phase, index) triple the transition function operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionFlow {
    /// Top-level lifecycle status.
    pub status: SessionStatus,
    /// Gameplay sub-phase.
    pub phase: SessionPhase,
    /// Index of the active question.
    pub question_index: usize,
}

impl SessionFlow {
    /// Flow of a freshly created session.
    pub fn lobby() -> Self {
        Self {
            status: SessionStatus::Lobby,
            phase: SessionPhase::Lobby,
            question_index: 0,
        }
    }
}

/// Host-driven events applied to a session's flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Open the first question from the lobby.
    Start,
    /// Show the answer for the active question.
    Reveal,
    /// Advance to the next question, or finish after the last one.
    Next,
    /// Force the session to finished from any point.
    End,
}

/// Error returned when an event cannot be applied to the current flow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// The event is not legal from the current flow.
    #[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
    Invalid {
        /// Flow the session was in when the event was received.
        from: SessionFlow,
        /// The rejected event.
        event: SessionEvent,
    },
    /// `Start` was attempted on a session whose items snapshot is empty.
    #[error("cannot start a session with an empty item set")]
    EmptyItemSet,
}

/// Result of a legal transition. `fresh_deadline` tells the caller to stamp
/// `question_deadline = now + duration` before persisting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    /// Flow after the event.
    pub next: SessionFlow,
    /// Whether a new question just opened and needs a deadline.
    pub fresh_deadline: bool,
}

/// Compute the flow resulting from applying `event`, without side effects.
///
/// `total_items` is the length of the session's items snapshot; it decides
/// both whether `Start` is legal and whether `Next` finishes the quiz.
pub fn advance(
    current: SessionFlow,
    event: SessionEvent,
    total_items: usize,
) -> Result<Transition, TransitionError> {
    let finished = SessionFlow {
        status: SessionStatus::Finished,
        phase: SessionPhase::Finished,
        question_index: current.question_index,
    };

    let transition = match (current.status, current.phase, event) {
        (SessionStatus::Lobby, SessionPhase::Lobby, SessionEvent::Start) => {
            if total_items == 0 {
                return Err(TransitionError::EmptyItemSet);
            }
            Transition {
                next: SessionFlow {
                    status: SessionStatus::InProgress,
                    phase: SessionPhase::Question,
                    question_index: 0,
                },
                fresh_deadline: true,
            }
        }
        (SessionStatus::InProgress, SessionPhase::Question, SessionEvent::Reveal) => Transition {
            next: SessionFlow {
                phase: SessionPhase::Reveal,
                ..current
            },
            // The old deadline stays as informational history.
            fresh_deadline: false,
        },
        (SessionStatus::InProgress, SessionPhase::Reveal, SessionEvent::Next) => {
            if current.question_index + 1 == total_items {
                Transition {
                    next: finished,
                    fresh_deadline: false,
                }
            } else {
                Transition {
                    next: SessionFlow {
                        status: SessionStatus::InProgress,
                        phase: SessionPhase::Question,
                        question_index: current.question_index + 1,
                    },
                    fresh_deadline: true,
                }
            }
        }
        // End is accepted from anywhere, idempotently so on finished sessions.
        (_, _, SessionEvent::End) => Transition {
            next: finished,
            fresh_deadline: false,
        },
        (_, _, event) => {
            return Err(TransitionError::Invalid {
                from: current,
                event,
            });
        }
    };

    Ok(transition)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(flow: SessionFlow, event: SessionEvent, total: usize) -> SessionFlow {
        advance(flow, event, total).unwrap().next
    }

    #[test]
    fn full_happy_path_through_two_questions() {
        let mut flow = SessionFlow::lobby();

        let start = advance(flow, SessionEvent::Start, 2).unwrap();
        assert!(start.fresh_deadline);
        flow = start.next;
        assert_eq!(flow.status, SessionStatus::InProgress);
        assert_eq!(flow.phase, SessionPhase::Question);
        assert_eq!(flow.question_index, 0);

        flow = step(flow, SessionEvent::Reveal, 2);
        assert_eq!(flow.phase, SessionPhase::Reveal);

        let next = advance(flow, SessionEvent::Next, 2).unwrap();
        assert!(next.fresh_deadline);
        flow = next.next;
        assert_eq!(flow.question_index, 1);
        assert_eq!(flow.phase, SessionPhase::Question);

        flow = step(flow, SessionEvent::Reveal, 2);
        let last = advance(flow, SessionEvent::Next, 2).unwrap();
        assert!(!last.fresh_deadline);
        assert_eq!(last.next.status, SessionStatus::Finished);
        assert_eq!(last.next.phase, SessionPhase::Finished);
    }

    #[test]
    fn start_requires_items() {
        let err = advance(SessionFlow::lobby(), SessionEvent::Start, 0).unwrap_err();
        assert_eq!(err, TransitionError::EmptyItemSet);
    }

    #[test]
    fn only_start_is_legal_from_lobby() {
        for event in [SessionEvent::Reveal, SessionEvent::Next] {
            let err = advance(SessionFlow::lobby(), event, 3).unwrap_err();
            match err {
                TransitionError::Invalid { from, event: got } => {
                    assert_eq!(from, SessionFlow::lobby());
                    assert_eq!(got, event);
                }
                other => panic!("unexpected error: {other:?}"),
            }
        }
    }

    #[test]
    fn reveal_only_from_question_phase() {
        let reveal_flow = SessionFlow {
            status: SessionStatus::InProgress,
            phase: SessionPhase::Reveal,
            question_index: 0,
        };
        assert!(advance(reveal_flow, SessionEvent::Reveal, 3).is_err());
    }

    #[test]
    fn end_forces_finished_from_anywhere() {
        let playing = SessionFlow {
            status: SessionStatus::InProgress,
            phase: SessionPhase::Question,
            question_index: 1,
        };
        let ended = step(playing, SessionEvent::End, 3);
        assert_eq!(ended.status, SessionStatus::Finished);
        assert_eq!(ended.phase, SessionPhase::Finished);

        // Idempotent re-confirmation on an already-finished session.
        let again = step(ended, SessionEvent::End, 3);
        assert_eq!(again.status, SessionStatus::Finished);
    }
}
