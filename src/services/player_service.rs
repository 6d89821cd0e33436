use serde_json::Value;
use tracing::info;

use crate::{
    dto::player::{JoinRequest, JoinResponse, SubmitAnswerRequest, SubmitAnswerResponse},
    error::ServiceError,
    identity::Identity,
    services::{scoring, session_service},
    state::{
        SharedState, paths,
        session::{AnswerDoc, PlayerDoc, SessionPhase, SessionStatus, unix_ms_now},
    },
    store::TransactOutcome,
};

/// Join a session by PIN, registering the caller as a player.
///
/// Re-joining is safe: an existing player record keeps its score and answer
/// feedback; only the display name and join timestamp refresh, so progress
/// survives incidental reconnects.
pub async fn join_by_pin(
    state: &SharedState,
    identity: &Identity,
    request: JoinRequest,
) -> Result<JoinResponse, ServiceError> {
    let (session_id, doc) = session_service::find_session_by_pin(state, &request.pin).await?;

    // New joins are lobby-only; a known player may re-join mid-game so a
    // reconnect does not lock them out.
    if doc.status != SessionStatus::Lobby && !doc.players.contains_key(&identity.id) {
        return Err(ServiceError::InvalidState(
            "session is no longer accepting players".into(),
        ));
    }

    let name = identity.display_name.clone();
    let outcome = state
        .store()
        .transact(
            &paths::player(&session_id, &identity.id),
            Box::new(move |current| {
                let player = match current.and_then(decode_player) {
                    Some(existing) => PlayerDoc {
                        name,
                        joined_at: unix_ms_now(),
                        ..existing
                    },
                    None => PlayerDoc {
                        name,
                        score: 0,
                        joined_at: unix_ms_now(),
                        last_answer_index: None,
                        last_answer_correct: None,
                    },
                };
                serde_json::to_value(player).ok()
            }),
        )
        .await?;

    if !outcome.committed() {
        return Err(ServiceError::InvalidState(
            "player record could not be written".into(),
        ));
    }

    info!(%session_id, player = %identity.id, "player joined");

    Ok(JoinResponse { session_id })
}

/// Submit an answer for the active question.
///
/// The server is the authority throughout: correctness is recomputed from
/// the canonical items snapshot, remaining time comes from the server clock
/// against the stored deadline, and the answer record acts as a reservation
/// so each player scores at most once per question.
pub async fn submit_answer(
    state: &SharedState,
    identity: &Identity,
    session_id: &str,
    request: SubmitAnswerRequest,
) -> Result<SubmitAnswerResponse, ServiceError> {
    let doc = session_service::load_session(state, session_id).await?;

    if !doc.players.contains_key(&identity.id) {
        return Err(ServiceError::InvalidState(
            "join the session before answering".into(),
        ));
    }
    if doc.status != SessionStatus::InProgress || doc.state.phase != SessionPhase::Question {
        return Err(ServiceError::InvalidState(
            "no question is currently open".into(),
        ));
    }
    if request.question_index != doc.state.question_index {
        return Err(ServiceError::InvalidState(format!(
            "question {} is not the active question",
            request.question_index
        )));
    }

    let item = doc
        .items
        .get(doc.state.question_index)
        .ok_or_else(|| ServiceError::InvalidState("items snapshot is missing".into()))?;
    if request.selected_index >= item.options().len() {
        return Err(ServiceError::InvalidArgument(format!(
            "selected_index {} is out of range for {} options",
            request.selected_index,
            item.options().len()
        )));
    }

    let deadline = doc
        .state
        .question_deadline
        .ok_or_else(|| ServiceError::InvalidState("question has no deadline".into()))?;
    let now = unix_ms_now();
    if now > deadline + state.config().late_tolerance_ms {
        return Err(ServiceError::InvalidState(
            "question deadline has passed".into(),
        ));
    }

    let correct = request.selected_index == item.answer_index();
    let remaining =
        scoring::seconds_remaining(deadline, now, doc.state.question_duration_seconds);
    let score_delta = scoring::score(
        correct,
        remaining,
        doc.state.question_duration_seconds,
        &state.config().scoring,
    );

    reserve_answer(
        state,
        session_id,
        doc.state.question_index,
        &identity.id,
        AnswerDoc {
            selected_index: request.selected_index,
            correct,
            timestamp: now,
            score_delta,
        },
    )
    .await?;

    let score = accrue_score(
        state,
        session_id,
        &identity.id,
        request.question_index,
        correct,
        score_delta,
    )
    .await?;

    info!(
        %session_id,
        player = %identity.id,
        question_index = request.question_index,
        correct,
        score_delta,
        "answer scored"
    );

    Ok(SubmitAnswerResponse {
        correct,
        score_delta,
        score,
    })
}

/// Claim the (question, player) answer slot; a pre-existing record aborts the
/// transaction and the submission.
async fn reserve_answer(
    state: &SharedState,
    session_id: &str,
    question_index: usize,
    player_id: &str,
    answer: AnswerDoc,
) -> Result<(), ServiceError> {
    let payload = serde_json::to_value(&answer)
        .map_err(|err| ServiceError::InvalidArgument(format!("unserialisable answer: {err}")))?;
    let outcome = state
        .store()
        .transact(
            &paths::answer(session_id, question_index, player_id),
            Box::new(move |current| match current {
                Some(_) => None,
                None => Some(payload),
            }),
        )
        .await?;

    if outcome.committed() {
        Ok(())
    } else {
        Err(ServiceError::InvalidState(
            "this question was already answered".into(),
        ))
    }
}

/// Add the delta to the player's score and refresh the feedback fields,
/// returning the new total.
async fn accrue_score(
    state: &SharedState,
    session_id: &str,
    player_id: &str,
    question_index: usize,
    correct: bool,
    score_delta: u32,
) -> Result<u32, ServiceError> {
    let outcome = state
        .store()
        .transact(
            &paths::player(session_id, player_id),
            Box::new(move |current| {
                let mut player = current.and_then(decode_player)?;
                player.score += score_delta;
                player.last_answer_index = Some(question_index);
                player.last_answer_correct = Some(correct);
                serde_json::to_value(player).ok()
            }),
        )
        .await?;

    match outcome {
        TransactOutcome::Committed(value) => decode_player(value)
            .map(|player| player.score)
            .ok_or_else(|| ServiceError::InvalidState("player record is corrupted".into())),
        TransactOutcome::Aborted(_) => Err(ServiceError::InvalidState(
            "player record disappeared during scoring".into(),
        )),
    }
}

fn decode_player(value: Value) -> Option<PlayerDoc> {
    serde_json::from_value(value).ok()
}
