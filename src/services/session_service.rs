use rand::{Rng, seq::SliceRandom};
use serde_json::{Map, Value, json};
use tracing::info;
use uuid::Uuid;

use crate::{
    dto::{
        session::{CreateSessionRequest, CreateSessionResponse, PinLookupResponse},
        snapshot::SessionSnapshot,
    },
    error::ServiceError,
    identity::Identity,
    services::content_service,
    state::{
        SharedState, paths,
        session::{QuizItem, SessionDoc, SessionPhase, SessionState, SessionStatus, unix_ms_now},
        state_machine::{SessionEvent, SessionFlow, advance},
    },
    store::TransactOutcome,
};

/// Create a session in the lobby state, snapshotting a shuffled copy of the
/// content set and allocating a PIN that no active session currently holds.
pub async fn create_session(
    state: &SharedState,
    identity: &Identity,
    request: CreateSessionRequest,
) -> Result<CreateSessionResponse, ServiceError> {
    let CreateSessionRequest {
        content_set_id,
        kind,
    } = request;

    if content_set_id.trim().is_empty() {
        return Err(ServiceError::InvalidArgument(
            "content_set_id must not be empty".into(),
        ));
    }

    let mut items = content_service::get_content_set(state, &content_set_id).await?;
    {
        // ThreadRng is not Send; keep it out of scope before the next await.
        let mut rng = rand::rng();
        items.shuffle(&mut rng);
    }

    let pin = allocate_pin(state).await?;
    let session_id = Uuid::new_v4().to_string();

    let doc = SessionDoc {
        owner_id: identity.id.clone(),
        pin: pin.clone(),
        content_set_id,
        kind,
        status: SessionStatus::Lobby,
        state: SessionState {
            phase: SessionPhase::Lobby,
            question_index: 0,
            question_duration_seconds: state.config().default_question_duration_seconds,
            question_deadline: None,
        },
        items: Vec::new(),
        players: Default::default(),
        answers: Default::default(),
    };

    let payload = serde_json::to_value(&doc)
        .map_err(|err| ServiceError::InvalidArgument(format!("unserialisable session: {err}")))?;
    state
        .store()
        .put(&paths::session(&session_id), payload)
        .await?;

    ensure_items_snapshot(state, &session_id, items).await?;

    info!(%session_id, %pin, host = %identity.id, "created session");

    Ok(CreateSessionResponse { session_id, pin })
}

/// Write the items snapshot if and only if none exists yet, returning the
/// canonical snapshot either way. Whichever loader runs first wins; later
/// loaders observe the already-written value and never overwrite it.
pub async fn ensure_items_snapshot(
    state: &SharedState,
    session_id: &str,
    items: Vec<QuizItem>,
) -> Result<Vec<QuizItem>, ServiceError> {
    let candidate = serde_json::to_value(&items)
        .map_err(|err| ServiceError::InvalidArgument(format!("unserialisable items: {err}")))?;

    let outcome = state
        .store()
        .transact(
            &paths::session_items(session_id),
            Box::new(move |current| match current {
                Some(_) => None,
                None => Some(candidate),
            }),
        )
        .await?;

    let canonical = match outcome {
        TransactOutcome::Committed(value) => value,
        TransactOutcome::Aborted(Some(value)) => value,
        TransactOutcome::Aborted(None) => Value::Array(Vec::new()),
    };
    serde_json::from_value(canonical).map_err(|err| {
        ServiceError::InvalidState(format!(
            "items snapshot of session `{session_id}` is corrupted: {err}"
        ))
    })
}

/// Resolve a PIN to its session, preferring active (lobby or in-progress)
/// sessions over finished ones so stale sessions never shadow a live lobby.
pub async fn find_session_by_pin(
    state: &SharedState,
    pin: &str,
) -> Result<(String, SessionDoc), ServiceError> {
    let mut matches = state
        .store()
        .query(paths::SESSIONS, "pin", json!(pin))
        .await?;
    // Deterministic pick when several sessions share the PIN.
    matches.sort_by(|(a, _), (b, _)| a.cmp(b));

    let mut finished = None;
    for (session_id, value) in matches {
        let Ok(doc) = serde_json::from_value::<SessionDoc>(value) else {
            continue;
        };
        if doc.is_active() {
            return Ok((session_id, doc));
        }
        finished.get_or_insert((session_id, doc));
    }

    finished.ok_or_else(|| ServiceError::NotFound(format!("no session with pin `{pin}`")))
}

/// PIN lookup as exposed over REST.
pub async fn lookup_pin(state: &SharedState, pin: &str) -> Result<PinLookupResponse, ServiceError> {
    let (session_id, doc) = find_session_by_pin(state, pin).await?;
    Ok(PinLookupResponse {
        session_id,
        status: doc.status,
    })
}

/// Load and decode one session document.
pub async fn load_session(
    state: &SharedState,
    session_id: &str,
) -> Result<SessionDoc, ServiceError> {
    let Some(value) = state.store().get(&paths::session(session_id)).await? else {
        return Err(ServiceError::NotFound(format!(
            "session `{session_id}` not found"
        )));
    };
    serde_json::from_value(value).map_err(|err| {
        ServiceError::InvalidState(format!("session `{session_id}` is corrupted: {err}"))
    })
}

/// Current presentation snapshot of a session.
pub async fn session_snapshot(
    state: &SharedState,
    session_id: &str,
) -> Result<SessionSnapshot, ServiceError> {
    let doc = load_session(state, session_id).await?;
    Ok(SessionSnapshot::from_doc(session_id, &doc))
}

/// Apply a host-driven phase transition.
///
/// Authorization is enforced here, server-side: the caller's identity must
/// equal the session's `owner_id` regardless of what the UI exposes.
pub async fn apply_event(
    state: &SharedState,
    identity: &Identity,
    session_id: &str,
    event: SessionEvent,
) -> Result<SessionSnapshot, ServiceError> {
    let mut doc = load_session(state, session_id).await?;

    if doc.owner_id != identity.id {
        return Err(ServiceError::Forbidden(
            "only the host can drive phase transitions".into(),
        ));
    }

    let flow = SessionFlow {
        status: doc.status,
        phase: doc.state.phase,
        question_index: doc.state.question_index,
    };
    let transition = advance(flow, event, doc.items.len())?;

    let next_state = SessionState {
        phase: transition.next.phase,
        question_index: transition.next.question_index,
        question_duration_seconds: doc.state.question_duration_seconds,
        question_deadline: if transition.fresh_deadline {
            Some(unix_ms_now() + i64::from(doc.state.question_duration_seconds) * 1000)
        } else {
            doc.state.question_deadline
        },
    };

    // One shallow merge on the session root keeps status and state subtree
    // consistent under the store's per-write atomicity.
    let mut fields = Map::new();
    fields.insert("status".into(), serde_json::to_value(transition.next.status).unwrap_or(Value::Null));
    fields.insert("state".into(), serde_json::to_value(&next_state).unwrap_or(Value::Null));
    state
        .store()
        .patch(&paths::session(session_id), fields)
        .await?;

    info!(
        %session_id,
        event = ?event,
        phase = ?transition.next.phase,
        question_index = transition.next.question_index,
        "applied session transition"
    );

    doc.status = transition.next.status;
    doc.state = next_state;
    Ok(SessionSnapshot::from_doc(session_id, &doc))
}

/// Draw PINs until one is free of active sessions, within the configured
/// attempt budget. The check-then-write window is not transactional; the
/// budget plus the active-only lookup keeps collisions out of joins.
async fn allocate_pin(state: &SharedState) -> Result<String, ServiceError> {
    for _ in 0..state.config().pin_attempts {
        let pin = generate_pin();
        let matches = state
            .store()
            .query(paths::SESSIONS, "pin", json!(pin.clone()))
            .await?;
        let taken = matches.iter().any(|(_, value)| {
            serde_json::from_value::<SessionDoc>(value.clone())
                .map(|doc| doc.is_active())
                .unwrap_or(false)
        });
        if !taken {
            return Ok(pin);
        }
    }
    Err(ServiceError::Exhausted(
        "could not allocate an unused pin".into(),
    ))
}

/// Uniform 6-digit PIN in `[100000, 999999]`.
fn generate_pin() -> String {
    let mut rng = rand::rng();
    format!("{}", rng.random_range(100_000..=999_999))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_pins_are_six_ascii_digits() {
        for _ in 0..200 {
            let pin = generate_pin();
            assert_eq!(pin.len(), 6);
            assert!(pin.bytes().all(|b| b.is_ascii_digit()));
            assert_ne!(pin.as_bytes()[0], b'0');
        }
    }
}
