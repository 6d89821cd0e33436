use std::{convert::Infallible, time::Duration};

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use serde_json::Value;
use tokio::sync::{broadcast::error::RecvError, mpsc};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{info, warn};

use crate::{
    dto::{snapshot::SessionSnapshot, sse::ServerEvent},
    error::ServiceError,
    state::{SharedState, paths, session::SessionDoc},
};

/// SSE event name carrying a full session snapshot.
const SNAPSHOT_EVENT: &str = "session";

/// Observe a session over SSE, pushing a full presentation snapshot on every
/// store change, starting with the current value.
pub async fn session_events(
    state: SharedState,
    session_id: String,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ServiceError> {
    let subscription = state.store().subscribe(&paths::session(&session_id)).await?;

    let Some(initial) = subscription.initial else {
        return Err(ServiceError::NotFound(format!(
            "session `{session_id}` not found"
        )));
    };

    let mut updates = subscription.updates;

    // small bounded channel between forwarder and response
    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(8);

    // forwarder task: reads from broadcast and pushes into mpsc
    tokio::spawn(async move {
        if let Some(event) = snapshot_event(&session_id, initial)
            && tx.send(Ok(event)).await.is_err()
        {
            return;
        }

        loop {
            tokio::select! {
                _ = tx.closed() => break,
                recv_result = updates.recv() => {
                    match recv_result {
                        Ok(value) => {
                            let Some(event) = snapshot_event(&session_id, value) else {
                                continue;
                            };
                            if tx.send(Ok(event)).await.is_err() {
                                break;
                            }
                        }
                        Err(RecvError::Closed) => break,
                        Err(RecvError::Lagged(_)) => {
                            // Skip lagged snapshots; the next one is a full
                            // replacement anyway.
                            continue;
                        }
                    }
                }
            }
        }

        info!(%session_id, "session SSE stream disconnected");
    });

    // response stream reads from mpsc; when the client disconnects axum drops it
    let stream = ReceiverStream::new(rx);
    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    ))
}

/// Convert a raw store value into an SSE snapshot event, skipping values that
/// do not (yet) decode into a complete session document.
fn snapshot_event(session_id: &str, value: Value) -> Option<Event> {
    let doc: SessionDoc = match serde_json::from_value(value) {
        Ok(doc) => doc,
        Err(err) => {
            warn!(%session_id, error = %err, "skipping undecodable session snapshot");
            return None;
        }
    };
    let snapshot = SessionSnapshot::from_doc(session_id, &doc);
    let payload = ServerEvent::json(Some(SNAPSHOT_EVENT.to_string()), &snapshot).ok()?;

    let mut event = Event::default().data(payload.data);
    if let Some(name) = payload.event {
        event = event.event(name);
    }
    Some(event)
}
