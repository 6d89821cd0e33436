//! Request, response and snapshot payloads exposed over REST and SSE.

/// Content-set registration payloads.
pub mod content;
/// Health payloads.
pub mod health;
/// Join and answer payloads.
pub mod player;
/// Session creation and lookup payloads.
pub mod session;
/// Full session snapshot pushed to observers.
pub mod snapshot;
/// SSE envelope.
pub mod sse;
