//! Service layer: the protocol logic between routes and the store.

/// Content set registry and item validation.
pub mod content_service;
/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Deterministic leaderboard and tally derivation.
pub mod leaderboard;
/// Player join and answer protocol.
pub mod player_service;
/// Point award computation.
pub mod scoring;
/// Session lifecycle: creation, PIN lookup, host transitions.
pub mod session_service;
/// Store subscription to SSE snapshot streaming.
pub mod watch_service;
