//! Realtime key-value tree the session protocol runs against.
//!
//! The service layer only depends on the [`SessionStore`] contract: partial
//! path reads and writes, equality queries, single-path atomic transactions,
//! and push-based change notification. [`memory::MemoryStore`] is the
//! in-process backend used in production and tests alike.

/// Store error definitions.
pub mod error;
/// In-memory JSON-tree backend.
pub mod memory;

use futures::future::BoxFuture;
use serde_json::{Map, Value};
use tokio::sync::broadcast;

pub use error::{StoreError, StoreResult};

/// Update closure passed to [`SessionStore::transact`]. Receives the current
/// value at the path (or `None` when absent) and returns the value to commit,
/// or `None` to abort the transaction leaving the tree untouched.
pub type TransactFn = Box<dyn FnOnce(Option<Value>) -> Option<Value> + Send>;

/// Result of a [`SessionStore::transact`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactOutcome {
    /// The update closure produced a value which is now committed.
    Committed(Value),
    /// The update closure declined; the value it observed is returned.
    Aborted(Option<Value>),
}

impl TransactOutcome {
    /// Whether the transaction committed.
    pub fn committed(&self) -> bool {
        matches!(self, TransactOutcome::Committed(_))
    }
}

/// Handle returned by [`SessionStore::subscribe`].
///
/// `initial` is the value at the path at subscription time; `updates` pushes
/// the full value at the path after every subsequent change under it.
pub struct Subscription {
    /// Snapshot at subscription time, `None` when the path is empty.
    pub initial: Option<Value>,
    /// Channel of full-value snapshots, one per change.
    pub updates: broadcast::Receiver<Value>,
}

/// Abstraction over the realtime tree consumed by the session protocol.
///
/// Paths are slash-separated segments (`sessions/{id}/players/{playerId}`).
/// The only atomicity primitive is `transact`, which is a read-modify-write
/// against a single path; cross-path sequences are not atomic.
pub trait SessionStore: Send + Sync {
    /// Replace the value at `path`, creating intermediate objects as needed.
    fn put(&self, path: &str, value: Value) -> BoxFuture<'static, StoreResult<()>>;
    /// Shallow-merge `fields` into the object at `path`.
    fn patch(&self, path: &str, fields: Map<String, Value>) -> BoxFuture<'static, StoreResult<()>>;
    /// Point read of the value at `path`.
    fn get(&self, path: &str) -> BoxFuture<'static, StoreResult<Option<Value>>>;
    /// Scan the children of `collection`, returning `(key, child)` pairs
    /// whose `field` equals `value`.
    fn query(
        &self,
        collection: &str,
        field: &str,
        value: Value,
    ) -> BoxFuture<'static, StoreResult<Vec<(String, Value)>>>;
    /// Atomic read-modify-write against a single path.
    fn transact(&self, path: &str, update: TransactFn)
    -> BoxFuture<'static, StoreResult<TransactOutcome>>;
    /// Observe the subtree at `path`, receiving a full snapshot per change.
    fn subscribe(&self, path: &str) -> BoxFuture<'static, StoreResult<Subscription>>;
}
