use std::sync::Arc;

use dashmap::DashMap;
use futures::future::BoxFuture;
use serde_json::{Map, Value};
use tokio::sync::{RwLock, broadcast};

use crate::store::{
    SessionStore, StoreError, StoreResult, Subscription, TransactFn, TransactOutcome,
};

/// Capacity of the per-prefix snapshot channels. Slow subscribers lag and
/// skip intermediate snapshots rather than block writers.
const WATCH_CHANNEL_CAPACITY: usize = 32;

/// In-memory backend holding the whole tree as one JSON value.
///
/// All mutations run under a single write lock, which also serialises
/// `transact` closures and keeps notification order consistent with write
/// order for every subscriber.
#[derive(Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

struct Inner {
    root: RwLock<Value>,
    watchers: DashMap<String, broadcast::Sender<Value>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                root: RwLock::new(Value::Object(Map::new())),
                watchers: DashMap::new(),
            }),
        }
    }
}

impl Inner {
    /// Push the current value at every watched prefix related to `path`,
    /// dropping channels nobody listens to anymore.
    fn notify(&self, root: &Value, path: &[String]) {
        self.watchers.retain(|prefix, sender| {
            if sender.receiver_count() == 0 {
                return false;
            }
            let prefix_segments: Vec<String> = split_unchecked(prefix);
            if paths_related(&prefix_segments, path) {
                let snapshot = value_at(root, &prefix_segments).unwrap_or(Value::Null);
                let _ = sender.send(snapshot);
            }
            true
        });
    }
}

impl SessionStore for MemoryStore {
    fn put(&self, path: &str, value: Value) -> BoxFuture<'static, StoreResult<()>> {
        let inner = self.inner.clone();
        let path = path.to_owned();
        Box::pin(async move {
            let segments = split_path(&path)?;
            let mut root = inner.root.write().await;
            write_at(&mut root, &segments, value);
            inner.notify(&root, &segments);
            Ok(())
        })
    }

    fn patch(&self, path: &str, fields: Map<String, Value>) -> BoxFuture<'static, StoreResult<()>> {
        let inner = self.inner.clone();
        let path = path.to_owned();
        Box::pin(async move {
            let segments = split_path(&path)?;
            let mut root = inner.root.write().await;
            let target = object_at_mut(&mut root, &segments);
            for (key, value) in fields {
                target.insert(key, value);
            }
            inner.notify(&root, &segments);
            Ok(())
        })
    }

    fn get(&self, path: &str) -> BoxFuture<'static, StoreResult<Option<Value>>> {
        let inner = self.inner.clone();
        let path = path.to_owned();
        Box::pin(async move {
            let segments = split_path(&path)?;
            let root = inner.root.read().await;
            Ok(value_at(&root, &segments))
        })
    }

    fn query(
        &self,
        collection: &str,
        field: &str,
        value: Value,
    ) -> BoxFuture<'static, StoreResult<Vec<(String, Value)>>> {
        let inner = self.inner.clone();
        let collection = collection.to_owned();
        let field = field.to_owned();
        Box::pin(async move {
            let segments = split_path(&collection)?;
            let root = inner.root.read().await;
            let Some(Value::Object(children)) = value_at_ref(&root, &segments) else {
                return Ok(Vec::new());
            };
            let matches = children
                .iter()
                .filter(|(_, child)| child.get(&field) == Some(&value))
                .map(|(key, child)| (key.clone(), child.clone()))
                .collect();
            Ok(matches)
        })
    }

    fn transact(
        &self,
        path: &str,
        update: TransactFn,
    ) -> BoxFuture<'static, StoreResult<TransactOutcome>> {
        let inner = self.inner.clone();
        let path = path.to_owned();
        Box::pin(async move {
            let segments = split_path(&path)?;
            let mut root = inner.root.write().await;
            let current = value_at(&root, &segments);
            match update(current.clone()) {
                Some(next) => {
                    write_at(&mut root, &segments, next.clone());
                    inner.notify(&root, &segments);
                    Ok(TransactOutcome::Committed(next))
                }
                None => Ok(TransactOutcome::Aborted(current)),
            }
        })
    }

    fn subscribe(&self, path: &str) -> BoxFuture<'static, StoreResult<Subscription>> {
        let inner = self.inner.clone();
        let path = path.to_owned();
        Box::pin(async move {
            let segments = split_path(&path)?;
            let normalized = segments.join("/");
            let root = inner.root.read().await;
            let initial = value_at(&root, &segments);
            let sender = inner
                .watchers
                .entry(normalized)
                .or_insert_with(|| broadcast::channel(WATCH_CHANNEL_CAPACITY).0);
            let updates = sender.subscribe();
            Ok(Subscription { initial, updates })
        })
    }
}

/// Split and validate a slash-separated path into non-empty segments.
fn split_path(path: &str) -> StoreResult<Vec<String>> {
    if path.is_empty() {
        return Err(StoreError::invalid_path(path, "path must not be empty"));
    }
    let segments: Vec<String> = path.split('/').map(str::to_owned).collect();
    if segments.iter().any(String::is_empty) {
        return Err(StoreError::invalid_path(
            path,
            "path must not contain empty segments",
        ));
    }
    Ok(segments)
}

/// Split a path already validated by [`split_path`].
fn split_unchecked(path: &str) -> Vec<String> {
    path.split('/').map(str::to_owned).collect()
}

/// Whether one path is a segment-wise prefix of the other; a change at either
/// is visible from the other.
fn paths_related(a: &[String], b: &[String]) -> bool {
    let shorter = a.len().min(b.len());
    a[..shorter] == b[..shorter]
}

/// Clone the value at `segments`, if present.
fn value_at(root: &Value, segments: &[String]) -> Option<Value> {
    value_at_ref(root, segments).cloned()
}

fn value_at_ref<'a>(root: &'a Value, segments: &[String]) -> Option<&'a Value> {
    let mut node = root;
    for segment in segments {
        node = node.as_object()?.get(segment)?;
    }
    Some(node)
}

/// Replace the value at `segments`, materialising intermediate objects. A
/// non-object intermediate is overwritten, matching replace-on-write trees.
fn write_at(root: &mut Value, segments: &[String], value: Value) {
    let (last, parents) = segments.split_last().expect("validated non-empty path");
    let mut node = root;
    for segment in parents {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        node = node
            .as_object_mut()
            .expect("just materialised an object")
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    node.as_object_mut()
        .expect("just materialised an object")
        .insert(last.clone(), value);
}

/// Borrow the object at `segments` mutably, materialising it (and any
/// intermediate objects) when absent.
fn object_at_mut<'a>(root: &'a mut Value, segments: &[String]) -> &'a mut Map<String, Value> {
    let mut node = root;
    for segment in segments {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        node = node
            .as_object_mut()
            .expect("just materialised an object")
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
    }
    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    node.as_object_mut().expect("just materialised an object")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn put_then_get_roundtrips() {
        let store = MemoryStore::new();
        store
            .put("sessions/abc/pin", json!("123456"))
            .await
            .unwrap();
        let value = store.get("sessions/abc/pin").await.unwrap();
        assert_eq!(value, Some(json!("123456")));
        assert_eq!(store.get("sessions/missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn patch_merges_shallowly() {
        let store = MemoryStore::new();
        store
            .put("sessions/abc/state", json!({"phase": "lobby", "question_index": 0}))
            .await
            .unwrap();

        let mut fields = Map::new();
        fields.insert("phase".into(), json!("question"));
        store.patch("sessions/abc/state", fields).await.unwrap();

        let state = store.get("sessions/abc/state").await.unwrap().unwrap();
        assert_eq!(state["phase"], json!("question"));
        assert_eq!(state["question_index"], json!(0));
    }

    #[tokio::test]
    async fn query_matches_on_field_equality() {
        let store = MemoryStore::new();
        store
            .put("sessions/a", json!({"pin": "111111", "status": "lobby"}))
            .await
            .unwrap();
        store
            .put("sessions/b", json!({"pin": "222222", "status": "lobby"}))
            .await
            .unwrap();

        let matches = store
            .query("sessions", "pin", json!("222222"))
            .await
            .unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].0, "b");

        let none = store
            .query("sessions", "pin", json!("999999"))
            .await
            .unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn transact_commits_and_aborts() {
        let store = MemoryStore::new();
        let outcome = store
            .transact(
                "counters/hits",
                Box::new(|current| {
                    let count = current.and_then(|v| v.as_u64()).unwrap_or(0);
                    Some(json!(count + 1))
                }),
            )
            .await
            .unwrap();
        assert_eq!(outcome, TransactOutcome::Committed(json!(1)));

        let outcome = store
            .transact("counters/hits", Box::new(|_| None))
            .await
            .unwrap();
        assert_eq!(outcome, TransactOutcome::Aborted(Some(json!(1))));
        assert_eq!(store.get("counters/hits").await.unwrap(), Some(json!(1)));
    }

    #[tokio::test]
    async fn transact_write_once_keeps_first_value() {
        let store = MemoryStore::new();
        let write_if_absent = |payload: Value| {
            Box::new(move |current: Option<Value>| match current {
                Some(_) => None,
                None => Some(payload),
            }) as TransactFn
        };

        let first = store
            .transact("sessions/a/items", write_if_absent(json!(["q1", "q2"])))
            .await
            .unwrap();
        assert!(first.committed());

        let second = store
            .transact("sessions/a/items", write_if_absent(json!(["q2", "q1"])))
            .await
            .unwrap();
        assert_eq!(second, TransactOutcome::Aborted(Some(json!(["q1", "q2"]))));
        assert_eq!(
            store.get("sessions/a/items").await.unwrap(),
            Some(json!(["q1", "q2"]))
        );
    }

    #[tokio::test]
    async fn subscribe_sees_initial_and_updates() {
        let store = MemoryStore::new();
        store.put("sessions/a/status", json!("lobby")).await.unwrap();

        let mut subscription = store.subscribe("sessions/a").await.unwrap();
        assert_eq!(subscription.initial, Some(json!({"status": "lobby"})));

        store
            .put("sessions/a/status", json!("in-progress"))
            .await
            .unwrap();
        let snapshot = subscription.updates.recv().await.unwrap();
        assert_eq!(snapshot, json!({"status": "in-progress"}));
    }

    #[tokio::test]
    async fn subscribe_ignores_unrelated_writes() {
        let store = MemoryStore::new();
        let mut subscription = store.subscribe("sessions/a").await.unwrap();

        store.put("sessions/b/status", json!("lobby")).await.unwrap();
        store.put("sessions/a/status", json!("lobby")).await.unwrap();

        // The first received snapshot is for the session/a write only.
        let snapshot = subscription.updates.recv().await.unwrap();
        assert_eq!(snapshot, json!({"status": "lobby"}));
        assert!(subscription.updates.try_recv().is_err());
    }

    #[tokio::test]
    async fn invalid_paths_are_rejected() {
        let store = MemoryStore::new();
        assert!(store.get("").await.is_err());
        assert!(store.get("sessions//a").await.is_err());
    }
}
