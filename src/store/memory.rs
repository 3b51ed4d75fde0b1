use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{Mutex, broadcast, mpsc};
use uuid::Uuid;

use super::api::{Document, Fields, RealtimeStore, StoreError, TIMESTAMP_FIELD};
use super::query::{Direction, MembershipOp, Query};
use super::subscription::Subscription;

const SNAPSHOT_BUFFER: usize = 16;
const CHANGE_BUFFER: usize = 64;

struct StoreInner {
    collections: HashMap<String, Vec<Document>>,
    last_timestamp: i64,
}

/// In-process stand-in for the hosted document store. Collections live in a
/// mutexed map; every write broadcasts the touched collection path and each
/// subscription recomputes its full ordered result set from scratch.
pub struct MemoryStore {
    inner: Arc<Mutex<StoreInner>>,
    changes: broadcast::Sender<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_BUFFER);
        Self {
            inner: Arc::new(Mutex::new(StoreInner {
                collections: HashMap::new(),
                last_timestamp: 0,
            })),
            changes,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn evaluate(collections: &HashMap<String, Vec<Document>>, query: &Query) -> Vec<Document> {
    let mut docs: Vec<Document> = collections.get(&query.collection).cloned().unwrap_or_default();
    if let Some(filter) = &query.filter {
        docs.retain(|doc| doc.fields.get(&filter.field) == Some(&filter.equals));
    }
    docs.sort_by_key(|doc| doc.order_key(&query.order_by));
    if query.direction == Direction::Desc {
        docs.reverse();
    }
    if let Some(limit) = query.limit {
        docs.truncate(limit);
    }
    docs
}

#[async_trait]
impl RealtimeStore for MemoryStore {
    async fn subscribe(&self, query: Query) -> Result<Subscription, StoreError> {
        let (tx, rx) = mpsc::channel(SNAPSHOT_BUFFER);
        // Register for changes before reading the initial state so no write
        // can fall between the two.
        let mut changes = self.changes.subscribe();
        let inner = self.inner.clone();

        let task = tokio::spawn(async move {
            let initial = evaluate(&inner.lock().await.collections, &query);
            if tx.send(initial).await.is_err() {
                return;
            }
            loop {
                match changes.recv().await {
                    Ok(collection) if collection == query.collection => {
                        let snapshot = evaluate(&inner.lock().await.collections, &query);
                        if tx.send(snapshot).await.is_err() {
                            break;
                        }
                    }
                    Ok(_) => continue,
                    // Snapshots supersede each other, so a lagged receiver
                    // just recomputes the current state.
                    Err(RecvError::Lagged(_)) => {
                        let snapshot = evaluate(&inner.lock().await.collections, &query);
                        if tx.send(snapshot).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });

        Ok(Subscription::new(rx, task))
    }

    async fn fetch_once(&self, query: Query) -> Result<Vec<Document>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(evaluate(&inner.collections, &query))
    }

    async fn create(&self, collection: &str, mut fields: Fields) -> Result<String, StoreError> {
        fields.remove("id");
        let id = Uuid::new_v4().to_string();

        let mut inner = self.inner.lock().await;
        // Strictly increasing even when two writes share a millisecond.
        let timestamp = Utc::now().timestamp_millis().max(inner.last_timestamp + 1);
        inner.last_timestamp = timestamp;
        fields.insert(TIMESTAMP_FIELD.to_string(), Value::from(timestamp));
        inner
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(Document {
                id: id.clone(),
                fields,
            });
        drop(inner);

        let _ = self.changes.send(collection.to_string());
        Ok(id)
    }

    async fn update_membership(
        &self,
        collection: &str,
        doc_id: &str,
        field: &str,
        member: &str,
        op: MembershipOp,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        let not_found = || StoreError::NotFound {
            collection: collection.to_string(),
            id: doc_id.to_string(),
        };
        let doc = inner
            .collections
            .get_mut(collection)
            .ok_or_else(not_found)?
            .iter_mut()
            .find(|doc| doc.id == doc_id)
            .ok_or_else(not_found)?;

        let entry = doc
            .fields
            .entry(field.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        let members = entry
            .as_array_mut()
            .ok_or_else(|| StoreError::NotAMembershipField(field.to_string()))?;

        let present = members.iter().any(|value| value.as_str() == Some(member));
        let mutated = match op {
            MembershipOp::Add => {
                if present {
                    false
                } else {
                    members.push(Value::String(member.to_string()));
                    true
                }
            }
            MembershipOp::Remove => {
                if present {
                    members.retain(|value| value.as_str() != Some(member));
                    true
                } else {
                    false
                }
            }
        };
        drop(inner);

        if mutated {
            let _ = self.changes.send(collection.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(entries: &[(&str, Value)]) -> Fields {
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    #[tokio::test]
    async fn create_assigns_monotonic_timestamps() {
        let store = MemoryStore::new();
        for _ in 0..3 {
            store
                .create("posts", fields(&[("content", Value::from("x"))]))
                .await
                .unwrap();
        }
        let docs = store.fetch_once(Query::new("posts")).await.unwrap();
        let stamps: Vec<i64> = docs.iter().map(|d| d.order_key(TIMESTAMP_FIELD)).collect();
        assert!(stamps[0] > stamps[1] && stamps[1] > stamps[2]);
        assert!(stamps[2] > 0);
    }

    #[tokio::test]
    async fn subscribe_delivers_explicit_empty_snapshot() {
        let store = MemoryStore::new();
        let mut sub = store.subscribe(Query::new("posts")).await.unwrap();
        assert_eq!(sub.next_snapshot().await, Some(Vec::new()));
    }

    #[tokio::test]
    async fn subscribe_sees_created_record() {
        let store = MemoryStore::new();
        let mut sub = store.subscribe(Query::new("posts")).await.unwrap();
        assert_eq!(sub.next_snapshot().await, Some(Vec::new()));

        let id = store
            .create("posts", fields(&[("content", Value::from("hello"))]))
            .await
            .unwrap();
        let snapshot = sub.next_snapshot().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, id);
        assert_eq!(
            snapshot[0].fields.get("content"),
            Some(&Value::from("hello"))
        );
        assert!(snapshot[0].order_key(TIMESTAMP_FIELD) > 0);
    }

    #[tokio::test]
    async fn equality_filter_limits_result_set() {
        let store = MemoryStore::new();
        store
            .create("posts", fields(&[("user_id", Value::from("a"))]))
            .await
            .unwrap();
        store
            .create("posts", fields(&[("user_id", Value::from("b"))]))
            .await
            .unwrap();

        let docs = store
            .fetch_once(Query::new("posts").filter_eq("user_id", "a"))
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].fields.get("user_id"), Some(&Value::from("a")));
    }

    #[tokio::test]
    async fn limited_window_drops_oldest_record() {
        let store = MemoryStore::new();
        for i in 0..51 {
            store
                .create(
                    "messages",
                    fields(&[("text", Value::from(format!("m{i}")))]),
                )
                .await
                .unwrap();
        }
        let window = store
            .fetch_once(Query::new("messages").limit(50))
            .await
            .unwrap();
        assert_eq!(window.len(), 50);
        // Desc ordering keeps the 50 newest; m0 fell out of the window.
        assert_eq!(window[0].fields.get("text"), Some(&Value::from("m50")));
        assert!(
            !window
                .iter()
                .any(|doc| doc.fields.get("text") == Some(&Value::from("m0")))
        );
    }

    #[tokio::test]
    async fn membership_updates_are_set_semantics() {
        let store = MemoryStore::new();
        let id = store
            .create("posts", fields(&[("likes", Value::Array(Vec::new()))]))
            .await
            .unwrap();

        store
            .update_membership("posts", &id, "likes", "u1", MembershipOp::Add)
            .await
            .unwrap();
        store
            .update_membership("posts", &id, "likes", "u1", MembershipOp::Add)
            .await
            .unwrap();
        let docs = store.fetch_once(Query::new("posts")).await.unwrap();
        assert_eq!(
            docs[0].fields.get("likes"),
            Some(&serde_json::json!(["u1"]))
        );

        store
            .update_membership("posts", &id, "likes", "u2", MembershipOp::Remove)
            .await
            .unwrap();
        store
            .update_membership("posts", &id, "likes", "u1", MembershipOp::Remove)
            .await
            .unwrap();
        let docs = store.fetch_once(Query::new("posts")).await.unwrap();
        assert_eq!(docs[0].fields.get("likes"), Some(&serde_json::json!([])));
    }

    #[tokio::test]
    async fn membership_update_on_missing_document_fails() {
        let store = MemoryStore::new();
        let result = store
            .update_membership("posts", "missing", "likes", "u1", MembershipOp::Add)
            .await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn cancel_is_idempotent_and_stops_delivery() {
        let store = MemoryStore::new();
        let mut sub = store.subscribe(Query::new("posts")).await.unwrap();
        assert_eq!(sub.next_snapshot().await, Some(Vec::new()));

        sub.cancel();
        sub.cancel();

        store
            .create("posts", fields(&[("content", Value::from("late"))]))
            .await
            .unwrap();
        assert_eq!(sub.next_snapshot().await, None);
    }
}
