use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::query::{MembershipOp, Query};
use super::subscription::Subscription;

/// Field the store fills in with its own clock on every create.
pub const TIMESTAMP_FIELD: &str = "timestamp";

pub type Fields = serde_json::Map<String, Value>;

/// A record as exchanged with the backend: server-assigned id plus a JSON
/// object of fields, including the server-assigned `timestamp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    /// Decode into a typed model. The document id is merged into the fields
    /// under `id` so models can carry it as a plain field.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        let mut fields = self.fields.clone();
        fields.insert("id".to_string(), Value::String(self.id.clone()));
        Ok(serde_json::from_value(Value::Object(fields))?)
    }

    /// Numeric sort key for `field`; missing or non-numeric values sort first.
    pub fn order_key(&self, field: &str) -> i64 {
        self.fields.get(field).and_then(Value::as_i64).unwrap_or(0)
    }
}

/// Serialize a model into create() fields.
pub fn to_fields<T: Serialize>(record: &T) -> Result<Fields, StoreError> {
    match serde_json::to_value(record)? {
        Value::Object(fields) => Ok(fields),
        _ => Err(StoreError::NotAnObject),
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document `{id}` not found in `{collection}`")]
    NotFound { collection: String, id: String },
    #[error("record does not serialize to a JSON object")]
    NotAnObject,
    #[error("field `{0}` is not a membership array")]
    NotAMembershipField(String),
    #[error(transparent)]
    Codec(#[from] serde_json::Error),
}

/// The hosted backend's data API. Writes are tagged server-side with a
/// creation timestamp; reads come back fully ordered.
#[async_trait]
pub trait RealtimeStore: Send + Sync {
    /// Standing subscription delivering the complete ordered result set on
    /// every relevant change, starting with the current state (possibly an
    /// explicit empty snapshot).
    async fn subscribe(&self, query: Query) -> Result<Subscription, StoreError>;

    /// One-shot ordered fetch.
    async fn fetch_once(&self, query: Query) -> Result<Vec<Document>, StoreError>;

    /// Append a record. Any client-supplied `id` or `timestamp` field is
    /// discarded; the store assigns both. Returns the assigned id.
    async fn create(&self, collection: &str, fields: Fields) -> Result<String, StoreError>;

    /// Atomic set-add/remove on an array field of one document.
    async fn update_membership(
        &self,
        collection: &str,
        doc_id: &str,
        field: &str,
        member: &str,
        op: MembershipOp,
    ) -> Result<(), StoreError>;
}
