pub mod memory;
pub mod postgres;
pub mod query;
pub mod sql;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use thiserror::Error;

use crate::config::{StoreBackend, StoreConfig};

pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use query::{Condition, Direction, Op, OrderBy, Query};

/// Document body as stored: a flat JSON object keyed by camelCase field names
pub type Fields = Map<String, Value>;

/// A stored document: store-assigned id plus its fields
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    pub fn new(id: impl Into<String>, fields: Fields) -> Self {
        Self { id: id.into(), fields }
    }

    /// Text form of a field as the store compares it, `None` when absent or null
    pub fn text(&self, field: &str) -> Option<String> {
        self.fields.get(field).and_then(field_text)
    }

    /// Deserialize into a typed record; the id is exposed as an `id` field
    pub fn into_record<T: DeserializeOwned>(self) -> Result<T, StoreError> {
        let mut fields = self.fields;
        fields.insert("id".to_string(), Value::String(self.id));
        Ok(serde_json::from_value(Value::Object(fields))?)
    }
}

/// Serialize a typed value into document fields, dropping any `id` key
pub fn to_fields<T: Serialize>(value: &T) -> Result<Fields, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(mut map) => {
            map.remove("id");
            Ok(map)
        }
        other => Err(StoreError::InvalidDocument(format!("expected a JSON object, got {}", other))),
    }
}

/// Text projection used for every comparison in every backend.
/// Postgres `->>` yields the same representation for strings, numbers and booleans.
pub fn field_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Document {id} not found in {collection}")]
    NotFound { collection: String, id: String },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            other => StoreError::Sqlx(other),
        }
    }
}

/// Collection-oriented document store.
///
/// Ordering and range comparisons operate on the text projection of a field
/// (see [`field_text`]) compared by code point. Documents lacking a field named
/// in the query's ordering are excluded from the result.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Insert with a store-assigned id
    async fn add(&self, collection: &str, fields: Fields) -> Result<Document, StoreError>;

    /// Create or overwrite the document with the given id
    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<Document, StoreError>;

    /// Merge `patch` into an existing document; `NotFound` when it does not exist
    async fn update(&self, collection: &str, id: &str, patch: Fields) -> Result<Document, StoreError>;

    /// Remove a document; deleting a missing document is not an error
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError>;

    /// Number of documents matching the query's conditions, ignoring limit and cursor
    async fn count(&self, query: &Query) -> Result<u64, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

/// Build the configured store backend
pub async fn connect(config: &StoreConfig) -> Result<Arc<dyn DocumentStore>, StoreError> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory document store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Postgres => {
            let store = PgStore::connect(config).await?;
            Ok(Arc::new(store))
        }
    }
}

/// Generate a store id for `add`
pub(crate) fn new_document_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
