use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use super::query::{is_valid_identifier, Query};
use super::{new_document_id, Document, DocumentStore, Fields, StoreError};

/// In-process document store for development and tests
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Fields>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_collection(collection: &str) -> Result<(), StoreError> {
        if is_valid_identifier(collection) {
            Ok(())
        } else {
            Err(StoreError::InvalidQuery(format!("Invalid collection name: {}", collection)))
        }
    }

    async fn matching(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        query.validate()?;
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(&query.collection) else {
            return Ok(vec![]);
        };
        Ok(docs
            .iter()
            .map(|(id, fields)| Document::new(id.clone(), fields.clone()))
            .filter(|doc| query.matches(doc))
            .collect())
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|fields| Document::new(id, fields.clone())))
    }

    async fn add(&self, collection: &str, fields: Fields) -> Result<Document, StoreError> {
        Self::check_collection(collection)?;
        let id = new_document_id();
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), fields.clone());
        Ok(Document::new(id, fields))
    }

    async fn set(&self, collection: &str, id: &str, fields: Fields) -> Result<Document, StoreError> {
        Self::check_collection(collection)?;
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), fields.clone());
        Ok(Document::new(id, fields))
    }

    async fn update(&self, collection: &str, id: &str, patch: Fields) -> Result<Document, StoreError> {
        let mut collections = self.collections.write().await;
        let existing = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        for (key, value) in patch {
            existing.insert(key, value);
        }
        Ok(Document::new(id, existing.clone()))
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        let mut docs = self.matching(query).await?;
        docs.retain(|doc| query.is_after_cursor(doc));
        docs.sort_by(|a, b| query.compare(a, b));
        if let Some(limit) = query.limit {
            docs.truncate(limit);
        }
        Ok(docs)
    }

    async fn count(&self, query: &Query) -> Result<u64, StoreError> {
        Ok(self.matching(&query.unbounded()).await?.len() as u64)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Direction;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn add_assigns_distinct_ids() {
        let store = MemoryStore::new();
        let a = store.add("notes", fields(json!({ "n": 1 }))).await.unwrap();
        let b = store.add("notes", fields(json!({ "n": 2 }))).await.unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(store.get("notes", &a.id).await.unwrap().unwrap().fields["n"], json!(1));
    }

    #[tokio::test]
    async fn update_merges_and_requires_existing() {
        let store = MemoryStore::new();
        store.set("notes", "n1", fields(json!({ "a": 1, "b": 2 }))).await.unwrap();
        let doc = store.update("notes", "n1", fields(json!({ "b": 3 }))).await.unwrap();
        assert_eq!(doc.fields, fields(json!({ "a": 1, "b": 3 })));

        let missing = store.update("notes", "nope", fields(json!({ "b": 3 }))).await;
        assert!(matches!(missing, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let store = MemoryStore::new();
        store.set("notes", "n1", Fields::new()).await.unwrap();
        store.delete("notes", "n1").await.unwrap();
        store.delete("notes", "n1").await.unwrap();
        store.delete("never", "n1").await.unwrap();
        assert!(store.get("notes", "n1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn query_orders_filters_and_resumes() {
        let store = MemoryStore::new();
        for (id, owner, at) in [("a", "u1", "1"), ("b", "u1", "3"), ("c", "u2", "2"), ("d", "u1", "2")] {
            store
                .set("notes", id, fields(json!({ "userId": owner, "createdAt": at })))
                .await
                .unwrap();
        }
        store.set("notes", "e", fields(json!({ "userId": "u1" }))).await.unwrap();

        let query = Query::new("notes")
            .where_eq("userId", "u1")
            .order_by("createdAt", Direction::Desc)
            .limit(2);
        let first: Vec<_> = store.query(&query).await.unwrap().into_iter().map(|d| d.id).collect();
        assert_eq!(first, vec!["b", "d"]);

        let rest: Vec<_> = store
            .query(&query.clone().start_after(vec!["2".into()]))
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(rest, vec!["a"]);

        // `e` has no createdAt, so no page can ever return it
        assert_eq!(store.count(&query).await.unwrap(), 3);
    }
}
