//! Document database surface.
//!
//! Per-collection CRUD plus simple field queries. Documents are JSON values
//! at this boundary; typed models live above it. No multi-document
//! transactions are assumed anywhere.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, RwLock};

use serde_json::Value as JsonValue;

use talentbridge_core::Collection;

/// A stored document with its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub body: JsonValue,
}

/// Record store error surface.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordStoreError {
    #[error("document not found: {collection}/{id}")]
    NotFound { collection: Collection, id: String },
    #[error("document serialization failed: {0}")]
    Serialization(String),
    #[error("record store backend failure: {0}")]
    Backend(String),
}

/// Query comparison operator.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum QueryOp {
    Eq,
    Gt,
    Lt,
}

/// Document database capability surface.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Fetch a document by id.
    async fn get(&self, collection: Collection, id: &str)
        -> Result<Option<Document>, RecordStoreError>;

    /// Write a document at a known id, replacing any existing body.
    async fn put(
        &self,
        collection: Collection,
        id: &str,
        body: JsonValue,
    ) -> Result<(), RecordStoreError>;

    /// Merge top-level fields into an existing document.
    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: JsonValue,
    ) -> Result<(), RecordStoreError>;

    /// Delete a document by id.
    async fn delete(&self, collection: Collection, id: &str) -> Result<(), RecordStoreError>;

    /// Insert a document, returning the generated id.
    async fn insert(
        &self,
        collection: Collection,
        body: JsonValue,
    ) -> Result<String, RecordStoreError>;

    /// Return all documents whose `field` compares to `value` under `op`.
    /// Result order is unspecified.
    async fn query(
        &self,
        collection: Collection,
        field: &str,
        op: QueryOp,
        value: &JsonValue,
    ) -> Result<Vec<Document>, RecordStoreError>;

    /// Return every document in a collection.
    async fn list(&self, collection: Collection) -> Result<Vec<Document>, RecordStoreError>;
}

fn matches(op: QueryOp, candidate: &JsonValue, value: &JsonValue) -> bool {
    match op {
        QueryOp::Eq => candidate == value,
        QueryOp::Gt | QueryOp::Lt => {
            let ord = match (candidate, value) {
                (JsonValue::Number(a), JsonValue::Number(b)) => a
                    .as_f64()
                    .zip(b.as_f64())
                    .and_then(|(a, b)| a.partial_cmp(&b)),
                (JsonValue::String(a), JsonValue::String(b)) => Some(a.as_str().cmp(b.as_str())),
                _ => None,
            };
            match (op, ord) {
                (QueryOp::Gt, Some(core::cmp::Ordering::Greater)) => true,
                (QueryOp::Lt, Some(core::cmp::Ordering::Less)) => true,
                _ => false,
            }
        }
    }
}

/// In-memory document store for dev/tests.
///
/// Fault knobs plant backend failures for compensation and cascade tests:
/// `fail_puts_to` fails every `put`/`insert` into a collection,
/// `fail_updates_to` fails every `update` in a collection, and
/// `fail_delete_of` fails the delete of one specific document.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    documents: RwLock<HashMap<(Collection, String), JsonValue>>,
    fail_puts: RwLock<HashSet<Collection>>,
    fail_updates: RwLock<HashSet<Collection>>,
    fail_deletes: RwLock<HashSet<(Collection, String)>>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn fail_puts_to(&self, collection: Collection) {
        self.fail_puts.write().unwrap().insert(collection);
    }

    pub fn fail_updates_to(&self, collection: Collection) {
        self.fail_updates.write().unwrap().insert(collection);
    }

    pub fn fail_delete_of(&self, collection: Collection, id: impl Into<String>) {
        self.fail_deletes
            .write()
            .unwrap()
            .insert((collection, id.into()));
    }

    pub fn clear_faults(&self) {
        self.fail_puts.write().unwrap().clear();
        self.fail_updates.write().unwrap().clear();
        self.fail_deletes.write().unwrap().clear();
    }

    /// Number of documents in a collection.
    pub fn count(&self, collection: Collection) -> usize {
        self.documents
            .read()
            .unwrap()
            .keys()
            .filter(|(c, _)| *c == collection)
            .count()
    }

    pub fn contains(&self, collection: Collection, id: &str) -> bool {
        self.documents
            .read()
            .unwrap()
            .contains_key(&(collection, id.to_string()))
    }
}

#[async_trait::async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn get(
        &self,
        collection: Collection,
        id: &str,
    ) -> Result<Option<Document>, RecordStoreError> {
        let documents = self.documents.read().unwrap();
        Ok(documents
            .get(&(collection, id.to_string()))
            .map(|body| Document {
                id: id.to_string(),
                body: body.clone(),
            }))
    }

    async fn put(
        &self,
        collection: Collection,
        id: &str,
        body: JsonValue,
    ) -> Result<(), RecordStoreError> {
        if self.fail_puts.read().unwrap().contains(&collection) {
            return Err(RecordStoreError::Backend(format!(
                "injected put failure for {collection}"
            )));
        }
        self.documents
            .write()
            .unwrap()
            .insert((collection, id.to_string()), body);
        Ok(())
    }

    async fn update(
        &self,
        collection: Collection,
        id: &str,
        patch: JsonValue,
    ) -> Result<(), RecordStoreError> {
        if self.fail_updates.read().unwrap().contains(&collection) {
            return Err(RecordStoreError::Backend(format!(
                "injected update failure for {collection}"
            )));
        }

        let mut documents = self.documents.write().unwrap();
        let body = documents
            .get_mut(&(collection, id.to_string()))
            .ok_or_else(|| RecordStoreError::NotFound {
                collection,
                id: id.to_string(),
            })?;

        match (body, patch) {
            (JsonValue::Object(target), JsonValue::Object(fields)) => {
                for (k, v) in fields {
                    target.insert(k, v);
                }
                Ok(())
            }
            _ => Err(RecordStoreError::Serialization(
                "update requires object documents and patches".to_string(),
            )),
        }
    }

    async fn delete(&self, collection: Collection, id: &str) -> Result<(), RecordStoreError> {
        if self
            .fail_deletes
            .read()
            .unwrap()
            .contains(&(collection, id.to_string()))
        {
            return Err(RecordStoreError::Backend(format!(
                "injected delete failure for {collection}/{id}"
            )));
        }

        let mut documents = self.documents.write().unwrap();
        documents
            .remove(&(collection, id.to_string()))
            .map(|_| ())
            .ok_or_else(|| RecordStoreError::NotFound {
                collection,
                id: id.to_string(),
            })
    }

    async fn insert(
        &self,
        collection: Collection,
        body: JsonValue,
    ) -> Result<String, RecordStoreError> {
        if self.fail_puts.read().unwrap().contains(&collection) {
            return Err(RecordStoreError::Backend(format!(
                "injected put failure for {collection}"
            )));
        }
        let id = uuid::Uuid::now_v7().to_string();
        self.documents
            .write()
            .unwrap()
            .insert((collection, id.clone()), body);
        Ok(id)
    }

    async fn query(
        &self,
        collection: Collection,
        field: &str,
        op: QueryOp,
        value: &JsonValue,
    ) -> Result<Vec<Document>, RecordStoreError> {
        let documents = self.documents.read().unwrap();
        Ok(documents
            .iter()
            .filter(|((c, _), body)| {
                *c == collection
                    && body
                        .get(field)
                        .map(|candidate| matches(op, candidate, value))
                        .unwrap_or(false)
            })
            .map(|((_, id), body)| Document {
                id: id.clone(),
                body: body.clone(),
            })
            .collect())
    }

    async fn list(&self, collection: Collection) -> Result<Vec<Document>, RecordStoreError> {
        let documents = self.documents.read().unwrap();
        Ok(documents
            .iter()
            .filter(|((c, _), _)| *c == collection)
            .map(|((_, id), body)| Document {
                id: id.clone(),
                body: body.clone(),
            })
            .collect())
    }
}
