use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::debug;

use super::{
    Collection, Document, DocumentId, DocumentStore, FindOptions, IdCodec, Result,
    StoredDocument, CREATED_AT_FIELD,
};

/// Process-local store. Each collection is an append-only vector, so vector
/// position doubles as insertion order.
pub struct MemoryDocumentStore {
    codec: Arc<dyn IdCodec>,
    collections: RwLock<HashMap<Collection, Vec<StoredDocument>>>,
}

impl MemoryDocumentStore {
    pub fn new(codec: Arc<dyn IdCodec>) -> Self {
        Self {
            codec,
            collections: RwLock::new(HashMap::new()),
        }
    }
}

fn created_at(doc: &StoredDocument) -> Option<DateTime<Utc>> {
    match doc.body.get(CREATED_AT_FIELD) {
        Some(Value::String(s)) => DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.with_timezone(&Utc)),
        _ => None,
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    fn codec(&self) -> &dyn IdCodec {
        self.codec.as_ref()
    }

    async fn insert_one(&self, collection: Collection, body: Document) -> Result<DocumentId> {
        let id = self.codec.generate();
        let mut collections = self.collections.write().await;
        collections
            .entry(collection)
            .or_default()
            .push(StoredDocument {
                id: id.clone(),
                body,
            });
        debug!("Inserted {id} into in-memory {collection}");
        Ok(id)
    }

    async fn find_one(
        &self,
        collection: Collection,
        id: &DocumentId,
    ) -> Result<Option<StoredDocument>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| &d.id == id))
            .cloned())
    }

    async fn find_recent(
        &self,
        collection: Collection,
        options: FindOptions,
    ) -> Result<Vec<StoredDocument>> {
        let collections = self.collections.read().await;
        let Some(docs) = collections.get(&collection) else {
            return Ok(Vec::new());
        };

        let mut ordered: Vec<(usize, &StoredDocument)> = docs.iter().enumerate().collect();
        ordered.sort_by_key(|(pos, doc)| Reverse((created_at(doc), *pos)));

        Ok(ordered
            .into_iter()
            .skip(options.skip as usize)
            .take(options.limit as usize)
            .map(|(_, doc)| doc.clone())
            .collect())
    }

    async fn find_all(&self, collection: Collection) -> Result<Vec<StoredDocument>> {
        let collections = self.collections.read().await;
        Ok(collections.get(&collection).cloned().unwrap_or_default())
    }

    async fn count(&self, collection: Collection) -> Result<u64> {
        let collections = self.collections.read().await;
        Ok(collections.get(&collection).map_or(0, |docs| docs.len() as u64))
    }

    async fn close(&self) {
        debug!("In-memory store closed");
    }
}
