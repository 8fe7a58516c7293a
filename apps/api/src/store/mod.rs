//! Document store: named collections of schema-flexible JSON documents.
//!
//! `DocumentStore` is the seam between the resource services and the storage
//! engine. `PgDocumentStore` keeps documents as JSONB rows; `MemoryDocumentStore`
//! keeps them in process and backs `memory://` URIs and the test suite.

pub mod id;
pub mod memory;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

pub use id::{DocumentId, IdCodec, IdFormat};
pub use memory::MemoryDocumentStore;
pub use postgres::PgDocumentStore;

/// Stored document body. The id lives beside it, never inside it.
pub type Document = Map<String, Value>;

/// Field every collection is ordered by when listing.
pub const CREATED_AT_FIELD: &str = "created_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Vlogs,
    Sentiments,
    GpsCoordinates,
}

impl Collection {
    pub const ALL: [Collection; 3] = [
        Collection::Vlogs,
        Collection::Sentiments,
        Collection::GpsCoordinates,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Collection::Vlogs => "vlogs",
            Collection::Sentiments => "sentiments",
            Collection::GpsCoordinates => "gps_coordinates",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub body: Document,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindOptions {
    pub skip: u64,
    pub limit: u64,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Document {id} in {collection} does not match its schema: {source}")]
    Malformed {
        collection: Collection,
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Document could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Unsupported store URI scheme '{0}'")]
    UnsupportedScheme(String),

    #[error("Invalid database name '{0}'")]
    InvalidDatabaseName(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Storage engine contract. Carried in the persistence handle as
/// `Arc<dyn DocumentStore>`.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Codec for the ids this store generates and accepts.
    fn codec(&self) -> &dyn IdCodec;

    /// Inserts `body` under a freshly generated id and returns that id.
    async fn insert_one(&self, collection: Collection, body: Document) -> Result<DocumentId>;

    async fn find_one(
        &self,
        collection: Collection,
        id: &DocumentId,
    ) -> Result<Option<StoredDocument>>;

    /// A page of documents, newest `created_at` first; ties go to the most
    /// recently inserted document.
    async fn find_recent(
        &self,
        collection: Collection,
        options: FindOptions,
    ) -> Result<Vec<StoredDocument>>;

    /// Every document in insertion order.
    async fn find_all(&self, collection: Collection) -> Result<Vec<StoredDocument>>;

    async fn count(&self, collection: Collection) -> Result<u64>;

    async fn close(&self);
}

/// Hides the password of a connection string for logging.
pub fn mask_connection_string(uri: &str) -> String {
    match (uri.find("//"), uri.rfind('@')) {
        (Some(scheme_end), Some(at)) if at > scheme_end => {
            format!("{}****{}", &uri[..scheme_end + 2], &uri[at..])
        }
        _ => uri.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_connection_string() {
        assert_eq!(
            mask_connection_string("postgres://emogo:secret@db:5432/emogo"),
            "postgres://****@db:5432/emogo"
        );
        assert_eq!(mask_connection_string("memory://"), "memory://");
    }

    #[test]
    fn test_collection_names() {
        let names: Vec<_> = Collection::ALL.iter().map(|c| c.as_str()).collect();
        assert_eq!(names, ["vlogs", "sentiments", "gps_coordinates"]);
    }
}
