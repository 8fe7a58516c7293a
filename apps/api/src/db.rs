use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::store::{
    mask_connection_string, DocumentStore, IdCodec, MemoryDocumentStore, PgDocumentStore,
    StoreError,
};

/// Persistence handle. Built once in `main`, shared through `AppState`.
///
/// Holds no store until `connect` (or `attach`) succeeds; handlers asking for
/// the store before then get `AppError::PersistenceUnavailable`.
pub struct Database {
    codec: Arc<dyn IdCodec>,
    store: RwLock<Option<Arc<dyn DocumentStore>>>,
}

impl Database {
    pub fn new(codec: Arc<dyn IdCodec>) -> Self {
        Self {
            codec,
            store: RwLock::new(None),
        }
    }

    /// Opens the store named by `uri`'s scheme and selects `db_name` within it.
    /// A second call while connected keeps the existing store.
    pub async fn connect(&self, uri: &str, db_name: &str) -> Result<(), StoreError> {
        let mut slot = self.store.write().await;
        if slot.is_some() {
            warn!(
                "Database already connected; ignoring connect to {}",
                mask_connection_string(uri)
            );
            return Ok(());
        }

        let scheme = uri.split("://").next().unwrap_or_default();
        let store: Arc<dyn DocumentStore> = match scheme {
            "postgres" | "postgresql" => {
                Arc::new(PgDocumentStore::connect(uri, db_name, self.codec.clone()).await?)
            }
            "memory" => Arc::new(MemoryDocumentStore::new(self.codec.clone())),
            other => return Err(StoreError::UnsupportedScheme(other.to_string())),
        };

        info!("Connected to database: {db_name} ({} ids)", self.codec.name());
        *slot = Some(store);
        Ok(())
    }

    /// Installs an already-built store.
    #[cfg(test)]
    pub async fn attach(&self, store: Arc<dyn DocumentStore>) {
        *self.store.write().await = Some(store);
    }

    /// Codec every store opened by this handle is built with.
    pub fn codec(&self) -> &dyn IdCodec {
        self.codec.as_ref()
    }

    pub async fn get(&self) -> Result<Arc<dyn DocumentStore>, AppError> {
        self.store
            .read()
            .await
            .clone()
            .ok_or(AppError::PersistenceUnavailable)
    }

    /// Releases the store. Safe to call when never connected.
    pub async fn close(&self) {
        if let Some(store) = self.store.write().await.take() {
            store.close().await;
            info!("Closed database connection");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::id::UuidCodec;
    use crate::store::Collection;

    fn database() -> Database {
        Database::new(Arc::new(UuidCodec))
    }

    #[tokio::test]
    async fn test_get_before_connect_fails() {
        let db = database();
        assert!(matches!(
            db.get().await,
            Err(AppError::PersistenceUnavailable)
        ));
    }

    #[tokio::test]
    async fn test_close_without_connect_is_noop() {
        let db = database();
        db.close().await;
        db.close().await;
        assert!(db.get().await.is_err());
    }

    #[tokio::test]
    async fn test_memory_connect_and_close() {
        let db = database();
        db.connect("memory://", "emogo_db").await.unwrap();
        let store = db.get().await.unwrap();
        assert_eq!(store.count(Collection::Vlogs).await.unwrap(), 0);

        db.close().await;
        assert!(matches!(
            db.get().await,
            Err(AppError::PersistenceUnavailable)
        ));
    }

    #[tokio::test]
    async fn test_second_connect_keeps_first_store() {
        let db = database();
        db.connect("memory://", "emogo_db").await.unwrap();
        let first = db.get().await.unwrap();
        db.connect("memory://", "other").await.unwrap();
        let second = db.get().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_unsupported_scheme() {
        let db = database();
        let err = db.connect("mongodb://localhost:27017", "emogo_db").await;
        assert!(matches!(err, Err(StoreError::UnsupportedScheme(s)) if s == "mongodb"));
    }
}
