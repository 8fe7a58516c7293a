//! PostgreSQL-backed document store.
//!
//! The configured database name becomes a schema; each collection is a table
//! of `(seq, id, body JSONB)` rows inside it. `seq` records insertion order.
//! Queries are runtime `sqlx::query_as` calls so the crate builds without a
//! live database.

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::{debug, info};

use super::{
    mask_connection_string, Collection, Document, DocumentId, DocumentStore, FindOptions,
    IdCodec, Result, StoreError, StoredDocument, CREATED_AT_FIELD,
};

#[derive(FromRow)]
struct DocumentRow {
    id: String,
    body: Json<Document>,
}

impl From<DocumentRow> for StoredDocument {
    fn from(row: DocumentRow) -> Self {
        StoredDocument {
            id: DocumentId::from_stored(row.id),
            body: row.body.0,
        }
    }
}

pub struct PgDocumentStore {
    pool: PgPool,
    schema: String,
    codec: Arc<dyn IdCodec>,
}

/// Schema names are interpolated into SQL, so only plain identifiers pass.
pub fn is_valid_database_name(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
        && name.len() <= 63
}

impl PgDocumentStore {
    /// Opens a pool, then creates the schema and collection tables if absent.
    pub async fn connect(uri: &str, db_name: &str, codec: Arc<dyn IdCodec>) -> Result<Self> {
        if !is_valid_database_name(db_name) {
            return Err(StoreError::InvalidDatabaseName(db_name.to_string()));
        }

        info!("Connecting to PostgreSQL at {}", mask_connection_string(uri));
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(uri)
            .await?;

        let store = Self {
            pool,
            schema: db_name.to_string(),
            codec,
        };
        store.bootstrap().await?;

        info!("PostgreSQL document store ready (schema: {})", store.schema);
        Ok(store)
    }

    async fn bootstrap(&self) -> Result<()> {
        sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", self.schema))
            .execute(&self.pool)
            .await?;

        for collection in Collection::ALL {
            sqlx::query(&format!(
                r#"
                CREATE TABLE IF NOT EXISTS {} (
                    seq  BIGSERIAL,
                    id   TEXT PRIMARY KEY,
                    body JSONB NOT NULL
                )
                "#,
                self.table(collection)
            ))
            .execute(&self.pool)
            .await?;
            debug!("Ensured table {}", self.table(collection));
        }
        Ok(())
    }

    fn table(&self, collection: Collection) -> String {
        format!("{}.{}", self.schema, collection.as_str())
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    fn codec(&self) -> &dyn IdCodec {
        self.codec.as_ref()
    }

    async fn insert_one(&self, collection: Collection, body: Document) -> Result<DocumentId> {
        let id = self.codec.generate();
        sqlx::query(&format!(
            "INSERT INTO {} (id, body) VALUES ($1, $2)",
            self.table(collection)
        ))
        .bind(id.as_str())
        .bind(Json(&body))
        .execute(&self.pool)
        .await?;

        debug!("Inserted {id} into {collection}");
        Ok(id)
    }

    async fn find_one(
        &self,
        collection: Collection,
        id: &DocumentId,
    ) -> Result<Option<StoredDocument>> {
        let row: Option<DocumentRow> = sqlx::query_as(&format!(
            "SELECT id, body FROM {} WHERE id = $1",
            self.table(collection)
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(StoredDocument::from))
    }

    async fn find_recent(
        &self,
        collection: Collection,
        options: FindOptions,
    ) -> Result<Vec<StoredDocument>> {
        let rows: Vec<DocumentRow> = sqlx::query_as(&format!(
            r#"
            SELECT id, body FROM {}
            ORDER BY (body->>'{CREATED_AT_FIELD}')::timestamptz DESC NULLS LAST, seq DESC
            OFFSET $1 LIMIT $2
            "#,
            self.table(collection)
        ))
        .bind(options.skip as i64)
        .bind(options.limit as i64)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(StoredDocument::from).collect())
    }

    async fn find_all(&self, collection: Collection) -> Result<Vec<StoredDocument>> {
        let rows: Vec<DocumentRow> = sqlx::query_as(&format!(
            "SELECT id, body FROM {} ORDER BY seq ASC",
            self.table(collection)
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(StoredDocument::from).collect())
    }

    async fn count(&self, collection: Collection) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM {}",
            self.table(collection)
        ))
        .fetch_one(&self.pool)
        .await?;
        Ok(count as u64)
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("PostgreSQL connection pool closed");
    }
}
