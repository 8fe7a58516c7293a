//! Create / list / get, shared by every resource type.
//!
//! Documents are decoded into the resource's typed shape on the way out;
//! a stored document that does not fit is an error, never silently skipped.

use anyhow::anyhow;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::{Record, Resource, Validate};
use crate::errors::AppError;
use crate::store::{
    Collection, Document, DocumentId, DocumentStore, FindOptions, IdCodec, StoreError,
    StoredDocument,
};

/// Validates, stamps timestamps, inserts, then reads the document back.
/// Nothing is written when validation fails.
pub async fn create<R: Resource>(
    store: &dyn DocumentStore,
    input: R::Create,
) -> Result<Record<R>, AppError> {
    input.validate()?;

    let body = encode(&R::from_create(input, Utc::now()))?;
    let id = store.insert_one(R::COLLECTION, body).await?;
    info!("Created {} {id}", R::LABEL);

    let stored = store
        .find_one(R::COLLECTION, &id)
        .await?
        .ok_or_else(|| anyhow!("{} {id} was inserted but could not be read back", R::LABEL))?;
    Ok(decode(R::COLLECTION, stored)?)
}

/// Newest first by `created_at`.
pub async fn list<R: Resource>(
    store: &dyn DocumentStore,
    options: FindOptions,
) -> Result<Vec<Record<R>>, AppError> {
    let docs = store.find_recent(R::COLLECTION, options).await?;
    Ok(docs
        .into_iter()
        .map(|doc| decode(R::COLLECTION, doc))
        .collect::<Result<_, _>>()?)
}

/// Malformed ids are rejected by the codec before the store is queried.
pub async fn get<R: Resource>(store: &dyn DocumentStore, raw_id: &str) -> Result<Record<R>, AppError> {
    let id = parse_id::<R>(store.codec(), raw_id)?;
    find::<R>(store, &id).await
}

/// Syntax check only; never touches a store.
pub fn parse_id<R: Resource>(codec: &dyn IdCodec, raw_id: &str) -> Result<DocumentId, AppError> {
    codec.parse(raw_id).ok_or_else(|| {
        AppError::InvalidIdentifier(format!(
            "Invalid {} ID format: expected a {} id",
            R::LABEL,
            codec.name()
        ))
    })
}

pub async fn find<R: Resource>(
    store: &dyn DocumentStore,
    id: &DocumentId,
) -> Result<Record<R>, AppError> {
    let stored = store
        .find_one(R::COLLECTION, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{} not found", R::LABEL)))?;
    Ok(decode(R::COLLECTION, stored)?)
}

pub fn encode<T: Serialize>(value: &T) -> Result<Document, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Encode(serde::ser::Error::custom(format!(
            "expected a JSON object, got {other}"
        )))),
    }
}

pub fn decode<R: Resource>(
    collection: Collection,
    doc: StoredDocument,
) -> Result<Record<R>, StoreError> {
    let StoredDocument { id, body } = doc;
    let fields = serde_json::from_value(Value::Object(body)).map_err(|source| {
        StoreError::Malformed {
            collection,
            id: id.to_string(),
            source,
        }
    })?;
    Ok(Record {
        id: id.into_string(),
        fields,
    })
}
