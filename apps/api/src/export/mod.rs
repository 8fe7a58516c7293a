// Read-only bulk export: an HTML dashboard with per-collection counts and
// JSON dumps served as downloadable attachments.
// Whole collections are materialized in memory before serialization.

pub mod handlers;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::resources::{service, GpsCoordinate, Resource, Sentiment, Vlog};
use crate::store::{Collection, DocumentStore};

pub const ALL_DATA_FILENAME: &str = "emogo_all_data.json";

const DASHBOARD_TEMPLATE: &str = include_str!("dashboard.html");

/// A document as written to export files: the id under `_id`, then the fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportRecord<R> {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(flatten)]
    pub fields: R,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExportAll {
    pub vlogs: Vec<ExportRecord<Vlog>>,
    pub sentiments: Vec<ExportRecord<Sentiment>>,
    pub gps_coordinates: Vec<ExportRecord<GpsCoordinate>>,
    pub export_timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionCounts {
    pub vlogs: u64,
    pub sentiments: u64,
    pub gps_coordinates: u64,
}

/// Attachment filename for a collection dump.
pub fn filename(collection: Collection) -> String {
    format!("{}.json", collection.as_str())
}

/// Every document of `R`'s collection in insertion order.
pub async fn export_collection<R: Resource>(
    store: &dyn DocumentStore,
) -> Result<Vec<ExportRecord<R>>, AppError> {
    let docs = store.find_all(R::COLLECTION).await?;
    let mut records = Vec::with_capacity(docs.len());
    for doc in docs {
        let record = service::decode::<R>(R::COLLECTION, doc)?;
        records.push(ExportRecord {
            id: record.id,
            fields: record.fields,
        });
    }
    Ok(records)
}

pub async fn export_all(store: &dyn DocumentStore) -> Result<ExportAll, AppError> {
    Ok(ExportAll {
        vlogs: export_collection(store).await?,
        sentiments: export_collection(store).await?,
        gps_coordinates: export_collection(store).await?,
        export_timestamp: Utc::now(),
    })
}

pub async fn count_collections(store: &dyn DocumentStore) -> Result<CollectionCounts, AppError> {
    Ok(CollectionCounts {
        vlogs: store.count(Collection::Vlogs).await?,
        sentiments: store.count(Collection::Sentiments).await?,
        gps_coordinates: store.count(Collection::GpsCoordinates).await?,
    })
}

pub fn render_dashboard(counts: &CollectionCounts) -> String {
    DASHBOARD_TEMPLATE
        .replace("{{vlogs_count}}", &counts.vlogs.to_string())
        .replace("{{sentiments_count}}", &counts.sentiments.to_string())
        .replace("{{gps_count}}", &counts.gps_coordinates.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::{json, Value};

    use super::*;
    use crate::resources::sentiments::SentimentCreate;
    use crate::resources::vlogs::VlogCreate;
    use crate::store::id::ObjectIdCodec;
    use crate::store::MemoryDocumentStore;

    fn store() -> MemoryDocumentStore {
        MemoryDocumentStore::new(Arc::new(ObjectIdCodec::new()))
    }

    fn vlog(title: &str) -> VlogCreate {
        VlogCreate {
            user_id: "user-1".to_string(),
            title: title.to_string(),
            content: "content".to_string(),
            video_url: None,
            audio_url: Some("https://cdn.example.com/a.m4a".to_string()),
        }
    }

    #[tokio::test]
    async fn test_export_collection_is_insertion_ordered() {
        let store = store();
        for title in ["first", "second", "third"] {
            service::create::<Vlog>(&store, vlog(title)).await.unwrap();
        }
        let records = export_collection::<Vlog>(&store).await.unwrap();
        let titles: Vec<_> = records.iter().map(|r| r.fields.title.as_str()).collect();
        assert_eq!(titles, ["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_export_json_shape_round_trips() {
        let store = store();
        let input = vlog("Sunset");
        let created = service::create::<Vlog>(&store, input.clone()).await.unwrap();

        let records = export_collection::<Vlog>(&store).await.unwrap();
        let json = serde_json::to_value(&records).unwrap();
        assert_eq!(json[0]["_id"], created.id.as_str());
        assert!(json[0].get("id").is_none());
        assert!(json[0]["created_at"].is_string());

        let parsed: Vec<ExportRecord<Vlog>> = serde_json::from_value(json).unwrap();
        assert_eq!(parsed[0].fields.title, input.title);
        assert_eq!(parsed[0].fields.user_id, input.user_id);
        assert_eq!(parsed[0].fields.audio_url, input.audio_url);
        assert_eq!(parsed[0].fields.created_at, created.fields.created_at);
    }

    #[tokio::test]
    async fn test_export_all_matches_live_counts() {
        let store = store();
        service::create::<Vlog>(&store, vlog("a")).await.unwrap();
        service::create::<Vlog>(&store, vlog("b")).await.unwrap();
        service::create::<Sentiment>(
            &store,
            SentimentCreate {
                user_id: "user-1".to_string(),
                vlog_id: None,
                sentiment_score: -0.25,
                sentiment_label: "negative".to_string(),
                emotion: "sad".to_string(),
                confidence: 0.8,
            },
        )
        .await
        .unwrap();

        let all = export_all(&store).await.unwrap();
        let counts = count_collections(&store).await.unwrap();
        assert_eq!(all.vlogs.len() as u64, counts.vlogs);
        assert_eq!(all.sentiments.len() as u64, counts.sentiments);
        assert_eq!(all.gps_coordinates.len() as u64, counts.gps_coordinates);

        let json = serde_json::to_value(&all).unwrap();
        let mut keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, ["export_timestamp", "gps_coordinates", "sentiments", "vlogs"]);
        assert!(json["export_timestamp"].is_string());
    }

    #[test]
    fn test_render_dashboard_fills_counts() {
        let html = render_dashboard(&CollectionCounts {
            vlogs: 3,
            sentiments: 14,
            gps_coordinates: 159,
        });
        assert!(html.contains(r#"<div class="stat-number">3</div>"#));
        assert!(html.contains(r#"<div class="stat-number">14</div>"#));
        assert!(html.contains(r#"<div class="stat-number">159</div>"#));
        assert!(!html.contains("{{"));
        assert!(html.contains("/export/all"));
    }

    #[test]
    fn test_filenames() {
        assert_eq!(filename(Collection::Vlogs), "vlogs.json");
        assert_eq!(filename(Collection::GpsCoordinates), "gps_coordinates.json");
    }

    #[tokio::test]
    async fn test_export_rejects_nonconforming_document() {
        let store = store();
        let body = match json!({ "latitude": "north" }) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        store.insert_one(Collection::GpsCoordinates, body).await.unwrap();
        assert!(export_collection::<GpsCoordinate>(&store).await.is_err());
    }
}
