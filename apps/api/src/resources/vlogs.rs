use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Resource, Validate};
use crate::store::Collection;

#[derive(Debug, Clone, Deserialize)]
pub struct VlogCreate {
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub video_url: Option<String>,
    pub audio_url: Option<String>,
}

impl Validate for VlogCreate {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vlog {
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub video_url: Option<String>,
    pub audio_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Resource for Vlog {
    type Create = VlogCreate;

    const COLLECTION: Collection = Collection::Vlogs;
    const LABEL: &'static str = "Vlog";

    fn from_create(input: VlogCreate, now: DateTime<Utc>) -> Self {
        Vlog {
            user_id: input.user_id,
            title: input.title,
            content: input.content,
            video_url: input.video_url,
            audio_url: input.audio_url,
            created_at: now,
            updated_at: now,
        }
    }
}
