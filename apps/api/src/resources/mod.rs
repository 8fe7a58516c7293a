// Resource collections exposed under /api: vlogs, sentiments, GPS coordinates.
// Each schema module defines the create input and the stored shape; the
// create/list/get flow is shared in `service` and `handlers`.

pub mod gps;
pub mod handlers;
pub mod sentiments;
pub mod service;
pub mod timestamp;
pub mod vlogs;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::store::{Collection, FindOptions};

pub use gps::GpsCoordinate;
pub use sentiments::Sentiment;
pub use vlogs::Vlog;

pub const DEFAULT_LIMIT: i64 = 100;
pub const MAX_LIMIT: i64 = 1000;

/// A stored resource type. `Self` is the document body (everything but the id).
pub trait Resource: Serialize + DeserializeOwned + Send + Sync + 'static {
    type Create: DeserializeOwned + Validate + Send + 'static;

    const COLLECTION: Collection;

    /// Singular display name used in error messages.
    const LABEL: &'static str;

    /// Builds the document body, stamping server-assigned timestamps with `now`.
    fn from_create(input: Self::Create, now: DateTime<Utc>) -> Self;
}

/// Range checks beyond what deserialization enforces.
pub trait Validate {
    fn validate(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// A resource as returned by the API: the id rendered as a plain string,
/// followed by the document fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record<R> {
    pub id: String,
    #[serde(flatten)]
    pub fields: R,
}

/// `?skip=&limit=` on list endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

impl ListParams {
    pub fn find_options(&self) -> Result<FindOptions, AppError> {
        let skip = self.skip.unwrap_or(0);
        if skip < 0 {
            return Err(AppError::Validation(format!(
                "skip: must be greater than or equal to 0, got {skip}"
            )));
        }

        let limit = self.limit.unwrap_or(DEFAULT_LIMIT);
        if !(1..=MAX_LIMIT).contains(&limit) {
            return Err(AppError::Validation(format!(
                "limit: must be between 1 and {MAX_LIMIT}, got {limit}"
            )));
        }

        Ok(FindOptions {
            skip: skip as u64,
            limit: limit as u64,
        })
    }
}
