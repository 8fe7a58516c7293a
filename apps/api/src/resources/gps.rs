use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{timestamp, Resource, Validate};
use crate::store::Collection;

#[derive(Debug, Clone, Deserialize)]
pub struct GpsCreate {
    pub user_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>,
    pub altitude: Option<f64>,
    /// When the reading was taken on the device.
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
}

impl Validate for GpsCreate {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpsCoordinate {
    pub user_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>,
    pub altitude: Option<f64>,
    pub timestamp: DateTime<Utc>,
    /// When the reading reached the server. Distinct from `timestamp`.
    pub created_at: DateTime<Utc>,
}

impl Resource for GpsCoordinate {
    type Create = GpsCreate;

    const COLLECTION: Collection = Collection::GpsCoordinates;
    const LABEL: &'static str = "GPS coordinate";

    fn from_create(input: GpsCreate, now: DateTime<Utc>) -> Self {
        GpsCoordinate {
            user_id: input.user_id,
            latitude: input.latitude,
            longitude: input.longitude,
            accuracy: input.accuracy,
            altitude: input.altitude,
            timestamp: input.timestamp,
            created_at: now,
        }
    }
}
