use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Resource, Validate};
use crate::errors::AppError;
use crate::store::Collection;

#[derive(Debug, Clone, Deserialize)]
pub struct SentimentCreate {
    pub user_id: String,
    /// Free-text reference to a vlog id; never checked against the vlogs collection.
    pub vlog_id: Option<String>,
    pub sentiment_score: f64,
    pub sentiment_label: String,
    pub emotion: String,
    pub confidence: f64,
}

fn check_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), AppError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "{field}: must be between {min:.1} and {max:.1}, got {value}"
        )))
    }
}

impl Validate for SentimentCreate {
    fn validate(&self) -> Result<(), AppError> {
        check_range("sentiment_score", self.sentiment_score, -1.0, 1.0)?;
        check_range("confidence", self.confidence, 0.0, 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub user_id: String,
    pub vlog_id: Option<String>,
    pub sentiment_score: f64,
    pub sentiment_label: String,
    pub emotion: String,
    pub confidence: f64,
    pub created_at: DateTime<Utc>,
}

impl Resource for Sentiment {
    type Create = SentimentCreate;

    const COLLECTION: Collection = Collection::Sentiments;
    const LABEL: &'static str = "Sentiment";

    fn from_create(input: SentimentCreate, now: DateTime<Utc>) -> Self {
        Sentiment {
            user_id: input.user_id,
            vlog_id: input.vlog_id,
            sentiment_score: input.sentiment_score,
            sentiment_label: input.sentiment_label,
            emotion: input.emotion,
            confidence: input.confidence,
            created_at: now,
        }
    }
}
