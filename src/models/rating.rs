// src/models/rating.rs
// DOCUMENTATION: Star ratings and their aggregate statistics
// PURPOSE: One rating per (user, place); statistics derived from grouped counts

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::collections::BTreeMap;
use uuid::Uuid;
use validator::Validate;

use crate::errors::PlacesError;

pub const MIN_RATING: i16 = 1;
pub const MAX_RATING: i16 = 5;

/// Rating row from the ratings table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Rating {
    pub id: Uuid,
    pub place_id: Uuid,
    pub user_id: Uuid,
    pub value: i16,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Rating value guaranteed to be within 1..=5
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatingValue(i16);

impl RatingValue {
    pub fn new(value: i32) -> Result<Self, PlacesError> {
        if value < MIN_RATING as i32 || value > MAX_RATING as i32 {
            return Err(PlacesError::invalid_field(
                "value",
                format!("must be between {} and {}", MIN_RATING, MAX_RATING),
            ));
        }
        Ok(RatingValue(value as i16))
    }

    pub fn get(self) -> i16 {
        self.0
    }
}

/// Body of PUT /places/{id}/rating
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SubmitRatingRequest {
    #[validate(range(min = 1, max = 5, message = "must be between 1 and 5"))]
    pub value: i32,
}

/// Aggregated rating statistics for one place (or all places)
/// DOCUMENTATION: distribution always holds every bucket 1..=5
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingStats {
    pub average: f64,
    pub total: i64,
    pub distribution: BTreeMap<i16, i64>,
}

impl RatingStats {
    /// Stats with no ratings recorded
    pub fn empty() -> Self {
        Self::from_buckets(&[])
    }

    /// Build stats from `(value, count)` rows of a GROUP BY query
    /// DOCUMENTATION: Rows with values outside 1..=5 are ignored
    pub fn from_buckets(buckets: &[(i16, i64)]) -> Self {
        let mut distribution: BTreeMap<i16, i64> =
            (MIN_RATING..=MAX_RATING).map(|value| (value, 0)).collect();

        for &(value, count) in buckets {
            if let Some(slot) = distribution.get_mut(&value) {
                *slot += count;
            }
        }

        let total: i64 = distribution.values().sum();
        let weighted: i64 = distribution
            .iter()
            .map(|(value, count)| *value as i64 * count)
            .sum();
        let average = if total == 0 {
            0.0
        } else {
            weighted as f64 / total as f64
        };

        Self {
            average,
            total,
            distribution,
        }
    }
}

/// Rating plus the freshly recomputed stats for its place
#[derive(Debug, Serialize)]
pub struct RatingSubmission {
    pub rating: Rating,
    pub stats: RatingStats,
}

/// Result of DELETE /places/{id}/rating
#[derive(Debug, Serialize)]
pub struct RatingRemoval {
    pub removed: bool,
    pub stats: RatingStats,
}

/// The caller's own rating for a place, if any
#[derive(Debug, Serialize)]
pub struct UserRatingResponse {
    pub place_id: Uuid,
    pub value: Option<i16>,
}
