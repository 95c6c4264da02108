// src/services/rating_service.rs
// DOCUMENTATION: Rating aggregation
// PURPOSE: Upsert/remove ratings and recompute statistics on every read

use crate::auth::Identity;
use crate::db::{PlaceRepository, RatingRepository};
use crate::errors::PlacesError;
use crate::models::{RatingRemoval, RatingStats, RatingSubmission, RatingValue, UserRatingResponse};
use crate::services::SubmissionLimiter;
use sqlx::PgPool;
use uuid::Uuid;

pub struct RatingService;

impl RatingService {
    /// Record (or overwrite) the caller's rating for a place
    pub async fn upsert_rating(
        pool: &PgPool,
        limiter: &SubmissionLimiter,
        identity: &Identity,
        place_id: Uuid,
        value: i32,
    ) -> Result<RatingSubmission, PlacesError> {
        let value = RatingValue::new(value)?;
        limiter.check(identity.user_id)?;
        PlaceRepository::get_available(pool, place_id).await?;

        let rating = RatingRepository::upsert(pool, place_id, identity.user_id, value).await?;
        log::info!(
            "User {} rated place {} with {}",
            identity.user_id,
            place_id,
            rating.value
        );

        let stats = Self::compute_stats(pool, place_id).await?;
        Ok(RatingSubmission { rating, stats })
    }

    /// Public statistics; unavailable places read as missing
    pub async fn place_stats(pool: &PgPool, place_id: Uuid) -> Result<RatingStats, PlacesError> {
        PlaceRepository::get_available(pool, place_id).await?;
        Self::compute_stats(pool, place_id).await
    }

    /// Average, total and 1..=5 distribution for a place
    pub async fn compute_stats(pool: &PgPool, place_id: Uuid) -> Result<RatingStats, PlacesError> {
        let buckets = RatingRepository::buckets_for_place(pool, place_id).await?;
        Ok(RatingStats::from_buckets(&buckets))
    }

    /// Remove the caller's rating; `removed` is false when none existed
    pub async fn remove_rating(
        pool: &PgPool,
        identity: &Identity,
        place_id: Uuid,
    ) -> Result<RatingRemoval, PlacesError> {
        let removed = RatingRepository::delete(pool, place_id, identity.user_id).await?;
        if removed {
            log::info!("User {} removed rating for place {}", identity.user_id, place_id);
        }

        let stats = Self::compute_stats(pool, place_id).await?;
        Ok(RatingRemoval { removed, stats })
    }

    pub async fn user_rating(
        pool: &PgPool,
        identity: &Identity,
        place_id: Uuid,
    ) -> Result<UserRatingResponse, PlacesError> {
        let rating = RatingRepository::find(pool, place_id, identity.user_id).await?;
        Ok(UserRatingResponse {
            place_id,
            value: rating.map(|r| r.value),
        })
    }
}
