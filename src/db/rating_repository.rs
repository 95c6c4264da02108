// src/db/rating_repository.rs
// DOCUMENTATION: Rating store - one row per (place, user)
// PURPOSE: Atomic upsert and grouped counts for aggregation

use crate::db::db_error;
use crate::errors::PlacesError;
use crate::models::{Rating, RatingValue};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

pub struct RatingRepository;

impl RatingRepository {
    /// Insert or overwrite the user's rating for a place
    /// DOCUMENTATION: Single statement keyed by the (place_id, user_id) constraint,
    /// so concurrent submissions can never produce two rows
    pub async fn upsert(
        pool: &PgPool,
        place_id: Uuid,
        user_id: Uuid,
        value: RatingValue,
    ) -> Result<Rating, PlacesError> {
        let rating = sqlx::query_as::<_, Rating>(
            r#"
            INSERT INTO ratings (place_id, user_id, value)
            VALUES ($1, $2, $3)
            ON CONFLICT (place_id, user_id) DO UPDATE
            SET value = EXCLUDED.value,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(place_id)
        .bind(user_id)
        .bind(value.get())
        .fetch_one(pool)
        .await
        .map_err(db_error("Upsert rating failed"))?;

        Ok(rating)
    }

    pub async fn find(
        pool: &PgPool,
        place_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Rating>, PlacesError> {
        sqlx::query_as::<_, Rating>("SELECT * FROM ratings WHERE place_id = $1 AND user_id = $2")
            .bind(place_id)
            .bind(user_id)
            .fetch_optional(pool)
            .await
            .map_err(db_error("Fetch rating failed"))
    }

    /// Returns true when a rating existed and was removed
    pub async fn delete(pool: &PgPool, place_id: Uuid, user_id: Uuid) -> Result<bool, PlacesError> {
        let result = sqlx::query("DELETE FROM ratings WHERE place_id = $1 AND user_id = $2")
            .bind(place_id)
            .bind(user_id)
            .execute(pool)
            .await
            .map_err(db_error("Delete rating failed"))?;

        Ok(result.rows_affected() > 0)
    }

    /// `(value, count)` rows for one place
    pub async fn buckets_for_place(
        pool: &PgPool,
        place_id: Uuid,
    ) -> Result<Vec<(i16, i64)>, PlacesError> {
        sqlx::query_as(
            r#"
            SELECT value, COUNT(*) AS count
            FROM ratings
            WHERE place_id = $1
            GROUP BY value
            "#,
        )
        .bind(place_id)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to fetch rating stats for place {}: {}", place_id, e);
            PlacesError::DatabaseError(format!("Fetch rating stats failed: {}", e))
        })
    }

    /// `(value, count)` rows across every place
    pub async fn buckets_all(pool: &PgPool) -> Result<Vec<(i16, i64)>, PlacesError> {
        sqlx::query_as("SELECT value, COUNT(*) AS count FROM ratings GROUP BY value")
            .fetch_all(pool)
            .await
            .map_err(db_error("Fetch rating histogram failed"))
    }

    pub async fn delete_for_place(conn: &mut PgConnection, place_id: Uuid) -> Result<u64, PlacesError> {
        let result = sqlx::query("DELETE FROM ratings WHERE place_id = $1")
            .bind(place_id)
            .execute(conn)
            .await
            .map_err(db_error("Delete ratings failed"))?;

        Ok(result.rows_affected())
    }
}
