// src/db/dashboard_repository.rs
// DOCUMENTATION: Aggregate queries behind the admin dashboard

use crate::db::db_error;
use crate::errors::PlacesError;
use crate::models::TopPlace;
use sqlx::PgPool;

pub struct DashboardRepository;

impl DashboardRepository {
    pub async fn count_places(pool: &PgPool) -> Result<i64, PlacesError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM places")
            .fetch_one(pool)
            .await
            .map_err(db_error("Count places failed"))?;
        Ok(count)
    }

    /// Returns (total, pending)
    pub async fn count_reviews(pool: &PgPool) -> Result<(i64, i64), PlacesError> {
        sqlx::query_as(
            "SELECT COUNT(*), COUNT(*) FILTER (WHERE is_approved = false) FROM reviews",
        )
        .fetch_one(pool)
        .await
        .map_err(db_error("Count reviews failed"))
    }

    /// Best rated places that have at least one rating
    pub async fn top_rated(pool: &PgPool, limit: i64) -> Result<Vec<TopPlace>, PlacesError> {
        sqlx::query_as::<_, TopPlace>(
            r#"
            SELECT
                p.id, p.title, p.slug,
                AVG(r.value)::float8 AS average_rating,
                COUNT(r.id) AS rating_count
            FROM places p
            JOIN ratings r ON r.place_id = p.id
            GROUP BY p.id, p.title, p.slug
            ORDER BY average_rating DESC, rating_count DESC, p.title ASC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(pool)
        .await
        .map_err(db_error("Top rated places failed"))
    }
}
