// src/db/vote_repository.rs
// DOCUMENTATION: Vote store - one helpful/unhelpful vote per (user, review)

use crate::db::db_error;
use crate::errors::PlacesError;
use crate::models::{UserVote, Vote};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

pub struct VoteRepository;

impl VoteRepository {
    /// Insert or overwrite the user's vote on a review
    pub async fn upsert(
        pool: &PgPool,
        review_id: Uuid,
        user_id: Uuid,
        is_helpful: bool,
    ) -> Result<Vote, PlacesError> {
        sqlx::query_as::<_, Vote>(
            r#"
            INSERT INTO review_votes (user_id, review_id, is_helpful)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, review_id) DO UPDATE
            SET is_helpful = EXCLUDED.is_helpful,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(review_id)
        .bind(is_helpful)
        .fetch_one(pool)
        .await
        .map_err(db_error("Upsert vote failed"))
    }

    /// `(is_helpful, count)` rows for one review
    pub async fn groups_for_review(
        pool: &PgPool,
        review_id: Uuid,
    ) -> Result<Vec<(bool, i64)>, PlacesError> {
        sqlx::query_as(
            r#"
            SELECT is_helpful, COUNT(*) AS count
            FROM review_votes
            WHERE review_id = $1
            GROUP BY is_helpful
            "#,
        )
        .bind(review_id)
        .fetch_all(pool)
        .await
        .map_err(db_error("Tally votes failed"))
    }

    pub async fn delete(pool: &PgPool, review_id: Uuid, user_id: Uuid) -> Result<bool, PlacesError> {
        let result = sqlx::query("DELETE FROM review_votes WHERE review_id = $1 AND user_id = $2")
            .bind(review_id)
            .bind(user_id)
            .execute(pool)
            .await
            .map_err(db_error("Delete vote failed"))?;

        Ok(result.rows_affected() > 0)
    }

    /// The user's votes on reviews of one place
    pub async fn for_place_and_user(
        pool: &PgPool,
        place_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<UserVote>, PlacesError> {
        sqlx::query_as::<_, UserVote>(
            r#"
            SELECT v.review_id, v.is_helpful
            FROM review_votes v
            JOIN reviews r ON r.id = v.review_id
            WHERE r.place_id = $1 AND v.user_id = $2
            "#,
        )
        .bind(place_id)
        .bind(user_id)
        .fetch_all(pool)
        .await
        .map_err(db_error("Fetch user votes failed"))
    }

    pub async fn delete_for_review(conn: &mut PgConnection, review_id: Uuid) -> Result<u64, PlacesError> {
        let result = sqlx::query("DELETE FROM review_votes WHERE review_id = $1")
            .bind(review_id)
            .execute(conn)
            .await
            .map_err(db_error("Delete review votes failed"))?;

        Ok(result.rows_affected())
    }

    /// Votes on every review of a place
    pub async fn delete_for_place(conn: &mut PgConnection, place_id: Uuid) -> Result<u64, PlacesError> {
        let result = sqlx::query(
            "DELETE FROM review_votes WHERE review_id IN (SELECT id FROM reviews WHERE place_id = $1)",
        )
        .bind(place_id)
        .execute(conn)
        .await
        .map_err(db_error("Delete place votes failed"))?;

        Ok(result.rows_affected())
    }
}
