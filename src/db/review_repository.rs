// src/db/review_repository.rs
// DOCUMENTATION: Review database operations
// PURPOSE: Persist reviews and their moderation state; listings with fresh vote counts

use crate::db::{contains_pattern, db_error};
use crate::errors::PlacesError;
use crate::models::{AdminReviewQuery, Pagination, Review, ReviewListRow, ReviewStatus};
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

/// Columns of ReviewListRow except viewer_vote
const LIST_COLUMNS: &str = r#"
    SELECT
        r.*,
        u.name AS author_name,
        p.title AS place_title,
        (SELECT COUNT(*) FROM review_votes v WHERE v.review_id = r.id AND v.is_helpful) AS helpful_count,
        (SELECT COUNT(*) FROM review_votes v WHERE v.review_id = r.id AND NOT v.is_helpful) AS unhelpful_count,
"#;

const LIST_FROM: &str = r#"
    FROM reviews r
    JOIN places p ON p.id = r.place_id
    LEFT JOIN users u ON u.id = r.user_id
"#;

pub struct ReviewRepository;

impl ReviewRepository {
    /// Serialize review creation for one (place, user) pair until the transaction ends
    pub async fn lock_author_slot(
        conn: &mut PgConnection,
        place_id: Uuid,
        user_id: Uuid,
    ) -> Result<(), PlacesError> {
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text || ':' || $2::text, 0))")
            .bind(place_id)
            .bind(user_id)
            .execute(conn)
            .await
            .map_err(db_error("Review lock failed"))?;

        Ok(())
    }

    pub async fn exists_for_author(
        conn: &mut PgConnection,
        place_id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, PlacesError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM reviews WHERE place_id = $1 AND user_id = $2)",
        )
        .bind(place_id)
        .bind(user_id)
        .fetch_one(conn)
        .await
        .map_err(db_error("Review lookup failed"))?;

        Ok(exists)
    }

    /// Create a new pending review
    pub async fn insert(
        conn: &mut PgConnection,
        place_id: Uuid,
        user_id: Uuid,
        title: Option<&str>,
        content: &str,
    ) -> Result<Review, PlacesError> {
        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (place_id, user_id, title, content, is_approved)
            VALUES ($1, $2, $3, $4, false)
            RETURNING *
            "#,
        )
        .bind(place_id)
        .bind(user_id)
        .bind(title)
        .bind(content)
        .fetch_one(conn)
        .await
        .map_err(|e| {
            log::error!("Failed to create review: {}", e);
            PlacesError::DatabaseError(format!("Create review failed: {}", e))
        })?;

        Ok(review)
    }

    /// Lock a review row for the rest of the transaction
    pub async fn get_for_update(conn: &mut PgConnection, id: Uuid) -> Result<Review, PlacesError> {
        sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(db_error("Lock review failed"))?
            .ok_or_else(|| PlacesError::NotFound(format!("Review {} not found", id)))
    }

    pub async fn get_by_id(pool: &PgPool, id: Uuid) -> Result<Review, PlacesError> {
        sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(db_error("Fetch review failed"))?
            .ok_or_else(|| PlacesError::NotFound(format!("Review {} not found", id)))
    }

    pub async fn find_for_author(
        pool: &PgPool,
        place_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Review>, PlacesError> {
        sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE place_id = $1 AND user_id = $2 ORDER BY created_at ASC LIMIT 1",
        )
        .bind(place_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await
        .map_err(db_error("Fetch own review failed"))
    }

    /// Persist text and moderation columns after a state transition
    pub async fn save_state(conn: &mut PgConnection, review: &Review) -> Result<Review, PlacesError> {
        sqlx::query_as::<_, Review>(
            r#"
            UPDATE reviews
            SET title = $2,
                content = $3,
                is_approved = $4,
                approved_at = $5,
                approved_by = $6,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(review.id)
        .bind(&review.title)
        .bind(&review.content)
        .bind(review.is_approved)
        .bind(review.approved_at)
        .bind(review.approved_by)
        .fetch_optional(conn)
        .await
        .map_err(db_error("Save review failed"))?
        .ok_or_else(|| PlacesError::NotFound(format!("Review {} not found", review.id)))
    }

    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<u64, PlacesError> {
        let result = sqlx::query("DELETE FROM reviews WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await
            .map_err(db_error("Delete review failed"))?;

        Ok(result.rows_affected())
    }

    pub async fn delete_for_place(conn: &mut PgConnection, place_id: Uuid) -> Result<u64, PlacesError> {
        let result = sqlx::query("DELETE FROM reviews WHERE place_id = $1")
            .bind(place_id)
            .execute(conn)
            .await
            .map_err(db_error("Delete reviews failed"))?;

        Ok(result.rows_affected())
    }

    /// Approved reviews of a place, newest first
    /// DOCUMENTATION: viewer_vote holds the viewer's own vote when a viewer is given
    pub async fn list_approved(
        pool: &PgPool,
        place_id: Uuid,
        pagination: Pagination,
        viewer: Option<Uuid>,
    ) -> Result<(Vec<ReviewListRow>, i64), PlacesError> {
        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM reviews WHERE place_id = $1 AND is_approved = true",
        )
        .bind(place_id)
        .fetch_one(pool)
        .await
        .map_err(db_error("Count reviews failed"))?;

        let mut select = QueryBuilder::<Postgres>::new(LIST_COLUMNS);
        select
            .push(" (SELECT v.is_helpful FROM review_votes v WHERE v.review_id = r.id AND v.user_id = ")
            .push_bind(viewer)
            .push(") AS viewer_vote ")
            .push(LIST_FROM)
            .push(" WHERE r.place_id = ")
            .push_bind(place_id)
            .push(" AND r.is_approved = true ORDER BY r.created_at DESC LIMIT ")
            .push_bind(pagination.limit)
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let rows = select
            .build_query_as::<ReviewListRow>()
            .fetch_all(pool)
            .await
            .map_err(|e| {
                log::error!("Failed to fetch reviews for place {}: {}", place_id, e);
                PlacesError::DatabaseError(format!("Fetch reviews failed: {}", e))
            })?;

        Ok((rows, total))
    }

    fn push_admin_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &AdminReviewQuery) {
        builder.push(" WHERE true");

        match query.status {
            Some(ReviewStatus::Approved) => {
                builder.push(" AND r.is_approved = true");
            }
            Some(ReviewStatus::Pending) => {
                builder.push(" AND r.is_approved = false");
            }
            None => {}
        }

        if let Some(place_id) = query.place_id {
            builder.push(" AND r.place_id = ").push_bind(place_id);
        }

        if let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let pattern = contains_pattern(q);
            builder
                .push(" AND (r.content ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR r.title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR u.name ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }

    /// Every review in any state, filtered for the moderation screen
    pub async fn list_for_admin(
        pool: &PgPool,
        query: &AdminReviewQuery,
        pagination: Pagination,
    ) -> Result<(Vec<ReviewListRow>, i64), PlacesError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*)");
        count.push(LIST_FROM);
        Self::push_admin_filters(&mut count, query);
        let (total,): (i64,) = count
            .build_query_as()
            .fetch_one(pool)
            .await
            .map_err(db_error("Count admin reviews failed"))?;

        let mut select = QueryBuilder::<Postgres>::new(LIST_COLUMNS);
        select.push(" NULL::boolean AS viewer_vote ").push(LIST_FROM);
        Self::push_admin_filters(&mut select, query);
        select
            .push(" ORDER BY r.is_approved ASC, r.created_at DESC LIMIT ")
            .push_bind(pagination.limit)
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let rows = select
            .build_query_as::<ReviewListRow>()
            .fetch_all(pool)
            .await
            .map_err(db_error("List admin reviews failed"))?;

        Ok((rows, total))
    }
}
