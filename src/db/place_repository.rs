// src/db/place_repository.rs
// DOCUMENTATION: Database access layer for places
// PURPOSE: Abstract place queries from business logic

use crate::db::{contains_pattern, db_error};
use crate::errors::PlacesError;
use crate::models::{NormalizedPlace, Pagination, Place, PlaceListQuery, PlaceSummaryRow};
use sqlx::{PgConnection, PgExecutor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

/// Listing select: place columns plus cover image and rating summary
const SUMMARY_SELECT: &str = r#"
    SELECT
        p.*,
        cover.image_path AS main_image_path,
        COALESCE(r.average, 0)::float8 AS average_rating,
        COALESCE(r.total, 0) AS rating_count
    FROM places p
    LEFT JOIN LATERAL (
        SELECT image_path
        FROM place_images
        WHERE place_id = p.id AND is_active = true
        ORDER BY is_main DESC, sort_order ASC, created_at ASC
        LIMIT 1
    ) cover ON true
    LEFT JOIN LATERAL (
        SELECT AVG(value)::float8 AS average, COUNT(*) AS total
        FROM ratings
        WHERE place_id = p.id
    ) r ON true
"#;

/// PlaceRepository: All database operations for places
pub struct PlaceRepository;

impl PlaceRepository {
    /// Append WHERE clause shared by the list and count queries
    fn push_filters(
        builder: &mut QueryBuilder<'_, Postgres>,
        query: &PlaceListQuery,
        only_available: bool,
    ) {
        builder.push(" WHERE true");

        if only_available {
            builder.push(" AND p.is_available = true");
        }

        if let Some(q) = query.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let pattern = contains_pattern(q);
            builder
                .push(" AND (p.title ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR p.short_description ILIKE ")
                .push_bind(pattern.clone())
                .push(" OR p.description ILIKE ")
                .push_bind(pattern)
                .push(")");
        }
    }

    /// List places with cover image and rating summary
    /// DOCUMENTATION: Returns tuple: (results, total_count) for pagination
    pub async fn list(
        pool: &PgPool,
        query: &PlaceListQuery,
        pagination: Pagination,
        only_available: bool,
    ) -> Result<(Vec<PlaceSummaryRow>, i64), PlacesError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM places p");
        Self::push_filters(&mut count, query, only_available);
        let (total,): (i64,) = count
            .build_query_as()
            .fetch_one(pool)
            .await
            .map_err(db_error("Count places failed"))?;

        let mut select = QueryBuilder::<Postgres>::new(SUMMARY_SELECT);
        Self::push_filters(&mut select, query, only_available);
        select
            .push(" ORDER BY p.sort_order ASC, p.title ASC LIMIT ")
            .push_bind(pagination.limit)
            .push(" OFFSET ")
            .push_bind(pagination.offset());

        let rows = select
            .build_query_as::<PlaceSummaryRow>()
            .fetch_all(pool)
            .await
            .map_err(db_error("List places failed"))?;

        log::debug!("Listed {} places ({} total)", rows.len(), total);
        Ok((rows, total))
    }

    /// Retrieve place by ID regardless of availability
    pub async fn get_by_id<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> Result<Place, PlacesError> {
        sqlx::query_as::<_, Place>("SELECT * FROM places WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await
            .map_err(db_error("Fetch place failed"))?
            .ok_or_else(|| {
                log::warn!("Place not found: {}", id);
                PlacesError::NotFound(format!("Place {} not found", id))
            })
    }

    /// Retrieve a publicly visible place by ID
    pub async fn get_available<'e>(
        executor: impl PgExecutor<'e>,
        id: Uuid,
    ) -> Result<Place, PlacesError> {
        sqlx::query_as::<_, Place>("SELECT * FROM places WHERE id = $1 AND is_available = true")
            .bind(id)
            .fetch_optional(executor)
            .await
            .map_err(db_error("Fetch place failed"))?
            .ok_or_else(|| PlacesError::NotFound(format!("Place {} not found", id)))
    }

    /// Retrieve a publicly visible place by slug
    pub async fn get_available_by_slug(pool: &PgPool, slug: &str) -> Result<Place, PlacesError> {
        sqlx::query_as::<_, Place>(
            "SELECT * FROM places WHERE slug = $1 AND is_available = true",
        )
        .bind(slug)
        .fetch_optional(pool)
        .await
        .map_err(db_error("Fetch place by slug failed"))?
        .ok_or_else(|| {
            log::warn!("Place not found with slug: {}", slug);
            PlacesError::NotFound(format!("Place '{}' not found", slug))
        })
    }

    /// Lock a place row for the rest of the transaction
    pub async fn get_for_update(conn: &mut PgConnection, id: Uuid) -> Result<Place, PlacesError> {
        sqlx::query_as::<_, Place>("SELECT * FROM places WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await
            .map_err(db_error("Lock place failed"))?
            .ok_or_else(|| PlacesError::NotFound(format!("Place {} not found", id)))
    }

    /// Whether another place already uses `slug`
    pub async fn slug_taken(
        conn: &mut PgConnection,
        slug: &str,
        exclude: Option<Uuid>,
    ) -> Result<bool, PlacesError> {
        let (taken,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM places WHERE slug = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(slug)
        .bind(exclude)
        .fetch_one(conn)
        .await
        .map_err(db_error("Slug lookup failed"))?;

        Ok(taken)
    }

    /// Create new place in database
    pub async fn insert(conn: &mut PgConnection, place: &NormalizedPlace) -> Result<Place, PlacesError> {
        let created = sqlx::query_as::<_, Place>(
            r#"
            INSERT INTO places (
                title, slug, short_description, description,
                thumbnail_path, panorama_path, is_available, sort_order,
                created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW(), NOW())
            RETURNING *
            "#,
        )
        .bind(&place.title) // $1
        .bind(&place.slug) // $2
        .bind(&place.short_description) // $3
        .bind(&place.description) // $4
        .bind(&place.thumbnail_path) // $5
        .bind(&place.panorama_path) // $6
        .bind(place.is_available) // $7
        .bind(place.sort_order) // $8
        .fetch_one(conn)
        .await
        .map_err(db_error("Failed to create place"))?;

        log::info!("Created place {} ({})", created.id, created.slug);
        Ok(created)
    }

    /// Overwrite editable columns of an existing place
    pub async fn update(
        conn: &mut PgConnection,
        id: Uuid,
        place: &NormalizedPlace,
    ) -> Result<Place, PlacesError> {
        let updated = sqlx::query_as::<_, Place>(
            r#"
            UPDATE places
            SET title = $1,
                slug = $2,
                short_description = $3,
                description = $4,
                thumbnail_path = $5,
                panorama_path = $6,
                is_available = $7,
                sort_order = $8,
                updated_at = NOW()
            WHERE id = $9
            RETURNING *
            "#,
        )
        .bind(&place.title)
        .bind(&place.slug)
        .bind(&place.short_description)
        .bind(&place.description)
        .bind(&place.thumbnail_path)
        .bind(&place.panorama_path)
        .bind(place.is_available)
        .bind(place.sort_order)
        .bind(id)
        .fetch_optional(conn)
        .await
        .map_err(db_error("Update place failed"))?
        .ok_or_else(|| PlacesError::NotFound(format!("Place {} not found", id)))?;

        log::info!("Updated place: {}", id);
        Ok(updated)
    }

    /// Physically delete a place row (dependents must already be gone)
    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<u64, PlacesError> {
        let rows = sqlx::query("DELETE FROM places WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await
            .map_err(db_error("Delete place failed"))?
            .rows_affected();

        if rows == 0 {
            return Err(PlacesError::NotFound(format!("Place {} not found", id)));
        }

        log::info!("Deleted place: {}", id);
        Ok(rows)
    }
}
