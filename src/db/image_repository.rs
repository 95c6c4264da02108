// src/db/image_repository.rs
// DOCUMENTATION: Place image database operations
// PURPOSE: Handle CRUD operations for place gallery images

use crate::db::db_error;
use crate::errors::PlacesError;
use crate::models::{CreateImageRequest, PlaceImage, UpdateImageRequest};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

pub struct ImageRepository;

impl ImageRepository {
    /// Insert a new image row
    pub async fn insert(
        conn: &mut PgConnection,
        place_id: Uuid,
        req: &CreateImageRequest,
    ) -> Result<PlaceImage, PlacesError> {
        let image = sqlx::query_as::<_, PlaceImage>(
            r#"
            INSERT INTO place_images (
                place_id, image_path, title, description,
                is_main, is_active, sort_order
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(place_id)
        .bind(&req.image_path)
        .bind(&req.title)
        .bind(&req.description)
        .bind(req.is_main.unwrap_or(false))
        .bind(req.is_active.unwrap_or(true))
        .bind(req.sort_order.unwrap_or(0))
        .fetch_one(conn)
        .await
        .map_err(db_error("Create image failed"))?;

        Ok(image)
    }

    /// Get images for a place
    /// DOCUMENTATION: Main image first, then by sort_order
    pub async fn get_images_by_place(
        pool: &PgPool,
        place_id: Uuid,
        only_active: bool,
    ) -> Result<Vec<PlaceImage>, PlacesError> {
        let images = sqlx::query_as::<_, PlaceImage>(
            r#"
            SELECT * FROM place_images
            WHERE place_id = $1 AND ($2 = false OR is_active = true)
            ORDER BY is_main DESC, sort_order ASC, created_at ASC
            "#,
        )
        .bind(place_id)
        .bind(only_active)
        .fetch_all(pool)
        .await
        .map_err(|e| {
            log::error!("Failed to fetch images for place {}: {}", place_id, e);
            PlacesError::DatabaseError(format!("Fetch images failed: {}", e))
        })?;

        Ok(images)
    }

    /// Lock one image row for the rest of the transaction
    pub async fn get_for_update(
        conn: &mut PgConnection,
        image_id: Uuid,
    ) -> Result<PlaceImage, PlacesError> {
        sqlx::query_as::<_, PlaceImage>("SELECT * FROM place_images WHERE id = $1 FOR UPDATE")
            .bind(image_id)
            .fetch_optional(conn)
            .await
            .map_err(db_error("Lock image failed"))?
            .ok_or_else(|| PlacesError::NotFound(format!("Image {} not found", image_id)))
    }

    /// Clear is_main on every image of the place except `keep`
    pub async fn clear_main(
        conn: &mut PgConnection,
        place_id: Uuid,
        keep: Option<Uuid>,
    ) -> Result<u64, PlacesError> {
        let result = sqlx::query(
            r#"
            UPDATE place_images
            SET is_main = false, updated_at = NOW()
            WHERE place_id = $1
              AND is_main = true
              AND ($2::uuid IS NULL OR id <> $2)
            "#,
        )
        .bind(place_id)
        .bind(keep)
        .execute(conn)
        .await
        .map_err(db_error("Unset main images failed"))?;

        Ok(result.rows_affected())
    }

    /// Flag one image as main
    pub async fn mark_main(conn: &mut PgConnection, image_id: Uuid) -> Result<PlaceImage, PlacesError> {
        sqlx::query_as::<_, PlaceImage>(
            r#"
            UPDATE place_images
            SET is_main = true, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(image_id)
        .fetch_optional(conn)
        .await
        .map_err(db_error("Set main image failed"))?
        .ok_or_else(|| PlacesError::NotFound(format!("Image {} not found", image_id)))
    }

    /// Partial update - only provided fields change
    pub async fn update(
        conn: &mut PgConnection,
        image_id: Uuid,
        req: &UpdateImageRequest,
    ) -> Result<PlaceImage, PlacesError> {
        sqlx::query_as::<_, PlaceImage>(
            r#"
            UPDATE place_images
            SET image_path = COALESCE($1, image_path),
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                is_main = COALESCE($4, is_main),
                is_active = COALESCE($5, is_active),
                sort_order = COALESCE($6, sort_order),
                updated_at = NOW()
            WHERE id = $7
            RETURNING *
            "#,
        )
        .bind(&req.image_path)
        .bind(&req.title)
        .bind(&req.description)
        .bind(req.is_main)
        .bind(req.is_active)
        .bind(req.sort_order)
        .bind(image_id)
        .fetch_optional(conn)
        .await
        .map_err(db_error("Update image failed"))?
        .ok_or_else(|| PlacesError::NotFound(format!("Image {} not found", image_id)))
    }

    pub async fn delete(conn: &mut PgConnection, image_id: Uuid) -> Result<u64, PlacesError> {
        let result = sqlx::query("DELETE FROM place_images WHERE id = $1")
            .bind(image_id)
            .execute(conn)
            .await
            .map_err(db_error("Delete image failed"))?;

        Ok(result.rows_affected())
    }

    /// Stored file paths of every image of a place
    pub async fn paths_for_place(
        conn: &mut PgConnection,
        place_id: Uuid,
    ) -> Result<Vec<String>, PlacesError> {
        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT image_path FROM place_images WHERE place_id = $1")
                .bind(place_id)
                .fetch_all(conn)
                .await
                .map_err(db_error("Fetch image paths failed"))?;

        Ok(rows.into_iter().map(|(path,)| path).collect())
    }

    /// Remove all images of a place
    pub async fn delete_for_place(conn: &mut PgConnection, place_id: Uuid) -> Result<u64, PlacesError> {
        let result = sqlx::query("DELETE FROM place_images WHERE place_id = $1")
            .bind(place_id)
            .execute(conn)
            .await
            .map_err(|e| {
                log::error!("Failed to delete images for place {}: {}", place_id, e);
                PlacesError::DatabaseError(format!("Delete images failed: {}", e))
            })?;

        Ok(result.rows_affected())
    }
}
