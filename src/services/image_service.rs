// src/services/image_service.rs
// DOCUMENTATION: Place gallery management
// PURPOSE: Keep at most one main image per place; clean up replaced/deleted files

use crate::auth::Identity;
use crate::db::{ImageRepository, PlaceRepository};
use crate::errors::PlacesError;
use crate::models::{
    CreateImageRequest, DeletionReport, PlaceImage, UpdateImageRequest, UploadImageQuery,
};
use crate::services::BlobStorage;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

const IMAGE_FOLDER: &str = "places";

pub struct ImageService;

/// Updated image plus any replaced file that could not be removed
#[derive(Debug, serde::Serialize)]
pub struct ImageUpdate {
    pub image: PlaceImage,
    pub storage_failures: Vec<String>,
}

impl ImageService {
    pub async fn list_images(
        pool: &PgPool,
        identity: &Identity,
        place_id: Uuid,
    ) -> Result<Vec<PlaceImage>, PlacesError> {
        identity.require_admin()?;
        PlaceRepository::get_by_id(pool, place_id).await?;
        ImageRepository::get_images_by_place(pool, place_id, false).await
    }

    /// Attach an already stored image to a place
    pub async fn create_image(
        pool: &PgPool,
        identity: &Identity,
        place_id: Uuid,
        req: CreateImageRequest,
    ) -> Result<PlaceImage, PlacesError> {
        identity.require_admin()?;
        req.validate()?;

        let mut tx = pool.begin().await?;
        PlaceRepository::get_for_update(&mut tx, place_id).await?;

        if req.is_main == Some(true) {
            ImageRepository::clear_main(&mut tx, place_id, None).await?;
        }
        let image = ImageRepository::insert(&mut tx, place_id, &req).await?;
        tx.commit().await?;

        log::info!("Image {} added to place {} (main: {})", image.id, place_id, image.is_main);
        Ok(image)
    }

    /// Store raw bytes, then attach them as a new image
    pub async fn upload_image(
        pool: &PgPool,
        storage: &BlobStorage,
        identity: &Identity,
        place_id: Uuid,
        query: UploadImageQuery,
        bytes: &[u8],
    ) -> Result<PlaceImage, PlacesError> {
        identity.require_admin()?;
        query.validate()?;
        if bytes.is_empty() {
            return Err(PlacesError::invalid_field("file", "must not be empty"));
        }
        PlaceRepository::get_by_id(pool, place_id).await?;

        let path = storage.store(IMAGE_FOLDER, &query.filename, bytes).await?;
        let req = query.into_create_request(path.clone());

        match Self::create_image(pool, identity, place_id, req).await {
            Ok(image) => Ok(image),
            Err(e) => {
                // no row references the stored file
                if !storage.delete(&path).await {
                    log::warn!(
                        "Upload for place {} failed and {} remains in storage",
                        place_id,
                        path
                    );
                }
                Err(e)
            }
        }
    }

    /// Partial update; a replaced file is removed after commit
    pub async fn update_image(
        pool: &PgPool,
        storage: &BlobStorage,
        identity: &Identity,
        place_id: Uuid,
        image_id: Uuid,
        req: UpdateImageRequest,
    ) -> Result<ImageUpdate, PlacesError> {
        identity.require_admin()?;
        req.validate()?;

        let mut tx = pool.begin().await?;
        if req.is_main == Some(true) {
            // serializes main-flag changes per place
            PlaceRepository::get_for_update(&mut tx, place_id).await?;
        }
        let current = ImageRepository::get_for_update(&mut tx, image_id).await?;
        current.ensure_belongs_to(place_id)?;
        let replaced = req.replaced_path(&current).map(str::to_string);

        if req.is_main == Some(true) {
            ImageRepository::clear_main(&mut tx, place_id, Some(image_id)).await?;
        }
        let image = ImageRepository::update(&mut tx, image_id, &req).await?;
        tx.commit().await?;

        let (_, storage_failures) = storage.delete_all(replaced).await;
        log::info!("Image {} of place {} updated", image_id, place_id);
        Ok(ImageUpdate {
            image,
            storage_failures,
        })
    }

    /// Make `image_id` the only main image of `place_id`
    pub async fn set_main_image(
        pool: &PgPool,
        identity: &Identity,
        place_id: Uuid,
        image_id: Uuid,
    ) -> Result<PlaceImage, PlacesError> {
        identity.require_admin()?;

        let mut tx = pool.begin().await?;
        PlaceRepository::get_for_update(&mut tx, place_id).await?;
        let target = ImageRepository::get_for_update(&mut tx, image_id).await?;
        target.ensure_belongs_to(place_id)?;

        let cleared = ImageRepository::clear_main(&mut tx, place_id, Some(image_id)).await?;
        let image = ImageRepository::mark_main(&mut tx, image_id).await?;
        tx.commit().await?;

        log::info!(
            "Image {} is now main for place {} ({} sibling flags cleared)",
            image_id,
            place_id,
            cleared
        );
        Ok(image)
    }

    /// Delete the row, then its file; a file failure does not undo the deletion
    pub async fn delete_image(
        pool: &PgPool,
        storage: &BlobStorage,
        identity: &Identity,
        place_id: Uuid,
        image_id: Uuid,
    ) -> Result<DeletionReport, PlacesError> {
        identity.require_admin()?;

        let mut tx = pool.begin().await?;
        let image = ImageRepository::get_for_update(&mut tx, image_id).await?;
        image.ensure_belongs_to(place_id)?;
        let records_deleted = ImageRepository::delete(&mut tx, image_id).await?;
        tx.commit().await?;

        let (files_deleted, storage_failures) = storage.delete_all([&image.image_path]).await;
        log::info!("Image {} deleted from place {}", image_id, place_id);

        Ok(DeletionReport {
            records_deleted,
            files_deleted,
            storage_failures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::place::sample_create_request;
    use crate::services::PlaceService;

    async fn seed_place(pool: &PgPool, admin: &Identity, title: &str) -> Uuid {
        PlaceService::create_place(pool, admin, sample_create_request(title, true))
            .await
            .expect("place should be created")
            .id
    }

    async fn seed_image(pool: &PgPool, admin: &Identity, place_id: Uuid, is_main: bool) -> Uuid {
        let req = CreateImageRequest {
            image_path: format!("/storage/places/{}.jpg", Uuid::new_v4()),
            title: None,
            description: None,
            is_main: Some(is_main),
            is_active: None,
            sort_order: None,
        };
        ImageService::create_image(pool, admin, place_id, req)
            .await
            .expect("image should be created")
            .id
    }

    async fn main_images(pool: &PgPool, place_id: Uuid) -> Vec<Uuid> {
        let rows: Vec<(Uuid,)> =
            sqlx::query_as("SELECT id FROM place_images WHERE place_id = $1 AND is_main")
                .bind(place_id)
                .fetch_all(pool)
                .await
                .expect("images should be readable");
        rows.into_iter().map(|(id,)| id).collect()
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_setting_main_clears_sibling_only(pool: PgPool) {
        let admin = Identity::admin(Uuid::new_v4());
        let place_id = seed_place(&pool, &admin, "Lighthouse").await;
        let other_place = seed_place(&pool, &admin, "Fish Market").await;

        seed_image(&pool, &admin, place_id, true).await;
        let second = seed_image(&pool, &admin, place_id, false).await;
        let elsewhere = seed_image(&pool, &admin, other_place, true).await;

        let image = ImageService::set_main_image(&pool, &admin, place_id, second)
            .await
            .expect("main image should switch");
        assert!(image.is_main);

        assert_eq!(main_images(&pool, place_id).await, vec![second]);
        assert_eq!(main_images(&pool, other_place).await, vec![elsewhere]);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_concurrent_main_changes_leave_one_main(pool: PgPool) {
        let admin = Identity::admin(Uuid::new_v4());
        let place_id = seed_place(&pool, &admin, "Old Mill").await;
        let a = seed_image(&pool, &admin, place_id, false).await;
        let b = seed_image(&pool, &admin, place_id, false).await;
        let c = seed_image(&pool, &admin, place_id, false).await;

        let update = UpdateImageRequest {
            is_main: Some(true),
            ..Default::default()
        };
        let storage = BlobStorage::new(std::env::temp_dir(), "/storage/");

        let (first, second, third) = tokio::join!(
            ImageService::set_main_image(&pool, &admin, place_id, a),
            ImageService::set_main_image(&pool, &admin, place_id, b),
            ImageService::update_image(&pool, &storage, &admin, place_id, c, update),
        );

        assert!(first.is_ok());
        assert!(second.is_ok());
        assert!(third.is_ok());
        assert_eq!(main_images(&pool, place_id).await.len(), 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_failed_upload_removes_stored_file(pool: PgPool) {
        let admin = Identity::admin(Uuid::new_v4());
        let place_id = seed_place(&pool, &admin, "Sculpture Park").await;

        // stored path outgrows the image_path column limit, so the insert is rejected
        let root = std::env::temp_dir().join(format!("upload-test-{}", Uuid::new_v4()));
        let long_prefix = format!("/{}", "p".repeat(600));
        let storage = BlobStorage::new(root.clone(), &long_prefix);

        let query = UploadImageQuery {
            filename: "statue.png".to_string(),
            title: None,
            description: None,
            is_main: None,
            sort_order: None,
        };
        let result =
            ImageService::upload_image(&pool, &storage, &admin, place_id, query, b"png-bytes")
                .await;
        assert!(matches!(result, Err(PlacesError::ValidationError(_))));

        let mut entries = tokio::fs::read_dir(root.join(IMAGE_FOLDER))
            .await
            .expect("upload folder was created");
        assert!(entries.next_entry().await.expect("folder is readable").is_none());
        assert!(main_images(&pool, place_id).await.is_empty());

        let _ = tokio::fs::remove_dir_all(&root).await;
    }
}
