// src/services/place_service.rs
// DOCUMENTATION: Business logic for places
// PURPOSE: Intermediary between handlers and repositories (slugs, cascades, file cleanup)

use crate::auth::Identity;
use crate::db::{ImageRepository, PlaceRepository, RatingRepository, ReviewRepository, VoteRepository};
use crate::errors::PlacesError;
use crate::models::{
    slug_candidate, CreatePlaceRequest, DeletionReport, NormalizedPlace, Paginated, Pagination,
    PlaceDetailResponse, PlaceListQuery, PlaceResponse, PlaceSummaryResponse, UpdatePlaceRequest,
};
use crate::services::{BlobStorage, RatingService};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;
use validator::Validate;

/// Give up looking for a free slug suffix after this many attempts
const MAX_SLUG_ATTEMPTS: u32 = 100;

pub struct PlaceService;

/// Updated place plus any replaced file that could not be removed
#[derive(Debug, serde::Serialize)]
pub struct PlaceUpdate {
    pub place: PlaceResponse,
    pub storage_failures: Vec<String>,
}

impl PlaceService {
    /// Public listing: available places only
    pub async fn list_places(
        pool: &PgPool,
        query: PlaceListQuery,
    ) -> Result<Paginated<PlaceSummaryResponse>, PlacesError> {
        let pagination = Pagination::new(query.page, query.limit);
        let (rows, total) = PlaceRepository::list(pool, &query, pagination, true).await?;
        Ok(pagination.wrap(rows.iter().map(|r| r.to_response()).collect(), total))
    }

    /// Admin listing: every place, available or not
    pub async fn list_all_places(
        pool: &PgPool,
        identity: &Identity,
        query: PlaceListQuery,
    ) -> Result<Paginated<PlaceSummaryResponse>, PlacesError> {
        identity.require_admin()?;
        let pagination = Pagination::new(query.page, query.limit);
        let (rows, total) = PlaceRepository::list(pool, &query, pagination, false).await?;
        Ok(pagination.wrap(rows.iter().map(|r| r.to_response()).collect(), total))
    }

    /// Place page: details, active images and rating stats
    pub async fn get_place_by_slug(
        pool: &PgPool,
        slug: &str,
    ) -> Result<PlaceDetailResponse, PlacesError> {
        let place = PlaceRepository::get_available_by_slug(pool, slug).await?;
        let images = ImageRepository::get_images_by_place(pool, place.id, true).await?;
        let rating = RatingService::compute_stats(pool, place.id).await?;

        Ok(PlaceDetailResponse {
            place: place.to_response(),
            images: images.iter().map(|i| i.to_response()).collect(),
            rating,
        })
    }

    /// Find a slug no other place uses, appending -2, -3, ... on collision
    async fn unique_slug(
        conn: &mut PgConnection,
        base: &str,
        exclude: Option<Uuid>,
    ) -> Result<String, PlacesError> {
        for attempt in 1..=MAX_SLUG_ATTEMPTS {
            let candidate = slug_candidate(base, attempt);
            if !PlaceRepository::slug_taken(conn, &candidate, exclude).await? {
                return Ok(candidate);
            }
        }
        Err(PlacesError::invalid_field("slug", "no free variant of this slug"))
    }

    pub async fn create_place(
        pool: &PgPool,
        identity: &Identity,
        req: CreatePlaceRequest,
    ) -> Result<PlaceResponse, PlacesError> {
        identity.require_admin()?;
        req.validate()?;
        let mut place: NormalizedPlace = req.normalize();

        let mut tx = pool.begin().await?;
        place.slug = Self::unique_slug(&mut tx, &place.slug, None).await?;
        let created = PlaceRepository::insert(&mut tx, &place).await?;
        tx.commit().await?;

        Ok(created.to_response())
    }

    pub async fn update_place(
        pool: &PgPool,
        storage: &BlobStorage,
        identity: &Identity,
        id: Uuid,
        req: UpdatePlaceRequest,
    ) -> Result<PlaceUpdate, PlacesError> {
        identity.require_admin()?;
        req.validate()?;

        let mut tx = pool.begin().await?;
        let current = PlaceRepository::get_for_update(&mut tx, id).await?;
        let mut place = req.normalize_onto(&current);
        if place.slug != current.slug {
            place.slug = Self::unique_slug(&mut tx, &place.slug, Some(id)).await?;
        }
        let updated = PlaceRepository::update(&mut tx, id, &place).await?;
        tx.commit().await?;

        let replaced: Vec<String> = current
            .stored_paths()
            .into_iter()
            .filter(|old| !updated.stored_paths().contains(old))
            .collect();
        let (_, storage_failures) = storage.delete_all(replaced).await;

        Ok(PlaceUpdate {
            place: updated.to_response(),
            storage_failures,
        })
    }

    /// Delete a place and everything it owns
    /// DOCUMENTATION: votes -> reviews -> ratings -> images -> place in one transaction,
    /// then the stored files; file failures are reported, not fatal
    pub async fn delete_place(
        pool: &PgPool,
        storage: &BlobStorage,
        identity: &Identity,
        id: Uuid,
    ) -> Result<DeletionReport, PlacesError> {
        identity.require_admin()?;

        let mut tx = pool.begin().await?;
        let place = PlaceRepository::get_for_update(&mut tx, id).await?;
        let mut paths = ImageRepository::paths_for_place(&mut tx, id).await?;
        paths.extend(place.stored_paths());

        let votes = VoteRepository::delete_for_place(&mut tx, id).await?;
        let reviews = ReviewRepository::delete_for_place(&mut tx, id).await?;
        let ratings = RatingRepository::delete_for_place(&mut tx, id).await?;
        let images = ImageRepository::delete_for_place(&mut tx, id).await?;
        let places = PlaceRepository::delete(&mut tx, id).await?;
        tx.commit().await?;

        let (files_deleted, storage_failures) = storage.delete_all(&paths).await;
        if !storage_failures.is_empty() {
            log::warn!(
                "Place {} deleted but {} file(s) remain in storage",
                id,
                storage_failures.len()
            );
        }

        Ok(DeletionReport {
            records_deleted: votes + reviews + ratings + images + places,
            files_deleted,
            storage_failures,
        })
    }
}
