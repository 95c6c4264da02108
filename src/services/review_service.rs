// src/services/review_service.rs
// DOCUMENTATION: Review moderation workflow
// PURPOSE: Create/edit/approve/disapprove/delete reviews, each as one transaction
//
// pending --approve--> approved --disapprove/edit--> pending ; delete from any state

use crate::auth::Identity;
use crate::db::{PlaceRepository, ReviewRepository, VoteRepository};
use crate::errors::PlacesError;
use crate::models::{
    AdminReviewQuery, AdminReviewResponse, OwnReviewResponse, PageQuery, Paginated, Pagination,
    Review, ReviewRequest, ReviewResponse,
};
use crate::services::SubmissionLimiter;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

pub struct ReviewService;

impl ReviewService {
    /// Submit a new review; it starts pending
    pub async fn create_review(
        pool: &PgPool,
        limiter: &SubmissionLimiter,
        identity: &Identity,
        place_id: Uuid,
        req: ReviewRequest,
    ) -> Result<Review, PlacesError> {
        let req = req.normalized();
        req.validate()?;
        limiter.check(identity.user_id)?;
        let ReviewRequest { title, content } = req;

        let mut tx = pool.begin().await?;
        PlaceRepository::get_available(&mut *tx, place_id).await?;

        ReviewRepository::lock_author_slot(&mut tx, place_id, identity.user_id).await?;
        if ReviewRepository::exists_for_author(&mut tx, place_id, identity.user_id).await? {
            log::info!(
                "Rejected duplicate review by {} for place {}",
                identity.user_id,
                place_id
            );
            return Err(PlacesError::DuplicateReview);
        }

        let review = ReviewRepository::insert(
            &mut tx,
            place_id,
            identity.user_id,
            title.as_deref(),
            &content,
        )
        .await?;
        tx.commit().await?;

        log::info!("Review {} created for place {} (pending)", review.id, place_id);
        Ok(review)
    }

    /// Author edit; the review always goes back to pending
    pub async fn edit_review(
        pool: &PgPool,
        limiter: &SubmissionLimiter,
        identity: &Identity,
        review_id: Uuid,
        req: ReviewRequest,
    ) -> Result<Review, PlacesError> {
        let req = req.normalized();
        req.validate()?;
        limiter.check(identity.user_id)?;
        let ReviewRequest { title, content } = req;

        let mut tx = pool.begin().await?;
        let mut review = ReviewRepository::get_for_update(&mut tx, review_id).await?;
        identity.require_owner(review.user_id)?;

        review.apply_edit(title, content);
        let saved = ReviewRepository::save_state(&mut tx, &review).await?;
        tx.commit().await?;

        log::info!("Review {} edited by author, back to pending", review_id);
        Ok(saved)
    }

    pub async fn approve_review(
        pool: &PgPool,
        identity: &Identity,
        review_id: Uuid,
    ) -> Result<Review, PlacesError> {
        identity.require_admin()?;

        let mut tx = pool.begin().await?;
        let mut review = ReviewRepository::get_for_update(&mut tx, review_id).await?;
        review.approve(identity.user_id, Utc::now());
        let saved = ReviewRepository::save_state(&mut tx, &review).await?;
        tx.commit().await?;

        log::info!("Review {} approved by {}", review_id, identity.user_id);
        Ok(saved)
    }

    pub async fn disapprove_review(
        pool: &PgPool,
        identity: &Identity,
        review_id: Uuid,
    ) -> Result<Review, PlacesError> {
        identity.require_admin()?;

        let mut tx = pool.begin().await?;
        let mut review = ReviewRepository::get_for_update(&mut tx, review_id).await?;
        review.disapprove();
        let saved = ReviewRepository::save_state(&mut tx, &review).await?;
        tx.commit().await?;

        log::info!("Review {} returned to pending by {}", review_id, identity.user_id);
        Ok(saved)
    }

    /// Delete by author or admin; votes go first
    pub async fn delete_review(
        pool: &PgPool,
        identity: &Identity,
        review_id: Uuid,
    ) -> Result<u64, PlacesError> {
        let mut tx = pool.begin().await?;
        let review = ReviewRepository::get_for_update(&mut tx, review_id).await?;
        identity.require_owner_or_admin(review.user_id)?;

        let votes = VoteRepository::delete_for_review(&mut tx, review_id).await?;
        ReviewRepository::delete(&mut tx, review_id).await?;
        tx.commit().await?;

        log::info!(
            "Review {} deleted by {} ({} votes removed)",
            review_id,
            identity.user_id,
            votes
        );
        Ok(votes)
    }

    /// Public listing: approved reviews only, with fresh vote counts
    pub async fn list_approved(
        pool: &PgPool,
        place_id: Uuid,
        page: &PageQuery,
        viewer: Option<Uuid>,
    ) -> Result<Paginated<ReviewResponse>, PlacesError> {
        PlaceRepository::get_available(pool, place_id).await?;

        let pagination = Pagination::from(page);
        let (rows, total) =
            ReviewRepository::list_approved(pool, place_id, pagination, viewer).await?;

        Ok(pagination.wrap(rows.iter().map(|r| r.to_response()).collect(), total))
    }

    /// Moderation listing: every state, filterable
    pub async fn list_for_admin(
        pool: &PgPool,
        identity: &Identity,
        query: &AdminReviewQuery,
    ) -> Result<Paginated<AdminReviewResponse>, PlacesError> {
        identity.require_admin()?;

        let pagination = Pagination::new(query.page, query.limit);
        let (rows, total) = ReviewRepository::list_for_admin(pool, query, pagination).await?;

        Ok(pagination.wrap(rows.iter().map(|r| r.to_admin_response()).collect(), total))
    }

    /// The caller's own review of a place, in whatever state it is
    pub async fn user_review(
        pool: &PgPool,
        identity: &Identity,
        place_id: Uuid,
    ) -> Result<Option<OwnReviewResponse>, PlacesError> {
        let review = ReviewRepository::find_for_author(pool, place_id, identity.user_id).await?;
        Ok(review.map(|r| r.to_own_response()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::place::sample_create_request;
    use crate::services::PlaceService;

    async fn seed_place(pool: &PgPool, title: &str, is_available: bool) -> Uuid {
        let admin = Identity::admin(Uuid::new_v4());
        PlaceService::create_place(pool, &admin, sample_create_request(title, is_available))
            .await
            .expect("place should be created")
            .id
    }

    fn review_request(content: &str) -> ReviewRequest {
        ReviewRequest {
            title: Some("Worth the climb".to_string()),
            content: content.to_string(),
        }
    }

    async fn review_count(pool: &PgPool, place_id: Uuid, user_id: Uuid) -> i64 {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM reviews WHERE place_id = $1 AND user_id = $2")
                .bind(place_id)
                .bind(user_id)
                .fetch_one(pool)
                .await
                .expect("reviews should be countable");
        count
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_second_review_by_same_author_is_rejected(pool: PgPool) {
        let place_id = seed_place(&pool, "River Walk", true).await;
        let limiter = SubmissionLimiter::per_minute(100);
        let author = Identity::user(Uuid::new_v4());

        let first = ReviewService::create_review(
            &pool,
            &limiter,
            &author,
            place_id,
            review_request("Lovely views along the whole river."),
        )
        .await
        .expect("first review should be stored");
        assert!(!first.is_approved);

        let second = ReviewService::create_review(
            &pool,
            &limiter,
            &author,
            place_id,
            review_request("Trying to post a second opinion."),
        )
        .await;
        assert!(matches!(second, Err(PlacesError::DuplicateReview)));
        assert_eq!(review_count(&pool, place_id, author.user_id).await, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_concurrent_reviews_by_same_author_store_one(pool: PgPool) {
        let place_id = seed_place(&pool, "Bell Tower", true).await;
        let limiter = SubmissionLimiter::per_minute(100);
        let author = Identity::user(Uuid::new_v4());

        let (a, b) = tokio::join!(
            ReviewService::create_review(
                &pool,
                &limiter,
                &author,
                place_id,
                review_request("The bells ring every quarter hour."),
            ),
            ReviewService::create_review(
                &pool,
                &limiter,
                &author,
                place_id,
                review_request("Steep stairs but a great lookout."),
            ),
        );

        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
        assert_eq!(review_count(&pool, place_id, author.user_id).await, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_public_listing_hides_unavailable_places(pool: PgPool) {
        let hidden = seed_place(&pool, "Private Garden", false).await;
        let open = seed_place(&pool, "Public Garden", true).await;

        let listing = ReviewService::list_approved(&pool, hidden, &PageQuery::default(), None).await;
        assert!(matches!(listing, Err(PlacesError::NotFound(_))));

        let listing = ReviewService::list_approved(&pool, open, &PageQuery::default(), None)
            .await
            .expect("available place lists reviews");
        assert!(listing.data.is_empty());
        assert_eq!(listing.total_count, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_only_approved_reviews_are_listed(pool: PgPool) {
        let place_id = seed_place(&pool, "Town Hall", true).await;
        let limiter = SubmissionLimiter::per_minute(100);
        let admin = Identity::admin(Uuid::new_v4());

        let approved = ReviewService::create_review(
            &pool,
            &limiter,
            &Identity::user(Uuid::new_v4()),
            place_id,
            review_request("Beautiful clock and a friendly guide."),
        )
        .await
        .expect("review should be stored");
        ReviewService::create_review(
            &pool,
            &limiter,
            &Identity::user(Uuid::new_v4()),
            place_id,
            review_request("Still waiting for a moderator here."),
        )
        .await
        .expect("review should be stored");
        ReviewService::approve_review(&pool, &admin, approved.id)
            .await
            .expect("admin can approve");

        let listing = ReviewService::list_approved(&pool, place_id, &PageQuery::default(), None)
            .await
            .expect("listing should succeed");
        assert_eq!(listing.total_count, 1);
        assert_eq!(listing.data.len(), 1);
        assert_eq!(listing.data[0].id, approved.id);
    }
}
