// src/services/vote_service.rs
// DOCUMENTATION: Helpful/unhelpful votes on reviews
// PURPOSE: One vote per (user, review); tallies always counted fresh

use crate::auth::Identity;
use crate::db::{PlaceRepository, ReviewRepository, VoteRepository};
use crate::errors::PlacesError;
use crate::models::{ensure_not_author, UserVote, VoteRemoval, VoteSubmission, VoteTally};
use crate::services::SubmissionLimiter;
use sqlx::PgPool;
use uuid::Uuid;

pub struct VoteService;

impl VoteService {
    /// Cast or overwrite the caller's vote on a review
    pub async fn cast_vote(
        pool: &PgPool,
        limiter: &SubmissionLimiter,
        identity: &Identity,
        review_id: Uuid,
        is_helpful: bool,
    ) -> Result<VoteSubmission, PlacesError> {
        let review = ReviewRepository::get_by_id(pool, review_id).await?;
        ensure_not_author(review.user_id, identity.user_id)?;
        limiter.check(identity.user_id)?;

        let vote = VoteRepository::upsert(pool, review_id, identity.user_id, is_helpful).await?;
        log::info!(
            "User {} voted {} on review {}",
            identity.user_id,
            if is_helpful { "helpful" } else { "unhelpful" },
            review_id
        );

        let tally = Self::tally(pool, review_id).await?;
        Ok(VoteSubmission { vote, tally })
    }

    /// Tally for public readers; reviews of hidden places read as missing
    pub async fn public_tally(pool: &PgPool, review_id: Uuid) -> Result<VoteTally, PlacesError> {
        let review = ReviewRepository::get_by_id(pool, review_id).await?;
        PlaceRepository::get_available(pool, review.place_id).await?;
        Self::tally(pool, review_id).await
    }

    pub async fn tally(pool: &PgPool, review_id: Uuid) -> Result<VoteTally, PlacesError> {
        let groups = VoteRepository::groups_for_review(pool, review_id).await?;
        Ok(VoteTally::from_groups(&groups))
    }

    pub async fn remove_vote(
        pool: &PgPool,
        identity: &Identity,
        review_id: Uuid,
    ) -> Result<VoteRemoval, PlacesError> {
        let removed = VoteRepository::delete(pool, review_id, identity.user_id).await?;
        let tally = Self::tally(pool, review_id).await?;
        Ok(VoteRemoval { removed, tally })
    }

    pub async fn user_votes(
        pool: &PgPool,
        identity: &Identity,
        place_id: Uuid,
    ) -> Result<Vec<UserVote>, PlacesError> {
        VoteRepository::for_place_and_user(pool, place_id, identity.user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::place::sample_create_request;
    use crate::models::ReviewRequest;
    use crate::services::{PlaceService, ReviewService};

    /// Place plus one review by `author`
    async fn seed_review(pool: &PgPool, author: &Identity, is_available: bool) -> (Uuid, Uuid) {
        let admin = Identity::admin(Uuid::new_v4());
        let limiter = SubmissionLimiter::per_minute(100);
        let place_id = PlaceService::create_place(
            pool,
            &admin,
            sample_create_request("Harbour Steps", true),
        )
        .await
        .expect("place should be created")
        .id;

        let review = ReviewService::create_review(
            pool,
            &limiter,
            author,
            place_id,
            ReviewRequest {
                title: None,
                content: "Great spot to watch the ferries.".to_string(),
            },
        )
        .await
        .expect("review should be stored");

        if !is_available {
            sqlx::query("UPDATE places SET is_available = false WHERE id = $1")
                .bind(place_id)
                .execute(pool)
                .await
                .expect("place should be hidden");
        }
        (place_id, review.id)
    }

    async fn vote_rows(pool: &PgPool, review_id: Uuid) -> Vec<(Uuid, bool)> {
        sqlx::query_as("SELECT user_id, is_helpful FROM review_votes WHERE review_id = $1")
            .bind(review_id)
            .fetch_all(pool)
            .await
            .expect("votes should be readable")
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_author_cannot_vote_on_own_review(pool: PgPool) {
        let author = Identity::user(Uuid::new_v4());
        let (_, review_id) = seed_review(&pool, &author, true).await;
        let limiter = SubmissionLimiter::per_minute(100);

        let result = VoteService::cast_vote(&pool, &limiter, &author, review_id, true).await;
        assert!(matches!(result, Err(PlacesError::SelfVote)));
        assert!(vote_rows(&pool, review_id).await.is_empty());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_revote_overwrites_previous_vote(pool: PgPool) {
        let author = Identity::user(Uuid::new_v4());
        let voter = Identity::user(Uuid::new_v4());
        let (_, review_id) = seed_review(&pool, &author, true).await;
        let limiter = SubmissionLimiter::per_minute(100);

        VoteService::cast_vote(&pool, &limiter, &voter, review_id, true)
            .await
            .expect("first vote should be stored");
        let second = VoteService::cast_vote(&pool, &limiter, &voter, review_id, false)
            .await
            .expect("second vote should be stored");

        assert_eq!(vote_rows(&pool, review_id).await, vec![(voter.user_id, false)]);
        assert_eq!(second.tally.helpful, 0);
        assert_eq!(second.tally.unhelpful, 1);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_public_tally_hides_unavailable_places(pool: PgPool) {
        let author = Identity::user(Uuid::new_v4());
        let (_, hidden_review) = seed_review(&pool, &author, false).await;
        let (_, open_review) = seed_review(&pool, &author, true).await;

        assert!(matches!(
            VoteService::public_tally(&pool, hidden_review).await,
            Err(PlacesError::NotFound(_))
        ));

        let tally = VoteService::public_tally(&pool, open_review)
            .await
            .expect("available place has a tally");
        assert_eq!((tally.helpful, tally.unhelpful), (0, 0));
    }
}
