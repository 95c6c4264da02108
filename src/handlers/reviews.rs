// src/handlers/reviews.rs
// DOCUMENTATION: HTTP handlers for visitor reviews and helpful votes
// PURPOSE: Public listing plus author-side create/edit/delete and voting

use crate::auth::{Identity, MaybeIdentity};
use crate::errors::PlacesError;
use crate::models::{CastVoteRequest, MutationResponse, PageQuery, ReviewRequest};
use crate::services::{ReviewService, SubmissionLimiter, VoteService};
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

/// GET /places/{id}/reviews
/// Approved reviews, newest first, with vote counts
pub async fn list_reviews(
    pool: web::Data<PgPool>,
    viewer: MaybeIdentity,
    path: web::Path<Uuid>,
    query: web::Query<PageQuery>,
) -> Result<impl Responder, PlacesError> {
    let reviews = ReviewService::list_approved(
        pool.get_ref(),
        path.into_inner(),
        &query,
        viewer.user_id(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(reviews))
}

/// POST /places/{id}/reviews
pub async fn create_review(
    pool: web::Data<PgPool>,
    limiter: web::Data<SubmissionLimiter>,
    identity: Identity,
    path: web::Path<Uuid>,
    req: web::Json<ReviewRequest>,
) -> Result<impl Responder, PlacesError> {
    let review = ReviewService::create_review(
        pool.get_ref(),
        limiter.get_ref(),
        &identity,
        path.into_inner(),
        req.into_inner(),
    )
    .await?;

    Ok(HttpResponse::Created().json(MutationResponse::ok(
        "Review submitted and awaiting moderation",
        review.to_own_response(),
    )))
}

/// GET /places/{id}/reviews/me
pub async fn my_review(
    pool: web::Data<PgPool>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> Result<impl Responder, PlacesError> {
    let review = ReviewService::user_review(pool.get_ref(), &identity, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "review": review })))
}

/// PUT /reviews/{id}
pub async fn edit_review(
    pool: web::Data<PgPool>,
    limiter: web::Data<SubmissionLimiter>,
    identity: Identity,
    path: web::Path<Uuid>,
    req: web::Json<ReviewRequest>,
) -> Result<impl Responder, PlacesError> {
    let review = ReviewService::edit_review(
        pool.get_ref(),
        limiter.get_ref(),
        &identity,
        path.into_inner(),
        req.into_inner(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(MutationResponse::ok(
        "Review updated and awaiting moderation",
        review.to_own_response(),
    )))
}

/// DELETE /reviews/{id}
pub async fn delete_review(
    pool: web::Data<PgPool>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> Result<impl Responder, PlacesError> {
    ReviewService::delete_review(pool.get_ref(), &identity, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MutationResponse::message("Review deleted")))
}

/// GET /reviews/{id}/votes
pub async fn vote_tally(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, PlacesError> {
    let tally = VoteService::public_tally(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(tally))
}

/// PUT /reviews/{id}/votes
pub async fn cast_vote(
    pool: web::Data<PgPool>,
    limiter: web::Data<SubmissionLimiter>,
    identity: Identity,
    path: web::Path<Uuid>,
    req: web::Json<CastVoteRequest>,
) -> Result<impl Responder, PlacesError> {
    let submission = VoteService::cast_vote(
        pool.get_ref(),
        limiter.get_ref(),
        &identity,
        path.into_inner(),
        req.is_helpful,
    )
    .await?;

    Ok(HttpResponse::Ok().json(MutationResponse::ok("Vote recorded", submission)))
}

/// DELETE /reviews/{id}/votes
pub async fn remove_vote(
    pool: web::Data<PgPool>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> Result<impl Responder, PlacesError> {
    let removal = VoteService::remove_vote(pool.get_ref(), &identity, path.into_inner()).await?;
    let message = if removal.removed {
        "Vote removed"
    } else {
        "No vote to remove"
    };
    Ok(HttpResponse::Ok().json(MutationResponse::ok(message, removal)))
}

/// GET /places/{id}/votes/me
pub async fn my_votes(
    pool: web::Data<PgPool>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> Result<impl Responder, PlacesError> {
    let votes = VoteService::user_votes(pool.get_ref(), &identity, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(votes))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/places/{id}/reviews")
            .route(web::get().to(list_reviews))
            .route(web::post().to(create_review)),
    )
    .route("/places/{id}/reviews/me", web::get().to(my_review))
    .route("/places/{id}/votes/me", web::get().to(my_votes))
    .service(
        web::resource("/reviews/{id}")
            .route(web::put().to(edit_review))
            .route(web::delete().to(delete_review)),
    )
    .service(
        web::resource("/reviews/{id}/votes")
            .route(web::get().to(vote_tally))
            .route(web::put().to(cast_vote))
            .route(web::delete().to(remove_vote)),
    );
}
