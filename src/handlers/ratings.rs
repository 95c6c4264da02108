// src/handlers/ratings.rs
// DOCUMENTATION: HTTP handlers for star ratings

use crate::auth::Identity;
use crate::errors::PlacesError;
use crate::models::{MutationResponse, SubmitRatingRequest};
use crate::services::{RatingService, SubmissionLimiter};
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// GET /places/{id}/rating
pub async fn rating_stats(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> Result<impl Responder, PlacesError> {
    let stats = RatingService::place_stats(pool.get_ref(), path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(stats))
}

/// PUT /places/{id}/rating
pub async fn submit_rating(
    pool: web::Data<PgPool>,
    limiter: web::Data<SubmissionLimiter>,
    identity: Identity,
    path: web::Path<Uuid>,
    req: web::Json<SubmitRatingRequest>,
) -> Result<impl Responder, PlacesError> {
    req.validate()?;

    let submission = RatingService::upsert_rating(
        pool.get_ref(),
        limiter.get_ref(),
        &identity,
        path.into_inner(),
        req.value,
    )
    .await?;

    Ok(HttpResponse::Ok().json(MutationResponse::ok("Rating saved", submission)))
}

/// DELETE /places/{id}/rating
pub async fn remove_rating(
    pool: web::Data<PgPool>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> Result<impl Responder, PlacesError> {
    let removal = RatingService::remove_rating(pool.get_ref(), &identity, path.into_inner()).await?;
    let message = if removal.removed {
        "Rating removed"
    } else {
        "No rating to remove"
    };
    Ok(HttpResponse::Ok().json(MutationResponse::ok(message, removal)))
}

/// GET /places/{id}/rating/me
pub async fn my_rating(
    pool: web::Data<PgPool>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> Result<impl Responder, PlacesError> {
    let rating = RatingService::user_rating(pool.get_ref(), &identity, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(rating))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/places/{id}/rating")
            .route(web::get().to(rating_stats))
            .route(web::put().to(submit_rating))
            .route(web::delete().to(remove_rating)),
    )
    .route("/places/{id}/rating/me", web::get().to(my_rating));
}
