// src/handlers/places.rs
// DOCUMENTATION: Public HTTP handlers for places
// PURPOSE: Parse requests, call services, return responses

use crate::errors::PlacesError;
use crate::models::PlaceListQuery;
use crate::services::PlaceService;
use actix_web::{web, HttpResponse, Responder};
use sqlx::PgPool;

/// GET /places
/// List available places with cover image and rating summary
pub async fn list_places(
    pool: web::Data<PgPool>,
    query: web::Query<PlaceListQuery>,
) -> Result<impl Responder, PlacesError> {
    let result = PlaceService::list_places(pool.get_ref(), query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// GET /places/{slug}
/// Place page: details, active images and rating stats
pub async fn get_place(
    pool: web::Data<PgPool>,
    path: web::Path<String>,
) -> Result<impl Responder, PlacesError> {
    let slug = path.into_inner();
    let place = PlaceService::get_place_by_slug(pool.get_ref(), &slug).await?;
    Ok(HttpResponse::Ok().json(place))
}

/// Configuration for place routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/places", web::get().to(list_places))
        .route("/places/{slug}", web::get().to(get_place));
}
