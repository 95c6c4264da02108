// src/handlers/admin.rs
// DOCUMENTATION: Admin handlers for places, galleries and review moderation
// PURPOSE: Expose back-office operations via REST endpoints
//
// Every handler takes an AdminIdentity, so requests without a valid
// X-User-Role: admin + X-Admin-Token pair never reach a service.

use crate::auth::AdminIdentity;
use crate::config::Config;
use crate::errors::PlacesError;
use crate::models::{
    AdminReviewQuery, CreateImageRequest, CreatePlaceRequest, MutationResponse, PlaceListQuery,
    UpdateImageRequest, UpdatePlaceRequest, UploadImageQuery,
};
use crate::services::{BlobStorage, DashboardService, ImageService, PlaceService, ReviewService};
use actix_web::{web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

/// GET /admin/dashboard
pub async fn dashboard(
    pool: web::Data<PgPool>,
    admin: AdminIdentity,
) -> Result<impl Responder, PlacesError> {
    let stats = DashboardService::dashboard(pool.get_ref(), &admin.0).await?;
    Ok(HttpResponse::Ok().json(stats))
}

// ---- places ----

/// GET /admin/places
/// Every place, including unavailable ones
pub async fn list_places(
    pool: web::Data<PgPool>,
    admin: AdminIdentity,
    query: web::Query<PlaceListQuery>,
) -> Result<impl Responder, PlacesError> {
    let result = PlaceService::list_all_places(pool.get_ref(), &admin.0, query.into_inner()).await?;
    Ok(HttpResponse::Ok().json(result))
}

/// POST /admin/places
pub async fn create_place(
    pool: web::Data<PgPool>,
    admin: AdminIdentity,
    req: web::Json<CreatePlaceRequest>,
) -> Result<impl Responder, PlacesError> {
    let place = PlaceService::create_place(pool.get_ref(), &admin.0, req.into_inner()).await?;
    log::info!("Place created: {} ({})", place.title, place.slug);
    Ok(HttpResponse::Created().json(MutationResponse::ok("Place created", place)))
}

/// PUT /admin/places/{id}
pub async fn update_place(
    pool: web::Data<PgPool>,
    storage: web::Data<BlobStorage>,
    admin: AdminIdentity,
    path: web::Path<Uuid>,
    req: web::Json<UpdatePlaceRequest>,
) -> Result<impl Responder, PlacesError> {
    let update = PlaceService::update_place(
        pool.get_ref(),
        storage.get_ref(),
        &admin.0,
        path.into_inner(),
        req.into_inner(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(MutationResponse::ok("Place updated", update)))
}

/// DELETE /admin/places/{id}
/// Removes the place with its images, ratings, reviews and votes
pub async fn delete_place(
    pool: web::Data<PgPool>,
    storage: web::Data<BlobStorage>,
    admin: AdminIdentity,
    path: web::Path<Uuid>,
) -> Result<impl Responder, PlacesError> {
    let report =
        PlaceService::delete_place(pool.get_ref(), storage.get_ref(), &admin.0, path.into_inner())
            .await?;
    Ok(HttpResponse::Ok().json(MutationResponse::ok(report.summary("Place"), report)))
}

// ---- images ----

/// GET /admin/places/{id}/images
pub async fn list_images(
    pool: web::Data<PgPool>,
    admin: AdminIdentity,
    path: web::Path<Uuid>,
) -> Result<impl Responder, PlacesError> {
    let images = ImageService::list_images(pool.get_ref(), &admin.0, path.into_inner()).await?;
    let images: Vec<_> = images.iter().map(|i| i.to_response()).collect();
    Ok(HttpResponse::Ok().json(json!({ "images": images })))
}

/// POST /admin/places/{id}/images
/// Attach an image whose file is already in storage
pub async fn create_image(
    pool: web::Data<PgPool>,
    admin: AdminIdentity,
    path: web::Path<Uuid>,
    req: web::Json<CreateImageRequest>,
) -> Result<impl Responder, PlacesError> {
    let image =
        ImageService::create_image(pool.get_ref(), &admin.0, path.into_inner(), req.into_inner())
            .await?;
    Ok(HttpResponse::Created().json(MutationResponse::ok("Image added", image.to_response())))
}

/// POST /admin/places/{id}/images/upload?filename=...
/// Raw request body is the file content
pub async fn upload_image(
    pool: web::Data<PgPool>,
    storage: web::Data<BlobStorage>,
    config: web::Data<Config>,
    admin: AdminIdentity,
    path: web::Path<Uuid>,
    query: web::Query<UploadImageQuery>,
    body: web::Bytes,
) -> Result<impl Responder, PlacesError> {
    if body.len() > config.max_upload_bytes {
        return Err(PlacesError::invalid_field(
            "file",
            format!("must not exceed {} bytes", config.max_upload_bytes),
        ));
    }

    let image = ImageService::upload_image(
        pool.get_ref(),
        storage.get_ref(),
        &admin.0,
        path.into_inner(),
        query.into_inner(),
        &body,
    )
    .await?;
    Ok(HttpResponse::Created().json(MutationResponse::ok("Image uploaded", image.to_response())))
}

/// PUT /admin/places/{id}/images/{image_id}
pub async fn update_image(
    pool: web::Data<PgPool>,
    storage: web::Data<BlobStorage>,
    admin: AdminIdentity,
    path: web::Path<(Uuid, Uuid)>,
    req: web::Json<UpdateImageRequest>,
) -> Result<impl Responder, PlacesError> {
    let (place_id, image_id) = path.into_inner();
    let update = ImageService::update_image(
        pool.get_ref(),
        storage.get_ref(),
        &admin.0,
        place_id,
        image_id,
        req.into_inner(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(MutationResponse::ok(
        "Image updated",
        json!({
            "image": update.image.to_response(),
            "storage_failures": update.storage_failures,
        }),
    )))
}

/// POST /admin/places/{id}/images/{image_id}/main
pub async fn set_main_image(
    pool: web::Data<PgPool>,
    admin: AdminIdentity,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<impl Responder, PlacesError> {
    let (place_id, image_id) = path.into_inner();
    let image = ImageService::set_main_image(pool.get_ref(), &admin.0, place_id, image_id).await?;
    Ok(HttpResponse::Ok().json(MutationResponse::ok("Main image set", image.to_response())))
}

/// DELETE /admin/places/{id}/images/{image_id}
pub async fn delete_image(
    pool: web::Data<PgPool>,
    storage: web::Data<BlobStorage>,
    admin: AdminIdentity,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<impl Responder, PlacesError> {
    let (place_id, image_id) = path.into_inner();
    let report =
        ImageService::delete_image(pool.get_ref(), storage.get_ref(), &admin.0, place_id, image_id)
            .await?;
    Ok(HttpResponse::Ok().json(MutationResponse::ok(report.summary("Image"), report)))
}

// ---- review moderation ----

/// GET /admin/reviews?status=pending&place_id=...&q=...
pub async fn list_reviews(
    pool: web::Data<PgPool>,
    admin: AdminIdentity,
    query: web::Query<AdminReviewQuery>,
) -> Result<impl Responder, PlacesError> {
    let reviews = ReviewService::list_for_admin(pool.get_ref(), &admin.0, &query).await?;
    Ok(HttpResponse::Ok().json(reviews))
}

/// POST /admin/reviews/{id}/approve
pub async fn approve_review(
    pool: web::Data<PgPool>,
    admin: AdminIdentity,
    path: web::Path<Uuid>,
) -> Result<impl Responder, PlacesError> {
    let review = ReviewService::approve_review(pool.get_ref(), &admin.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MutationResponse::ok("Review approved", review.to_own_response())))
}

/// POST /admin/reviews/{id}/disapprove
pub async fn disapprove_review(
    pool: web::Data<PgPool>,
    admin: AdminIdentity,
    path: web::Path<Uuid>,
) -> Result<impl Responder, PlacesError> {
    let review =
        ReviewService::disapprove_review(pool.get_ref(), &admin.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MutationResponse::ok(
        "Review returned to pending",
        review.to_own_response(),
    )))
}

/// DELETE /admin/reviews/{id}
pub async fn delete_review(
    pool: web::Data<PgPool>,
    admin: AdminIdentity,
    path: web::Path<Uuid>,
) -> Result<impl Responder, PlacesError> {
    let votes = ReviewService::delete_review(pool.get_ref(), &admin.0, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(MutationResponse::ok(
        "Review deleted",
        json!({ "votes_deleted": votes }),
    )))
}

/// Configuration for admin routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/dashboard", web::get().to(dashboard))
            .service(
                web::resource("/places")
                    .route(web::get().to(list_places))
                    .route(web::post().to(create_place)),
            )
            .service(
                web::resource("/places/{id}")
                    .route(web::put().to(update_place))
                    .route(web::delete().to(delete_place)),
            )
            .service(
                web::resource("/places/{id}/images")
                    .route(web::get().to(list_images))
                    .route(web::post().to(create_image)),
            )
            .route("/places/{id}/images/upload", web::post().to(upload_image))
            .service(
                web::resource("/places/{id}/images/{image_id}")
                    .route(web::put().to(update_image))
                    .route(web::delete().to(delete_image)),
            )
            .route(
                "/places/{id}/images/{image_id}/main",
                web::post().to(set_main_image),
            )
            .route("/reviews", web::get().to(list_reviews))
            .route("/reviews/{id}/approve", web::post().to(approve_review))
            .route("/reviews/{id}/disapprove", web::post().to(disapprove_review))
            .route("/reviews/{id}", web::delete().to(delete_review)),
    );
}
