// src/services/dashboard_service.rs

use crate::auth::Identity;
use crate::db::{DashboardRepository, RatingRepository};
use crate::errors::PlacesError;
use crate::models::{DashboardStats, RatingStats};
use sqlx::PgPool;

const TOP_PLACES: i64 = 5;

pub struct DashboardService;

impl DashboardService {
    /// Site-wide numbers for the admin landing page
    pub async fn dashboard(pool: &PgPool, identity: &Identity) -> Result<DashboardStats, PlacesError> {
        identity.require_admin()?;

        let total_places = DashboardRepository::count_places(pool).await?;
        let (total_reviews, pending_reviews) = DashboardRepository::count_reviews(pool).await?;
        let ratings = RatingStats::from_buckets(&RatingRepository::buckets_all(pool).await?);
        let top_places = DashboardRepository::top_rated(pool, TOP_PLACES).await?;

        Ok(DashboardStats::assemble(
            total_places,
            total_reviews,
            pending_reviews,
            ratings,
            top_places,
        ))
    }
}
