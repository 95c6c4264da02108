// src/models/dashboard.rs

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::RatingStats;

/// Highly rated place for the admin dashboard
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TopPlace {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub average_rating: f64,
    pub rating_count: i64,
}

/// Aggregate numbers shown on the admin dashboard
#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_places: i64,
    pub total_reviews: i64,
    pub pending_reviews: i64,
    /// Mean over every rating of every place (0 when none exist)
    pub average_rating: f64,
    pub total_ratings: i64,
    pub top_places: Vec<TopPlace>,
    /// Histogram across all places, buckets 1..=5
    pub rating_histogram: std::collections::BTreeMap<i16, i64>,
}

impl DashboardStats {
    pub fn assemble(
        total_places: i64,
        total_reviews: i64,
        pending_reviews: i64,
        ratings: RatingStats,
        top_places: Vec<TopPlace>,
    ) -> Self {
        Self {
            total_places,
            total_reviews,
            pending_reviews,
            average_rating: ratings.average,
            total_ratings: ratings.total,
            top_places,
            rating_histogram: ratings.distribution,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_on_empty_data_is_zeroed() {
        let stats = DashboardStats::assemble(0, 0, 0, RatingStats::empty(), Vec::new());

        assert_eq!(stats.average_rating, 0.0);
        assert_eq!(stats.total_ratings, 0);
        assert_eq!(stats.rating_histogram.len(), 5);
        assert!(stats.top_places.is_empty());
    }

    #[test]
    fn test_assemble_uses_global_histogram() {
        let ratings = RatingStats::from_buckets(&[(4, 3), (2, 1)]);
        let stats = DashboardStats::assemble(2, 5, 1, ratings, Vec::new());

        assert_eq!(stats.average_rating, 3.5);
        assert_eq!(stats.rating_histogram[&4], 3);
        assert_eq!(stats.rating_histogram[&5], 0);
        assert_eq!(stats.pending_reviews, 1);
    }
}
