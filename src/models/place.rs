// src/models/place.rs
// DOCUMENTATION: Core data structures for places
// PURPOSE: Defines all serialization/deserialization models for API and database

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::{PlaceImageResponse, RatingStats};

/// Represents a complete place record from the database
/// DOCUMENTATION: This struct maps directly to the places table in PostgreSQL
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Place {
    /// Unique identifier (UUID v4)
    pub id: Uuid,

    /// Display title - required field for all places
    pub title: String,

    /// URL-safe unique identifier derived from the title
    pub slug: String,

    /// One-line teaser shown in listings
    pub short_description: Option<String>,

    /// Long-form description
    pub description: Option<String>,

    /// Stored path of the listing thumbnail
    pub thumbnail_path: Option<String>,

    /// Stored path of the 360° panorama
    pub panorama_path: Option<String>,

    /// Hidden from the public surface when false
    pub is_available: bool,

    /// Ascending display order
    pub sort_order: i32,

    /// When record was created
    pub created_at: DateTime<Utc>,

    /// When record was last modified
    pub updated_at: DateTime<Utc>,
}

/// Place row enriched with listing aggregates
#[derive(Debug, Clone, FromRow)]
pub struct PlaceSummaryRow {
    #[sqlx(flatten)]
    pub place: Place,
    pub main_image_path: Option<String>,
    pub average_rating: f64,
    pub rating_count: i64,
}

/// Request DTO for creating a new place
/// DOCUMENTATION: Data transfer object for POST /admin/places
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct CreatePlaceRequest {
    /// Place title (required)
    #[validate(length(min = 1, max = 255))]
    pub title: String,

    /// Optional explicit slug; derived from the title when absent
    #[validate(length(max = 255))]
    pub slug: Option<String>,

    #[validate(length(max = 500))]
    pub short_description: Option<String>,

    pub description: Option<String>,

    #[validate(length(max = 512))]
    pub thumbnail_path: Option<String>,

    #[validate(length(max = 512))]
    pub panorama_path: Option<String>,

    #[serde(default)]
    pub is_available: Option<bool>,

    #[serde(default)]
    pub sort_order: Option<i32>,
}

/// Request DTO for updating an existing place
/// DOCUMENTATION: All fields are optional - only provided fields are updated.
/// A blank slug asks for the slug to be regenerated from the title.
#[derive(Debug, Default, Serialize, Deserialize, Validate)]
pub struct UpdatePlaceRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,

    #[validate(length(max = 255))]
    pub slug: Option<String>,

    #[validate(length(max = 500))]
    pub short_description: Option<String>,

    pub description: Option<String>,

    #[validate(length(max = 512))]
    pub thumbnail_path: Option<String>,

    #[validate(length(max = 512))]
    pub panorama_path: Option<String>,

    pub is_available: Option<bool>,

    pub sort_order: Option<i32>,
}

/// Place fields after the pre-insert normalization step
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedPlace {
    pub title: String,
    pub slug: String,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub thumbnail_path: Option<String>,
    pub panorama_path: Option<String>,
    pub is_available: bool,
    pub sort_order: i32,
}

/// Public and admin list filters
#[derive(Debug, Default, Deserialize)]
pub struct PlaceListQuery {
    /// Free-text filter over title and descriptions
    pub q: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Response DTO for API responses
#[derive(Debug, Serialize)]
pub struct PlaceResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub short_description: Option<String>,
    pub description: Option<String>,
    pub thumbnail_path: Option<String>,
    pub panorama_path: Option<String>,
    pub is_available: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Listing entry with cover image and rating summary
#[derive(Debug, Serialize)]
pub struct PlaceSummaryResponse {
    #[serde(flatten)]
    pub place: PlaceResponse,
    pub main_image_path: Option<String>,
    pub average_rating: f64,
    pub rating_count: i64,
}

/// Detailed response DTO
/// DOCUMENTATION: Used for GET /places/{slug} endpoint
#[derive(Debug, Serialize)]
pub struct PlaceDetailResponse {
    #[serde(flatten)]
    pub place: PlaceResponse,
    pub images: Vec<PlaceImageResponse>,
    pub rating: RatingStats,
}

impl Place {
    /// Convert Place to PlaceResponse for API
    pub fn to_response(&self) -> PlaceResponse {
        PlaceResponse {
            id: self.id,
            title: self.title.clone(),
            slug: self.slug.clone(),
            short_description: self.short_description.clone(),
            description: self.description.clone(),
            thumbnail_path: self.thumbnail_path.clone(),
            panorama_path: self.panorama_path.clone(),
            is_available: self.is_available,
            sort_order: self.sort_order,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Stored files owned directly by the place record
    pub fn stored_paths(&self) -> Vec<String> {
        [&self.thumbnail_path, &self.panorama_path]
            .into_iter()
            .flatten()
            .cloned()
            .collect()
    }
}

impl PlaceSummaryRow {
    pub fn to_response(&self) -> PlaceSummaryResponse {
        PlaceSummaryResponse {
            place: self.place.to_response(),
            main_image_path: self.main_image_path.clone(),
            average_rating: self.average_rating,
            rating_count: self.rating_count,
        }
    }
}

/// Derive a URL-safe slug from free text
/// DOCUMENTATION: lower-case ASCII alphanumerics; every other run of characters
/// becomes a single '-'
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        "place".to_string()
    } else {
        slug
    }
}

/// Column width of places.slug
pub const MAX_SLUG_LEN: usize = 255;

/// Slug candidate for the n-th collision (n starts at 2), never longer than MAX_SLUG_LEN
pub fn slug_candidate(base: &str, attempt: u32) -> String {
    let suffix = if attempt <= 1 {
        String::new()
    } else {
        format!("-{}", attempt)
    };

    // slugs are ASCII, so byte and char lengths agree
    let keep = MAX_SLUG_LEN.saturating_sub(suffix.len()).min(base.len());
    let stem = base[..keep].trim_end_matches('-');
    format!("{}{}", stem, suffix)
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(|s| s.trim()).filter(|s| !s.is_empty())
}

impl CreatePlaceRequest {
    /// Pre-insert normalization: trims the title and fills in the slug
    pub fn normalize(self) -> NormalizedPlace {
        let title = self.title.trim().to_string();
        let slug = match non_blank(self.slug.as_ref()) {
            Some(explicit) => slugify(explicit),
            None => slugify(&title),
        };

        NormalizedPlace {
            title,
            slug,
            short_description: self.short_description,
            description: self.description,
            thumbnail_path: self.thumbnail_path,
            panorama_path: self.panorama_path,
            is_available: self.is_available.unwrap_or(true),
            sort_order: self.sort_order.unwrap_or(0),
        }
    }
}

impl UpdatePlaceRequest {
    /// Apply the partial update on top of the current record
    pub fn normalize_onto(self, current: &Place) -> NormalizedPlace {
        let title = self
            .title
            .as_deref()
            .map(|t| t.trim().to_string())
            .unwrap_or_else(|| current.title.clone());

        let slug = match &self.slug {
            None => current.slug.clone(),
            Some(s) => match non_blank(Some(s)) {
                Some(explicit) => slugify(explicit),
                None => slugify(&title),
            },
        };

        NormalizedPlace {
            title,
            slug,
            short_description: self.short_description.or_else(|| current.short_description.clone()),
            description: self.description.or_else(|| current.description.clone()),
            thumbnail_path: self.thumbnail_path.or_else(|| current.thumbnail_path.clone()),
            panorama_path: self.panorama_path.or_else(|| current.panorama_path.clone()),
            is_available: self.is_available.unwrap_or(current.is_available),
            sort_order: self.sort_order.unwrap_or(current.sort_order),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_place() -> Place {
    Place {
        id: Uuid::new_v4(),
        title: "Old Harbour".to_string(),
        slug: "old-harbour".to_string(),
        short_description: None,
        description: Some("Fishing boats and a lighthouse".to_string()),
        thumbnail_path: Some("/storage/places/thumb.jpg".to_string()),
        panorama_path: Some("/storage/panoramas/harbour.jpg".to_string()),
        is_available: true,
        sort_order: 3,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[cfg(test)]
pub(crate) fn sample_create_request(title: &str, is_available: bool) -> CreatePlaceRequest {
    CreatePlaceRequest {
        title: title.to_string(),
        slug: None,
        short_description: None,
        description: None,
        thumbnail_path: None,
        panorama_path: None,
        is_available: Some(is_available),
        sort_order: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_request(title: &str, slug: Option<&str>) -> CreatePlaceRequest {
        CreatePlaceRequest {
            title: title.to_string(),
            slug: slug.map(str::to_string),
            short_description: None,
            description: None,
            thumbnail_path: None,
            panorama_path: None,
            is_available: None,
            sort_order: None,
        }
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Old Town Square"), "old-town-square");
        assert_eq!(slugify("  Café & Bar -- No.5!  "), "caf-bar-no-5");
        assert_eq!(slugify("???"), "place");
        assert_eq!(slugify("already-a-slug"), "already-a-slug");
    }

    #[test]
    fn test_slug_candidates() {
        assert_eq!(slug_candidate("castle", 1), "castle");
        assert_eq!(slug_candidate("castle", 2), "castle-2");
        assert_eq!(slug_candidate("castle", 7), "castle-7");
    }

    #[test]
    fn test_slug_candidates_fit_the_column() {
        let base = slugify(&"a".repeat(MAX_SLUG_LEN));
        assert_eq!(base.len(), MAX_SLUG_LEN);

        assert_eq!(slug_candidate(&base, 1).len(), MAX_SLUG_LEN);
        let second = slug_candidate(&base, 2);
        assert_eq!(second.len(), MAX_SLUG_LEN);
        assert!(second.ends_with("a-2"));
        assert!(slug_candidate(&base, 100).len() <= MAX_SLUG_LEN);

        // a cut landing right after a dash does not leave a double dash
        let dashed = format!("{}-b", "a".repeat(MAX_SLUG_LEN - 3));
        assert_eq!(
            slug_candidate(&dashed, 2),
            format!("{}-2", "a".repeat(MAX_SLUG_LEN - 3))
        );
    }

    #[test]
    fn test_create_derives_slug_from_title_when_absent() {
        let normalized = create_request(" Royal Gardens ", None).normalize();
        assert_eq!(normalized.title, "Royal Gardens");
        assert_eq!(normalized.slug, "royal-gardens");
        assert!(normalized.is_available);
        assert_eq!(normalized.sort_order, 0);

        let blank = create_request("Royal Gardens", Some("   ")).normalize();
        assert_eq!(blank.slug, "royal-gardens");
    }

    #[test]
    fn test_create_normalizes_explicit_slug() {
        let normalized = create_request("Royal Gardens", Some("The Gardens")).normalize();
        assert_eq!(normalized.slug, "the-gardens");
    }

    #[test]
    fn test_update_keeps_slug_unless_asked() {
        let current = sample_place();

        let renamed = UpdatePlaceRequest {
            title: Some("New Harbour".to_string()),
            ..Default::default()
        }
        .normalize_onto(&current);
        assert_eq!(renamed.title, "New Harbour");
        assert_eq!(renamed.slug, "old-harbour");
        assert_eq!(renamed.thumbnail_path, current.thumbnail_path);
        assert_eq!(renamed.sort_order, 3);

        let regenerated = UpdatePlaceRequest {
            title: Some("New Harbour".to_string()),
            slug: Some(String::new()),
            ..Default::default()
        }
        .normalize_onto(&current);
        assert_eq!(regenerated.slug, "new-harbour");
    }

    #[test]
    fn test_stored_paths() {
        let mut place = sample_place();
        assert_eq!(place.stored_paths().len(), 2);
        place.thumbnail_path = None;
        assert_eq!(place.stored_paths(), vec!["/storage/panoramas/harbour.jpg".to_string()]);
    }
}
