// src/models/image.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::errors::PlacesError;

/// Gallery image belonging to exactly one place
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PlaceImage {
    pub id: Uuid,
    pub place_id: Uuid,
    pub image_path: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_main: bool,
    pub is_active: bool,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to attach an already stored image to a place
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateImageRequest {
    #[validate(length(min = 1, max = 512))]
    pub image_path: String,
    #[validate(length(max = 255))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub is_main: Option<bool>,
    #[serde(default)]
    pub is_active: Option<bool>,
    #[serde(default)]
    pub sort_order: Option<i32>,
}

/// Query parameters accompanying a raw upload body
#[derive(Debug, Deserialize, Validate)]
pub struct UploadImageQuery {
    #[validate(length(min = 1, max = 255))]
    pub filename: String,
    #[validate(length(max = 255))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_main: Option<bool>,
    pub sort_order: Option<i32>,
}

/// Partial image update - only provided fields change
#[derive(Debug, Default, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateImageRequest {
    #[validate(length(min = 1, max = 512))]
    pub image_path: Option<String>,
    #[validate(length(max = 255))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_main: Option<bool>,
    pub is_active: Option<bool>,
    pub sort_order: Option<i32>,
}

/// Image DTO for API responses
#[derive(Debug, Clone, Serialize)]
pub struct PlaceImageResponse {
    pub id: Uuid,
    pub image_path: String,
    pub title: Option<String>,
    pub description: Option<String>,
    pub is_main: bool,
    pub is_active: bool,
    pub sort_order: i32,
}

impl PlaceImage {
    /// Convert database image into API response DTO
    pub fn to_response(&self) -> PlaceImageResponse {
        PlaceImageResponse {
            id: self.id,
            image_path: self.image_path.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            is_main: self.is_main,
            is_active: self.is_active,
            sort_order: self.sort_order,
        }
    }

    /// An image addressed through the wrong place is treated as absent
    pub fn ensure_belongs_to(&self, place_id: Uuid) -> Result<(), PlacesError> {
        if self.place_id != place_id {
            return Err(PlacesError::NotFound(format!(
                "Image {} does not belong to place {}",
                self.id, place_id
            )));
        }
        Ok(())
    }
}

impl UploadImageQuery {
    pub fn into_create_request(self, image_path: String) -> CreateImageRequest {
        CreateImageRequest {
            image_path,
            title: self.title,
            description: self.description,
            is_main: self.is_main,
            is_active: Some(true),
            sort_order: self.sort_order,
        }
    }
}

impl UpdateImageRequest {
    /// Path of the file this update replaces, if any
    pub fn replaced_path<'a>(&self, current: &'a PlaceImage) -> Option<&'a str> {
        match &self.image_path {
            Some(new_path) if new_path != &current.image_path => Some(current.image_path.as_str()),
            _ => None,
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_image(place_id: Uuid, is_main: bool) -> PlaceImage {
    PlaceImage {
        id: Uuid::new_v4(),
        place_id,
        image_path: "/storage/places/a.jpg".to_string(),
        title: None,
        description: None,
        is_main,
        is_active: true,
        sort_order: 0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}
