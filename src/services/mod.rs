// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod blob_storage;
pub mod dashboard_service;
pub mod image_service;
pub mod place_service;
pub mod rate_limiter;
pub mod rating_service;
pub mod review_service;
pub mod vote_service;

pub use blob_storage::*;
pub use dashboard_service::*;
pub use image_service::*;
pub use place_service::*;
pub use rate_limiter::*;
pub use rating_service::*;
pub use review_service::*;
pub use vote_service::*;
