// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod common;
pub mod dashboard;
pub mod image;
pub mod place;
pub mod rating;
pub mod review;
pub mod vote;

pub use common::*;
pub use dashboard::*;
pub use image::*;
pub use place::*;
pub use rating::*;
pub use review::*;
pub use vote::*;
