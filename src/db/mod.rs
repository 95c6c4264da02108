// src/db/mod.rs
// DOCUMENTATION: Database module organization
// PURPOSE: Re-export database components

pub mod dashboard_repository;
pub mod image_repository;
pub mod place_repository;
pub mod rating_repository;
pub mod review_repository;
pub mod vote_repository;

pub use dashboard_repository::*;
pub use image_repository::*;
pub use place_repository::*;
pub use rating_repository::*;
pub use review_repository::*;
pub use vote_repository::*;

use crate::errors::PlacesError;

/// Log a failed query and turn it into a DatabaseError
pub(crate) fn db_error(context: &'static str) -> impl Fn(sqlx::Error) -> PlacesError {
    move |e| {
        log::error!("{}: {}", context, e);
        PlacesError::DatabaseError(format!("{}: {}", context, e))
    }
}

/// `%text%` pattern for ILIKE with the wildcard characters of `text` escaped
pub(crate) fn contains_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for ch in text.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("harbour"), "%harbour%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("c:\\x"), "%c:\\\\x%");
    }
}
