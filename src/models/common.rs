// src/models/common.rs
// DOCUMENTATION: Response envelopes and pagination shared by every resource

use serde::{Deserialize, Serialize};

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;
/// Highest page whose offset and end still fit in an i64
const MAX_PAGE: i64 = i64::MAX / MAX_LIMIT;

/// Page/limit query parameters accepted by list endpoints
#[derive(Debug, Default, Clone, Deserialize)]
pub struct PageQuery {
    /// Page number (1-based)
    pub page: Option<i64>,
    /// Results per page (max 100)
    pub limit: Option<i64>,
}

/// Normalized pagination window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).clamp(1, MAX_PAGE),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Wrap one page of results with its metadata
    pub fn wrap<T>(&self, data: Vec<T>, total_count: i64) -> Paginated<T> {
        Paginated {
            data,
            total_count,
            page: self.page,
            limit: self.limit,
            has_more: total_count > self.page.saturating_mul(self.limit),
        }
    }
}

impl From<&PageQuery> for Pagination {
    fn from(query: &PageQuery) -> Self {
        Pagination::new(query.page, query.limit)
    }
}

/// Paginated list response
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    /// Array of results
    pub data: Vec<T>,

    /// Total number of matches (regardless of pagination)
    pub total_count: i64,

    /// Current page number
    pub page: i64,

    /// Results per page
    pub limit: i64,

    /// Whether more results exist on next page
    pub has_more: bool,
}

/// Envelope returned by every mutation endpoint
#[derive(Debug, Serialize)]
pub struct MutationResponse<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> MutationResponse<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl MutationResponse<()> {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data: None,
        }
    }
}

/// Outcome of deleting a record that owns stored files
/// DOCUMENTATION: The record is gone even when some files could not be removed;
/// those paths are listed in storage_failures
#[derive(Debug, Default, Serialize)]
pub struct DeletionReport {
    pub records_deleted: u64,
    pub files_deleted: usize,
    pub storage_failures: Vec<String>,
}

impl DeletionReport {
    pub fn summary(&self, subject: &str) -> String {
        if self.storage_failures.is_empty() {
            format!("{} deleted", subject)
        } else {
            format!(
                "{} deleted, but {} stored file(s) could not be removed",
                subject,
                self.storage_failures.len()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_defaults_and_clamps() {
        assert_eq!(Pagination::new(None, None), Pagination { page: 1, limit: 20 });
        assert_eq!(Pagination::new(Some(0), Some(500)), Pagination { page: 1, limit: 100 });
        assert_eq!(Pagination::new(Some(-3), Some(0)), Pagination { page: 1, limit: 1 });
        assert_eq!(Pagination::new(Some(3), Some(10)).offset(), 20);
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let pagination = Pagination::new(Some(i64::MAX), Some(100));
        assert_eq!(pagination.page, MAX_PAGE);
        assert!(pagination.offset() >= 0);
        assert!(!pagination.wrap(Vec::<i32>::new(), 10).has_more);

        let pagination = Pagination::new(Some(i64::MAX / 50), Some(100));
        assert!(pagination.offset() > 0);
        assert!(!pagination.wrap(Vec::<i32>::new(), 10).has_more);
    }

    #[test]
    fn test_wrap_reports_has_more() {
        let pagination = Pagination::new(Some(2), Some(10));
        assert!(pagination.wrap(vec![1; 10], 25).has_more);
        assert!(!pagination.wrap(vec![1; 10], 20).has_more);
    }

    #[test]
    fn test_deletion_summary_mentions_failures() {
        let mut report = DeletionReport::default();
        assert_eq!(report.summary("Image"), "Image deleted");

        report.storage_failures.push("/storage/places/a.jpg".to_string());
        assert_eq!(
            report.summary("Image"),
            "Image deleted, but 1 stored file(s) could not be removed"
        );
    }
}
