// src/models/review.rs
// DOCUMENTATION: Visitor reviews and their moderation state machine
// PURPOSE: pending -> approved (admin) ; approved -> pending (disapprove or edit)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use super::VoteTally;

/// Moderation state derived from is_approved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Approved,
}

/// Review row from the reviews table
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Review {
    pub id: Uuid,
    pub place_id: Uuid,
    pub user_id: Uuid,
    pub title: Option<String>,
    pub content: String,
    pub is_approved: bool,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    pub fn status(&self) -> ReviewStatus {
        if self.is_approved {
            ReviewStatus::Approved
        } else {
            ReviewStatus::Pending
        }
    }

    /// Owner edit: replaces text and always returns the review to moderation
    pub fn apply_edit(&mut self, title: Option<String>, content: String) {
        self.title = title;
        self.content = content;
        self.reset_to_pending();
    }

    pub fn approve(&mut self, admin_id: Uuid, at: DateTime<Utc>) {
        self.is_approved = true;
        self.approved_by = Some(admin_id);
        self.approved_at = Some(at);
    }

    pub fn disapprove(&mut self) {
        self.reset_to_pending();
    }

    fn reset_to_pending(&mut self) {
        self.is_approved = false;
        self.approved_by = None;
        self.approved_at = None;
    }
}

/// Body of POST /places/{id}/reviews and PUT /reviews/{id}
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReviewRequest {
    #[validate(length(max = 255))]
    pub title: Option<String>,
    #[validate(length(
        min = 10,
        max = 1000,
        message = "must be between 10 and 1000 characters"
    ))]
    pub content: String,
}

impl ReviewRequest {
    /// Trimmed title (blank becomes None) and trimmed content; validate after this
    pub fn normalized(self) -> Self {
        let title = self
            .title
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        Self {
            title,
            content: self.content.trim().to_string(),
        }
    }
}

/// Review joined with author, place and fresh vote counts
#[derive(Debug, Clone, FromRow)]
pub struct ReviewListRow {
    #[sqlx(flatten)]
    pub review: Review,
    pub author_name: Option<String>,
    pub place_title: String,
    pub helpful_count: i64,
    pub unhelpful_count: i64,
    pub viewer_vote: Option<bool>,
}

/// Public review listing entry
#[derive(Debug, Clone, Serialize)]
pub struct ReviewResponse {
    pub id: Uuid,
    pub place_id: Uuid,
    pub title: Option<String>,
    pub content: String,
    pub author_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub votes: VoteTally,
    /// The viewer's own vote, when the viewer is known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my_vote: Option<bool>,
}

/// Admin listing entry with moderation details
#[derive(Debug, Clone, Serialize)]
pub struct AdminReviewResponse {
    pub id: Uuid,
    pub place_id: Uuid,
    pub place_title: String,
    pub user_id: Uuid,
    pub author_name: Option<String>,
    pub title: Option<String>,
    pub content: String,
    pub status: ReviewStatus,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub votes: VoteTally,
}

/// Review as seen by its author (any status)
#[derive(Debug, Clone, Serialize)]
pub struct OwnReviewResponse {
    pub id: Uuid,
    pub place_id: Uuid,
    pub title: Option<String>,
    pub content: String,
    pub status: ReviewStatus,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin listing filters
#[derive(Debug, Default, Deserialize)]
pub struct AdminReviewQuery {
    pub status: Option<ReviewStatus>,
    pub place_id: Option<Uuid>,
    /// Free-text search over content, title and author name
    pub q: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

impl Review {
    pub fn to_own_response(&self) -> OwnReviewResponse {
        OwnReviewResponse {
            id: self.id,
            place_id: self.place_id,
            title: self.title.clone(),
            content: self.content.clone(),
            status: self.status(),
            approved_at: self.approved_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl ReviewListRow {
    fn votes(&self) -> VoteTally {
        VoteTally {
            helpful: self.helpful_count,
            unhelpful: self.unhelpful_count,
        }
    }

    pub fn to_response(&self) -> ReviewResponse {
        ReviewResponse {
            id: self.review.id,
            place_id: self.review.place_id,
            title: self.review.title.clone(),
            content: self.review.content.clone(),
            author_name: self.author_name.clone(),
            created_at: self.review.created_at,
            updated_at: self.review.updated_at,
            votes: self.votes(),
            my_vote: self.viewer_vote,
        }
    }

    pub fn to_admin_response(&self) -> AdminReviewResponse {
        AdminReviewResponse {
            id: self.review.id,
            place_id: self.review.place_id,
            place_title: self.place_title.clone(),
            user_id: self.review.user_id,
            author_name: self.author_name.clone(),
            title: self.review.title.clone(),
            content: self.review.content.clone(),
            status: self.review.status(),
            approved_at: self.review.approved_at,
            approved_by: self.review.approved_by,
            created_at: self.review.created_at,
            votes: self.votes(),
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_review(author: Uuid) -> Review {
    Review {
        id: Uuid::new_v4(),
        place_id: Uuid::new_v4(),
        user_id: author,
        title: Some("Worth the climb".to_string()),
        content: "The view from the tower is spectacular.".to_string(),
        is_approved: false,
        approved_at: None,
        approved_by: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use validator::Validate;

    #[test]
    fn test_new_review_is_pending() {
        let review = sample_review(Uuid::new_v4());
        assert_eq!(review.status(), ReviewStatus::Pending);
        assert!(review.approved_by.is_none());
        assert!(review.approved_at.is_none());
    }

    #[test]
    fn test_approve_then_edit_returns_to_pending() {
        let author = Uuid::new_v4();
        let admin = Uuid::new_v4();
        let approved_at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let mut review = sample_review(author);

        review.approve(admin, approved_at);
        assert_eq!(review.status(), ReviewStatus::Approved);
        assert_eq!(review.approved_by, Some(admin));
        assert_eq!(review.approved_at, Some(approved_at));

        review.apply_edit(None, "Rewritten after a second visit.".to_string());
        assert!(!review.is_approved);
        assert_eq!(review.status(), ReviewStatus::Pending);
        assert_eq!(review.approved_by, None);
        assert_eq!(review.approved_at, None);
        assert_eq!(review.title, None);
        assert_eq!(review.content, "Rewritten after a second visit.");
    }

    #[test]
    fn test_edit_of_pending_review_stays_pending() {
        let mut review = sample_review(Uuid::new_v4());
        review.apply_edit(Some("t".to_string()), "Still waiting for moderation".to_string());
        assert_eq!(review.status(), ReviewStatus::Pending);
    }

    #[test]
    fn test_disapprove_clears_approval() {
        let mut review = sample_review(Uuid::new_v4());
        review.approve(Uuid::new_v4(), Utc::now());
        review.disapprove();

        assert_eq!(review.status(), ReviewStatus::Pending);
        assert!(review.approved_by.is_none());
        assert!(review.approved_at.is_none());
    }

    #[test]
    fn test_review_request_validation() {
        let short = ReviewRequest {
            title: None,
            content: "too short".to_string(),
        };
        assert!(short.validate().is_err());

        let long = ReviewRequest {
            title: None,
            content: "x".repeat(1001),
        };
        assert!(long.validate().is_err());

        let padded = ReviewRequest {
            title: None,
            content: "   tiny   ".to_string(),
        };
        assert!(padded.validate().is_ok());
        assert!(padded.normalized().validate().is_err());

        let ok = ReviewRequest {
            title: Some("  ".to_string()),
            content: "  A lovely quiet square.  ".to_string(),
        }
        .normalized();
        assert!(ok.validate().is_ok());
        assert_eq!(ok.title, None);
        assert_eq!(ok.content, "A lovely quiet square.");
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_value(ReviewStatus::Approved).unwrap(), "approved");
        let parsed: ReviewStatus = serde_json::from_str("\"pending\"").unwrap();
        assert_eq!(parsed, ReviewStatus::Pending);
    }
}
