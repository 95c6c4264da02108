// src/models/vote.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::PlacesError;

/// Helpful/unhelpful vote by one user on one review
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Vote {
    pub id: Uuid,
    pub user_id: Uuid,
    pub review_id: Uuid,
    pub is_helpful: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of PUT /reviews/{id}/votes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastVoteRequest {
    pub is_helpful: bool,
}

/// Helpful/unhelpful counts, always recomputed from the votes table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VoteTally {
    pub helpful: i64,
    pub unhelpful: i64,
}

impl VoteTally {
    /// Build a tally from `(is_helpful, count)` rows of a GROUP BY query
    pub fn from_groups(groups: &[(bool, i64)]) -> Self {
        groups
            .iter()
            .fold(VoteTally::default(), |mut tally, &(is_helpful, count)| {
                if is_helpful {
                    tally.helpful += count;
                } else {
                    tally.unhelpful += count;
                }
                tally
            })
    }
}

/// Authors may not vote on their own reviews
pub fn ensure_not_author(review_author: Uuid, voter: Uuid) -> Result<(), PlacesError> {
    if review_author == voter {
        return Err(PlacesError::SelfVote);
    }
    Ok(())
}

/// Vote plus the fresh tally of its review
#[derive(Debug, Serialize)]
pub struct VoteSubmission {
    pub vote: Vote,
    pub tally: VoteTally,
}

/// Result of DELETE /reviews/{id}/votes
#[derive(Debug, Serialize)]
pub struct VoteRemoval {
    pub removed: bool,
    pub tally: VoteTally,
}

/// One of the caller's votes on a place's reviews
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserVote {
    pub review_id: Uuid,
    pub is_helpful: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tally_from_groups() {
        assert_eq!(VoteTally::from_groups(&[]), VoteTally::default());
        assert_eq!(
            VoteTally::from_groups(&[(true, 7), (false, 2)]),
            VoteTally {
                helpful: 7,
                unhelpful: 2
            }
        );
        assert_eq!(
            VoteTally::from_groups(&[(false, 3)]),
            VoteTally {
                helpful: 0,
                unhelpful: 3
            }
        );
    }

    #[test]
    fn test_self_vote_rejected() {
        let author = Uuid::new_v4();
        assert!(matches!(
            ensure_not_author(author, author),
            Err(PlacesError::SelfVote)
        ));
        tokio_test::assert_ok!(ensure_not_author(author, Uuid::new_v4()));
    }
}
