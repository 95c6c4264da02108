// src/services/rate_limiter.rs
// DOCUMENTATION: Per-user throttle on rating, review and vote submissions

use crate::errors::PlacesError;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use uuid::Uuid;

/// Checks between two sweeps of idle per-user entries
const PRUNE_EVERY: u64 = 1024;

pub struct SubmissionLimiter {
    limiter: DefaultKeyedRateLimiter<Uuid>,
    checks: AtomicU64,
}

impl SubmissionLimiter {
    pub fn per_minute(submissions: u32) -> Self {
        let burst = NonZeroU32::new(submissions).unwrap_or(NonZeroU32::MIN);
        Self {
            limiter: RateLimiter::keyed(Quota::per_minute(burst)),
            checks: AtomicU64::new(0),
        }
    }

    /// Consume one submission for `user_id`
    pub fn check(&self, user_id: Uuid) -> Result<(), PlacesError> {
        if self.checks.fetch_add(1, Ordering::Relaxed) % PRUNE_EVERY == PRUNE_EVERY - 1 {
            self.prune();
        }

        self.limiter.check_key(&user_id).map_err(|_| {
            log::warn!("Submission rate limit hit for user {}", user_id);
            PlacesError::RateLimitExceeded
        })
    }

    /// Drop entries of users whose quota has fully refilled
    pub fn prune(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
        log::debug!("Submission limiter holds {} users", self.limiter.len());
    }

    /// Users currently tracked
    pub fn tracked_users(&self) -> usize {
        self.limiter.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_limit_is_per_user() {
        let limiter = SubmissionLimiter::per_minute(2);
        let alice = Uuid::new_v4();
        let bob = Uuid::new_v4();

        assert!(limiter.check(alice).is_ok());
        assert!(limiter.check(alice).is_ok());
        assert!(matches!(
            limiter.check(alice),
            Err(PlacesError::RateLimitExceeded)
        ));

        assert!(limiter.check(bob).is_ok());
    }

    #[test]
    fn test_zero_quota_still_allows_one() {
        let limiter = SubmissionLimiter::per_minute(0);
        let user = Uuid::new_v4();
        assert!(limiter.check(user).is_ok());
        assert!(limiter.check(user).is_err());
    }

    #[test]
    fn test_prune_forgets_refilled_users() {
        // one cell refills every millisecond
        let limiter = SubmissionLimiter::per_minute(60_000);
        for _ in 0..10 {
            assert!(limiter.check(Uuid::new_v4()).is_ok());
        }
        assert_eq!(limiter.tracked_users(), 10);

        std::thread::sleep(Duration::from_millis(50));
        limiter.prune();
        assert_eq!(limiter.tracked_users(), 0);
    }

    #[test]
    fn test_periodic_prune_keeps_state_bounded() {
        let limiter = SubmissionLimiter::per_minute(60_000);
        for _ in 0..(PRUNE_EVERY - 1) {
            assert!(limiter.check(Uuid::new_v4()).is_ok());
        }
        std::thread::sleep(Duration::from_millis(50));

        // this check triggers the sweep before recording its own user
        assert!(limiter.check(Uuid::new_v4()).is_ok());
        assert_eq!(limiter.tracked_users(), 1);
    }
}
