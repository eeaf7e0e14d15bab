//! Sign-in attempt throttling.
//!
//! Counts consecutive failed sign-in attempts and imposes a timed
//! lockout once the threshold is reached. State lives in memory only:
//! a process restart resets it. The client-side throttle is a UX
//! speed-bump, the server remains authoritative for brute-force
//! defense.
//!
//! State machine: Open -> Locked -> Open. The lock releases lazily at
//! the first check after the deadline, which also resets the counter,
//! so the next failure starts a fresh window.

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, warn};

use crate::config::SessionConfig;

/// Result of recording a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    /// Still open; this many attempts remain before lockout.
    AttemptsRemaining(u32),
    /// This failure tripped the lock.
    LockedOut { until: DateTime<Utc> },
}

#[derive(Debug)]
pub struct SignInThrottle {
    max_attempts: u32,
    lockout: TimeDelta,
    consecutive_failures: u32,
    locked_until: Option<DateTime<Utc>>,
}

impl SignInThrottle {
    pub fn new(config: &SessionConfig) -> Self {
        Self {
            max_attempts: config.max_sign_in_attempts,
            lockout: TimeDelta::from_std(config.lockout_duration).unwrap_or(TimeDelta::MAX),
            consecutive_failures: 0,
            locked_until: None,
        }
    }

    /// Whether an attempt may proceed right now. `Err` carries the
    /// lockout deadline; no network call is made in that case.
    pub fn check(&mut self) -> Result<(), DateTime<Utc>> {
        self.check_at(Utc::now())
    }

    pub(crate) fn check_at(&mut self, now: DateTime<Utc>) -> Result<(), DateTime<Utc>> {
        if let Some(until) = self.locked_until {
            if now < until {
                return Err(until);
            }
            // Lockout elapsed: back to Open with a clean slate
            debug!("Sign-in lockout expired, resetting");
            self.locked_until = None;
            self.consecutive_failures = 0;
        }
        Ok(())
    }

    /// Record a failed attempt, locking when the threshold is reached.
    pub fn record_failure(&mut self) -> FailureOutcome {
        self.record_failure_at(Utc::now())
    }

    pub(crate) fn record_failure_at(&mut self, now: DateTime<Utc>) -> FailureOutcome {
        self.consecutive_failures += 1;
        if self.consecutive_failures >= self.max_attempts {
            let until = now + self.lockout;
            self.locked_until = Some(until);
            warn!(
                failures = self.consecutive_failures,
                locked_until = %until,
                "Sign-in throttle locked"
            );
            FailureOutcome::LockedOut { until }
        } else {
            FailureOutcome::AttemptsRemaining(self.max_attempts - self.consecutive_failures)
        }
    }

    /// Any successful authentication resets the counter.
    pub fn record_success(&mut self) {
        self.consecutive_failures = 0;
        self.locked_until = None;
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_throttle() -> SignInThrottle {
        SignInThrottle::new(&SessionConfig::default())
    }

    #[test]
    fn test_locks_after_threshold_failures() {
        let mut throttle = test_throttle();
        let now = Utc::now();

        for _ in 0..4 {
            assert!(throttle.check_at(now).is_ok());
            let outcome = throttle.record_failure_at(now);
            assert!(matches!(outcome, FailureOutcome::AttemptsRemaining(_)));
        }

        let outcome = throttle.record_failure_at(now);
        let FailureOutcome::LockedOut { until } = outcome else {
            panic!("Expected lockout on failure #5");
        };
        assert_eq!(until, now + TimeDelta::minutes(5));

        // The 6th attempt is rejected locally
        assert_eq!(throttle.check_at(now), Err(until));
        assert_eq!(
            throttle.check_at(now + TimeDelta::minutes(4)),
            Err(until)
        );
    }

    #[test]
    fn test_lock_expiry_starts_a_fresh_window() {
        let mut throttle = test_throttle();
        let now = Utc::now();

        for _ in 0..5 {
            throttle.record_failure_at(now);
        }
        assert!(throttle.check_at(now).is_err());

        // Past the deadline the attempt is allowed and the counter is reset
        let later = now + TimeDelta::minutes(5) + TimeDelta::seconds(1);
        assert!(throttle.check_at(later).is_ok());
        assert_eq!(throttle.consecutive_failures(), 0);

        // A failure now is failure #1 of a new window
        let outcome = throttle.record_failure_at(later);
        assert_eq!(outcome, FailureOutcome::AttemptsRemaining(4));
    }

    #[test]
    fn test_success_resets_counter_at_any_depth() {
        let mut throttle = test_throttle();
        let now = Utc::now();

        for _ in 0..3 {
            throttle.record_failure_at(now);
        }
        assert_eq!(throttle.consecutive_failures(), 3);

        throttle.record_success();
        assert_eq!(throttle.consecutive_failures(), 0);
        assert!(throttle.check_at(now).is_ok());
    }

    #[test]
    fn test_attempts_remaining_counts_down() {
        let mut throttle = test_throttle();
        let now = Utc::now();

        assert_eq!(
            throttle.record_failure_at(now),
            FailureOutcome::AttemptsRemaining(4)
        );
        assert_eq!(
            throttle.record_failure_at(now),
            FailureOutcome::AttemptsRemaining(3)
        );
    }
}
