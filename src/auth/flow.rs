//! Sign-in, sign-out and refresh flows.
//!
//! `AuthFlow` wraps the session's login entry point with the sign-in
//! throttle and local input validation, performs the best-effort
//! sign-out against the server, and runs single refresh attempts on
//! behalf of the scheduler.

use std::sync::Mutex;
use std::time::Duration;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::{ApiClient, ApiError};
use crate::auth::session::SessionManager;
use crate::auth::throttle::{FailureOutcome, SignInThrottle};
use crate::config::SessionConfig;
use crate::models::UserProfile;

/// Minimum user id length accepted before contacting the server
const MIN_USER_ID_LENGTH: usize = 3;

/// Minimum password length accepted before contacting the server
const MIN_PASSWORD_LENGTH: usize = 6;

#[derive(Error, Debug)]
pub enum SignInError {
    /// Rejected locally by the throttle; no network call was made.
    #[error("Too many failed attempts - try again after {until}")]
    Locked { until: DateTime<Utc> },

    /// The failure that tripped the lock. Later attempts while the
    /// lock holds come back as `Locked`.
    #[error("Account temporarily blocked - try again after {until}")]
    LockedOut { until: DateTime<Utc> },

    #[error("{0}")]
    InvalidUserId(&'static str),

    #[error("{0}")]
    InvalidPassword(&'static str),

    /// Server rejected the credentials (401).
    #[error("Invalid username or password - {attempts_remaining} attempts remaining")]
    InvalidCredentials { attempts_remaining: u32 },

    #[error(transparent)]
    Api(ApiError),

    #[error("Failed to persist session: {0}")]
    Storage(#[from] anyhow::Error),
}

pub struct AuthFlow {
    api: ApiClient,
    session: SessionManager,
    throttle: Mutex<SignInThrottle>,
}

impl AuthFlow {
    pub fn new(api: ApiClient, session: SessionManager, config: &SessionConfig) -> Self {
        Self {
            api,
            session,
            throttle: Mutex::new(SignInThrottle::new(config)),
        }
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Submit a sign-in attempt.
    ///
    /// Order matters: the lockout check and input validation are local
    /// and never reach the network; only a real submission can count
    /// against the throttle.
    pub async fn sign_in(
        &self,
        user_id: &str,
        password: &str,
    ) -> Result<UserProfile, SignInError> {
        if let Err(until) = self.lock_throttle().check() {
            warn!(%until, "Sign-in rejected: throttle locked");
            return Err(SignInError::Locked { until });
        }

        let user_id = user_id.trim();
        let password = password.trim();
        validate_user_id(user_id).map_err(SignInError::InvalidUserId)?;
        validate_password(password).map_err(SignInError::InvalidPassword)?;

        match self.api.login(user_id, password).await {
            Ok(resp) => {
                self.lock_throttle().record_success();

                if let Some(ref refresh_token) = resp.refresh_token {
                    if let Err(e) = self.session.set_refresh_token(refresh_token) {
                        warn!(error = %e, "Failed to persist refresh token");
                    }
                }

                let ttl = resp.expires_in.map(Duration::from_secs);
                self.session
                    .login(resp.user.clone(), Some(&resp.token), ttl)?;
                Ok(resp.user)
            }
            Err(e) => {
                // The session is untouched: the user was never logged in
                match self.lock_throttle().record_failure() {
                    FailureOutcome::LockedOut { until } => Err(SignInError::LockedOut { until }),
                    FailureOutcome::AttemptsRemaining(attempts_remaining) => match e {
                        ApiError::Unauthorized => {
                            Err(SignInError::InvalidCredentials { attempts_remaining })
                        }
                        other => {
                            if other.is_transient() {
                                warn!(error = %other, "Sign-in request never reached the server");
                            }
                            Err(SignInError::Api(other))
                        }
                    },
                }
            }
        }
    }

    /// Explicit user sign-out. Notifies the server best-effort, then
    /// unconditionally clears local state. Never fails.
    pub async fn sign_out(&self) {
        match self.session.identity() {
            Some(identity) => {
                if let Err(e) = self.api.invalidate(&identity.user_id).await {
                    warn!(error = %e, "Remote session invalidation failed, logging out locally");
                }
            }
            None => debug!("No identity for remote invalidation"),
        }

        self.session.clear_refresh_token();
        self.session.logout();
    }

    /// One credential refresh attempt. Fail-closed: any failure (missing
    /// refresh token, network, non-2xx) downgrades to logged-out rather
    /// than leaving an ambiguous session. Returns true when a fresh
    /// credential was installed.
    pub async fn refresh_once(&self) -> bool {
        let epoch = self.session.epoch();

        let Some(refresh_token) = self.session.refresh_token() else {
            warn!("No refresh token available, logging out");
            self.session.logout();
            return false;
        };

        match self.api.refresh(&refresh_token).await {
            Ok(resp) => {
                let ttl = Duration::from_secs(resp.expires_in);
                match self.session.login_if_epoch(epoch, resp.user, &resp.token, ttl) {
                    Ok(true) => {
                        info!("Bearer token refreshed");
                        true
                    }
                    Ok(false) => {
                        debug!("Discarded refresh result for a stale session epoch");
                        false
                    }
                    Err(e) => {
                        warn!(error = %e, "Failed to persist refreshed credential, logging out");
                        self.session.logout();
                        false
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, "Token refresh failed, logging out");
                // Only tear down the session generation that issued the call
                if self.session.epoch() == epoch {
                    self.session.logout();
                }
                false
            }
        }
    }

    fn lock_throttle(&self) -> std::sync::MutexGuard<'_, SignInThrottle> {
        self.throttle
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// User id rule from the sign-in form: at least 3 characters,
/// alphanumeric with both letters and digits.
fn validate_user_id(user_id: &str) -> Result<(), &'static str> {
    if user_id.is_empty() {
        return Err("Username is required");
    }
    if user_id.len() < MIN_USER_ID_LENGTH {
        return Err("Username must be at least 3 characters");
    }
    let alphanumeric = user_id.chars().all(|c| c.is_ascii_alphanumeric());
    let has_letter = user_id.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = user_id.chars().any(|c| c.is_ascii_digit());
    if !alphanumeric || !has_letter || !has_digit {
        return Err("Username must contain both letters and numbers");
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.is_empty() {
        return Err("Password is required");
    }
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err("Password must be at least 6 characters");
    }
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
