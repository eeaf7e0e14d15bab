//! Session lifecycle configuration.
//!
//! All timer intervals and thresholds live here rather than as literals
//! scattered through the components, so tests can run against compressed
//! clocks and deployments can tune the cadence.
//!
//! The profile directory (where credentials persist) defaults to
//! `<cache dir>/mymobile/`.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

/// Application name used for the profile storage directory
const APP_NAME: &str = "mymobile";

/// How often the expiry watchdog inspects the stored expiry.
const WATCHDOG_INTERVAL_SECS: u64 = 60;

/// How often the refresh scheduler evaluates the time until expiry.
const REFRESH_INTERVAL_SECS: u64 = 60;

/// Refresh when the token expires within this window.
const REFRESH_WINDOW_SECS: u64 = 5 * 60;

/// Bearer token lifetime assumed when the server does not report one.
const DEFAULT_TOKEN_TTL_SECS: u64 = 24 * 60 * 60;

/// Consecutive sign-in failures before the throttle locks.
const MAX_SIGN_IN_ATTEMPTS: u32 = 5;

/// How long the sign-in throttle stays locked.
const LOCKOUT_SECS: u64 = 5 * 60;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Tick interval for the expiry watchdog timer.
    pub watchdog_interval: Duration,
    /// Tick interval for the refresh scheduler timer.
    pub refresh_interval: Duration,
    /// A refresh attempt is made when `0 < time_until_expiry < refresh_window`.
    pub refresh_window: Duration,
    /// Expiry applied to saved credentials when the server omits `expiresIn`.
    pub default_token_ttl: Duration,
    /// Failed sign-in attempts tolerated before lockout.
    pub max_sign_in_attempts: u32,
    /// Duration of a sign-in lockout.
    pub lockout_duration: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            watchdog_interval: Duration::from_secs(WATCHDOG_INTERVAL_SECS),
            refresh_interval: Duration::from_secs(REFRESH_INTERVAL_SECS),
            refresh_window: Duration::from_secs(REFRESH_WINDOW_SECS),
            default_token_ttl: Duration::from_secs(DEFAULT_TOKEN_TTL_SECS),
            max_sign_in_attempts: MAX_SIGN_IN_ATTEMPTS,
            lockout_duration: Duration::from_secs(LOCKOUT_SECS),
        }
    }
}

impl SessionConfig {
    /// Directory holding the durable credential entries for this profile.
    pub fn profile_dir() -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}
