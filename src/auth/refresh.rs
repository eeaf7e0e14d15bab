//! Background timer that renews the bearer token before it lapses.
//!
//! Each tick computes the time until the stored expiry and triggers at
//! most one refresh attempt when it falls inside the configured window.
//! There is no retry or backoff beyond the next scheduled tick; a
//! failed attempt fails closed via `AuthFlow::refresh_once`.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::debug;

use crate::auth::flow::AuthFlow;
use crate::config::SessionConfig;

pub struct RefreshScheduler {
    flow: Arc<AuthFlow>,
    interval: Duration,
    window: TimeDelta,
}

impl RefreshScheduler {
    pub fn new(flow: Arc<AuthFlow>, config: &SessionConfig) -> Self {
        Self {
            flow,
            interval: config.refresh_interval,
            window: TimeDelta::from_std(config.refresh_window).unwrap_or(TimeDelta::MAX),
        }
    }

    /// Run the scheduler on its configured interval until aborted.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
            loop {
                ticker.tick().await;
                self.run_tick().await;
            }
        })
    }

    /// One tick: inactive unless logged in, at most one refresh attempt.
    pub(crate) async fn run_tick(&self) {
        if !self.flow.session().is_logged_in() {
            return;
        }
        let Some(expires_at) = self.flow.session().stored_expiry() else {
            return;
        };

        let time_until_expiry = expires_at - Utc::now();
        if should_refresh(time_until_expiry, self.window) {
            debug!(
                seconds_left = time_until_expiry.num_seconds(),
                "Token near expiry, refreshing"
            );
            self.flow.refresh_once().await;
        }
    }
}

/// Refresh only while some lifetime remains and it is inside the window.
/// An already-passed expiry is the watchdog's business, not ours.
fn should_refresh(time_until_expiry: TimeDelta, window: TimeDelta) -> bool {
    time_until_expiry > TimeDelta::zero() && time_until_expiry < window
}

// ============================================================================
// Tests
// ============================================================================
