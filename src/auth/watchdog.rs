//! Background timer that force-expires lapsed sessions.
//!
//! The authoritative expiry check is the credential store's lazy check
//! on every `load`; the watchdog exists so an idle session still dies
//! even when nothing reads the store between ticks.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::info;

use crate::auth::session::SessionManager;
use crate::config::SessionConfig;

pub struct ExpiryWatchdog {
    session: SessionManager,
    interval: Duration,
}

impl ExpiryWatchdog {
    pub fn new(session: SessionManager, config: &SessionConfig) -> Self {
        Self {
            session,
            interval: config.watchdog_interval,
        }
    }

    /// Run the watchdog on its configured interval until aborted.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            // First tick after one full interval, matching setInterval semantics
            let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
            loop {
                ticker.tick().await;
                self.check();
            }
        })
    }

    /// One tick: read only the stored expiry and logout when passed.
    pub(crate) fn check(&self) {
        self.check_at(Utc::now());
    }

    pub(crate) fn check_at(&self, now: DateTime<Utc>) {
        if let Some(expires_at) = self.session.stored_expiry() {
            if now > expires_at {
                info!(expires_at = %expires_at, "Session expired, logging out");
                self.session.logout();
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
