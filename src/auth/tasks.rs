//! Lifecycle of the two background timers.
//!
//! `SessionTasks` owns the watchdog and refresh scheduler handles and
//! aborts both on drop, so no timer fires after the owning component
//! is torn down.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::auth::flow::AuthFlow;
use crate::auth::refresh::RefreshScheduler;
use crate::auth::watchdog::ExpiryWatchdog;
use crate::config::SessionConfig;

pub struct SessionTasks {
    watchdog: JoinHandle<()>,
    refresh: JoinHandle<()>,
}

impl SessionTasks {
    /// Spawn the expiry watchdog and refresh scheduler.
    pub fn spawn(flow: Arc<AuthFlow>, config: &SessionConfig) -> Self {
        let watchdog = ExpiryWatchdog::new(flow.session().clone(), config).spawn();
        let refresh = RefreshScheduler::new(flow, config).spawn();
        debug!("Session background timers started");
        Self { watchdog, refresh }
    }
}

impl Drop for SessionTasks {
    fn drop(&mut self) {
        self.watchdog.abort();
        self.refresh.abort();
        debug!("Session background timers stopped");
    }
}
