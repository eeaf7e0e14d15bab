//! In-memory session state and its mutation entry points.
//!
//! `SessionManager` is the single source of truth consumed by route
//! guards and request signing. It owns the `CredentialStore`; the
//! watchdog, refresh scheduler and sign-in flow all mutate the session
//! through it. Handles are cheap to clone and share one inner state.
//!
//! Every `login`/`logout` advances a session epoch. A refresh that was
//! issued under an older epoch is discarded instead of applied, so an
//! in-flight refresh completing after an explicit logout cannot
//! resurrect the session.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::auth::store::CredentialStore;
use crate::config::SessionConfig;
use crate::models::UserProfile;

/// Observable view of the session for route guards and UI.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub is_logged_in: bool,
    pub identity: Option<UserProfile>,
    /// True only during startup restoration, false for the rest of the
    /// process lifetime.
    pub is_loading: bool,
}

impl SessionSnapshot {
    fn loading() -> Self {
        Self {
            is_logged_in: false,
            identity: None,
            is_loading: true,
        }
    }
}

/// Shared session handle.
/// Clone is cheap - all handles point at the same inner state.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

struct Inner {
    store: CredentialStore,
    config: SessionConfig,
    state: RwLock<SessionSnapshot>,
    initialized: AtomicBool,
    epoch: AtomicU64,
    watch_tx: watch::Sender<SessionSnapshot>,
}

impl SessionManager {
    pub fn new(store: CredentialStore, config: SessionConfig) -> Self {
        let initial = SessionSnapshot::loading();
        let (watch_tx, _) = watch::channel(initial.clone());
        Self {
            inner: Arc::new(Inner {
                store,
                config,
                state: RwLock::new(initial),
                initialized: AtomicBool::new(false),
                epoch: AtomicU64::new(0),
                watch_tx,
            }),
        }
    }

    /// One-time startup restoration from the credential store. Ends
    /// with `is_loading = false` whether or not a credential was found.
    /// Subsequent calls are no-ops.
    pub fn initialize(&self) {
        if self.inner.initialized.swap(true, Ordering::SeqCst) {
            debug!("Session already initialized, ignoring");
            return;
        }

        let restored = self.inner.store.load();
        let snapshot = match restored {
            Some(cred) => {
                info!(user_id = %cred.identity.user_id, "Restored session from storage");
                SessionSnapshot {
                    is_logged_in: true,
                    identity: Some(cred.identity),
                    is_loading: false,
                }
            }
            None => {
                debug!("No stored session to restore");
                SessionSnapshot {
                    is_logged_in: false,
                    identity: None,
                    is_loading: false,
                }
            }
        };
        self.replace_state(snapshot);
    }

    /// Transition to logged-in with the given identity, unconditionally
    /// overwriting any prior session, and persist the credential.
    /// `expires_in` falls back to the configured default TTL.
    pub fn login(
        &self,
        identity: UserProfile,
        token: Option<&str>,
        expires_in: Option<Duration>,
    ) -> Result<()> {
        let ttl = expires_in.unwrap_or(self.inner.config.default_token_ttl);

        // Persist before flipping memory: on a failed save the session
        // stays logged-out, keeping state and store in agreement.
        self.inner.store.save(&identity, token, ttl)?;

        self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        info!(user_id = %identity.user_id, "Logged in");
        self.replace_state(SessionSnapshot {
            is_logged_in: true,
            identity: Some(identity),
            is_loading: false,
        });
        Ok(())
    }

    /// Transition to logged-out and clear the credential store.
    /// Idempotent: safe to call when already logged out.
    pub fn logout(&self) {
        self.inner.epoch.fetch_add(1, Ordering::SeqCst);
        let was_logged_in = {
            let state = self.read_state();
            state.is_logged_in
        };
        self.replace_state(SessionSnapshot {
            is_logged_in: false,
            identity: None,
            is_loading: false,
        });
        self.inner.store.clear();

        if was_logged_in {
            info!("Logged out");
        }
    }

    /// Bearer token for outbound request signing. Delegates to the
    /// store so lazy expiry applies on every read.
    pub fn current_token(&self) -> Option<String> {
        self.inner.store.load().map(|cred| cred.token)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.read_state().clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.read_state().is_logged_in
    }

    pub fn identity(&self) -> Option<UserProfile> {
        self.read_state().identity.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.read_state().is_loading
    }

    /// Watch session changes (route guards re-render on updates).
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.watch_tx.subscribe()
    }

    /// Current session epoch. Captured before an async operation whose
    /// result must not apply to a newer session generation.
    pub fn epoch(&self) -> u64 {
        self.inner.epoch.load(Ordering::SeqCst)
    }

    /// Apply a login only if the session epoch has not moved since
    /// `expected` was captured. Returns false when the result was
    /// discarded as stale.
    pub(crate) fn login_if_epoch(
        &self,
        expected: u64,
        identity: UserProfile,
        token: &str,
        expires_in: Duration,
    ) -> Result<bool> {
        if self.epoch() != expected {
            debug!(expected, current = self.epoch(), "Discarding stale session update");
            return Ok(false);
        }
        self.login(identity, Some(token), Some(expires_in))?;
        Ok(true)
    }

    // ===== Store passthroughs for the timers and flows =====

    pub(crate) fn stored_expiry(&self) -> Option<DateTime<Utc>> {
        self.inner.store.expires_at()
    }

    pub(crate) fn refresh_token(&self) -> Option<String> {
        self.inner.store.refresh_token()
    }

    pub(crate) fn set_refresh_token(&self, token: &str) -> Result<()> {
        self.inner.store.set_refresh_token(token)
    }

    pub(crate) fn clear_refresh_token(&self) {
        self.inner.store.clear_refresh_token();
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, SessionSnapshot> {
        self.inner
            .state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn replace_state(&self, snapshot: SessionSnapshot) {
        {
            let mut state = self
                .inner
                .state
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            *state = snapshot.clone();
        }
        self.inner.watch_tx.send_replace(snapshot);
    }
}

// ============================================================================
// Tests
// ============================================================================
