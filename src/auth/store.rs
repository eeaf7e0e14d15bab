//! Durable credential persistence for the browsing profile.
//!
//! The on-disk format is four independent entries under the profile
//! directory, mirroring the storefront's storage keys:
//!
//! - `user.json` - serialized identity record
//! - `auth_token` - bearer token string
//! - `token_expiry` - absolute expiry, milliseconds since epoch
//! - `refresh_token` - refresh token string
//!
//! Internally the first three are only ever read and written as a set
//! via `load`/`save`/`clear`; the refresh token has its own lifecycle.
//! Expiry is enforced lazily at every `load`, not only by the watchdog.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, warn};

use crate::models::UserProfile;

/// Identity record entry
const USER_FILE: &str = "user.json";

/// Bearer token entry
const TOKEN_FILE: &str = "auth_token";

/// Absolute expiry entry (milliseconds since epoch, as a string)
const EXPIRY_FILE: &str = "token_expiry";

/// Refresh token entry
const REFRESH_TOKEN_FILE: &str = "refresh_token";

/// A non-expired credential read back from the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredCredential {
    pub identity: UserProfile,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct CredentialStore {
    profile_dir: PathBuf,
}

impl CredentialStore {
    pub fn new(profile_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&profile_dir)
            .with_context(|| format!("Failed to create profile directory {:?}", profile_dir))?;
        Ok(Self { profile_dir })
    }

    /// Persist identity, bearer token (when provided) and a fresh expiry
    /// computed as `now + expires_in`. No validation of the token shape.
    pub fn save(
        &self,
        identity: &UserProfile,
        token: Option<&str>,
        expires_in: Duration,
    ) -> Result<()> {
        let ttl = chrono::Duration::from_std(expires_in)
            .context("Token lifetime out of range")?;
        let expires_at = Utc::now() + ttl;

        let identity_json =
            serde_json::to_string(identity).context("Failed to serialize identity")?;
        self.write_entry(USER_FILE, &identity_json)?;
        if let Some(token) = token {
            self.write_entry(TOKEN_FILE, token)?;
        }
        self.write_entry(EXPIRY_FILE, &expires_at.timestamp_millis().to_string())?;

        debug!(expires_at = %expires_at, "Credential saved");
        Ok(())
    }

    /// Read the credential set. Absent if any of the three entries is
    /// missing. An expired or malformed set is evicted and reported as
    /// absent; this never fails the caller.
    pub fn load(&self) -> Option<StoredCredential> {
        self.load_at(Utc::now())
    }

    /// `load` against an explicit clock, for tests and internal callers.
    pub(crate) fn load_at(&self, now: DateTime<Utc>) -> Option<StoredCredential> {
        let identity_raw = self.read_entry(USER_FILE)?;
        let token = self.read_entry(TOKEN_FILE)?;
        let expiry_raw = self.read_entry(EXPIRY_FILE)?;

        let identity: UserProfile = match serde_json::from_str(&identity_raw) {
            Ok(identity) => identity,
            Err(e) => {
                warn!(error = %e, "Malformed stored identity, evicting credential");
                self.clear();
                return None;
            }
        };

        let expires_at = match parse_expiry_millis(&expiry_raw) {
            Some(expires_at) => expires_at,
            None => {
                warn!("Malformed stored expiry, evicting credential");
                self.clear();
                return None;
            }
        };

        if now > expires_at {
            debug!(expires_at = %expires_at, "Stored credential expired, evicting");
            self.clear();
            return None;
        }

        Some(StoredCredential {
            identity,
            token,
            expires_at,
        })
    }

    /// Read only the stored expiry, for the watchdog. Malformed or
    /// missing data reads as absent; eviction is left to `load`.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        parse_expiry_millis(&self.read_entry(EXPIRY_FILE)?)
    }

    /// Evict the identity, token and expiry entries unconditionally.
    /// Total: filesystem errors are logged, never surfaced.
    pub fn clear(&self) {
        for name in [USER_FILE, TOKEN_FILE, EXPIRY_FILE] {
            self.remove_entry(name);
        }
    }

    // ===== Refresh token (independent fourth entry) =====

    pub fn refresh_token(&self) -> Option<String> {
        self.read_entry(REFRESH_TOKEN_FILE)
    }

    pub fn set_refresh_token(&self, token: &str) -> Result<()> {
        self.write_entry(REFRESH_TOKEN_FILE, token)
    }

    pub fn clear_refresh_token(&self) {
        self.remove_entry(REFRESH_TOKEN_FILE);
    }

    // ===== Entry plumbing =====

    fn entry_path(&self, name: &str) -> PathBuf {
        self.profile_dir.join(name)
    }

    fn read_entry(&self, name: &str) -> Option<String> {
        match std::fs::read_to_string(self.entry_path(name)) {
            Ok(contents) => Some(contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!(entry = name, error = %e, "Failed to read stored entry");
                None
            }
        }
    }

    fn write_entry(&self, name: &str, contents: &str) -> Result<()> {
        std::fs::write(self.entry_path(name), contents)
            .with_context(|| format!("Failed to write stored entry: {}", name))
    }

    fn remove_entry(&self, name: &str) {
        if let Err(e) = std::fs::remove_file(self.entry_path(name)) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(entry = name, error = %e, "Failed to remove stored entry");
            }
        }
    }
}

fn parse_expiry_millis(raw: &str) -> Option<DateTime<Utc>> {
    let millis: i64 = raw.trim().parse().ok()?;
    Utc.timestamp_millis_opt(millis).single()
}

// ============================================================================
// Tests
// ============================================================================
