//! Session lifecycle management for the MyMobile storefront client.
//!
//! Tracks the signed-in identity, its bearer credential and expiry;
//! refreshes the credential shortly before it lapses; force-expires the
//! session when it does lapse; and throttles repeated failed sign-in
//! attempts. Consumed by route guards and the sign-in form; the server
//! remains authoritative for credential validation.
//!
//! Typical wiring:
//!
//! ```no_run
//! use std::sync::Arc;
//! use storefront_session::{
//!     ApiClient, AuthFlow, CredentialStore, SessionConfig, SessionManager, SessionTasks,
//! };
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = SessionConfig::default();
//! let store = CredentialStore::new(SessionConfig::profile_dir()?)?;
//! let session = SessionManager::new(store, config.clone());
//! session.initialize();
//!
//! let api = ApiClient::new("https://api.mymobile.example")?;
//! let flow = Arc::new(AuthFlow::new(api, session, &config));
//! let _tasks = SessionTasks::spawn(flow.clone(), &config);
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError};
pub use auth::{
    AuthFlow, CredentialStore, SessionManager, SessionSnapshot, SessionTasks, SignInError,
    SignInThrottle,
};
pub use config::SessionConfig;
pub use models::{UserProfile, UserRole};
