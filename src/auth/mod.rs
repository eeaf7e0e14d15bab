//! Session and authentication lifecycle.
//!
//! This module provides:
//! - `CredentialStore`: durable four-entry credential persistence with lazy expiry
//! - `SessionManager`: observable in-memory session state with an epoch counter
//! - `SignInThrottle`: lockout after repeated failed sign-in attempts
//! - `AuthFlow`: sign-in, sign-out and single refresh attempts
//! - `ExpiryWatchdog` / `RefreshScheduler`: the two recurring timers
//! - `SessionTasks`: spawn/teardown guard for the timers

pub mod flow;
pub mod refresh;
pub mod session;
pub mod store;
pub mod tasks;
pub mod throttle;
pub mod watchdog;

pub use flow::{AuthFlow, SignInError};
pub use refresh::RefreshScheduler;
pub use session::{SessionManager, SessionSnapshot};
pub use store::{CredentialStore, StoredCredential};
pub use tasks::SessionTasks;
pub use throttle::{FailureOutcome, SignInThrottle};
pub use watchdog::ExpiryWatchdog;
