//! Data models shared across the session subsystem.
//!
//! - `UserProfile`: the signed-in identity record
//! - `UserRole`: vendor/customer account role with routing helper

pub mod user;

pub use user::{UserProfile, UserRole};
