//! REST API client module for the storefront backend.
//!
//! This module provides the `ApiClient` for the three authentication
//! endpoints the session lifecycle depends on:
//!
//! - `POST /user/login` - sign-in
//! - `POST /auth/refresh` - bearer token renewal
//! - `PUT /logout/{userId}` - best-effort remote invalidation

pub mod client;
pub mod error;

pub use client::{ApiClient, LoginResponse, RefreshResponse};
pub use error::ApiError;
