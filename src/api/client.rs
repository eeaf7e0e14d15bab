//! API client for the storefront authentication endpoints.
//!
//! This module provides the `ApiClient` struct for the three endpoint
//! contracts the session manager depends on: sign-in, credential
//! refresh, and best-effort remote session invalidation.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::UserProfile;

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
/// 30s allows for slow API responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    #[serde(rename = "userId")]
    user_id: &'a str,
    #[serde(rename = "userPassword")]
    user_password: &'a str,
}

/// Response from `POST /user/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub user: UserProfile,
    pub token: String,
    #[serde(rename = "refreshToken", default)]
    pub refresh_token: Option<String>,
    /// Bearer token lifetime in seconds, when the server reports one.
    #[serde(rename = "expiresIn", default)]
    pub expires_in: Option<u64>,
}

#[derive(Debug, Serialize)]
struct RefreshRequest<'a> {
    #[serde(rename = "refreshToken")]
    refresh_token: &'a str,
}

/// Response from `POST /auth/refresh`.
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshResponse {
    pub user: UserProfile,
    pub token: String,
    /// New bearer token lifetime in seconds.
    #[serde(rename = "expiresIn")]
    pub expires_in: u64,
}

/// API client for the storefront backend.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client against the given base URL.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Authenticate with user id and password.
    pub async fn login(&self, user_id: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let url = format!("{}/user/login", self.base_url);
        let body = LoginRequest {
            user_id,
            user_password: password,
        };

        let response = self.client.post(&url).json(&body).send().await?;
        let response = Self::check_response(response).await?;

        response
            .json()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse login response: {}", e)))
    }

    /// Exchange a refresh token for a new bearer token and identity.
    pub async fn refresh(&self, refresh_token: &str) -> Result<RefreshResponse, ApiError> {
        let url = format!("{}/auth/refresh", self.base_url);
        let body = RefreshRequest { refresh_token };

        let response = self.client.post(&url).json(&body).send().await?;
        let response = Self::check_response(response).await?;

        response.json().await.map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse refresh response: {}", e))
        })
    }

    /// Tell the server to invalidate the session for a user.
    /// The response body is ignored; only the status matters.
    pub async fn invalidate(&self, user_id: &str) -> Result<(), ApiError> {
        let url = format!("{}/logout/{}", self.base_url, user_id);

        let response = self.client.put(&url).send().await?;
        Self::check_response(response).await?;
        debug!(user_id, "Remote session invalidated");
        Ok(())
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_login_parses_full_response() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/user/login"))
            .and(body_json(json!({
                "userId": "AB12",
                "userPassword": "hunter22"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user": {"userId": "AB12", "userName": "Alice", "userRole": "CUSTOMER"},
                "token": "T1",
                "refreshToken": "R1",
                "expiresIn": 3600
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).expect("Failed to build client");
        let resp = client.login("AB12", "hunter22").await.expect("Login failed");
        assert_eq!(resp.token, "T1");
        assert_eq!(resp.refresh_token.as_deref(), Some("R1"));
        assert_eq!(resp.expires_in, Some(3600));
        assert_eq!(resp.user.user_id, "AB12");
    }

    #[tokio::test]
    async fn test_login_optional_fields_absent() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/user/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user": {"userId": "AB12", "userName": "Alice", "userRole": "CUSTOMER"},
                "token": "T1"
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).expect("Failed to build client");
        let resp = client.login("AB12", "pw").await.expect("Login failed");
        assert_eq!(resp.refresh_token, None);
        assert_eq!(resp.expires_in, None);
    }

    #[tokio::test]
    async fn test_login_401_maps_to_unauthorized() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/user/login"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).expect("Failed to build client");
        let err = client.login("AB12", "wrong").await.unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized));
    }

    #[tokio::test]
    async fn test_invalidate_uses_put_and_ignores_body() {
        let server = MockServer::start().await;

        Mock::given(method("PUT"))
            .and(path("/logout/AB12"))
            .respond_with(ResponseTemplate::new(200).set_body_string("whatever"))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).expect("Failed to build client");
        client.invalidate("AB12").await.expect("Invalidate failed");
    }

    #[tokio::test]
    async fn test_connect_failure_is_transient() {
        // Nothing listens on port 1: the request is refused before any
        // response exists
        let client = ApiClient::new("http://127.0.0.1:1").expect("Failed to build client");
        let err = client.login("AB12", "hunter22").await.unwrap_err();
        assert!(matches!(err, ApiError::NetworkError(_)));
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_error_status_is_not_transient() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/user/login"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).expect("Failed to build client");
        let err = client.login("AB12", "hunter22").await.unwrap_err();
        assert!(!err.is_transient());
    }

    #[tokio::test]
    async fn test_refresh_error_status_surfaces() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/refresh"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).expect("Failed to build client");
        let err = client.refresh("R1").await.unwrap_err();
        assert!(matches!(err, ApiError::ServerError(_)));
    }
}
