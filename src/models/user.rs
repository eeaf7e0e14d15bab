use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account role reported by the login endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    #[serde(rename = "VENDOR")]
    Vendor,
    #[serde(rename = "CUSTOMER")]
    Customer,
}

impl UserRole {
    /// Route the UI navigates to after a successful sign-in.
    pub fn landing_path(&self) -> &'static str {
        match self {
            UserRole::Vendor => "/vendor/products",
            UserRole::Customer => "/customer/products",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::Vendor => write!(f, "Vendor"),
            UserRole::Customer => write!(f, "Customer"),
        }
    }
}

/// Signed-in identity as returned by the server and persisted locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(rename = "userId")]
    pub user_id: String,
    #[serde(rename = "userName")]
    pub user_name: String,
    #[serde(rename = "userRole")]
    pub user_role: UserRole,
    #[serde(rename = "lastLoginTime", default)]
    pub last_login_time: Option<DateTime<Utc>>,
}
