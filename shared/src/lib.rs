use serde::{Deserialize, Serialize};

pub mod aggregate;
pub mod dataset;
pub mod date;
pub mod protocol;
pub mod record;

pub use date::{DateRange, DateRangeError};
pub use record::Record;

// =========================================================
// Constants
// =========================================================

/// Persisted session slots (origin-scoped key/value store).
pub const STORAGE_ACCESS_KEY: &str = "access";
pub const STORAGE_REFRESH_KEY: &str = "refresh";
pub const STORAGE_USER_KEY: &str = "user";

pub const HEADER_AUTHORIZATION: &str = "Authorization";
pub const HEADER_CONTENT_TYPE: &str = "Content-Type";

/// Build the `Authorization` header value for a resource call.
pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}

// =========================================================
// Domain Models
// =========================================================

/// Role discriminator carried by the login response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserType {
    Admin,
    User,
    #[serde(other)]
    Other,
}

/// Profile persisted in the `user` slot as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub email: String,
    pub user_type: UserType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of a 2xx login response.
///
/// Some deployments answer 200 with `"success": false` instead of a 4xx;
/// that is treated as a rejection too.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub access: Option<String>,
    #[serde(default)]
    pub refresh: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

impl LoginResponse {
    /// Tokens and profile, when the response actually grants a session.
    pub fn into_grant(self) -> Option<SessionGrant> {
        if self.success == Some(false) {
            return None;
        }
        let access = self.access.filter(|token| !token.is_empty())?;
        Some(SessionGrant {
            access,
            refresh: self.refresh,
            user: self.user,
        })
    }
}

/// What a successful credential exchange hands to the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionGrant {
    pub access: String,
    pub refresh: Option<String>,
    pub user: Option<UserProfile>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "PENDING",
            OrderStatus::Processing => "PROCESSING",
            OrderStatus::Shipped => "SHIPPED",
            OrderStatus::Delivered => "DELIVERED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == raw)
    }
}

/// Query filters for the catalog listing. Empty fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductFilters {
    pub search: String,
    pub category: String,
    pub material: String,
    pub min_price: String,
    pub max_price: String,
    pub condition: String,
    pub available: String,
}

impl ProductFilters {
    pub fn query(&self) -> Vec<(&'static str, String)> {
        [
            ("search", &self.search),
            ("category", &self.category),
            ("material", &self.material),
            ("min_price", &self.min_price),
            ("max_price", &self.max_price),
            ("condition", &self.condition),
            ("available", &self.available),
        ]
        .into_iter()
        .filter(|(_, v)| !v.trim().is_empty())
        .map(|(k, v)| (k, v.trim().to_string()))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_response_grant() {
        let body = r#"{"access":"a1","refresh":"r1","user":{"email":"admin@shop.test","user_type":"ADMIN"}}"#;
        let grant = serde_json::from_str::<LoginResponse>(body)
            .unwrap()
            .into_grant()
            .unwrap();
        assert_eq!(grant.access, "a1");
        assert_eq!(grant.refresh.as_deref(), Some("r1"));
        assert_eq!(grant.user.unwrap().user_type, UserType::Admin);
    }

    #[test]
    fn test_login_response_explicit_failure() {
        let body = r#"{"success":false,"access":"a1"}"#;
        let resp: LoginResponse = serde_json::from_str(body).unwrap();
        assert!(resp.into_grant().is_none());

        let resp: LoginResponse = serde_json::from_str(r#"{"detail":"nope"}"#).unwrap();
        assert!(resp.into_grant().is_none());
    }

    #[test]
    fn test_unknown_user_type() {
        let user: UserProfile =
            serde_json::from_str(r#"{"email":"x@y.z","user_type":"VENDOR"}"#).unwrap();
        assert_eq!(user.user_type, UserType::Other);
    }

    #[test]
    fn test_product_filters_skip_empty() {
        let filters = ProductFilters {
            search: "chair".into(),
            max_price: " 300 ".into(),
            ..Default::default()
        };
        assert_eq!(
            filters.query(),
            vec![("search", "chair".to_string()), ("max_price", "300".to_string())]
        );
    }

    #[test]
    fn test_order_status_parse() {
        assert_eq!(OrderStatus::parse("SHIPPED"), Some(OrderStatus::Shipped));
        assert_eq!(OrderStatus::parse("shipped"), None);
    }
}
