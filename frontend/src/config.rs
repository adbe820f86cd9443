//! Build-time configuration.
//!
//! Values are read from the environment when the wasm bundle is compiled
//! (`SHOPDESK_API_BASE_URL=https://api.example.com trunk build`). Anything not
//! set falls back to the defaults below.

use log::LevelFilter;
use shopdesk_shared::UserType;

use crate::web::route::AppRoute;

/// Empty base means same origin (`/api/...`), which is how the console is
/// served behind the backend's reverse proxy.
const DEFAULT_API_BASE_URL: &str = "";
const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub api_base_url: String,
    pub log_level: LevelFilter,
    /// Roles allowed to keep a session after login.
    pub privileged_roles: Vec<UserType>,
    /// Where a fresh session lands.
    pub landing_route: AppRoute,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            log_level: DEFAULT_LOG_LEVEL,
            privileged_roles: vec![UserType::Admin],
            landing_route: AppRoute::Dashboard,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_values(
            option_env!("SHOPDESK_API_BASE_URL"),
            option_env!("SHOPDESK_LOG_LEVEL"),
        )
    }

    fn from_values(base_url: Option<&str>, log_level: Option<&str>) -> Self {
        let defaults = Self::default();
        Self {
            api_base_url: base_url
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),
            log_level: log_level
                .and_then(|level| level.trim().parse().ok())
                .unwrap_or(defaults.log_level),
            ..defaults
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_values(None, None);
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.privileged_roles, vec![UserType::Admin]);
        assert_eq!(config.landing_route, AppRoute::Dashboard);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_values(Some("https://api.shop.test/ "), Some("debug"));
        assert_eq!(config.api_base_url, "https://api.shop.test");
        assert_eq!(config.log_level, LevelFilter::Debug);

        let config = AppConfig::from_values(None, Some("loud"));
        assert_eq!(config.log_level, LevelFilter::Info);
    }
}
