//! Route table.
//!
//! Pure domain layer: no DOM, no `web_sys`. Which routes need a session is
//! decided here; what to do about it is [`super::guard`].

use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// Public sign-in page.
    #[default]
    Login,
    /// Console shell with the welcome panel.
    Home,
    Dashboard,
    Orders,
    /// Product performance analytics.
    Products,
    /// Catalog CRUD.
    ProductManagement,
    /// Anything unmatched. Never rendered; the guard resolves it.
    NotFound,
}

impl AppRoute {
    /// Parse a URL path. A trailing slash is ignored (`/orders/` == `/orders`).
    pub fn from_path(path: &str) -> Self {
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let trimmed = path.trim_end_matches('/');
        match trimmed {
            "" => Self::Home,
            "/login" => Self::Login,
            "/dashboard" => Self::Dashboard,
            "/orders" => Self::Orders,
            "/products-admin" => Self::Products,
            "/products" => Self::ProductManagement,
            _ => Self::NotFound,
        }
    }

    pub fn to_path(&self) -> &'static str {
        match self {
            Self::Login => "/login",
            Self::Home => "/",
            Self::Dashboard => "/dashboard",
            Self::Orders => "/orders",
            Self::Products => "/products-admin",
            Self::ProductManagement => "/products",
            Self::NotFound => "/404",
        }
    }

    /// Reachable without a session.
    pub fn is_public(&self) -> bool {
        matches!(self, Self::Login)
    }

    pub fn requires_auth(&self) -> bool {
        !self.is_public() && *self != Self::NotFound
    }

    /// Sidebar label.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Login => "Login",
            Self::Home => "Home",
            Self::Dashboard => "Dashboard",
            Self::Orders => "Orders",
            Self::Products => "Products",
            Self::ProductManagement => "Catalog",
            Self::NotFound => "Not found",
        }
    }

    /// Entries shown in the sidebar, in order.
    pub fn navigation() -> [AppRoute; 4] {
        [
            Self::Dashboard,
            Self::Orders,
            Self::Products,
            Self::ProductManagement,
        ]
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_path() {
        assert_eq!(AppRoute::from_path("/"), AppRoute::Home);
        assert_eq!(AppRoute::from_path("/login"), AppRoute::Login);
        assert_eq!(AppRoute::from_path("/orders/"), AppRoute::Orders);
        assert_eq!(AppRoute::from_path("/products-admin"), AppRoute::Products);
        assert_eq!(AppRoute::from_path("/products?page=2"), AppRoute::ProductManagement);
        assert_eq!(AppRoute::from_path("/nope"), AppRoute::NotFound);
        assert_eq!(AppRoute::from_path(""), AppRoute::Home);
    }

    #[test]
    fn test_paths_roundtrip() {
        for route in AppRoute::navigation() {
            assert_eq!(AppRoute::from_path(route.to_path()), route);
        }
        assert_eq!(AppRoute::from_path(AppRoute::Login.to_path()), AppRoute::Login);
    }

    #[test]
    fn test_protection() {
        assert!(!AppRoute::Login.requires_auth());
        assert!(AppRoute::Home.requires_auth());
        assert!(AppRoute::ProductManagement.requires_auth());
        assert!(!AppRoute::NotFound.requires_auth());
    }
}
