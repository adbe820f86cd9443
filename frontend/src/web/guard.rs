//! Route guard.
//!
//! Two states: the requested view is `Allowed`, or the navigation was
//! `Redirected` somewhere else. The originally requested path is not kept;
//! after a redirect to login the user lands on the default view once a
//! session appears.

use super::route::AppRoute;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Allowed(AppRoute),
    Redirected(AppRoute),
}

impl GuardState {
    /// The view to render.
    pub fn route(&self) -> AppRoute {
        match self {
            GuardState::Allowed(route) | GuardState::Redirected(route) => *route,
        }
    }

    pub fn is_allowed(&self) -> bool {
        matches!(self, GuardState::Allowed(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteGuard {
    landing: AppRoute,
    login: AppRoute,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new(AppRoute::Dashboard)
    }
}

impl RouteGuard {
    pub fn new(landing: AppRoute) -> Self {
        Self {
            landing,
            login: AppRoute::Login,
        }
    }

    pub fn landing(&self) -> AppRoute {
        self.landing
    }

    /// Decide a fresh navigation to `requested`.
    pub fn navigate(&self, requested: AppRoute, is_authenticated: bool) -> GuardState {
        if requested.is_public() {
            return GuardState::Allowed(requested);
        }
        match (requested, is_authenticated) {
            (AppRoute::NotFound, true) => GuardState::Allowed(self.landing),
            (_, false) => GuardState::Redirected(self.login),
            (route, true) => GuardState::Allowed(route),
        }
    }

    /// Re-run the guard for the state currently on screen after the session
    /// changed (logout, 401, another tab).
    pub fn reevaluate(&self, current: GuardState, is_authenticated: bool) -> GuardState {
        match current {
            GuardState::Allowed(route) => self.navigate(route, is_authenticated),
            GuardState::Redirected(_) if is_authenticated => GuardState::Allowed(self.landing),
            redirected @ GuardState::Redirected(_) => redirected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protected_without_session_goes_to_login() {
        let guard = RouteGuard::default();
        for route in [AppRoute::Home, AppRoute::Dashboard, AppRoute::Orders, AppRoute::Products] {
            assert_eq!(
                guard.navigate(route, false),
                GuardState::Redirected(AppRoute::Login)
            );
        }
    }

    #[test]
    fn test_protected_with_session_allowed() {
        let guard = RouteGuard::default();
        assert_eq!(
            guard.navigate(AppRoute::ProductManagement, true),
            GuardState::Allowed(AppRoute::ProductManagement)
        );
    }

    #[test]
    fn test_catch_all() {
        let guard = RouteGuard::default();
        assert_eq!(
            guard.navigate(AppRoute::NotFound, true),
            GuardState::Allowed(AppRoute::Dashboard)
        );
        assert_eq!(
            guard.navigate(AppRoute::NotFound, false),
            GuardState::Redirected(AppRoute::Login)
        );
    }

    #[test]
    fn test_login_always_public() {
        let guard = RouteGuard::default();
        assert_eq!(guard.navigate(AppRoute::Login, false), GuardState::Allowed(AppRoute::Login));
        assert_eq!(guard.navigate(AppRoute::Login, true), GuardState::Allowed(AppRoute::Login));
    }

    #[test]
    fn test_session_loss_flips_to_redirected() {
        let guard = RouteGuard::default();
        let on_screen = guard.navigate(AppRoute::Orders, true);
        assert!(on_screen.is_allowed());

        let after = guard.reevaluate(on_screen, false);
        assert_eq!(after, GuardState::Redirected(AppRoute::Login));
    }

    #[test]
    fn test_external_login_flips_redirect_to_allowed() {
        let guard = RouteGuard::default();
        let redirected = guard.navigate(AppRoute::Orders, false);

        // nothing changes while still logged out
        assert_eq!(guard.reevaluate(redirected, false), redirected);

        // another tab stores a token
        let after = guard.reevaluate(redirected, true);
        assert_eq!(after, GuardState::Allowed(AppRoute::Dashboard));
    }

    #[test]
    fn test_voluntary_login_page_stays() {
        let guard = RouteGuard::default();
        let on_login = guard.navigate(AppRoute::Login, false);
        assert_eq!(guard.reevaluate(on_login, true), on_login);
    }
}
