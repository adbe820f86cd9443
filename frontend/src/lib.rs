//! ShopDesk admin console.
//!
//! Context-driven layout:
//! - `web::route` / `web::guard`: route table and the pure guard state machine
//! - `web::router`: router service applying the guard to browser history
//! - `session`: persisted session, login and the role gate
//! - `auth`: reactive wrapper around the session, shared through context
//! - `components`: views

pub mod analytics;
pub mod api;
mod auth;
pub mod config;
pub mod fetch;
pub mod forms;
pub mod logging;
pub mod session;

mod components {
    pub mod dashboard;
    pub mod layout;
    pub mod login;
    pub mod notification;
    pub mod orders;
    pub mod product_management;
    pub mod products;
    pub mod table;
}

use leptos::prelude::*;

use crate::auth::AuthContext;
use crate::components::dashboard::DashboardPage;
use crate::components::layout::{HomePage, Layout};
use crate::components::login::LoginPage;
use crate::components::orders::OrdersPage;
use crate::components::product_management::ProductManagementPage;
use crate::components::products::ProductsPage;
use crate::config::AppConfig;

/// Browser bindings: fetch, LocalStorage, History.
pub mod web {
    mod dialog;
    pub mod guard;
    mod http;
    pub mod route;
    pub mod router;
    mod storage;

    pub use dialog::confirm;
    pub use http::GlooTransport;
    pub use storage::LocalStorage;
}

use web::route::AppRoute;
use web::router::{Router, RouterOutlet};

fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Login => view! { <LoginPage /> }.into_any(),
        AppRoute::Home => view! { <Layout><HomePage /></Layout> }.into_any(),
        AppRoute::Dashboard => view! { <Layout><DashboardPage /></Layout> }.into_any(),
        AppRoute::Orders => view! { <Layout><OrdersPage /></Layout> }.into_any(),
        AppRoute::Products => view! { <Layout><ProductsPage /></Layout> }.into_any(),
        AppRoute::ProductManagement => view! { <Layout><ProductManagementPage /></Layout> }.into_any(),
        // the guard resolves unknown paths; this only shows if that changes
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-screen bg-base-200">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-error">"404"</h1>
                    <p class="text-xl mt-4">"Page not found"</p>
                </div>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App(config: AppConfig) -> impl IntoView {
    let auth_ctx = AuthContext::new(&config);
    provide_context(auth_ctx);
    auth_ctx.listen_cross_tab();

    let is_authenticated = auth_ctx.is_authenticated_signal();

    view! {
        <Router landing=config.landing_route is_authenticated=is_authenticated>
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}
