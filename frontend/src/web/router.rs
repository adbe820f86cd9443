//! Router service.
//!
//! Owns every `window.history` call. Each navigation goes request →
//! [`RouteGuard`] → history → render; the same guard runs for `popstate`
//! and whenever the injected auth signal changes.

use leptos::prelude::*;
use wasm_bindgen::prelude::*;

use super::guard::{GuardState, RouteGuard};
use super::route::AppRoute;

fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

fn push_history_state(path: &str) {
    if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
        let _ = history.push_state_with_url(&JsValue::NULL, "", Some(path));
    }
}

fn replace_history_state(path: &str) {
    if let Some(history) = web_sys::window().and_then(|w| w.history().ok()) {
        let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(path));
    }
}

#[derive(Clone, Copy)]
pub struct RouterService {
    state: ReadSignal<GuardState>,
    set_state: WriteSignal<GuardState>,
    route: Memo<AppRoute>,
    guard: RouteGuard,
    is_authenticated: Signal<bool>,
}

impl RouterService {
    fn new(guard: RouteGuard, is_authenticated: Signal<bool>) -> Self {
        let requested = AppRoute::from_path(&current_path());
        let initial = guard.navigate(requested, is_authenticated.get_untracked());
        if initial.route() != requested {
            replace_history_state(initial.route().to_path());
        }
        let (state, set_state) = signal(initial);
        let route = Memo::new(move |_| state.get().route());

        Self {
            state,
            set_state,
            route,
            guard,
            is_authenticated,
        }
    }

    /// The view on screen.
    pub fn current_route(&self) -> Memo<AppRoute> {
        self.route
    }

    pub fn landing(&self) -> AppRoute {
        self.guard.landing()
    }

    pub fn navigate(&self, path: &str) {
        self.navigate_to(AppRoute::from_path(path));
    }

    pub fn navigate_to(&self, requested: AppRoute) {
        let next = self
            .guard
            .navigate(requested, self.is_authenticated.get_untracked());
        if !next.is_allowed() {
            log::info!("[Router] {} needs a session, redirecting to {}", requested, next.route());
        }
        self.commit(next, next.is_allowed() && next.route() == requested);
    }

    /// Apply a guard decision. Redirects replace the history entry so Back
    /// does not bounce through the guarded page.
    fn commit(&self, next: GuardState, push: bool) {
        let path = next.route().to_path();
        if push {
            push_history_state(path);
        } else {
            replace_history_state(path);
        }
        self.set_state.set(next);
    }

    fn init_popstate_listener(&self) {
        let router = *self;
        let closure = Closure::<dyn Fn()>::new(move || {
            let requested = AppRoute::from_path(&current_path());
            let next = router
                .guard
                .navigate(requested, router.is_authenticated.get_untracked());
            if next.route() != requested {
                log::info!("[Router] Back/forward to {} blocked", requested);
                replace_history_state(next.route().to_path());
            }
            router.set_state.set(next);
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        closure.forget();
    }

    /// Re-run the guard whenever the session appears or disappears
    /// (login, logout, 401, another tab).
    fn setup_auth_redirect(&self) {
        let router = *self;
        Effect::new(move |_| {
            let is_auth = router.is_authenticated.get();
            let current = router.state.get_untracked();
            let next = router.guard.reevaluate(current, is_auth);
            if next != current {
                log::info!(
                    "[Router] Session changed (authenticated={}), {} -> {}",
                    is_auth,
                    current.route(),
                    next.route()
                );
                router.commit(next, false);
            }
        });
    }
}

fn provide_router(guard: RouteGuard, is_authenticated: Signal<bool>) -> RouterService {
    let router = RouterService::new(guard, is_authenticated);
    router.init_popstate_listener();
    router.setup_auth_redirect();
    provide_context(router);
    router
}

pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

#[component]
pub fn Router(
    /// Where a session lands after login or a catch-all hit.
    landing: AppRoute,
    is_authenticated: Signal<bool>,
    children: Children,
) -> impl IntoView {
    provide_router(RouteGuard::new(landing), is_authenticated);
    children()
}

#[component]
pub fn RouterOutlet(matcher: fn(AppRoute) -> AnyView) -> impl IntoView {
    let router = use_router();
    move || matcher(router.current_route().get())
}

/// In-app link: no page reload, still guarded.
#[component]
pub fn Link(
    to: AppRoute,
    #[prop(optional, into)] class: Signal<String>,
    children: Children,
) -> impl IntoView {
    let router = use_router();
    let on_click = move |ev: web_sys::MouseEvent| {
        ev.prevent_default();
        router.navigate_to(to);
    };

    view! {
        <a href=to.to_path() class=class on:click=on_click>
            {children()}
        </a>
    }
}
