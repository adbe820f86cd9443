//! Authentication context.
//!
//! Wraps the browser [`AuthSession`] in reactive state shared through the
//! Leptos context. The router only sees [`AuthContext::is_authenticated_signal`];
//! it never touches the session directly.

use std::sync::Arc;

use leptos::prelude::*;
use shopdesk_shared::{STORAGE_ACCESS_KEY, STORAGE_REFRESH_KEY, STORAGE_USER_KEY, UserProfile};

use crate::api::{AdminApi, ApiError, HttpAuthBackend, report_failure};
use crate::config::AppConfig;
use crate::session::{AuthError, AuthSession, RolePolicy, SessionSnapshot, SignIn};
use crate::web::{GlooTransport, LocalStorage};

pub type WebSession = AuthSession<LocalStorage, HttpAuthBackend<GlooTransport>>;

#[derive(Clone, Copy)]
pub struct AuthContext {
    session: StoredValue<Arc<WebSession>>,
    policy: StoredValue<RolePolicy>,
    base_url: StoredValue<String>,
    /// Mirrors the persisted session; updated by a session subscription.
    pub state: ReadSignal<SessionSnapshot>,
}

impl AuthContext {
    pub fn new(config: &AppConfig) -> Self {
        let backend = HttpAuthBackend::new(AdminApi::new(config.api_base_url.clone(), GlooTransport));
        let session = Arc::new(AuthSession::new(LocalStorage, backend));
        let policy = RolePolicy::new(config.privileged_roles.iter().copied());

        let (state, set_state) = signal(session.snapshot());
        session.subscribe(move |snapshot| set_state.set(snapshot.clone()));

        if session.is_authenticated() {
            let _ = policy.revalidate(&*session);
        }

        Self {
            session: StoredValue::new(session),
            policy: StoredValue::new(policy),
            base_url: StoredValue::new(config.api_base_url.clone()),
            state,
        }
    }

    /// For the router guard.
    pub fn is_authenticated_signal(&self) -> Signal<bool> {
        let state = self.state;
        Signal::derive(move || state.with(SessionSnapshot::is_authenticated))
    }

    pub fn user(&self) -> Signal<Option<UserProfile>> {
        let state = self.state;
        Signal::derive(move || state.with(|s| s.user.clone()))
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<SignIn, AuthError> {
        let session = self.session.get_value();
        let policy = self.policy.get_value();
        policy.sign_in(&*session, email, password).await
    }

    pub fn logout(&self) {
        self.session.get_value().logout();
    }

    /// Client carrying the current access token.
    pub fn api(&self) -> AdminApi<GlooTransport> {
        let token = self.session.get_value().access_token();
        AdminApi::new(self.base_url.get_value(), GlooTransport).with_token(token)
    }

    /// See [`report_failure`]: a 401 ends the session.
    pub fn handle_error(&self, context: &str, err: &ApiError) -> String {
        report_failure(&*self.session.get_value(), context, err)
    }

    /// Follow logins and logouts made in other tabs.
    pub fn listen_cross_tab(&self) {
        let session = self.session.get_value();
        let policy = self.policy.get_value();
        LocalStorage::on_change(move |key| {
            let relevant = match key.as_deref() {
                // `clear()` in the other tab
                None => true,
                Some(k) => [STORAGE_ACCESS_KEY, STORAGE_REFRESH_KEY, STORAGE_USER_KEY].contains(&k),
            };
            if relevant && session.sync_from_store().is_authenticated() {
                let _ = policy.revalidate(&*session);
            }
        });
    }
}

pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}
