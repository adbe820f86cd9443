//! Session lifecycle.
//!
//! `AuthSession` is the only writer of the persisted session slots. It does
//! authentication only; role checks live in [`policy`].

mod policy;
mod token_store;

pub use policy::{AccessDenied, RolePolicy, SignIn};
pub use token_store::{MemoryTokenStore, TokenStore};

use async_trait::async_trait;
use shopdesk_shared::{
    LoginRequest, STORAGE_ACCESS_KEY, STORAGE_REFRESH_KEY, STORAGE_USER_KEY, SessionGrant,
    UserProfile,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

/// Failures that are not a plain "wrong password".
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AuthError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("unexpected login response: {0}")]
    Decode(String),
    #[error("could not persist the session ({0})")]
    Storage(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Success,
    /// Credentials refused. Nothing was written.
    Rejected,
}

impl LoginOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, LoginOutcome::Success)
    }
}

/// Credential exchange against the auth API.
///
/// `Ok(None)` means the server refused the credentials.
#[async_trait(?Send)]
pub trait AuthBackend {
    async fn exchange(&self, request: &LoginRequest) -> Result<Option<SessionGrant>, AuthError>;
}

/// Point-in-time view of the persisted session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub access_token: Option<String>,
    pub user: Option<UserProfile>,
}

impl SessionSnapshot {
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(&SessionSnapshot) + Send + Sync>;

pub struct AuthSession<S, B> {
    store: S,
    backend: B,
    listeners: Mutex<Vec<(SubscriptionId, Listener)>>,
    next_id: AtomicU64,
}

impl<S: TokenStore, B: AuthBackend> AuthSession<S, B> {
    pub fn new(store: S, backend: B) -> Self {
        Self {
            store,
            backend,
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Exchange credentials and persist the granted session.
    ///
    /// A refused login is `Ok(LoginOutcome::Rejected)`, not an error.
    pub async fn login(&self, identifier: &str, secret: &str) -> Result<LoginOutcome, AuthError> {
        let request = LoginRequest {
            email: identifier.trim().to_string(),
            password: secret.to_string(),
        };

        let Some(grant) = self.backend.exchange(&request).await? else {
            log::info!("[Session] Login rejected for {}", request.email);
            return Ok(LoginOutcome::Rejected);
        };

        if let Err(err) = self.persist(&grant) {
            self.wipe();
            self.notify();
            return Err(err);
        }

        log::info!("[Session] Logged in as {}", request.email);
        self.notify();
        Ok(LoginOutcome::Success)
    }

    /// Clear every session slot. Idempotent, never fails.
    pub fn logout(&self) {
        self.wipe();
        log::info!("[Session] Logged out");
        self.notify();
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.get(STORAGE_ACCESS_KEY).is_some()
    }

    pub fn access_token(&self) -> Option<String> {
        self.store.get(STORAGE_ACCESS_KEY)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.store.get(STORAGE_REFRESH_KEY)
    }

    /// Last persisted profile. A slot that does not decode reads as `None`.
    pub fn current_user(&self) -> Option<UserProfile> {
        let raw = self.store.get(STORAGE_USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(err) => {
                log::warn!("[Session] Ignoring unreadable user profile: {}", err);
                None
            }
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            access_token: self.access_token(),
            user: self.current_user(),
        }
    }

    /// Re-read the store after someone else (another tab) changed it and
    /// tell subscribers.
    pub fn sync_from_store(&self) -> SessionSnapshot {
        let snapshot = self.snapshot();
        log::debug!(
            "[Session] External change, authenticated={}",
            snapshot.is_authenticated()
        );
        self.dispatch(&snapshot);
        snapshot
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&SessionSnapshot) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(sid, _)| *sid != id);
        listeners.len() != before
    }

    // user and refresh go first so an observer that sees the access token
    // also sees the rest of the session
    fn persist(&self, grant: &SessionGrant) -> Result<(), AuthError> {
        match &grant.user {
            Some(user) => {
                let json =
                    serde_json::to_string(user).map_err(|e| AuthError::Decode(e.to_string()))?;
                if !self.store.set(STORAGE_USER_KEY, &json) {
                    return Err(AuthError::Storage(STORAGE_USER_KEY));
                }
            }
            None => self.store.remove(STORAGE_USER_KEY),
        }

        match &grant.refresh {
            Some(refresh) => {
                if !self.store.set(STORAGE_REFRESH_KEY, refresh) {
                    return Err(AuthError::Storage(STORAGE_REFRESH_KEY));
                }
            }
            None => self.store.remove(STORAGE_REFRESH_KEY),
        }

        if !self.store.set(STORAGE_ACCESS_KEY, &grant.access) {
            return Err(AuthError::Storage(STORAGE_ACCESS_KEY));
        }
        Ok(())
    }

    // access first, so the session stops counting as authenticated before the
    // rest disappears
    fn wipe(&self) {
        self.store.remove(STORAGE_ACCESS_KEY);
        self.store.remove(STORAGE_REFRESH_KEY);
        self.store.remove(STORAGE_USER_KEY);
    }

    fn notify(&self) {
        let snapshot = self.snapshot();
        self.dispatch(&snapshot);
    }

    fn dispatch(&self, snapshot: &SessionSnapshot) {
        // listeners may (un)subscribe, so call them outside the lock
        let listeners: Vec<Listener> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, l)| l.clone())
            .collect();
        for listener in listeners {
            listener(snapshot);
        }
    }
}
