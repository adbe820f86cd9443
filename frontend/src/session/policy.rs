//! Post-login authorization gate.
//!
//! Login proves who the user is; this decides whether they may stay. A
//! denied identity has its whole session wiped before the caller sees the
//! result.

use super::{AuthBackend, AuthError, AuthSession, LoginOutcome, TokenStore};
use shopdesk_shared::{UserProfile, UserType};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Access denied: Administrator privileges required")]
pub struct AccessDenied;

/// Result of [`RolePolicy::sign_in`].
#[derive(Debug, Clone, PartialEq)]
pub enum SignIn {
    Granted(UserProfile),
    /// Wrong credentials.
    Rejected,
    /// Valid credentials, insufficient role. Session already cleared.
    Denied(AccessDenied),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RolePolicy {
    allowed: Vec<UserType>,
}

impl Default for RolePolicy {
    fn default() -> Self {
        Self::admin_only()
    }
}

impl RolePolicy {
    pub fn admin_only() -> Self {
        Self::new([UserType::Admin])
    }

    pub fn new(allowed: impl IntoIterator<Item = UserType>) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
        }
    }

    /// A missing profile never passes.
    pub fn permits(&self, user: Option<&UserProfile>) -> bool {
        user.is_some_and(|u| self.allowed.contains(&u.user_type))
    }

    /// Check the persisted profile; on failure the session is logged out
    /// before returning.
    pub fn enforce<S, B>(&self, session: &AuthSession<S, B>) -> Result<UserProfile, AccessDenied>
    where
        S: TokenStore,
        B: AuthBackend,
    {
        match session.current_user() {
            Some(user) if self.permits(Some(&user)) => Ok(user),
            other => {
                log::warn!(
                    "[Session] {} lacks a privileged role, clearing session",
                    other.as_ref().map(|u| u.email.as_str()).unwrap_or("<no profile>")
                );
                session.logout();
                Err(AccessDenied)
            }
        }
    }

    /// Check a session that was already in the store (page reload, another
    /// tab). Only a stored profile with an unprivileged role is wiped; a token
    /// without a profile stays signed in.
    pub fn revalidate<S, B>(&self, session: &AuthSession<S, B>) -> Result<(), AccessDenied>
    where
        S: TokenStore,
        B: AuthBackend,
    {
        match session.current_user() {
            Some(user) if !self.permits(Some(&user)) => {
                log::warn!("[Session] Dropping stored session of {} without privileges", user.email);
                session.logout();
                Err(AccessDenied)
            }
            _ => Ok(()),
        }
    }

    /// `login` followed by `enforce`.
    pub async fn sign_in<S, B>(
        &self,
        session: &AuthSession<S, B>,
        identifier: &str,
        secret: &str,
    ) -> Result<SignIn, AuthError>
    where
        S: TokenStore,
        B: AuthBackend,
    {
        match session.login(identifier, secret).await? {
            LoginOutcome::Rejected => Ok(SignIn::Rejected),
            LoginOutcome::Success => Ok(match self.enforce(session) {
                Ok(user) => SignIn::Granted(user),
                Err(denied) => SignIn::Denied(denied),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryTokenStore;
    use crate::session::tests::FakeBackend;
    use shopdesk_shared::{STORAGE_ACCESS_KEY, STORAGE_REFRESH_KEY, STORAGE_USER_KEY};

    #[tokio::test]
    async fn test_admin_keeps_session() {
        let store = MemoryTokenStore::new();
        let session = AuthSession::new(store.clone(), FakeBackend::granting(UserType::Admin));

        let result = RolePolicy::admin_only()
            .sign_in(&session, "admin@shop.test", "pw")
            .await
            .unwrap();

        assert!(matches!(result, SignIn::Granted(ref u) if u.user_type == UserType::Admin));
        assert!(session.is_authenticated());
    }

    #[tokio::test]
    async fn test_non_admin_is_wiped() {
        let store = MemoryTokenStore::new();
        let session = AuthSession::new(store.clone(), FakeBackend::granting(UserType::User));

        let result = RolePolicy::admin_only()
            .sign_in(&session, "shopper@shop.test", "pw")
            .await
            .unwrap();

        assert_eq!(result, SignIn::Denied(AccessDenied));
        assert!(!session.is_authenticated());
        for key in [STORAGE_ACCESS_KEY, STORAGE_REFRESH_KEY, STORAGE_USER_KEY] {
            assert_eq!(store.get(key), None, "{} should be cleared", key);
        }
    }

    #[tokio::test]
    async fn test_rejected_passes_through() {
        let session = AuthSession::new(MemoryTokenStore::new(), FakeBackend::replying(Ok(None)));
        let result = RolePolicy::admin_only()
            .sign_in(&session, "admin@shop.test", "bad")
            .await
            .unwrap();
        assert_eq!(result, SignIn::Rejected);
    }

    #[test]
    fn test_missing_profile_denied() {
        let store = MemoryTokenStore::new();
        store.set(STORAGE_ACCESS_KEY, "t");
        let session = AuthSession::new(store.clone(), FakeBackend::replying(Ok(None)));

        assert_eq!(RolePolicy::admin_only().enforce(&session), Err(AccessDenied));
        assert!(store.is_empty());
    }

    #[test]
    fn test_token_only_session_survives_revalidation() {
        let store = MemoryTokenStore::new();
        store.set(STORAGE_ACCESS_KEY, "t");
        let session = AuthSession::new(store.clone(), FakeBackend::replying(Ok(None)));

        assert_eq!(RolePolicy::admin_only().revalidate(&session), Ok(()));
        assert!(session.is_authenticated());
        assert_eq!(store.get(STORAGE_ACCESS_KEY).as_deref(), Some("t"));
    }

    #[test]
    fn test_stored_shopper_is_revalidated_away() {
        let store = MemoryTokenStore::new();
        store.set(STORAGE_ACCESS_KEY, "t");
        store.set(STORAGE_USER_KEY, r#"{"email":"shopper@shop.test","user_type":"USER"}"#);
        let session = AuthSession::new(store.clone(), FakeBackend::replying(Ok(None)));

        assert_eq!(RolePolicy::admin_only().revalidate(&session), Err(AccessDenied));
        assert!(!session.is_authenticated());
        assert!(store.is_empty());

        store.set(STORAGE_ACCESS_KEY, "t");
        store.set(STORAGE_USER_KEY, r#"{"email":"admin@shop.test","user_type":"ADMIN"}"#);
        assert_eq!(RolePolicy::admin_only().revalidate(&session), Ok(()));
        assert!(session.is_authenticated());
    }

    #[test]
    fn test_custom_roles() {
        let policy = RolePolicy::new([UserType::Admin, UserType::User]);
        let user = UserProfile {
            email: "u@shop.test".into(),
            user_type: UserType::User,
        };
        assert!(policy.permits(Some(&user)));
        assert!(!RolePolicy::default().permits(Some(&user)));
        assert!(!policy.permits(None));
    }
}
