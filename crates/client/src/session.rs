//! Session store for persisted credentials.
//!
//! Wraps the [`LocalStore`](crate::store::LocalStore) with typed access to
//! the token pair. Pure storage - no network. The refresh flow itself lives
//! in the API client; this type only answers "what tokens do we hold" and
//! enforces the fail-closed clear.

use secrecy::SecretString;

use crate::store::{LocalStore, StoreError, keys};

/// Typed access to the persisted session credentials.
///
/// Cheaply cloneable; clones share the same backing store.
#[derive(Clone)]
pub struct SessionStore {
    store: LocalStore,
}

impl SessionStore {
    /// Create a session store over the given local store.
    #[must_use]
    pub const fn new(store: LocalStore) -> Self {
        Self { store }
    }

    /// The current access token, if any.
    #[must_use]
    pub fn access_token(&self) -> Option<SecretString> {
        self.store
            .get::<String>(keys::ACCESS_TOKEN)
            .map(SecretString::from)
    }

    /// The current refresh token, if any.
    #[must_use]
    pub fn refresh_token(&self) -> Option<SecretString> {
        self.store
            .get::<String>(keys::REFRESH_TOKEN)
            .map(SecretString::from)
    }

    /// The CSRF token for cookie-session deployments, if any.
    #[must_use]
    pub fn csrf_token(&self) -> Option<String> {
        self.store.get::<String>(keys::CSRF_TOKEN)
    }

    /// Whether any access token is held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.access_token().is_some()
    }

    /// Store a freshly issued token pair (login / OTP verify).
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing store cannot be written.
    pub fn set_tokens(&self, access: &str, refresh: &str) -> Result<(), StoreError> {
        self.store.set(keys::ACCESS_TOKEN, &access)?;
        self.store.set(keys::REFRESH_TOKEN, &refresh)
    }

    /// Replace only the access token (successful refresh).
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing store cannot be written.
    pub fn set_access_token(&self, access: &str) -> Result<(), StoreError> {
        self.store.set(keys::ACCESS_TOKEN, &access)
    }

    /// Store the CSRF token for cookie-session deployments.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing store cannot be written.
    pub fn set_csrf_token(&self, token: &str) -> Result<(), StoreError> {
        self.store.set(keys::CSRF_TOKEN, &token)
    }

    /// Clear all credentials (logout, or unrecoverable refresh failure).
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the backing store cannot be written.
    pub fn clear(&self) -> Result<(), StoreError> {
        self.store.remove(keys::ACCESS_TOKEN)?;
        self.store.remove(keys::REFRESH_TOKEN)?;
        self.store.remove(keys::CSRF_TOKEN)
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;

    fn session() -> SessionStore {
        SessionStore::new(LocalStore::in_memory())
    }

    #[test]
    fn test_empty_session() {
        let session = session();
        assert!(session.access_token().is_none());
        assert!(session.refresh_token().is_none());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_set_and_read_tokens() {
        let session = session();
        session.set_tokens("acc-1", "ref-1").expect("set");

        assert_eq!(
            session.access_token().expect("access").expose_secret(),
            "acc-1"
        );
        assert_eq!(
            session.refresh_token().expect("refresh").expose_secret(),
            "ref-1"
        );
        assert!(session.is_authenticated());
    }

    #[test]
    fn test_refresh_replaces_only_access() {
        let session = session();
        session.set_tokens("acc-1", "ref-1").expect("set");
        session.set_access_token("acc-2").expect("set access");

        assert_eq!(
            session.access_token().expect("access").expose_secret(),
            "acc-2"
        );
        assert_eq!(
            session.refresh_token().expect("refresh").expose_secret(),
            "ref-1"
        );
    }

    #[test]
    fn test_clear_removes_everything() {
        let session = session();
        session.set_tokens("acc", "ref").expect("set");
        session.set_csrf_token("csrf").expect("set csrf");

        session.clear().expect("clear");

        assert!(session.access_token().is_none());
        assert!(session.refresh_token().is_none());
        assert!(session.csrf_token().is_none());
    }
}
