//! Authentication state and the login/logout lifecycle.
//!
//! ARCHITECTURE
//! ============
//! `Session` is the single process-wide service every other component is
//! handed: it owns the session store, the reactive `AuthState` flag and the
//! navigator used for forced redirects. `AuthProvider` layers the explicit
//! `login`/`logout` operations on top of it using an `ApiClient`.
//!
//! The flag starts as `Authenticated` iff a token is stored, and afterwards
//! only moves through `mark_authenticated`, `end` and `detach`, all of which
//! keep it in step with the store.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use super::session::SessionStore;
use super::storage::StorageError;
use crate::error::ApiError;
use crate::nav::{LOGIN_ROUTE, Navigator};
use crate::net::api;
use crate::net::client::ApiClient;
use crate::net::types::{Credentials, LoginResponse};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Authenticated,
    Unauthenticated,
}

/// Why a session ended. Only used for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    Logout,
    SessionInvalid,
    ClearedElsewhere,
    PasswordChanged,
}

impl EndReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Logout => "logout",
            Self::SessionInvalid => "session_invalid",
            Self::ClearedElsewhere => "cleared_elsewhere",
            Self::PasswordChanged => "password_changed",
        }
    }
}

// =============================================================================
// SESSION
// =============================================================================

#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    store: SessionStore,
    state: watch::Sender<AuthState>,
    navigator: Arc<dyn Navigator>,
}

impl Session {
    #[must_use]
    pub fn new(store: SessionStore, navigator: Arc<dyn Navigator>) -> Self {
        let initial = if store.has_token() { AuthState::Authenticated } else { AuthState::Unauthenticated };
        let (state, _) = watch::channel(initial);
        Self { inner: Arc::new(SessionInner { store, state, navigator }) }
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.inner.store
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        *self.inner.state.borrow()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state() == AuthState::Authenticated
    }

    /// Watch the auth flag. The receiver sees every later transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.state.subscribe()
    }

    pub(crate) fn mark_authenticated(&self) {
        self.inner.state.send_replace(AuthState::Authenticated);
    }

    /// Forced logout: clear the store, drop to `Unauthenticated` and redirect
    /// to the login route. Safe to call any number of times.
    pub fn end(&self, reason: EndReason) {
        if let Err(e) = self.inner.store.clear_session() {
            warn!(error = %e, reason = reason.as_str(), "failed to clear session storage");
        }
        self.detach(reason);
    }

    /// Drop to `Unauthenticated` and redirect without touching storage.
    pub fn detach(&self, reason: EndReason) {
        let previous = self.inner.state.send_replace(AuthState::Unauthenticated);
        info!(
            reason = reason.as_str(),
            was_authenticated = previous == AuthState::Authenticated,
            "session ended"
        );
        self.inner.navigator.replace(LOGIN_ROUTE);
    }
}

// =============================================================================
// AUTH PROVIDER
// =============================================================================

#[derive(Clone)]
pub struct AuthProvider {
    client: ApiClient,
}

impl AuthProvider {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        self.client.session()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session().is_authenticated()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.session().subscribe()
    }

    /// Authenticate against the admin login endpoint.
    ///
    /// On success the token (and any user/session payload) is stored and the
    /// state is `Authenticated`. On failure the stored session is left as it
    /// was before the call.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` for blank credentials, otherwise the request
    /// error, or `Storage` if the session could not be persisted.
    pub async fn login(&self, credentials: &Credentials) -> Result<(), ApiError> {
        credentials.validate()?;
        let response = api::login_admin(&self.client, credentials).await?;

        let store = self.session().store();
        let previous = store.snapshot()?;
        if let Err(e) = persist_login(store, &response) {
            if let Err(restore_err) = store.restore(&previous) {
                warn!(error = %restore_err, "failed to roll back partial login");
            }
            return Err(e.into());
        }

        self.session().mark_authenticated();
        info!(email = %credentials.email, "admin login succeeded");
        Ok(())
    }

    /// Log out remotely (best-effort) and always locally.
    ///
    /// # Errors
    ///
    /// Returns the remote failure after the local session has been cleared.
    /// A server that already considers the session invalid is not a failure.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let remote = api::logout_user(&self.client).await;
        self.session().end(EndReason::Logout);

        match remote {
            Ok(()) | Err(ApiError::SessionInvalid { .. }) => Ok(()),
            Err(e) => {
                warn!(error = %e, "remote logout failed; local session cleared");
                Err(e)
            }
        }
    }
}

fn persist_login(store: &SessionStore, response: &LoginResponse) -> Result<(), StorageError> {
    if let Some(user) = response.user() {
        store.set_user_data(user)?;
    }
    if let Some(session) = response.session() {
        store.set_session_data(session)?;
    }
    store.set_token(response.token())
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
