//! Session store: the persisted token and cached login payloads.
//!
//! DESIGN
//! ======
//! This is the only module that knows the storage key names. Everything else
//! goes through `SessionStore`, so token reads and writes have a single
//! owner. Token presence is the sole source of truth for "authenticated"; an
//! empty stored token counts as absent.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::storage::{StorageContext, StorageError};

/// Opaque session credential.
pub const AUTH_TOKEN_KEY: &str = "auth_token";
/// JSON snapshot of the logged-in user's profile.
pub const USER_DATA_KEY: &str = "user_data";
/// JSON session metadata returned by login.
pub const SESSION_DATA_KEY: &str = "session_data";

/// Best-effort profile snapshot cached at login. Never authoritative.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CachedProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Raw values of the session keys at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    entries: [(&'static str, Option<String>); 3],
}

const SESSION_KEYS: [&str; 3] = [AUTH_TOKEN_KEY, USER_DATA_KEY, SESSION_DATA_KEY];

#[derive(Clone)]
pub struct SessionStore {
    storage: StorageContext,
}

impl SessionStore {
    #[must_use]
    pub fn new(storage: StorageContext) -> Self {
        Self { storage }
    }

    #[must_use]
    pub fn context(&self) -> &StorageContext {
        &self.storage
    }

    /// Store the session token, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage write fails.
    pub fn set_token(&self, token: &str) -> Result<(), StorageError> {
        self.storage.set_item(AUTH_TOKEN_KEY, token)
    }

    /// Current session token, `None` when absent or empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage read fails.
    pub fn token(&self) -> Result<Option<String>, StorageError> {
        Ok(self.storage.get_item(AUTH_TOKEN_KEY)?.filter(|t| !t.is_empty()))
    }

    /// Whether a usable token is stored. Unreadable storage counts as no token.
    #[must_use]
    pub fn has_token(&self) -> bool {
        matches!(self.token(), Ok(Some(_)))
    }

    /// Remove the token and every cached payload.
    ///
    /// # Errors
    ///
    /// Returns an error if any removal fails; earlier removals stay applied.
    pub fn clear_session(&self) -> Result<(), StorageError> {
        self.storage.remove_item(AUTH_TOKEN_KEY)?;
        self.storage.remove_item(USER_DATA_KEY)?;
        self.storage.remove_item(SESSION_DATA_KEY)
    }

    /// Capture the session keys so a failed update can be undone.
    ///
    /// # Errors
    ///
    /// Returns an error if a storage read fails.
    pub fn snapshot(&self) -> Result<SessionSnapshot, StorageError> {
        let mut snapshot = SessionSnapshot::default();
        for (slot, key) in snapshot.entries.iter_mut().zip(SESSION_KEYS) {
            *slot = (key, self.storage.get_item(key)?);
        }
        Ok(snapshot)
    }

    /// Put every session key back to its value in `snapshot`, removing keys
    /// that were absent.
    ///
    /// # Errors
    ///
    /// Returns the first failed write; earlier keys stay restored.
    pub fn restore(&self, snapshot: &SessionSnapshot) -> Result<(), StorageError> {
        for (key, value) in &snapshot.entries {
            match value {
                Some(value) => self.storage.set_item(key, value)?,
                None => self.storage.remove_item(key)?,
            }
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Returns an error if serialization or the storage write fails.
    pub fn set_user_data(&self, user: &Value) -> Result<(), StorageError> {
        self.storage.set_item(USER_DATA_KEY, &serde_json::to_string(user)?)
    }

    /// Raw cached user payload. Unreadable or malformed data yields `None`.
    #[must_use]
    pub fn user_data(&self) -> Option<Value> {
        self.read_json(USER_DATA_KEY)
    }

    /// Cached profile fields, if a user payload was stored at login.
    #[must_use]
    pub fn user_profile(&self) -> Option<CachedProfile> {
        let value = self.user_data()?;
        match serde_json::from_value(value) {
            Ok(profile) => Some(profile),
            Err(e) => {
                debug!(error = %e, "cached user data is not a profile");
                None
            }
        }
    }

    /// # Errors
    ///
    /// Returns an error if serialization or the storage write fails.
    pub fn set_session_data(&self, session: &Value) -> Result<(), StorageError> {
        self.storage.set_item(SESSION_DATA_KEY, &serde_json::to_string(session)?)
    }

    #[must_use]
    pub fn session_data(&self) -> Option<Value> {
        self.read_json(SESSION_DATA_KEY)
    }

    fn read_json(&self, key: &str) -> Option<Value> {
        let raw = match self.storage.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                debug!(error = %e, key, "cached payload unreadable");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                debug!(error = %e, key, "cached payload is not JSON");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
