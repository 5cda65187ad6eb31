//! Cross-tab logout synchronization.
//!
//! Watches the shared storage for the session token disappearing because
//! another context logged out or cleared the area. When that happens while
//! this context still believes it is authenticated, the context is detached
//! and sent to the login route. The watcher only reacts; it never writes to
//! storage, so it cannot trigger other contexts' watchers itself.

use tokio::task::JoinHandle;
use tracing::debug;

use super::auth::{EndReason, Session};
use super::session::AUTH_TOKEN_KEY;
use super::storage::{StorageEvent, StorageUpdate};

/// Whether `event` means the session token is gone.
#[must_use]
pub fn clears_token(event: &StorageEvent) -> bool {
    let token_key = match event.key.as_deref() {
        Some(key) => key == AUTH_TOKEN_KEY,
        None => true,
    };
    token_key && event.new_value.is_none()
}

/// Spawn the watcher for `session`. The subscription is taken before this
/// returns, so changes made right after the call are not missed. If the
/// watcher falls behind, it re-checks the stored token instead.
pub fn spawn_cross_tab_sync(session: Session) -> JoinHandle<()> {
    let mut events = session.store().context().subscribe();
    tokio::spawn(async move {
        while let Some(update) = events.recv().await {
            let cleared = match update {
                StorageUpdate::Changed(event) => clears_token(&event),
                StorageUpdate::Lagged(_) => !session.store().has_token(),
            };
            if !cleared {
                continue;
            }
            if !session.is_authenticated() {
                debug!("token cleared elsewhere while already logged out");
                continue;
            }
            session.detach(EndReason::ClearedElsewhere);
        }
    })
}

#[cfg(test)]
#[path = "sync_test.rs"]
mod tests;
