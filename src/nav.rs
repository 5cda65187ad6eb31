//! Navigation seam for forced redirects.
//!
//! The session layer never decides how a redirect is rendered; it calls
//! [`Navigator::replace`] and the embedding application (a UI shell, the CLI,
//! a test) decides what that means.

use std::sync::Mutex;

use tracing::info;

/// Unauthenticated landing route.
pub const LOGIN_ROUTE: &str = "/login";

/// Hard navigation that replaces the current location.
pub trait Navigator: Send + Sync {
    fn replace(&self, route: &str);
}

/// Records every redirect in order.
#[derive(Debug, Default)]
pub struct NavigationLog {
    history: Mutex<Vec<String>>,
}

impl NavigationLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn history(&self) -> Vec<String> {
        match self.history.lock() {
            Ok(history) => history.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    #[must_use]
    pub fn last(&self) -> Option<String> {
        self.history().pop()
    }
}

impl Navigator for NavigationLog {
    fn replace(&self, route: &str) {
        let mut history = match self.history.lock() {
            Ok(history) => history,
            Err(poisoned) => poisoned.into_inner(),
        };
        history.push(route.to_owned());
    }
}

/// Reports redirects through `tracing`. Used where there is no page to leave.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn replace(&self, route: &str) {
        info!(%route, "redirect");
    }
}

#[cfg(test)]
#[path = "nav_test.rs"]
mod tests;
