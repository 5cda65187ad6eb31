//! Session lifecycle and admin API client for the Poolyfi admin dashboard.
//!
//! ARCHITECTURE
//! ============
//! - `state`: shared storage, the token store, the reactive auth flag with
//!   login/logout, and the cross-context sync task.
//! - `net`: the authenticated request wrapper and typed endpoint calls.
//! - `nav`: the redirect seam used on forced logout.
//! - `config` / `error`: environment config and the error taxonomy.
//!
//! A typical embedding opens one [`state::storage::SharedStorage`], builds a
//! [`state::auth::Session`] per context, hands it to a [`net::client::ApiClient`]
//! and wraps that in an [`state::auth::AuthProvider`].

pub mod config;
pub mod error;
pub mod nav;
pub mod net;
pub mod state;
