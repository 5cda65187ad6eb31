//! Client-side session state.
//!
//! DESIGN
//! ======
//! Split by concern so each piece can be tested on its own: `storage` is the
//! shared key-value area, `session` the token store on top of it, `auth` the
//! reactive flag plus login/logout, and `sync` the cross-tab watcher.

pub mod auth;
pub mod session;
pub mod storage;
pub mod sync;
