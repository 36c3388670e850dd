//! Authentication: sign-up/login against the user store, and the
//! opaque-token session lifecycle behind the `sessionId` cookie.

pub mod handlers;
pub mod service;
pub mod store;

pub use service::{AuthService, HASH_COST};
pub use store::AuthStore;

/// Cookie carrying the opaque session token.
pub const SESSION_COOKIE: &str = "sessionId";
