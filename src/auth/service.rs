use std::sync::Arc;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::RngCore;
use tracing::{debug, info};

use crate::auth::store::AuthStore;
use crate::db::models::{PublicUser, Session, User};
use crate::error::{AppError, AuthError, DatabaseError};
use crate::Result;

/// Fixed bcrypt work factor, matching the cost the user store was
/// populated with.
pub const HASH_COST: u32 = 10;

const SESSION_TOKEN_BYTES: usize = 32;

pub struct AuthService {
    store: Arc<dyn AuthStore>,
    hash_cost: u32,
    session_ttl_hours: i64,
}

impl AuthService {
    pub fn new(store: Arc<dyn AuthStore>, hash_cost: u32, session_ttl_hours: i64) -> Self {
        Self {
            store,
            hash_cost,
            session_ttl_hours,
        }
    }

    /// Creates a new account. Uniqueness is enforced by the store's
    /// unique index; a duplicate insert becomes the 409 Conflict and
    /// performs no write. There is no read-then-write race window.
    pub async fn sign_up(&self, username: &str, password: &str) -> Result<PublicUser> {
        let hashed = bcrypt::hash(password, self.hash_cost)?;
        let user = User::new(username.to_string(), hashed);

        match self.store.create_user(&user).await {
            Ok(created) => {
                info!("Created user {}", created.username);
                Ok(created.into_public())
            }
            Err(AppError::DatabaseError(DatabaseError::Duplicate)) => Err(AppError::UsernameTaken),
            Err(e) => Err(e),
        }
    }

    /// Verifies credentials. A missing user short-circuits before the
    /// comparator runs; both that case and a hash mismatch surface as
    /// the same `InvalidCredentials`.
    pub async fn login(&self, username: &str, password: &str) -> Result<PublicUser> {
        let user = self
            .store
            .find_user_by_username(username)
            .await?
            .ok_or(AppError::AuthError(AuthError::InvalidCredentials))?;

        if !bcrypt::verify(password, &user.hashed_password)? {
            return Err(AppError::AuthError(AuthError::InvalidCredentials));
        }

        debug!("Login verified for {}", user.username);
        Ok(user.into_public())
    }

    /// Issues a fresh opaque session token for the user and persists it.
    pub async fn start_session(&self, user_id: uuid::Uuid) -> Result<Session> {
        let session = Session::new(user_id, generate_token(), self.session_ttl_hours);
        self.store.create_session(&session).await
    }

    /// Resolves a session token to its user, rejecting unknown and
    /// expired tokens. Valid lookups refresh the activity timestamp.
    pub async fn current_user(&self, token: &str) -> Result<PublicUser> {
        let session = self
            .store
            .session_by_token(token)
            .await?
            .ok_or(AppError::AuthError(AuthError::InvalidSession))?;

        if session.is_expired() {
            return Err(AppError::AuthError(AuthError::SessionExpired));
        }

        let user = self
            .store
            .find_user_by_id(session.user_id)
            .await?
            .ok_or(AppError::AuthError(AuthError::InvalidSession))?;

        self.store.touch_session(token).await?;
        Ok(user.into_public())
    }

    pub async fn end_session(&self, token: &str) -> Result<()> {
        self.store.delete_session(token).await
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
