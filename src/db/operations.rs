use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::store::AuthStore;
use crate::db::models::{Chat, ChatMessage, Session, User};
use crate::Result;

#[derive(Clone)]
pub struct DbOperations {
    pool: Arc<PgPool>,
}

impl DbOperations {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    // ---- chats ----

    pub async fn create_chat(&self, user_id: Uuid, title: &str) -> Result<Chat> {
        let now = Utc::now();
        let chat = sqlx::query_as::<_, Chat>(
            r#"
            INSERT INTO chats (id, user_id, title, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id, user_id, title, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(title)
        .bind(now)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(chat)
    }

    /// Recent chats for the sidebar, newest activity first.
    pub async fn recent_chats(&self, user_id: Uuid, limit: i64) -> Result<Vec<Chat>> {
        let chats = sqlx::query_as::<_, Chat>(
            r#"
            SELECT id, user_id, title, created_at, updated_at
            FROM chats
            WHERE user_id = $1
            ORDER BY updated_at DESC
            LIMIT $2
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(chats)
    }

    /// Fetches a chat only if it belongs to the given user.
    pub async fn chat_owned_by(&self, chat_id: Uuid, user_id: Uuid) -> Result<Option<Chat>> {
        let chat = sqlx::query_as::<_, Chat>(
            r#"
            SELECT id, user_id, title, created_at, updated_at
            FROM chats
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(chat_id)
        .bind(user_id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(chat)
    }

    pub async fn chat_messages(&self, chat_id: Uuid) -> Result<Vec<ChatMessage>> {
        let messages = sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT id, chat_id, role, content, created_at
            FROM chat_messages
            WHERE chat_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(chat_id)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(messages)
    }

    /// Appends a message and bumps the chat's recency in one
    /// transaction so the sidebar ordering stays consistent.
    pub async fn append_message(
        &self,
        chat_id: Uuid,
        role: &str,
        content: &str,
    ) -> Result<ChatMessage> {
        let now = Utc::now();
        let mut transaction = self.pool.as_ref().begin().await?;

        let message = sqlx::query_as::<_, ChatMessage>(
            r#"
            INSERT INTO chat_messages (id, chat_id, role, content, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, chat_id, role, content, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(chat_id)
        .bind(role)
        .bind(content)
        .bind(now)
        .fetch_one(&mut *transaction)
        .await?;

        sqlx::query("UPDATE chats SET updated_at = $1 WHERE id = $2")
            .bind(now)
            .bind(chat_id)
            .execute(&mut *transaction)
            .await?;

        transaction.commit().await?;
        Ok(message)
    }

    pub async fn cleanup_expired_sessions(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < $1")
            .bind(Utc::now())
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl AuthStore for DbOperations {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, hashed_password, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, hashed_password, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(user)
    }

    /// Uniqueness is enforced by the `users_username_key` index; a
    /// violation surfaces as `DatabaseError::Duplicate` rather than
    /// being checked ahead of the insert.
    async fn create_user(&self, user: &User) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, username, hashed_password, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, hashed_password, created_at
            "#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.hashed_password)
        .bind(user.created_at)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(user)
    }

    async fn create_session(&self, session: &Session) -> Result<Session> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            INSERT INTO sessions (id, user_id, token, created_at, expires_at, last_activity)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, user_id, token, created_at, expires_at, last_activity
            "#,
        )
        .bind(session.id)
        .bind(session.user_id)
        .bind(&session.token)
        .bind(session.created_at)
        .bind(session.expires_at)
        .bind(session.last_activity)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(session)
    }

    async fn session_by_token(&self, token: &str) -> Result<Option<Session>> {
        let session = sqlx::query_as::<_, Session>(
            r#"
            SELECT id, user_id, token, created_at, expires_at, last_activity
            FROM sessions
            WHERE token = $1
            "#,
        )
        .bind(token)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(session)
    }

    async fn touch_session(&self, token: &str) -> Result<()> {
        sqlx::query("UPDATE sessions SET last_activity = $1 WHERE token = $2")
            .bind(Utc::now())
            .bind(token)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }

    async fn delete_session(&self, token: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(self.pool.as_ref())
            .await?;

        Ok(())
    }
}
