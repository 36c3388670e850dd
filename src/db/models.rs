use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(username: String, hashed_password: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            hashed_password,
            created_at: Utc::now(),
        }
    }

    /// The projection handed back to callers. The hash never leaves
    /// the service layer.
    pub fn into_public(self) -> PublicUser {
        PublicUser {
            id: self.id,
            username: self.username,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Session {
    pub fn new(user_id: Uuid, token: String, ttl_hours: i64) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            token,
            created_at: now,
            expires_at: now + chrono::Duration::hours(ttl_hours),
            last_activity: now,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Chat {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatMessage {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub role: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_projection_drops_hash() {
        let user = User::new("alice".to_string(), "$2b$10$hash".to_string());
        let public = user.clone().into_public();
        assert_eq!(public.id, user.id);
        assert_eq!(public.username, "alice");

        let json = serde_json::to_value(&public).unwrap();
        let fields: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(fields, vec!["id", "username"]);
    }

    #[test]
    fn test_session_expiry() {
        let session = Session::new(Uuid::new_v4(), "token".to_string(), 1);
        assert!(!session.is_expired());

        let expired = Session::new(Uuid::new_v4(), "token".to_string(), -1);
        assert!(expired.is_expired());
    }
}
