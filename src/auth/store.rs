use async_trait::async_trait;
use uuid::Uuid;

use crate::db::models::{Session, User};
use crate::Result;

/// Storage operations the auth service depends on. `DbOperations`
/// is the production implementation; tests substitute a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthStore: Send + Sync {
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;
    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<User>>;
    async fn create_user(&self, user: &User) -> Result<User>;

    async fn create_session(&self, session: &Session) -> Result<Session>;
    async fn session_by_token(&self, token: &str) -> Result<Option<Session>>;
    async fn touch_session(&self, token: &str) -> Result<()>;
    async fn delete_session(&self, token: &str) -> Result<()>;
}
