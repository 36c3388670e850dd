pub mod auth;
pub mod chat;
pub mod config;
pub mod db;
pub mod error;
pub mod gateway;

use std::sync::Arc;

use actix_web::HttpResponse;

pub use config::Settings;
pub use error::{AppError, AuthError, DatabaseError};
pub type Result<T> = std::result::Result<T, AppError>;

pub use auth::AuthService;
pub use chat::AnthropicClient;
pub use db::DbOperations;

/// Health check endpoint handler
/// Returns a JSON response with server status and timestamp
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub db: DbOperations,
    pub auth: Arc<AuthService>,
    pub anthropic: Arc<AnthropicClient>,
}

impl AppState {
    /// Builds shared state from settings. The pool connects lazily, so
    /// this succeeds without a reachable database; the first query
    /// surfaces connection failures.
    pub fn new(config: Settings) -> Self {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect_lazy_with(db::connect_options(&config.database));

        let db = DbOperations::new(Arc::new(pool));
        let auth = Arc::new(AuthService::new(
            Arc::new(db.clone()),
            auth::HASH_COST,
            config.session.ttl_hours,
        ));
        let anthropic = Arc::new(AnthropicClient::new(
            config.anthropic.api_key.clone(),
            config.anthropic.model.clone(),
        ));

        Self {
            config: Arc::new(config),
            db,
            auth,
            anthropic,
        }
    }
}
