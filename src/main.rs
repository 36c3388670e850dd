use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use dotenv::dotenv;
use talkdeck_server::auth::handlers::{login, logout, me, signup};
use talkdeck_server::chat::handlers::{create_chat, list_chats, list_messages, send_message};
use talkdeck_server::gateway::{HttpSessionValidator, RouteGuard};
use talkdeck_server::{health_check, AppError, AppState, Settings};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> talkdeck_server::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Settings::new()?;
    config
        .validate()
        .map_err(|e| AppError::ConfigError(e.to_string()))?;
    info!(
        "Configuration loaded for environment '{}', database {}",
        config.environment,
        config.database_endpoint()
    );

    let state = AppState::new(config.clone());
    let state = web::Data::new(state);

    // Expired sessions accumulate otherwise; sweep them periodically.
    let cleanup_state = state.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            match cleanup_state.db.cleanup_expired_sessions().await {
                Ok(0) => {}
                Ok(removed) => info!("Removed {} expired sessions", removed),
                Err(e) => warn!("Session cleanup failed: {}", e),
            }
        }
    });

    let listener = TcpListener::bind(format!("{}:{}", config.server.host, config.server.port))?;
    info!(
        "Starting server at {}:{}",
        config.server.host, config.server.port
    );

    let workers = config.server.workers as usize;
    let api_url = config.gateway.api_url.clone();

    HttpServer::new(move || {
        // The frontend dev server runs on another origin and sends
        // the session cookie, so credentials must be allowed.
        let cors = Cors::default()
            .allowed_origin("http://localhost:3000")
            .allowed_origin("http://127.0.0.1:3000")
            .allowed_methods(vec!["GET", "POST"])
            .allowed_headers(vec!["Content-Type"])
            .supports_credentials()
            .max_age(3600);

        let validator = HttpSessionValidator::new(api_url.clone());

        App::new()
            .wrap(cors)
            .wrap(RouteGuard::new(Arc::new(validator)))
            .app_data(state.clone())
            .route("/health", web::get().to(health_check))
            .route("/auth/signup", web::post().to(signup))
            .route("/auth/login", web::post().to(login))
            .route("/auth/me", web::get().to(me))
            .route("/auth/logout", web::post().to(logout))
            .route("/chats", web::get().to(list_chats))
            .route("/chats", web::post().to(create_chat))
            .route("/chats/{id}/messages", web::get().to(list_messages))
            .route("/chats/{id}/messages", web::post().to(send_message))
    })
    .listen(listener)?
    .workers(workers)
    .run()
    .await
    .map_err(|e| AppError::InternalError(e.to_string()))?;

    Ok(())
}
