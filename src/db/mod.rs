//! Database layer: connection options, models, and the data access
//! operations used by the auth and chat services.

pub mod models;
pub mod operations;

pub use models::{Chat, ChatMessage, PublicUser, Session, User};
pub use operations::DbOperations;

use sqlx::postgres::{PgConnectOptions, PgSslMode};

use crate::config::DatabaseConfig;

/// Builds Postgres connection options from configuration. A CA
/// certificate switches the connection to TLS with full verification.
pub fn connect_options(config: &DatabaseConfig) -> PgConnectOptions {
    let mut options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.database);

    if let Some(ca_cert) = &config.ca_cert {
        options = options
            .ssl_mode(PgSslMode::VerifyFull)
            .ssl_root_cert(ca_cert);
    }

    options
}
