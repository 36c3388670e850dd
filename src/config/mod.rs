use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

/// Placeholder secrets baked into the development defaults. Startup
/// validation refuses to run outside development while any of these
/// are still in effect.
pub const DEV_SESSION_SECRET: &str = "secret-key";
pub const DEV_DATABASE_PASSWORD: &str = "postgres";

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub max_connections: u32,
    /// Path to a CA certificate. When set, connections use TLS with
    /// full certificate verification.
    pub ca_cert: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SessionConfig {
    pub secret: String,
    pub ttl_hours: i64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnthropicConfig {
    pub api_key: String,
    /// https://docs.anthropic.com/en/docs/about-claude/models
    pub model: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GatewayConfig {
    /// Base URL of the backend the route guard validates sessions
    /// against via `GET /auth/me`.
    pub api_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub environment: String,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cache: CacheConfig,
    pub session: SessionConfig,
    pub anthropic: AnthropicConfig,
    pub gateway: GatewayConfig,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // Development defaults; every fallback is enumerated here.
            .set_default("environment", "development")?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 4000)?
            .set_default("server.workers", num_cpus::get() as i64)?
            .set_default("database.host", "localhost")?
            .set_default("database.port", 5432)?
            .set_default("database.user", "postgres")?
            .set_default("database.password", DEV_DATABASE_PASSWORD)?
            .set_default("database.database", "talkdeck")?
            .set_default("database.max_connections", 5)?
            .set_default("database.ca_cert", None::<String>)?
            .set_default("cache.host", "127.0.0.1")?
            .set_default("cache.port", 6379)?
            .set_default("session.secret", DEV_SESSION_SECRET)?
            .set_default("session.ttl_hours", 24)?
            .set_default("anthropic.api_key", "")?
            .set_default("anthropic.model", "claude-3-5-haiku-latest")?
            .set_default("gateway.api_url", "http://127.0.0.1:4000")?
            // Config files, if present
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Environment variables with prefix "APP_".
            // E.g., `APP_SERVER__PORT=5001` sets `Settings.server.port`.
            .add_source(
                Environment::with_prefix("app")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }

    /// Refuses insecure placeholder credentials outside development.
    /// The original deployment silently fell back to them in every
    /// environment; here that is a startup failure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.environment == "development" {
            return Ok(());
        }
        if self.session.secret == DEV_SESSION_SECRET {
            return Err(ConfigError::Message(
                "session.secret must be set outside development".into(),
            ));
        }
        if self.database.password == DEV_DATABASE_PASSWORD {
            return Err(ConfigError::Message(
                "database.password must be set outside development".into(),
            ));
        }
        if self.anthropic.api_key.is_empty() {
            return Err(ConfigError::Message(
                "anthropic.api_key must be set outside development".into(),
            ));
        }
        Ok(())
    }

    /// Connection string without credentials, for logging.
    pub fn database_endpoint(&self) -> String {
        format!(
            "{}:{}/{}",
            self.database.host, self.database.port, self.database.database
        )
    }

    #[cfg(test)]
    pub fn new_for_test() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("environment", "test")?
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 4000)?
            .set_default("server.workers", 1)?
            .set_default("database.host", "localhost")?
            .set_default("database.port", 5432)?
            .set_default("database.user", "postgres")?
            .set_default("database.password", DEV_DATABASE_PASSWORD)?
            .set_default("database.database", "talkdeck_test")?
            .set_default("database.max_connections", 2)?
            .set_default("database.ca_cert", None::<String>)?
            .set_default("cache.host", "127.0.0.1")?
            .set_default("cache.port", 6379)?
            .set_default("session.secret", DEV_SESSION_SECRET)?
            .set_default("session.ttl_hours", 1)?
            .set_default("anthropic.api_key", "")?
            .set_default("anthropic.model", "claude-3-5-haiku-latest")?
            .set_default("gateway.api_url", "http://127.0.0.1:4000")?
            .build()?
            .try_deserialize()
    }
}
