use async_trait::async_trait;
use tracing::warn;

use crate::auth::SESSION_COOKIE;
use crate::gateway::SessionCheck;

/// Upstream session validation. The guard performs one single-shot
/// check per request; results are never cached across requests.
#[async_trait]
pub trait SessionValidator: Send + Sync {
    async fn check(&self, token: &str) -> SessionCheck;
}

/// Validates a session by calling the backend's `GET /auth/me` with
/// the cookie attached, exactly as the edge does. No explicit request
/// timeout is configured; the transport default applies.
pub struct HttpSessionValidator {
    http: reqwest::Client,
    api_url: String,
}

impl HttpSessionValidator {
    pub fn new(api_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url,
        }
    }
}

#[async_trait]
impl SessionValidator for HttpSessionValidator {
    async fn check(&self, token: &str) -> SessionCheck {
        let result = self
            .http
            .get(format!("{}/auth/me", self.api_url))
            .header(
                reqwest::header::COOKIE,
                format!("{}={}", SESSION_COOKIE, token),
            )
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => SessionCheck::Valid,
            Ok(response) => {
                warn!("Session rejected upstream with status {}", response.status());
                SessionCheck::Invalid
            }
            Err(e) => {
                warn!("Session check failed to reach backend: {}", e);
                SessionCheck::UpstreamError
            }
        }
    }
}
