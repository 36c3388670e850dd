use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use tracing::{error, info};

use crate::auth::SESSION_COOKIE;
use crate::error::{AppError, AuthError};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    pub username: String,
    pub password: String,
}

/// Pulls the session token out of the request cookie, if any.
pub(crate) fn session_token(req: &HttpRequest) -> crate::Result<String> {
    req.cookie(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or(AppError::AuthError(AuthError::InvalidSession))
}

fn session_cookie(token: String, ttl_hours: i64) -> Cookie<'static> {
    Cookie::build(SESSION_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::hours(ttl_hours))
        .finish()
}

fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::new(SESSION_COOKIE, "");
    cookie.set_path("/");
    cookie.make_removal();
    cookie
}

fn check_credentials_present(req: &CredentialsRequest) -> crate::Result<()> {
    if req.username.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::ValidationError(
            "username and password are required".to_string(),
        ));
    }
    Ok(())
}

/// `POST /auth/signup` — 201 with the public user, 409 on a taken name.
pub async fn signup(
    req: web::Json<CredentialsRequest>,
    state: web::Data<AppState>,
) -> crate::Result<HttpResponse> {
    check_credentials_present(&req)?;
    info!("Received signup request for username: {}", req.username);

    match state.auth.sign_up(&req.username, &req.password).await {
        Ok(user) => Ok(HttpResponse::Created().json(user)),
        Err(e) => {
            error!("Signup failed for username {}: {}", req.username, e);
            Err(e)
        }
    }
}

/// `POST /auth/login` — 200 with the public user and a fresh
/// `sessionId` cookie, 401 on bad credentials.
pub async fn login(
    req: web::Json<CredentialsRequest>,
    state: web::Data<AppState>,
) -> crate::Result<HttpResponse> {
    check_credentials_present(&req)?;
    info!("Received login request for username: {}", req.username);

    let user = match state.auth.login(&req.username, &req.password).await {
        Ok(user) => user,
        Err(e) => {
            error!("Login failed for username {}: {}", req.username, e);
            return Err(e);
        }
    };

    let session = state.auth.start_session(user.id).await?;
    let cookie = session_cookie(session.token, state.config.session.ttl_hours);

    Ok(HttpResponse::Ok().cookie(cookie).json(user))
}

/// `GET /auth/me` — 200 with the public user behind the cookie, 401
/// otherwise. This is the endpoint the edge gateway validates against.
pub async fn me(req: HttpRequest, state: web::Data<AppState>) -> crate::Result<HttpResponse> {
    let token = session_token(&req)?;
    let user = state.auth.current_user(&token).await?;
    Ok(HttpResponse::Ok().json(user))
}

/// `POST /auth/logout` — tears down the session and clears the cookie.
pub async fn logout(req: HttpRequest, state: web::Data<AppState>) -> crate::Result<HttpResponse> {
    let token = session_token(&req)?;
    state.auth.end_session(&token).await?;

    Ok(HttpResponse::Ok()
        .cookie(removal_cookie())
        .json(serde_json::json!({ "message": "Successfully logged out" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("tok123".to_string(), 24);
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "tok123");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age(), Some(CookieDuration::hours(24)));
    }

    #[test]
    fn test_removal_cookie_expires_immediately() {
        let cookie = removal_cookie();
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(CookieDuration::ZERO));
    }

    #[test]
    fn test_empty_credentials_are_rejected() {
        let missing_password = CredentialsRequest {
            username: "alice".to_string(),
            password: String::new(),
        };
        assert!(check_credentials_present(&missing_password).is_err());

        let blank_username = CredentialsRequest {
            username: "   ".to_string(),
            password: "pw1".to_string(),
        };
        assert!(check_credentials_present(&blank_username).is_err());

        let ok = CredentialsRequest {
            username: "alice".to_string(),
            password: "pw1".to_string(),
        };
        assert!(check_credentials_present(&ok).is_ok());
    }
}
