use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::handlers::session_token;
use crate::chat::{clamp_limit, PromptMessage};
use crate::db::models::PublicUser;
use crate::error::{AppError, DatabaseError};
use crate::AppState;

const ROLE_USER: &str = "user";
const ROLE_ASSISTANT: &str = "assistant";
const DEFAULT_TITLE: &str = "New Chat";

#[derive(Debug, Deserialize)]
pub struct ListChatsQuery {
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateChatRequest {
    pub title: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

async fn current_user(req: &HttpRequest, state: &AppState) -> crate::Result<PublicUser> {
    let token = session_token(req)?;
    state.auth.current_user(&token).await
}

/// `GET /chats` — the sidebar's data source: up to 30 recent chats,
/// newest activity first.
pub async fn list_chats(
    req: HttpRequest,
    query: web::Query<ListChatsQuery>,
    state: web::Data<AppState>,
) -> crate::Result<HttpResponse> {
    let user = current_user(&req, &state).await?;
    let chats = state.db.recent_chats(user.id, clamp_limit(query.limit)).await?;
    Ok(HttpResponse::Ok().json(chats))
}

/// `POST /chats` — creates an empty chat, as the "New Chat" action does.
pub async fn create_chat(
    req: HttpRequest,
    body: web::Json<CreateChatRequest>,
    state: web::Data<AppState>,
) -> crate::Result<HttpResponse> {
    let user = current_user(&req, &state).await?;
    let title = body
        .title
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .unwrap_or(DEFAULT_TITLE);

    let chat = state.db.create_chat(user.id, title).await?;
    info!("Created chat {} for user {}", chat.id, user.username);
    Ok(HttpResponse::Created().json(chat))
}

/// `GET /chats/{id}/messages` — ordered transcript, owner only.
pub async fn list_messages(
    req: HttpRequest,
    chat_id: web::Path<Uuid>,
    state: web::Data<AppState>,
) -> crate::Result<HttpResponse> {
    let user = current_user(&req, &state).await?;
    let chat_id = chat_id.into_inner();

    // Ownership check doubles as existence check; both miss as 404.
    state
        .db
        .chat_owned_by(chat_id, user.id)
        .await?
        .ok_or(AppError::DatabaseError(DatabaseError::NotFound))?;

    let messages = state.db.chat_messages(chat_id).await?;
    Ok(HttpResponse::Ok().json(messages))
}

/// `POST /chats/{id}/messages` — appends the user message, asks the
/// model for a reply over the full transcript, persists and returns it.
pub async fn send_message(
    req: HttpRequest,
    chat_id: web::Path<Uuid>,
    body: web::Json<SendMessageRequest>,
    state: web::Data<AppState>,
) -> crate::Result<HttpResponse> {
    let user = current_user(&req, &state).await?;
    let chat_id = chat_id.into_inner();

    if body.content.trim().is_empty() {
        return Err(AppError::ValidationError(
            "message content is required".to_string(),
        ));
    }

    state
        .db
        .chat_owned_by(chat_id, user.id)
        .await?
        .ok_or(AppError::DatabaseError(DatabaseError::NotFound))?;

    state
        .db
        .append_message(chat_id, ROLE_USER, &body.content)
        .await?;

    let transcript: Vec<PromptMessage> = state
        .db
        .chat_messages(chat_id)
        .await?
        .into_iter()
        .map(|m| PromptMessage::new(m.role, m.content))
        .collect();

    let reply = state.anthropic.complete(&transcript).await?;
    let message = state
        .db
        .append_message(chat_id, ROLE_ASSISTANT, &reply)
        .await?;

    Ok(HttpResponse::Created().json(message))
}
