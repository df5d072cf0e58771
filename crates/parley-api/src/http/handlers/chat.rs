//! Chat HTTP handlers.
//!
//! Endpoints:
//! - POST   /chats/new          - Create a chat
//! - GET    /chats              - List chats (id and title)
//! - GET    /chats/{id}         - Get a chat's transcript
//! - POST   /chats/{id}/message - Send a message (multipart: `message`, optional `file`)
//! - DELETE /chats/{id}         - Delete a chat

use axum::Json;
use axum::extract::{Multipart, Path, State};
use serde::Serialize;
use uuid::Uuid;

use parley_core::chat::attachment::Upload;
use parley_types::chat::{ChatId, ChatSummary, Turn};
use parley_types::error::ChatError;

use crate::http::error::AppError;
use crate::state::AppState;

/// Body of `POST /chats/new`.
#[derive(Debug, Serialize)]
pub struct NewChatResponse {
    pub chat_id: ChatId,
    pub title: String,
    pub history: Vec<Turn>,
}

/// Body of `POST /chats/{id}/message`.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Model reply, or an error description when the turn failed.
    pub response: String,
    pub new_title: String,
}

/// Body of `DELETE /chats/{id}`.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

/// Ids that are not UUIDs can never name a chat.
fn parse_chat_id(raw: &str) -> Result<ChatId, AppError> {
    raw.parse::<ChatId>()
        .map_err(|_| AppError::Chat(ChatError::NotFound(ChatId::from_uuid(Uuid::nil()))))
}

/// POST /chats/new
pub async fn create_chat(State(state): State<AppState>) -> Json<NewChatResponse> {
    let chat = state.chat_service.create_chat();
    Json(NewChatResponse {
        chat_id: chat.id,
        title: chat.title,
        history: Vec::new(),
    })
}

/// GET /chats
pub async fn list_chats(State(state): State<AppState>) -> Json<Vec<ChatSummary>> {
    Json(state.chat_service.list_chats().await)
}

/// GET /chats/{id}
pub async fn get_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Turn>>, AppError> {
    let id = parse_chat_id(&id)?;
    Ok(Json(state.chat_service.transcript(&id).await?))
}

/// POST /chats/{id}/message
///
/// Model and attachment failures still answer 200: the error text becomes
/// the reply and no assistant turn is recorded.
pub async fn send_message(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Json<MessageResponse>, AppError> {
    let (message, upload) = read_message_form(multipart).await?;
    let id = parse_chat_id(&id)?;

    let outcome = state
        .chat_service
        .send_message(&id, message, upload)
        .await?;

    Ok(Json(MessageResponse {
        response: outcome.reply_text(&state.config.chat.error_prefix),
        new_title: outcome.title,
    }))
}

/// DELETE /chats/{id}
pub async fn delete_chat(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, AppError> {
    let id = parse_chat_id(&id)?;
    state.chat_service.delete_chat(&id).await?;
    Ok(Json(StatusResponse { status: "ok" }))
}

/// Pull `message` and the optional `file` out of the form. Other fields are ignored.
///
/// A `file` part with no filename and no content is how browsers submit an
/// empty file input; it counts as no attachment.
async fn read_message_form(
    mut multipart: Multipart,
) -> Result<(String, Option<Upload>), AppError> {
    let mut message = None;
    let mut upload = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("message") => message = Some(field.text().await?),
            Some("file") => {
                let file_name = field
                    .file_name()
                    .filter(|n| !n.is_empty())
                    .map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await?;
                if file_name.is_some() || !bytes.is_empty() {
                    upload = Some(Upload {
                        bytes: bytes.to_vec(),
                        content_type,
                        file_name,
                    });
                }
            }
            _ => {}
        }
    }

    let message =
        message.ok_or_else(|| AppError::Validation("field 'message' is required".to_string()))?;
    Ok((message, upload))
}
