use thiserror::Error;

use crate::chat::ChatId;

/// Errors related to chat session operations.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("chat {0} not found")]
    NotFound(ChatId),
}

/// Errors from decoding a stored `data:` URL attachment.
#[derive(Debug, Error)]
pub enum DataUrlError {
    #[error("attachment is not a data: URL")]
    MissingScheme,

    #[error("attachment data URL has no payload")]
    MissingPayload,

    #[error("attachment data URL is not base64-encoded")]
    NotBase64,

    #[error("invalid base64 payload: {0}")]
    Payload(#[from] base64::DecodeError),
}
