//! Uploaded attachment handling.
//!
//! An upload must decode as an image. Two views are produced from it: the
//! image part forwarded to the model (media type sniffed from the bytes) and
//! the self-describing copy stored on the user turn (media type as declared
//! by the client).

use std::io::Cursor;

use image::ImageReader;
use thiserror::Error;

use parley_types::chat::{EncodedAttachment, FALLBACK_ATTACHMENT_MEDIA_TYPE};
use parley_types::llm::ImagePart;

/// A file received with a chat message.
#[derive(Debug, Clone, Default)]
pub struct Upload {
    pub bytes: Vec<u8>,
    /// Content type declared by the client, if any.
    pub content_type: Option<String>,
    pub file_name: Option<String>,
}

/// Errors from turning an upload into an image.
#[derive(Debug, Error)]
pub enum AttachmentError {
    #[error("cannot identify image file{}", display_name(.0))]
    Unrecognized(Option<String>),

    #[error("invalid image data: {0}")]
    Corrupt(String),
}

fn display_name(name: &Option<String>) -> String {
    name.as_deref()
        .map(|n| format!(" '{n}'"))
        .unwrap_or_default()
}

/// An upload that decoded as an image.
#[derive(Debug, Clone)]
pub struct PreparedAttachment {
    /// Forwarded to the model.
    pub image: ImagePart,
    /// Stored alongside the user turn for transcript replay.
    pub stored: EncodedAttachment,
}

/// Validate an upload as an image and build both of its views.
pub fn prepare(upload: Upload) -> Result<PreparedAttachment, AttachmentError> {
    let reader = ImageReader::new(Cursor::new(upload.bytes.as_slice()))
        .with_guessed_format()
        .map_err(|e| AttachmentError::Corrupt(e.to_string()))?;

    let format = reader
        .format()
        .ok_or_else(|| AttachmentError::Unrecognized(upload.file_name.clone()))?;

    // Reading the header is enough to reject truncated or mislabeled files.
    reader
        .into_dimensions()
        .map_err(|e| AttachmentError::Corrupt(e.to_string()))?;

    let declared = upload
        .content_type
        .as_deref()
        .map(str::trim)
        .filter(|ct| !ct.is_empty())
        .unwrap_or(FALLBACK_ATTACHMENT_MEDIA_TYPE);
    let stored = EncodedAttachment::encode(declared, &upload.bytes);

    Ok(PreparedAttachment {
        image: ImagePart {
            media_type: format.to_mime_type().to_string(),
            data: upload.bytes,
        },
        stored,
    })
}
