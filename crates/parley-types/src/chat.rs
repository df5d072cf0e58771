//! Chat session and transcript types for Parley.
//!
//! These types model one conversation: its identifier, the ordered
//! transcript of turns, and the self-describing attachment copies stored
//! alongside user turns.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::error::DataUrlError;

/// Placeholder title given to every freshly created chat.
pub const DEFAULT_CHAT_TITLE: &str = "Nowy czat";

/// Media type recorded for attachments uploaded without a content type.
pub const FALLBACK_ATTACHMENT_MEDIA_TYPE: &str = "image/jpeg";

/// Unique identifier for a chat session, wrapping a UUID v7 (time-sortable).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub Uuid);

impl ChatId {
    /// Create a new ChatId using UUID v7.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create a ChatId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for ChatId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ChatId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Who produced a turn.
///
/// Assistant turns go over the wire as `"bot"`, the name existing web
/// clients render; `"assistant"` is accepted when reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TurnRole {
    #[serde(rename = "user")]
    User,
    #[serde(rename = "bot", alias = "assistant")]
    Assistant,
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnRole::User => write!(f, "user"),
            TurnRole::Assistant => write!(f, "bot"),
        }
    }
}

impl FromStr for TurnRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(TurnRole::User),
            "bot" | "assistant" => Ok(TurnRole::Assistant),
            other => Err(format!("invalid turn role: '{other}'")),
        }
    }
}

/// One entry of a chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
    /// Copy of the uploaded image, present only on user turns that had one.
    #[serde(rename = "image", default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<EncodedAttachment>,
}

impl Turn {
    /// A user turn, optionally carrying an attachment copy.
    pub fn user(text: impl Into<String>, attachment: Option<EncodedAttachment>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
            attachment,
        }
    }

    /// An assistant turn holding the model's reply.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            text: text.into(),
            attachment: None,
        }
    }
}

/// A self-describing binary payload: `data:<media-type>;base64,<payload>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EncodedAttachment(String);

impl EncodedAttachment {
    /// Encode raw bytes under the given media type.
    pub fn encode(media_type: &str, bytes: &[u8]) -> Self {
        Self(format!("data:{media_type};base64,{}", STANDARD.encode(bytes)))
    }

    /// The media type declared in the data URL header.
    pub fn media_type(&self) -> Result<&str, DataUrlError> {
        self.split().map(|(media_type, _)| media_type)
    }

    /// Decode back into `(media_type, bytes)`.
    pub fn decode(&self) -> Result<(String, Vec<u8>), DataUrlError> {
        let (media_type, payload) = self.split()?;
        let bytes = STANDARD.decode(payload)?;
        Ok((media_type.to_string(), bytes))
    }

    fn split(&self) -> Result<(&str, &str), DataUrlError> {
        let rest = self.0.strip_prefix("data:").ok_or(DataUrlError::MissingScheme)?;
        let (header, payload) = rest.split_once(',').ok_or(DataUrlError::MissingPayload)?;
        let media_type = header
            .strip_suffix(";base64")
            .ok_or(DataUrlError::NotBase64)?;
        Ok((media_type, payload))
    }
}

impl fmt::Display for EncodedAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Listing entry for a chat: id and current title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatSummary {
    pub id: ChatId,
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_id_roundtrip() {
        let id = ChatId::new();
        let parsed: ChatId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_chat_id_rejects_garbage() {
        assert!("not-a-uuid".parse::<ChatId>().is_err());
    }

    #[test]
    fn test_turn_role_wire_names() {
        assert_eq!(serde_json::to_string(&TurnRole::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&TurnRole::Assistant).unwrap(), "\"bot\"");
        let parsed: TurnRole = serde_json::from_str("\"assistant\"").unwrap();
        assert_eq!(parsed, TurnRole::Assistant);
    }

    #[test]
    fn test_turn_role_from_str() {
        assert_eq!("BOT".parse::<TurnRole>().unwrap(), TurnRole::Assistant);
        assert_eq!("user".parse::<TurnRole>().unwrap(), TurnRole::User);
        assert!("system".parse::<TurnRole>().is_err());
    }

    #[test]
    fn test_turn_serialize_omits_missing_image() {
        let json = serde_json::to_value(Turn::assistant("hej")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "bot", "text": "hej"}));
    }

    #[test]
    fn test_turn_serialize_with_image() {
        let image = EncodedAttachment::encode("image/png", b"\x89PNG");
        let json = serde_json::to_value(Turn::user("look", Some(image))).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["image"], "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn test_attachment_decodes_to_original_bytes() {
        let bytes: Vec<u8> = (0..=255).collect();
        let encoded = EncodedAttachment::encode("image/webp", &bytes);
        assert_eq!(encoded.media_type().unwrap(), "image/webp");

        let (media_type, decoded) = encoded.decode().unwrap();
        assert_eq!(media_type, "image/webp");
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn test_attachment_decode_errors() {
        let no_scheme: EncodedAttachment = serde_json::from_str("\"image/png;base64,AA==\"").unwrap();
        assert!(matches!(no_scheme.decode(), Err(DataUrlError::MissingScheme)));

        let plain: EncodedAttachment = serde_json::from_str("\"data:text/plain,hello\"").unwrap();
        assert!(matches!(plain.decode(), Err(DataUrlError::NotBase64)));

        let broken: EncodedAttachment =
            serde_json::from_str("\"data:image/png;base64,@@@\"").unwrap();
        assert!(matches!(broken.decode(), Err(DataUrlError::Payload(_))));
    }
}
