//! Per-chat record: title and transcript.
//!
//! Wraps the mutable state of one chat with the append and titling rules.
//! The provider-side conversation lives next to it in the store, not here.

use parley_types::chat::{EncodedAttachment, Turn};
use parley_types::config::ChatConfig;

/// How a chat title is derived from a message.
#[derive(Debug, Clone)]
pub struct TitlePolicy {
    /// Characters (not bytes) of the message kept.
    pub max_chars: usize,
    pub suffix: String,
}

impl TitlePolicy {
    /// Title for a chat whose opening message is `message`.
    ///
    /// The suffix is always appended, even when nothing was cut.
    pub fn title_for(&self, message: &str) -> String {
        let mut title: String = message.chars().take(self.max_chars).collect();
        title.push_str(&self.suffix);
        title
    }
}

impl Default for TitlePolicy {
    fn default() -> Self {
        Self::from(&ChatConfig::default())
    }
}

impl From<&ChatConfig> for TitlePolicy {
    fn from(config: &ChatConfig) -> Self {
        Self {
            max_chars: config.title_max_chars,
            suffix: config.title_suffix.clone(),
        }
    }
}

/// Transcript length up to which each user message rewrites the title.
const TITLE_WINDOW: usize = 2;

/// Title and append-only transcript of one chat.
#[derive(Debug, Clone)]
pub struct ChatRecord {
    title: String,
    transcript: Vec<Turn>,
}

impl ChatRecord {
    /// A record with an empty transcript.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            transcript: Vec::new(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    /// Append the user's side of an exchange.
    pub fn push_user_turn(&mut self, text: impl Into<String>, attachment: Option<EncodedAttachment>) {
        self.transcript.push(Turn::user(text, attachment));
    }

    /// Append the model's reply.
    pub fn push_assistant_turn(&mut self, text: impl Into<String>) {
        self.transcript.push(Turn::assistant(text));
    }

    /// Rewrite the title from `message` while the transcript is short.
    ///
    /// Call after appending the user turn. The check is on transcript length,
    /// so after a failed first exchange (one user turn, no reply) the second
    /// message still lands inside the window and retitles the chat.
    /// Returns whether the title changed.
    pub fn refresh_title(&mut self, message: &str, policy: &TitlePolicy) -> bool {
        if self.transcript.len() > TITLE_WINDOW {
            return false;
        }
        self.title = policy.title_for(message);
        true
    }
}
