//! In-memory chat store.
//!
//! Maps chat ids to slots. Each slot pairs the chat's record (title and
//! transcript) with its provider-side conversation. The conversation mutex
//! doubles as the per-chat turn lock: a turn holds it for the whole model
//! call, so turns on one chat run one at a time while other chats proceed.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use parley_types::chat::{ChatId, ChatSummary, Turn};
use parley_types::error::ChatError;

use crate::llm::box_provider::BoxConversation;

use super::session::ChatRecord;

/// State of a single chat.
pub struct ChatSlot {
    id: ChatId,
    record: RwLock<ChatRecord>,
    /// `None` once the chat was deleted and its conversation released.
    conversation: Mutex<Option<BoxConversation>>,
}

impl ChatSlot {
    fn new(id: ChatId, record: ChatRecord, conversation: BoxConversation) -> Self {
        Self {
            id,
            record: RwLock::new(record),
            conversation: Mutex::new(Some(conversation)),
        }
    }

    pub fn id(&self) -> ChatId {
        self.id
    }

    /// Title and transcript. Hold the guard only briefly, never across a model call.
    pub fn record(&self) -> &RwLock<ChatRecord> {
        &self.record
    }

    /// Provider-side conversation; locking it serializes turns on this chat.
    pub fn conversation(&self) -> &Mutex<Option<BoxConversation>> {
        &self.conversation
    }
}

/// Process-lifetime store of all chats. Nothing is persisted.
#[derive(Default)]
pub struct ChatStore {
    chats: DashMap<ChatId, Arc<ChatSlot>>,
}

impl ChatStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new chat and return its id.
    pub fn insert(&self, record: ChatRecord, conversation: BoxConversation) -> ChatId {
        let id = ChatId::new();
        self.chats
            .insert(id, Arc::new(ChatSlot::new(id, record, conversation)));
        debug!(chat_id = %id, "chat inserted into store");
        id
    }

    /// Look up a chat's slot.
    pub fn get(&self, id: &ChatId) -> Option<Arc<ChatSlot>> {
        self.chats.get(id).map(|entry| Arc::clone(entry.value()))
    }

    /// Snapshot of every chat's id and title, oldest first.
    ///
    /// Ids are UUID v7, so sorting by id gives creation order.
    pub async fn list(&self) -> Vec<ChatSummary> {
        // Collect first: shard guards must not be held across an await.
        let slots: Vec<Arc<ChatSlot>> = self
            .chats
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        let mut summaries = Vec::with_capacity(slots.len());
        for slot in slots {
            let record = slot.record.read().await;
            summaries.push(ChatSummary {
                id: slot.id,
                title: record.title().to_string(),
            });
        }
        summaries.sort_by_key(|summary| summary.id.0);
        summaries
    }

    /// Copy of a chat's transcript.
    pub async fn transcript(&self, id: &ChatId) -> Result<Vec<Turn>, ChatError> {
        let slot = self.get(id).ok_or(ChatError::NotFound(*id))?;
        let record = slot.record.read().await;
        Ok(record.transcript().to_vec())
    }

    /// Remove a chat and release its conversation.
    ///
    /// A turn already running on the chat finishes first; turns still
    /// waiting for the lock find the conversation gone.
    pub async fn remove(&self, id: &ChatId) -> Result<(), ChatError> {
        let (_, slot) = self.chats.remove(id).ok_or(ChatError::NotFound(*id))?;
        let mut conversation = slot.conversation.lock().await;
        if let Some(conversation) = conversation.take() {
            conversation.release();
        }
        debug!(chat_id = %id, "chat removed from store");
        Ok(())
    }

    /// Number of live chats.
    pub fn len(&self) -> usize {
        self.chats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chats.is_empty()
    }
}
