//! Chat context cache: recent conversation state keyed by conversation id.

use serde::{Deserialize, Serialize};

use super::{CacheDomain, DomainCache};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextMessage {
    pub role: MessageRole,
    pub content: String,
    /// Unix milliseconds
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatContext {
    pub messages: Vec<ContextMessage>,
    pub summary: Option<String>,
}

impl ChatContext {
    /// Appends a message, keeping at most `limit` of the most recent ones.
    pub fn push_bounded(&mut self, message: ContextMessage, limit: usize) {
        self.messages.push(message);
        if self.messages.len() > limit {
            let excess = self.messages.len() - limit;
            self.messages.drain(..excess);
        }
    }
}

pub struct ContextDomain;

impl CacheDomain for ContextDomain {
    type Payload = ChatContext;
    /// Conversation id
    type Validity = String;

    const KEY: &'static str = "chatContext";
    const TTL_MINUTES: i64 = 60;
}

pub type ContextCache<'a, B> = DomainCache<'a, ContextDomain, B>;
