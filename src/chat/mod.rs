//! Chat data model: messages, conversation keys, history and bubble layout.

pub mod history;
pub mod layout;

use heapless::String;

use crate::config::MESSAGE_TEXT_CHARS;
use crate::mesh::Name;
use crate::text::truncated;

pub use history::{ChatHistoryStore, InboundEffect};
pub use layout::{layout, Bubble, TextSize};

/// Identifies one chat thread. Two keys are equal iff both fields match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConversationKey<'a> {
    pub is_channel: bool,
    pub name: &'a str,
}

impl<'a> ConversationKey<'a> {
    pub const fn contact(name: &'a str) -> Self {
        Self {
            is_channel: false,
            name,
        }
    }

    pub const fn channel(name: &'a str) -> Self {
        Self {
            is_channel: true,
            name,
        }
    }
}

/// One stored chat line. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub text: String<MESSAGE_TEXT_CHARS>,
    pub from_name: Name,
    /// Contact or channel name this message is filed under.
    pub conversation: Name,
    pub is_outgoing: bool,
    pub is_channel: bool,
    /// Wall-clock seconds.
    pub timestamp: u32,
}

impl ChatMessage {
    /// Locally composed message; text beyond 127 characters is not kept.
    pub fn outgoing(key: ConversationKey<'_>, from_name: &str, text: &str, timestamp: u32) -> Self {
        Self::build(key, from_name, text, timestamp, true)
    }

    pub fn incoming(key: ConversationKey<'_>, from_name: &str, text: &str, timestamp: u32) -> Self {
        Self::build(key, from_name, text, timestamp, false)
    }

    fn build(
        key: ConversationKey<'_>,
        from_name: &str,
        text: &str,
        timestamp: u32,
        is_outgoing: bool,
    ) -> Self {
        Self {
            text: truncated(text),
            from_name: truncated(from_name),
            conversation: truncated(key.name),
            is_outgoing,
            is_channel: key.is_channel,
            timestamp,
        }
    }

    pub fn key(&self) -> ConversationKey<'_> {
        ConversationKey {
            is_channel: self.is_channel,
            name: self.conversation.as_str(),
        }
    }

    pub fn belongs_to(&self, key: ConversationKey<'_>) -> bool {
        self.key() == key
    }
}
