//! Bounded chat history with per-channel unread flags.

use heapless::{Deque, Vec};

use super::{ChatMessage, ConversationKey};
use crate::config::{HISTORY_CAPACITY, MAX_GROUP_CHANNELS};

/// Filtered view of one conversation, newest first.
pub type Thread<'a> = Vec<&'a ChatMessage, HISTORY_CAPACITY>;

/// What the controller should surface after an inbound message was stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InboundEffect {
    /// The conversation is open; the redraw shows it.
    Visible,
    /// A channel that is not open now has its unread flag set.
    MarkedUnread { slot: u8 },
    /// A direct message for a contact that is not open.
    Notify,
}

/// FIFO message log of at most [`HISTORY_CAPACITY`] entries.
pub struct ChatHistoryStore {
    messages: Deque<ChatMessage, HISTORY_CAPACITY>,
    unread: [bool; MAX_GROUP_CHANNELS],
}

impl ChatHistoryStore {
    pub const fn new() -> Self {
        Self {
            messages: Deque::new(),
            unread: [false; MAX_GROUP_CHANNELS],
        }
    }

    /// Append, dropping the oldest message when full. Returns the evicted message.
    pub fn append(&mut self, message: ChatMessage) -> Option<ChatMessage> {
        let evicted = if self.messages.is_full() {
            self.messages.pop_front()
        } else {
            None
        };
        if evicted.is_some() {
            debug!("History: full, evicted oldest");
        }
        // A slot was just freed if the deque was full.
        let _ = self.messages.push_back(message);
        evicted
    }

    /// Store an inbound message and decide how to surface it.
    ///
    /// `channel_slot` is the slot of the channel it was filed under (if any);
    /// `open` is the conversation currently shown in Chat.
    pub fn record_inbound(
        &mut self,
        message: ChatMessage,
        channel_slot: Option<u8>,
        open: Option<ConversationKey<'_>>,
    ) -> InboundEffect {
        let is_open = open.is_some_and(|key| message.belongs_to(key));
        let is_channel = message.is_channel;
        self.append(message);

        if is_open {
            return InboundEffect::Visible;
        }
        match (is_channel, channel_slot) {
            (true, Some(slot)) => {
                self.mark_unread(slot);
                InboundEffect::MarkedUnread { slot }
            }
            (true, None) => InboundEffect::Visible,
            (false, _) => InboundEffect::Notify,
        }
    }

    /// Messages of one conversation, newest first.
    pub fn filter_by_conversation(&self, key: ConversationKey<'_>) -> Thread<'_> {
        let mut thread = Vec::new();
        for message in self.messages.iter().rev().filter(|m| m.belongs_to(key)) {
            // Capacity equals the history capacity, so this never fails.
            let _ = thread.push(message);
        }
        thread
    }

    pub fn count_for(&self, key: ConversationKey<'_>) -> usize {
        self.messages.iter().filter(|m| m.belongs_to(key)).count()
    }

    /// All messages, oldest first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ChatMessage> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn is_unread(&self, slot: u8) -> bool {
        self.unread.get(slot as usize).copied().unwrap_or(false)
    }

    pub fn mark_unread(&mut self, slot: u8) {
        if let Some(flag) = self.unread.get_mut(slot as usize) {
            *flag = true;
        }
    }

    /// Clear the unread flag of the channel in `slot`.
    pub fn mark_conversation_read(&mut self, slot: u8) {
        if let Some(flag) = self.unread.get_mut(slot as usize) {
            *flag = false;
        }
    }
}

impl Default for ChatHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}
