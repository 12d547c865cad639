//! Chat bubble layout.
//!
//! Walks a newest-first thread from the scroll index toward older messages,
//! accepting bubbles while they fit the message area, then stacks them from
//! the bottom of the viewport upward.

use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;
use heapless::Vec;

use super::ChatMessage;
use crate::config::{CHAT_AREA_BOTTOM, CHAT_AREA_HEIGHT, MAX_VISIBLE_BUBBLES};
use crate::text::is_printable;

/// Messages at or below this many characters use the large font.
pub const LARGE_TEXT_MAX_CHARS: usize = 48;

/// A channel sender prefix ("Name: text") must end before this column.
pub const SENDER_SPLIT_LIMIT: usize = 30;

/// Extra height for a sender label above the text.
pub const SENDER_LABEL_HEIGHT: i32 = 10;

/// Vertical gap below every bubble.
pub const BUBBLE_GAP: i32 = 2;

pub const BUBBLE_X: i32 = 10;
pub const BUBBLE_WIDTH: u32 = 220;

/// Lowest pixel row a bubble may occupy.
const STACK_BOTTOM: i32 = CHAT_AREA_BOTTOM - BUBBLE_GAP;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TextSize {
    Large,
    Small,
}

impl TextSize {
    pub fn for_len(len: usize) -> Self {
        if len <= LARGE_TEXT_MAX_CHARS {
            TextSize::Large
        } else {
            TextSize::Small
        }
    }

    pub fn line_height(self) -> i32 {
        match self {
            TextSize::Large => 16,
            TextSize::Small => 9,
        }
    }

    pub fn chars_per_line(self) -> usize {
        match self {
            TextSize::Large => 16,
            TextSize::Small => 35,
        }
    }

    pub fn padding(self) -> i32 {
        match self {
            TextSize::Large => 20,
            TextSize::Small => 12,
        }
    }

    /// Horizontal inset of the text inside its bubble.
    pub fn text_inset(self) -> i32 {
        match self {
            TextSize::Large => 10,
            TextSize::Small => 6,
        }
    }

    /// Display surface text size.
    pub fn font_scale(self) -> u8 {
        match self {
            TextSize::Large => 2,
            TextSize::Small => 1,
        }
    }
}

/// One positioned message.
#[derive(Clone, Copy, Debug)]
pub struct Bubble<'a> {
    pub message: &'a ChatMessage,
    /// Sender label split off a channel message.
    pub sender: Option<&'a str>,
    pub body: &'a str,
    pub size: TextSize,
    pub lines: usize,
    pub rect: Rectangle,
}

impl Bubble<'_> {
    /// Top-left of the first text line.
    pub fn text_origin(&self) -> Point {
        let inset = self.size.text_inset();
        self.rect.top_left + Point::new(inset, inset)
    }

    /// Top-left of the sender label, drawn just above the bubble.
    pub fn label_origin(&self) -> Option<Point> {
        self.sender
            .map(|_| self.rect.top_left - Point::new(0, SENDER_LABEL_HEIGHT))
    }

    /// Vertical space taken including the label, excluding the gap.
    pub fn slot_height(&self) -> i32 {
        let label = if self.sender.is_some() {
            SENDER_LABEL_HEIGHT
        } else {
            0
        };
        self.rect.size.height as i32 + label
    }
}

/// Split "Name: text" on the first colon within the first 30 characters.
///
/// Spaces following the colon are skipped. Without such a colon the whole
/// text is the body.
pub fn split_sender(text: &str) -> (Option<&str>, &str) {
    let colon = text
        .char_indices()
        .take(SENDER_SPLIT_LIMIT)
        .find(|&(_, c)| c == ':')
        .map(|(idx, _)| idx);
    match colon {
        Some(idx) => (Some(&text[..idx]), text[idx + 1..].trim_start_matches(' ')),
        None => (None, text),
    }
}

/// Number of characters that survive display sanitising.
pub fn display_len(text: &str) -> usize {
    text.chars().filter(|&c| is_printable(c)).count()
}

/// Bubble height plus its sender label, without the inter-message gap.
pub fn bubble_height(size: TextSize, lines: usize, has_sender: bool) -> i32 {
    let label = if has_sender { SENDER_LABEL_HEIGHT } else { 0 };
    lines as i32 * size.line_height() + size.padding() + label
}

struct Measured<'a> {
    sender: Option<&'a str>,
    body: &'a str,
    size: TextSize,
    lines: usize,
    height: i32,
}

fn measure(message: &ChatMessage, is_channel: bool) -> Measured<'_> {
    let (sender, body) = if is_channel && !message.is_outgoing {
        split_sender(message.text.as_str())
    } else {
        (None, message.text.as_str())
    };
    let len = display_len(body);
    let size = TextSize::for_len(len);
    let lines = len.div_ceil(size.chars_per_line());
    Measured {
        sender,
        body,
        size,
        lines,
        height: bubble_height(size, lines, sender.is_some()),
    }
}

/// Clamp a scroll index to `[0, count - 1]`.
pub fn clamp_scroll(scroll: usize, count: usize) -> usize {
    scroll.min(count.saturating_sub(1))
}

/// Lay out `thread` (newest first) starting `scroll` messages back.
///
/// The first accepted message is always included even when it alone
/// exceeds the budget; bubbles are returned newest (bottom) first.
pub fn layout<'a>(
    thread: &[&'a ChatMessage],
    scroll: usize,
    is_channel: bool,
) -> Vec<Bubble<'a>, MAX_VISIBLE_BUBBLES> {
    let mut bubbles = Vec::new();
    let start = clamp_scroll(scroll, thread.len());
    let mut used = 0;
    let mut bottom = STACK_BOTTOM;

    for &message in thread.iter().skip(start) {
        let m = measure(message, is_channel);
        let needed = m.height + BUBBLE_GAP;
        if !bubbles.is_empty() && used + needed > CHAT_AREA_HEIGHT {
            break;
        }
        used += needed;

        let top = bottom - m.height;
        let label = if m.sender.is_some() {
            SENDER_LABEL_HEIGHT
        } else {
            0
        };
        let bubble = Bubble {
            message,
            sender: m.sender,
            body: m.body,
            size: m.size,
            lines: m.lines,
            rect: Rectangle::new(
                Point::new(BUBBLE_X, top + label),
                Size::new(BUBBLE_WIDTH, (m.height - label) as u32),
            ),
        };
        if bubbles.push(bubble).is_err() {
            break;
        }
        bottom = top - BUBBLE_GAP;
    }
    bubbles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::ConversationKey;
    use proptest::prelude::*;

    fn incoming(text: &str) -> ChatMessage {
        ChatMessage::incoming(ConversationKey::channel("Public"), "x", text, 0)
    }

    #[test]
    fn sender_split_only_within_limit() {
        assert_eq!(split_sender("Ann: hello"), (Some("Ann"), "hello"));
        assert_eq!(split_sender("no colon"), (None, "no colon"));
        let late = "abcdefghijklmnopqrstuvwxyz0123456789: x";
        assert_eq!(split_sender(late), (None, late));
        assert_eq!(split_sender("Ann:   spaced"), (Some("Ann"), "spaced"));
    }

    #[test]
    fn size_switches_at_48_chars() {
        assert_eq!(TextSize::for_len(48), TextSize::Large);
        assert_eq!(TextSize::for_len(49), TextSize::Small);
        // 48 chars at 16/line: 3 lines * 16 + 20.
        assert_eq!(bubble_height(TextSize::Large, 3, false), 68);
        assert_eq!(bubble_height(TextSize::Small, 2, true), 40);
    }

    #[test]
    fn outgoing_channel_text_is_not_split() {
        let out = ChatMessage::outgoing(ConversationKey::channel("Public"), "me", "me: hi", 0);
        let thread = [&out];
        let bubbles = layout(&thread, 0, true);
        assert_eq!(bubbles[0].sender, None);
        assert_eq!(bubbles[0].body, "me: hi");
    }

    #[test]
    fn short_messages_stack_until_budget() {
        // Each: 1 line large = 36 px + 2 gap = 38; two fit in 76.
        let a = ChatMessage::incoming(ConversationKey::contact("Bob"), "Bob", "one", 0);
        let b = ChatMessage::incoming(ConversationKey::contact("Bob"), "Bob", "two", 1);
        let c = ChatMessage::incoming(ConversationKey::contact("Bob"), "Bob", "three", 2);
        let thread = [&c, &b, &a];
        let bubbles = layout(&thread, 0, false);
        assert_eq!(bubbles.len(), 2);
        assert_eq!(bubbles[0].body, "three");
        assert_eq!(bubbles[0].rect.top_left.y, STACK_BOTTOM - 36);
        assert_eq!(bubbles[1].rect.top_left.y, STACK_BOTTOM - 36 - 2 - 36);

        let older = layout(&thread, 1, false);
        assert_eq!(older[0].body, "two");
        assert_eq!(older.len(), 2);
    }

    #[test]
    fn long_message_crowds_out_older_ones() {
        // "Ann: " + 111 chars: small font, 4 lines, labelled = 58 px.
        let text = "Ann: aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
        let long = incoming(text);
        let short = incoming("hi");
        let thread = [&long, &short];
        let bubbles = layout(&thread, 0, true);
        assert_eq!(bubbles.len(), 1);
        assert_eq!(bubbles[0].size, TextSize::Small);
        assert_eq!(bubbles[0].rect.size.height, 48);
        assert_eq!(bubbles[0].slot_height(), 58);
        assert_eq!(bubbles[0].sender, Some("Ann"));
        assert_eq!(bubbles[0].rect.top_left.y, STACK_BOTTOM - 48);
        assert_eq!(
            bubbles[0].label_origin(),
            Some(Point::new(BUBBLE_X, STACK_BOTTOM - 58))
        );
    }

    #[test]
    fn oversized_first_message_is_always_shown() {
        // Labelled 48-char large message: 3 * 16 + 20 + 10 = 78 px, over the 76 px budget.
        let text = "Ann: 012345678901234567890123456789012345678901234567";
        let big = incoming(text);
        let short = incoming("hi");
        let thread = [&big, &short];
        let bubbles = layout(&thread, 0, true);
        assert_eq!(bubbles.len(), 1);
        assert_eq!(bubbles[0].slot_height(), 78);
        assert!(bubbles[0].label_origin().unwrap().y < crate::config::CHAT_AREA_TOP);
    }

    #[test]
    fn scroll_is_clamped() {
        let m = incoming("hi");
        let thread = [&m];
        assert_eq!(layout(&thread, 9, true).len(), 1);
        assert!(layout(&[], 0, true).is_empty());
        assert_eq!(clamp_scroll(5, 0), 0);
    }

    #[test]
    fn empty_body_takes_padding_only() {
        let blank = ChatMessage::incoming(ConversationKey::contact("Bob"), "Bob", "", 0);
        let labelled = incoming("Ann:   ");
        let blank_thread = [&blank];
        let bubbles = layout(&blank_thread, 0, false);
        assert_eq!(bubbles[0].lines, 0);
        assert_eq!(bubbles[0].rect.size.height, 20);

        let labelled_thread = [&labelled];
        let bubbles = layout(&labelled_thread, 0, true);
        assert_eq!(bubbles[0].sender, Some("Ann"));
        assert_eq!(bubbles[0].lines, 0);
        assert_eq!(bubbles[0].slot_height(), 30);
    }

    #[test]
    fn emoji_do_not_count_toward_length() {
        let m = incoming("\u{1F600}\u{1F600}ok");
        let thread = [&m];
        let bubbles = layout(&thread, 0, true);
        assert_eq!(bubbles[0].lines, 1);
        assert_eq!(bubbles[0].size, TextSize::Large);
    }

    proptest! {
        #[test]
        fn accepted_bubbles_fit_or_stand_alone(
            lens in proptest::collection::vec(0usize..127, 1..20),
            scroll in 0usize..25,
        ) {
            let owned: std::vec::Vec<ChatMessage> = lens
                .iter()
                .map(|&n| {
                    let text: std::string::String = "x".repeat(n);
                    ChatMessage::incoming(ConversationKey::contact("Bob"), "Bob", &text, 0)
                })
                .collect();
            let thread: std::vec::Vec<&ChatMessage> = owned.iter().collect();
            let bubbles = layout(&thread, scroll, false);

            prop_assert!(!bubbles.is_empty());
            let start = clamp_scroll(scroll, thread.len());
            prop_assert!(core::ptr::eq(bubbles[0].message, thread[start]));

            let used: i32 = bubbles.iter().map(|b| b.slot_height() + BUBBLE_GAP).sum();
            prop_assert!(bubbles.len() == 1 || used <= CHAT_AREA_HEIGHT);

            // Recomputing at the same index is stable.
            prop_assert_eq!(layout(&thread, scroll, false).len(), bubbles.len());

            // Never more bubbles than remain at or after the scroll index.
            prop_assert!(bubbles.len() <= thread.len() - start);
        }
    }
}
