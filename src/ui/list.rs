//! Three-row list navigation with an optional pseudo-item and search filter.
//!
//! The pseudo-item (settings icon, Back bar) sits between the last row and
//! the first in the Up/Down cycle.

use core::ops::Range;

use crate::config::{FILTER_CHARS, LIST_WINDOW};
use crate::text::{contains_ignore_case, EditBuffer};

/// Current focus of a list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Focus {
    Pseudo,
    Item(usize),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListNavigator {
    focus: Focus,
    scroll: usize,
    has_pseudo: bool,
    filter: EditBuffer<FILTER_CHARS>,
}

impl ListNavigator {
    pub fn new(has_pseudo: bool) -> Self {
        Self {
            focus: Focus::Item(0),
            scroll: 0,
            has_pseudo,
            filter: EditBuffer::new(),
        }
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    /// Selected row, `-1` for the pseudo-item.
    pub fn selected_index(&self) -> i32 {
        match self.focus {
            Focus::Pseudo => -1,
            Focus::Item(idx) => idx as i32,
        }
    }

    pub fn scroll_offset(&self) -> usize {
        self.scroll
    }

    pub fn has_pseudo(&self) -> bool {
        self.has_pseudo
    }

    pub fn pseudo_focused(&self) -> bool {
        self.focus == Focus::Pseudo
    }

    /// Rows visible in the three-row window.
    pub fn visible(&self, count: usize) -> Range<usize> {
        let start = self.scroll.min(count);
        start..(self.scroll + LIST_WINDOW).min(count)
    }

    pub fn up(&mut self, count: usize) {
        self.focus = match self.focus {
            _ if count == 0 => self.empty_focus(),
            Focus::Pseudo => Focus::Item(count - 1),
            Focus::Item(0) if self.has_pseudo => Focus::Pseudo,
            Focus::Item(0) => Focus::Item(count - 1),
            Focus::Item(idx) => Focus::Item(idx.min(count) - 1),
        };
        self.follow_focus();
    }

    pub fn down(&mut self, count: usize) {
        self.focus = match self.focus {
            _ if count == 0 => self.empty_focus(),
            Focus::Pseudo => Focus::Item(0),
            Focus::Item(idx) if idx + 1 >= count => {
                if self.has_pseudo {
                    Focus::Pseudo
                } else {
                    Focus::Item(0)
                }
            }
            Focus::Item(idx) => Focus::Item(idx + 1),
        };
        self.follow_focus();
    }

    /// Focus the pseudo-item, if there is one.
    pub fn focus_pseudo(&mut self) {
        if self.has_pseudo {
            self.focus = Focus::Pseudo;
        }
    }

    /// Focus row `idx`, clamped to `count`.
    pub fn focus_item(&mut self, idx: usize, count: usize) {
        self.focus = if count == 0 {
            self.empty_focus()
        } else {
            Focus::Item(idx.min(count - 1))
        };
        self.follow_focus();
    }

    /// Re-establish the invariants after the item count changed.
    pub fn normalize(&mut self, count: usize) {
        match self.focus {
            Focus::Item(_) if count == 0 => self.focus = self.empty_focus(),
            Focus::Item(idx) if idx >= count => self.focus = Focus::Item(count - 1),
            _ => {}
        }
        if count <= LIST_WINDOW {
            self.scroll = 0;
        }
        self.follow_focus();
    }

    /// The focused row if it exists.
    pub fn selected_item(&self, count: usize) -> Option<usize> {
        match self.focus {
            Focus::Item(idx) if idx < count => Some(idx),
            _ => None,
        }
    }

    pub fn reset(&mut self) {
        self.focus = Focus::Item(0);
        self.scroll = 0;
    }

    pub fn filter(&self) -> &str {
        self.filter.as_str()
    }

    pub fn filter_buffer(&self) -> &EditBuffer<FILTER_CHARS> {
        &self.filter
    }

    /// Append to the filter. Any change resets selection and scroll.
    pub fn push_filter(&mut self, c: char) -> bool {
        let changed = self.filter.push(c);
        if changed {
            self.reset();
        }
        changed
    }

    pub fn pop_filter(&mut self) -> bool {
        let changed = self.filter.pop();
        if changed {
            self.reset();
        }
        changed
    }

    pub fn clear_filter(&mut self) {
        if !self.filter.is_empty() {
            self.filter.clear();
            self.reset();
        }
    }

    /// Case-insensitive substring match against the filter.
    pub fn matches(&self, name: &str) -> bool {
        contains_ignore_case(name, self.filter.as_str())
    }

    fn empty_focus(&self) -> Focus {
        if self.has_pseudo {
            Focus::Pseudo
        } else {
            Focus::Item(0)
        }
    }

    /// Minimal scroll keeping the focused row inside the window.
    fn follow_focus(&mut self) {
        if let Focus::Item(idx) = self.focus {
            if idx < self.scroll {
                self.scroll = idx;
            } else if idx >= self.scroll + LIST_WINDOW {
                self.scroll = idx + 1 - LIST_WINDOW;
            }
        }
    }
}
