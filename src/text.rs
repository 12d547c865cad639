//! Bounded text: edit buffers, truncation and display sanitising.

use core::fmt;

use heapless::String;

use crate::error::Error;

/// Fixed-capacity editable text holding at most `N` characters.
///
/// Input is restricted to printable ASCII, so characters and bytes coincide
/// and `len()` always equals the number of characters stored. Pushing past
/// capacity is a no-op that leaves existing content intact.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct EditBuffer<const N: usize> {
    text: String<N>,
}

impl<const N: usize> EditBuffer<N> {
    pub const fn new() -> Self {
        Self { text: String::new() }
    }

    /// Buffer prefilled from `value`, dropping anything that does not fit.
    pub fn from_str_lossy(value: &str) -> Self {
        let mut buffer = Self::new();
        for c in value.chars() {
            if !buffer.push(c) {
                break;
            }
        }
        buffer
    }

    /// Append one printable character. Returns `false` if it was dropped.
    pub fn push(&mut self, c: char) -> bool {
        if !is_printable(c) {
            return false;
        }
        self.text.push(c).is_ok()
    }

    /// Remove the last character. Returns `false` if the buffer was empty.
    pub fn pop(&mut self) -> bool {
        self.text.pop().is_some()
    }

    pub fn clear(&mut self) {
        self.text.clear();
    }

    pub fn as_str(&self) -> &str {
        self.text.as_str()
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.text.len() >= N
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Last `count` characters, for fixed-width input bars.
    pub fn tail(&self, count: usize) -> &str {
        let start = self.text.len().saturating_sub(count);
        &self.text[start..]
    }
}

impl<const N: usize> fmt::Debug for EditBuffer<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.text.as_str(), f)
    }
}

/// Printable ASCII, the only range the display fonts cover.
pub fn is_printable(c: char) -> bool {
    matches!(c, ' '..='~')
}

/// Copy `value` into a bounded string, cutting at the first char that does not fit.
pub fn truncated<const N: usize>(value: &str) -> String<N> {
    let mut out = String::new();
    for c in value.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// Copy `value` into a bounded string, failing instead of truncating.
pub fn bounded<const N: usize>(value: &str) -> Result<String<N>, Error> {
    let mut out = String::new();
    out.push_str(value).map_err(|_| Error::BufferOverflow)?;
    Ok(out)
}

/// Reduce `input` to printable ASCII for drawing.
///
/// Multibyte sequences (emoji, accented letters) and control characters are
/// dropped; output stops when `N` is reached.
pub fn sanitize_for_display<const N: usize>(input: &str) -> String<N> {
    let mut out = String::new();
    for c in input.chars().filter(|&c| is_printable(c)) {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// Case-insensitive ASCII substring test; an empty needle matches everything.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let hay = haystack.as_bytes();
    let pat = needle.as_bytes();
    if pat.len() > hay.len() {
        return false;
    }
    hay.windows(pat.len())
        .any(|window| window.eq_ignore_ascii_case(pat))
}

/// First `count` characters of an ASCII string.
pub fn prefix(value: &str, count: usize) -> &str {
    match value.char_indices().nth(count) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}
