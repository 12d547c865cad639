//! Keyboard snapshot, input routing and Backspace auto-repeat.
//!
//! The keyboard reports a set of pressed character keys plus modifier flags.
//! [`route`] turns one such snapshot into a single [`Command`] for the
//! current input context; the controller dispatches it.

use heapless::Vec;

use crate::config::{BACKSPACE_REPEAT_DELAY_MILLIS, BACKSPACE_REPEAT_INTERVAL_MILLIS};

/// Maximum simultaneously pressed character keys reported.
pub const MAX_PRESSED: usize = 8;

/// One keyboard snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyState {
    /// Character keys, already shifted.
    pub word: Vec<char, MAX_PRESSED>,
    pub enter: bool,
    pub space: bool,
    /// Backspace.
    pub del: bool,
    pub fn_: bool,
    pub opt: bool,
}

impl KeyState {
    /// Snapshot of plain character keys.
    pub fn chars(text: &str) -> Self {
        let mut state = Self::default();
        for c in text.chars() {
            if state.word.push(c).is_err() {
                break;
            }
        }
        state
    }

    pub fn enter() -> Self {
        Self {
            enter: true,
            ..Self::default()
        }
    }

    pub fn space() -> Self {
        Self {
            space: true,
            ..Self::default()
        }
    }

    pub fn backspace() -> Self {
        Self {
            del: true,
            ..Self::default()
        }
    }

    pub fn opt() -> Self {
        Self {
            opt: true,
            ..Self::default()
        }
    }

    /// Fn held together with `c`.
    pub fn with_fn(c: char) -> Self {
        let mut state = Self::default();
        let _ = state.word.push(c);
        state.fn_ = true;
        state
    }

    pub fn has(&self, c: char) -> bool {
        self.word.contains(&c)
    }

    /// Fn+backtick or Opt.
    pub fn is_escape(&self) -> bool {
        (self.fn_ && self.has('`')) || self.opt
    }

    /// One of the four dedicated navigation characters is down.
    pub fn has_nav_char(&self) -> bool {
        self.word.iter().any(|&c| Nav::from_char(c).is_some())
    }

    /// Direction or selection carried by this snapshot.
    pub fn nav(&self) -> Option<Nav> {
        for nav in [Nav::Up, Nav::Down, Nav::Left, Nav::Right] {
            if self.word.iter().any(|&c| Nav::from_char(c) == Some(nav)) {
                return Some(nav);
            }
        }
        if self.enter || self.space {
            Some(Nav::Select)
        } else {
            None
        }
    }

    /// Typed text: the character keys, or a single space.
    fn text(&self) -> Vec<char, MAX_PRESSED> {
        if self.space && self.word.is_empty() {
            let mut text = Vec::new();
            let _ = text.push(' ');
            text
        } else {
            self.word.clone()
        }
    }
}

/// Navigation intent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Nav {
    Up,
    Down,
    Left,
    Right,
    Select,
}

impl Nav {
    /// `;` up, `.` down, `,` left, `/` right.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            ';' => Some(Nav::Up),
            '.' => Some(Nav::Down),
            ',' => Some(Nav::Left),
            '/' => Some(Nav::Right),
            _ => None,
        }
    }
}

/// What the focused component accepts right now.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputContext {
    /// Contacts/Channels list: navigation, search filter typing.
    List,
    /// Chat without an open draft.
    ChatIdle,
    /// Chat with a draft being typed.
    ChatCompose,
    /// Modal text editor (name, radio parameter).
    TextEdit,
    /// Settings lists.
    Menu,
    /// Yes/no modal: Enter confirms, anything else cancels.
    Confirm,
    /// Read-only modal closed by any key.
    AnyKey,
}

impl InputContext {
    /// Free-text contexts get Backspace auto-repeat.
    pub fn repeats_backspace(self) -> bool {
        matches!(self, InputContext::List | InputContext::ChatCompose)
    }
}

/// Semantic action produced from one key snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Escape,
    Nav(Nav),
    Insert(Vec<char, MAX_PRESSED>),
    DeleteBack,
    /// Fn+Backspace on a list row.
    RemoveSelected,
    ScrollOlder,
    ScrollNewer,
    Submit,
    /// Closes a read-only modal.
    Dismiss,
    Ignore,
}

/// Classify `key` for `context`.
pub fn route(key: &KeyState, context: InputContext) -> Command {
    if context == InputContext::AnyKey {
        return Command::Dismiss;
    }
    if context == InputContext::Confirm {
        return if key.enter {
            Command::Submit
        } else {
            Command::Escape
        };
    }
    if key.is_escape() {
        return Command::Escape;
    }

    match context {
        InputContext::List => {
            if key.fn_ && key.del {
                Command::RemoveSelected
            } else if key.fn_ || key.has_nav_char() {
                key.nav().map_or(Command::Ignore, Command::Nav)
            } else if key.del {
                Command::DeleteBack
            } else if !key.word.is_empty() {
                Command::Insert(key.word.clone())
            } else {
                key.nav().map_or(Command::Ignore, Command::Nav)
            }
        }
        InputContext::ChatIdle => {
            if key.fn_ {
                if key.has(';') {
                    Command::ScrollOlder
                } else if key.has('.') {
                    Command::ScrollNewer
                } else {
                    Command::Ignore
                }
            } else if !key.word.is_empty() || key.space {
                Command::Insert(key.text())
            } else {
                Command::Ignore
            }
        }
        InputContext::ChatCompose | InputContext::TextEdit => {
            if key.enter {
                Command::Submit
            } else if key.fn_ {
                Command::Ignore
            } else if key.del {
                Command::DeleteBack
            } else if !key.word.is_empty() || key.space {
                Command::Insert(key.text())
            } else {
                Command::Ignore
            }
        }
        InputContext::Menu => {
            if key.fn_ || key.has_nav_char() || key.enter || key.space {
                key.nav().map_or(Command::Ignore, Command::Nav)
            } else {
                Command::Ignore
            }
        }
        InputContext::Confirm | InputContext::AnyKey => Command::Ignore,
    }
}

/// Backspace hold tracking: Idle -> HeldShort -> HeldRepeating.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BackspaceRepeat {
    #[default]
    Idle,
    /// Pressed at `since`, not yet repeating.
    HeldShort { since: u64 },
    /// Repeating; last deletion at `last`.
    HeldRepeating { last: u64 },
}

impl BackspaceRepeat {
    /// Backspace went down (the caller deletes one character itself).
    pub fn press(&mut self, now_ms: u64) {
        *self = BackspaceRepeat::HeldShort { since: now_ms };
    }

    /// Backspace released or another key pressed.
    pub fn release(&mut self) {
        *self = BackspaceRepeat::Idle;
    }

    pub fn is_held(&self) -> bool {
        !matches!(self, BackspaceRepeat::Idle)
    }

    /// Poll while Backspace stays down. Returns `true` when one more
    /// character should be deleted.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match *self {
            BackspaceRepeat::Idle => false,
            BackspaceRepeat::HeldShort { since } => {
                if now_ms.saturating_sub(since) > BACKSPACE_REPEAT_DELAY_MILLIS {
                    *self = BackspaceRepeat::HeldRepeating { last: now_ms };
                    true
                } else {
                    false
                }
            }
            BackspaceRepeat::HeldRepeating { last } => {
                if now_ms.saturating_sub(last) >= BACKSPACE_REPEAT_INTERVAL_MILLIS {
                    *self = BackspaceRepeat::HeldRepeating { last: now_ms };
                    true
                } else {
                    false
                }
            }
        }
    }
}

/// Keyboard collaborator.
pub trait InputSource {
    /// Rescan the key matrix.
    fn update(&mut self);

    /// Whether the pressed-key set changed since the previous `update`.
    fn changed(&self) -> bool;

    /// Whether any key is currently down.
    fn is_pressed(&self) -> bool;

    fn snapshot(&self) -> KeyState;
}
