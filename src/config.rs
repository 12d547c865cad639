//! Application-wide constants and compile-time configuration.
//!
//! Screen geometry, buffer capacities and timing parameters live here so
//! they can be tuned in one place.

// Display geometry (Cardputer ST7789, landscape)

/// Panel width in pixels.
pub const SCREEN_WIDTH: u32 = 240;
/// Panel height in pixels.
pub const SCREEN_HEIGHT: u32 = 135;

/// Header bar height; the hamburger icon box is `HEADER_ICON_WIDTH` wide.
pub const HEADER_HEIGHT: u32 = 28;
pub const HEADER_ICON_WIDTH: u32 = 30;

/// Top edge of the first visible list row, and row-to-row spacing.
pub const LIST_ROW_TOP: i32 = 27;
pub const LIST_ROW_PITCH: i32 = 27;
/// List row height (rows overlap their neighbour's border by one pixel).
pub const LIST_ROW_HEIGHT: u32 = 28;
/// Number of list rows visible at once.
pub const LIST_WINDOW: usize = 3;
/// Longest name rendered in a list row before truncation.
pub const LIST_NAME_CHARS: usize = 18;

/// Bottom bar (tabs / search / Save-Back).
pub const BOTTOM_BAR_Y: i32 = 108;
pub const BOTTOM_BAR_HEIGHT: u32 = 27;

/// Chat message viewport, between the header and the compose bar.
pub const CHAT_AREA_TOP: i32 = 30;
pub const CHAT_AREA_BOTTOM: i32 = 106;
/// Vertical budget available for bubbles.
pub const CHAT_AREA_HEIGHT: i32 = CHAT_AREA_BOTTOM - CHAT_AREA_TOP;
/// Compose bar at the bottom of the chat screen.
pub const COMPOSE_BAR_Y: i32 = 107;
pub const COMPOSE_BAR_HEIGHT: u32 = 28;
/// Characters of the draft shown in the compose bar.
pub const COMPOSE_VISIBLE_CHARS: usize = 19;
/// Name shown in the chat header is cut to this length.
pub const CHAT_TITLE_CHARS: usize = 12;

/// Settings rows: first baseline and spacing.
pub const SETTINGS_ROW_Y: i32 = 35;
pub const SETTINGS_ROW_PITCH: i32 = 23;
pub const SETTINGS_ROW_HEIGHT: u32 = 18;

// Buffer capacities (characters)

/// Messages kept in the chat history ring.
pub const HISTORY_CAPACITY: usize = 100;
/// Longest stored message body.
pub const MESSAGE_TEXT_CHARS: usize = 127;
/// Longest stored sender or conversation name.
pub const NAME_CHARS: usize = 31;
/// List search filter.
pub const FILTER_CHARS: usize = 30;
/// Chat compose draft.
pub const COMPOSE_CHARS: usize = 150;
/// Device name editor.
pub const DEVICE_NAME_CHARS: usize = 31;
/// Numeric radio-parameter editor.
pub const NUMERIC_CHARS: usize = 15;

/// Contacts visited when building a filtered list.
pub const MAX_CONTACTS: usize = 128;
/// Group channel slots exposed by the mesh engine.
pub const MAX_GROUP_CHANNELS: usize = 8;
/// Upper bound on bubbles drawn in one chat frame.
pub const MAX_VISIBLE_BUBBLES: usize = 10;

// Timing (milliseconds)

/// Default inactivity timeout before the display is blanked (5 minutes).
pub const AUTO_OFF_MILLIS: u64 = 300_000;

/// How long a notification stays on screen.
pub const NOTIFICATION_MILLIS: u64 = 2_000;

/// Delay between the "restarting" notice and the restart request.
pub const RESTART_DELAY_MILLIS: u64 = 2_000;

/// Backspace auto-repeat: initial hold, then cadence.
pub const BACKSPACE_REPEAT_DELAY_MILLIS: u64 = 500;
pub const BACKSPACE_REPEAT_INTERVAL_MILLIS: u64 = 100;

/// Compose cursor blink half-period.
pub const CURSOR_BLINK_MILLIS: u64 = 350;

// Theme defaults

/// Backlight level used when no stored value exists.
pub const DEFAULT_BRIGHTNESS: u8 = 128;
/// Brightness change per Left/Right press (~6%).
pub const BRIGHTNESS_STEP: u8 = 15;
/// Palette indices for foreground (White) and background (Black).
pub const DEFAULT_MAIN_COLOR: u8 = 0;
pub const DEFAULT_SECONDARY_COLOR: u8 = 1;

/// BLE PIN the companion firmware uses when none was provisioned.
pub const DEFAULT_BLE_PIN: u32 = 123_456;

// Settings store

/// Namespace holding the UI preferences.
pub const UI_SETTINGS_NAMESPACE: &str = "ui_settings";
pub const KEY_BRIGHTNESS: &str = "brightness";
pub const KEY_MAIN_COLOR: &str = "main_color";
pub const KEY_SECONDARY_COLOR: &str = "sec_color";
pub const KEY_AUTO_OFF: &str = "auto_off";

/// Flash page index where settings storage starts (4 KB pages).
pub const STORAGE_FLASH_PAGE_START: u32 = 240;
/// Number of flash pages reserved for settings storage.
pub const STORAGE_FLASH_PAGE_COUNT: u32 = 4;
