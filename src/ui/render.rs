//! Screen drawing against a [`DisplaySurface`].
//!
//! Every routine draws a complete region from state it is handed; nothing
//! here reads the mesh engine or mutates UI state. Contacts, channels and
//! settings lists all go through [`draw_rows`].

use core::fmt::Write;

use embedded_graphics::prelude::{Point, Size};
use embedded_graphics::primitives::Rectangle;
use heapless::{String, Vec};

use super::notification::Notification;
use super::settings::{BarChoice, BarKind, SettingsView};
use super::surface::{DisplaySurface, Ink};
use super::theme::Palette;
use crate::chat::Bubble;
use crate::config::{
    BOTTOM_BAR_HEIGHT, BOTTOM_BAR_Y, CHAT_TITLE_CHARS, COMPOSE_BAR_HEIGHT, COMPOSE_BAR_Y,
    COMPOSE_CHARS, COMPOSE_VISIBLE_CHARS, CURSOR_BLINK_MILLIS, DEFAULT_BLE_PIN, HEADER_HEIGHT,
    HEADER_ICON_WIDTH, LIST_NAME_CHARS, LIST_ROW_HEIGHT, LIST_ROW_PITCH, LIST_ROW_TOP, LIST_WINDOW,
    MESSAGE_TEXT_CHARS,
    SCREEN_HEIGHT, SCREEN_WIDTH, SETTINGS_ROW_HEIGHT, SETTINGS_ROW_PITCH, SETTINGS_ROW_Y,
};
use crate::text::{prefix, sanitize_for_display};

/// One visible list row.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListRow {
    pub name: String<LIST_NAME_CHARS>,
    /// Channel has unread messages.
    pub unread: bool,
}

impl ListRow {
    pub fn new(name: &str, unread: bool) -> Self {
        Self {
            name: sanitize_for_display(name),
            unread,
        }
    }
}

/// Contacts/Channels tab.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Tab {
    Contacts,
    Channels,
}

fn rect(x: i32, y: i32, w: u32, h: u32) -> Rectangle {
    Rectangle::new(Point::new(x, y), Size::new(w, h))
}

fn print_at<D: DisplaySurface + ?Sized>(d: &mut D, x: i32, y: i32, text: &str) {
    d.set_cursor(Point::new(x, y));
    d.print(text);
}

/// Print `text` horizontally centred on the screen.
fn print_centered<D: DisplaySurface + ?Sized>(d: &mut D, y: i32, text: &str) {
    let width = d.text_width(text) as i32;
    print_at(d, (SCREEN_WIDTH as i32 - width) / 2, y, text);
}

/// Fill the whole panel with the background ink.
pub fn clear<D: DisplaySurface + ?Sized>(d: &mut D) {
    d.set_color(Ink::Dark);
    d.fill_rect(rect(0, 0, SCREEN_WIDTH, SCREEN_HEIGHT));
}

/// Header with the hamburger settings icon, title and pairing PIN.
pub fn draw_header<D: DisplaySurface + ?Sized>(
    d: &mut D,
    palette: Palette,
    icon_selected: bool,
    ble_pin: u32,
) {
    d.set_color(Ink::Light);
    d.draw_rect(rect(0, 0, SCREEN_WIDTH, HEADER_HEIGHT));
    d.draw_rect(rect(0, 0, HEADER_ICON_WIDTH, HEADER_HEIGHT));

    let lines = if icon_selected {
        d.fill_rect_rgb(rect(0, 0, HEADER_ICON_WIDTH, HEADER_HEIGHT), palette.light);
        palette.dark
    } else {
        palette.light
    };
    for y in [7, 13, 19] {
        d.fill_rect_rgb(rect(6, y, 18, 3), lines);
    }

    d.set_color(Ink::Light);
    d.set_text_size(2);
    print_at(d, 73, 7, "MeshCore");

    if ble_pin != 0 && ble_pin != DEFAULT_BLE_PIN {
        let mut pin: String<12> = String::new();
        let _ = write!(pin, "{}", ble_pin);
        d.set_text_size(1);
        print_at(d, 189, 11, &pin);
    }
}

/// Geometry of the three-row window drawn by [`draw_rows`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowStyle {
    /// Top edge of the first row.
    pub top: i32,
    pub pitch: i32,
    pub height: u32,
    /// Name position relative to the row's top-left corner.
    pub text: Point,
    /// Every row gets a border, not just the selection fill.
    pub outlined: bool,
    /// `>` in front of the selected row.
    pub marker: bool,
}

impl RowStyle {
    /// Contacts and channels.
    pub const LIST: Self = Self {
        top: LIST_ROW_TOP,
        pitch: LIST_ROW_PITCH,
        height: LIST_ROW_HEIGHT,
        text: Point::new(16, 6),
        outlined: true,
        marker: false,
    };

    /// Settings categories and presets.
    pub const SETTINGS: Self = Self {
        top: SETTINGS_ROW_Y - 2,
        pitch: SETTINGS_ROW_PITCH,
        height: SETTINGS_ROW_HEIGHT,
        text: Point::new(10, 2),
        outlined: false,
        marker: false,
    };

    pub const fn with_marker(self, marker: bool) -> Self {
        Self { marker, ..self }
    }
}

/// Three-row list body. `selected` is the index within `rows`.
pub fn draw_rows<D: DisplaySurface + ?Sized>(
    d: &mut D,
    style: RowStyle,
    rows: &[ListRow],
    selected: Option<usize>,
    placeholder: &str,
) {
    if rows.is_empty() {
        d.set_color(Ink::Light);
        d.set_text_size(2);
        print_centered(d, 60, placeholder);
        return;
    }

    for (i, row) in rows.iter().take(LIST_WINDOW).enumerate() {
        let y = style.top + i as i32 * style.pitch;
        let bounds = rect(0, y, SCREEN_WIDTH, style.height);
        d.set_color(Ink::Light);
        if style.outlined {
            d.draw_rect(bounds);
        }
        d.set_text_size(2);

        if selected == Some(i) {
            d.fill_rect(bounds);
            d.set_color(Ink::Dark);
            if style.marker {
                print_at(d, 2, y + 7, ">");
            }
        }
        print_at(d, style.text.x, y + style.text.y, &row.name);

        if row.unread {
            d.set_color(Ink::Accent);
            d.fill_rect(rect(SCREEN_WIDTH as i32 - 14, y + 10, 8, 8));
        }
    }
}

/// Contacts/Channels tab bar, or the search bar while a filter is typed.
pub fn draw_bottom_bar<D: DisplaySurface + ?Sized>(d: &mut D, active: Tab, filter: &str) {
    d.set_color(Ink::Light);
    d.set_text_size(2);

    if !filter.is_empty() {
        d.draw_rect(rect(0, COMPOSE_BAR_Y, SCREEN_WIDTH, COMPOSE_BAR_HEIGHT));
        let shown: String<32> = sanitize_for_display(filter);
        print_at(d, 4, 112, &shown);
        let cursor_x = 4 + d.text_width(&shown) as i32;
        if cursor_x < 235 {
            d.fill_rect(rect(cursor_x, 112, 3, 14));
        }
        return;
    }

    d.draw_rect(rect(0, BOTTOM_BAR_Y, SCREEN_WIDTH, BOTTOM_BAR_HEIGHT));
    for (tab, x, label) in [(Tab::Contacts, 0, "Contacts"), (Tab::Channels, 120, "Channels")] {
        d.set_color(Ink::Light);
        if tab == active {
            d.fill_rect(rect(x, BOTTOM_BAR_Y, 120, BOTTOM_BAR_HEIGHT));
            d.set_color(Ink::Dark);
        }
        print_at(d, x + 13, BOTTOM_BAR_Y + 7, label);
    }
}

/// Chat header: back glyph and `#channel` / `@contact`.
pub fn draw_chat_header<D: DisplaySurface + ?Sized>(d: &mut D, is_channel: bool, name: &str) {
    d.set_color(Ink::Light);
    d.draw_rect(rect(0, 0, SCREEN_WIDTH, HEADER_HEIGHT));
    d.set_text_size(2);
    print_at(d, 4, 7, "<");

    let clean: String<32> = sanitize_for_display(name);
    let mut title: String<{ CHAT_TITLE_CHARS + 1 }> = String::new();
    let _ = title.push(if is_channel { '#' } else { '@' });
    let _ = title.push_str(prefix(&clean, CHAT_TITLE_CHARS));
    print_centered(d, 7, &title);
}

/// Message bubbles, or a placeholder when the thread is empty.
pub fn draw_bubbles<D: DisplaySurface + ?Sized>(d: &mut D, bubbles: &[Bubble<'_>]) {
    if bubbles.is_empty() {
        d.set_color(Ink::Light);
        d.set_text_size(1);
        print_at(d, 80, 60, "No messages");
        return;
    }
    for bubble in bubbles {
        draw_bubble(d, bubble);
    }
}

fn draw_bubble<D: DisplaySurface + ?Sized>(d: &mut D, bubble: &Bubble<'_>) {
    let r = bubble.rect;
    let (x, y) = (r.top_left.x, r.top_left.y);
    let (w, h) = (r.size.width, r.size.height);

    if let (Some(sender), Some(origin)) = (bubble.sender, bubble.label_origin()) {
        let label: String<32> = sanitize_for_display(sender);
        d.set_color(Ink::Light);
        d.set_text_size(1);
        d.set_cursor(origin);
        d.print(&label);
    }

    d.set_color(Ink::Light);
    if bubble.message.is_outgoing {
        d.fill_rect(r);
    }
    for inset in 0..3u32 {
        let i = inset as i32;
        d.draw_rect(rect(
            x + i,
            y + i,
            w.saturating_sub(2 * inset),
            h.saturating_sub(2 * inset),
        ));
    }

    d.set_color(Ink::Dark);
    let right = x + w as i32 - 3;
    let bottom = y + h as i32 - 3;
    for (cx, cy) in [(x, y), (right, y), (x, bottom), (right, bottom)] {
        d.fill_rect(rect(cx, cy, 3, 3));
    }

    d.set_color(if bubble.message.is_outgoing {
        Ink::Dark
    } else {
        Ink::Light
    });
    d.set_text_size(bubble.size.font_scale());

    let body: String<MESSAGE_TEXT_CHARS> = sanitize_for_display(bubble.body);
    let origin = bubble.text_origin();
    let line_height = bubble.size.line_height();
    for (n, chunk) in body
        .as_bytes()
        .chunks(bubble.size.chars_per_line())
        .take(bubble.lines)
        .enumerate()
    {
        if let Ok(line) = core::str::from_utf8(chunk) {
            print_at(d, origin.x, origin.y + n as i32 * line_height, line);
        }
    }
}

/// Compose bar: draft tail, blinking cursor and counter, or `_` when idle.
pub fn draw_compose_bar<D: DisplaySurface + ?Sized>(d: &mut D, draft: Option<&str>, now_ms: u64) {
    d.set_color(Ink::Light);
    d.draw_rect(rect(0, COMPOSE_BAR_Y, SCREEN_WIDTH, COMPOSE_BAR_HEIGHT));
    d.set_text_size(2);

    let Some(draft) = draft else {
        print_at(d, 6, 112, "_");
        return;
    };

    let start = draft.len().saturating_sub(COMPOSE_VISIBLE_CHARS);
    let visible = &draft[start..];
    print_at(d, 6, 112, visible);

    if (now_ms / CURSOR_BLINK_MILLIS) % 2 == 0 {
        let cursor_x = 6 + d.text_width(visible) as i32;
        if cursor_x < 190 {
            d.fill_rect(rect(cursor_x, 112, 3, 14));
        }
    }

    let mut counter: String<12> = String::new();
    let _ = write!(counter, "{}/{}", draft.len(), COMPOSE_CHARS);
    d.set_text_size(1);
    let width = d.text_width(&counter) as i32;
    print_at(d, 234 - width, 122, &counter);
}

/// Full-screen notification.
pub fn draw_notification<D: DisplaySurface + ?Sized>(d: &mut D, notification: &Notification) {
    clear(d);
    d.set_color(Ink::Light);
    d.set_text_size(2);

    let from: String<32> = sanitize_for_display(&notification.from);
    print_centered(d, 30, &from);
    for (n, line) in notification.lines().iter().enumerate() {
        print_centered(d, 55 + n as i32 * 18, line);
    }

    d.set_text_size(1);
    print_centered(d, 120, "Press any key");
}

/// Yes/no modal over the current screen.
pub fn draw_confirm<D: DisplaySurface + ?Sized>(d: &mut D, prompt: &str, detail: &str) {
    let frame = rect(10, 30, SCREEN_WIDTH - 20, 75);
    d.set_color(Ink::Dark);
    d.fill_rect(frame);
    d.set_color(Ink::Light);
    d.draw_rect(frame);

    d.set_text_size(2);
    print_centered(d, 40, prompt);
    if !detail.is_empty() {
        let clean: String<32> = sanitize_for_display(detail);
        print_centered(d, 62, prefix(&clean, LIST_NAME_CHARS));
    }
    d.set_text_size(1);
    print_centered(d, 90, "Enter = yes, any key = no");
}

fn draw_title<D: DisplaySurface + ?Sized>(d: &mut D, title: &str) {
    d.set_color(Ink::Light);
    d.draw_rect(rect(0, 0, SCREEN_WIDTH, HEADER_HEIGHT));
    d.draw_rect(rect(0, 0, HEADER_ICON_WIDTH, HEADER_HEIGHT));
    d.set_text_size(2);
    print_centered(d, 7, title);
}

fn draw_settings_bar<D: DisplaySurface + ?Sized>(d: &mut D, bar: BarKind, focus: Option<BarChoice>) {
    d.set_color(Ink::Light);
    d.draw_rect(rect(0, BOTTOM_BAR_Y, SCREEN_WIDTH, BOTTOM_BAR_HEIGHT));
    d.set_text_size(2);

    let halves: &[(BarChoice, i32, u32, i32, &str)] = match bar {
        BarKind::SaveBack => &[
            (BarChoice::Save, 0, 120, 35, "Save"),
            (BarChoice::Back, 120, 120, 155, "Back"),
        ],
        BarKind::Back => &[(BarChoice::Back, 0, SCREEN_WIDTH, 96, "Back")],
    };
    for &(choice, x, w, text_x, label) in halves {
        d.set_color(Ink::Light);
        let focused = match bar {
            BarKind::SaveBack => focus == Some(choice),
            BarKind::Back => focus.is_some(),
        };
        if focused {
            d.fill_rect(rect(x, BOTTOM_BAR_Y, w, BOTTOM_BAR_HEIGHT));
            d.set_color(Ink::Dark);
        }
        print_at(d, text_x, BOTTOM_BAR_Y + 7, label);
    }
}

/// Settings screen for any [`SettingsView`].
pub fn draw_settings<D: DisplaySurface + ?Sized>(d: &mut D, view: &SettingsView<'_>) {
    match view {
        SettingsView::List {
            title,
            rows,
            scroll,
            selected,
            bar,
            bar_focus,
        } => {
            draw_title(d, title);
            let mut visible: Vec<ListRow, LIST_WINDOW> = Vec::new();
            for row in rows.iter().skip(*scroll).take(LIST_WINDOW) {
                let _ = visible.push(ListRow::new(row, false));
            }
            let selected = (*selected).and_then(|idx| idx.checked_sub(*scroll));
            draw_rows(d, RowStyle::SETTINGS, &visible, selected, "");
            draw_settings_bar(d, *bar, *bar_focus);
        }
        SettingsView::Edit { title, text, hint } => {
            draw_title(d, "Settings");
            d.set_color(Ink::Light);
            d.set_text_size(1);
            print_at(d, 10, 36, title);

            let field = rect(8, 52, SCREEN_WIDTH - 16, 26);
            d.draw_rect(field);
            d.set_text_size(2);
            let visible = &text[text.len().saturating_sub(COMPOSE_VISIBLE_CHARS)..];
            print_at(d, 14, 58, visible);
            let cursor_x = 14 + d.text_width(visible) as i32;
            d.fill_rect(rect(cursor_x, 58, 3, 14));

            d.set_text_size(1);
            print_centered(d, 118, hint);
        }
        SettingsView::Share { name, uri } => {
            draw_title(d, "Share");
            d.set_color(Ink::Light);
            d.set_text_size(2);
            let clean: String<32> = sanitize_for_display(name);
            print_centered(d, 36, prefix(&clean, LIST_NAME_CHARS));

            // URI wrapped at 38 small-font columns.
            d.set_text_size(1);
            for (n, chunk) in uri.as_bytes().chunks(38).take(5).enumerate() {
                if let Ok(line) = core::str::from_utf8(chunk) {
                    print_at(d, 6, 58 + n as i32 * 11, line);
                }
            }
            print_centered(d, 124, "Press any key");
        }
        SettingsView::Confirm { prompt } => {
            draw_title(d, "Settings");
            draw_confirm(d, prompt, "");
        }
        SettingsView::Info { title, lines } => {
            draw_title(d, title);
            d.set_color(Ink::Light);
            d.set_text_size(1);
            for (n, line) in lines.iter().enumerate() {
                print_at(d, 10, 36 + n as i32 * 12, line);
            }
            print_centered(d, 120, "Press any key");
        }
    }
}
