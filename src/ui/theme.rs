//! Theme palette.

use embedded_graphics::pixelcolor::raw::RawU16;
use embedded_graphics::pixelcolor::Rgb565;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NamedColor {
    pub name: &'static str,
    pub rgb565: u16,
}

impl NamedColor {
    pub fn color(&self) -> Rgb565 {
        Rgb565::from(RawU16::new(self.rgb565))
    }
}

const fn named(name: &'static str, rgb565: u16) -> NamedColor {
    NamedColor { name, rgb565 }
}

/// Selectable theme colours; prefs store an index into this table.
pub const COLORS: [NamedColor; 18] = [
    named("White", 0xFFFF),
    named("Black", 0x0000),
    named("Red", 0xF800),
    named("Green", 0x07E0),
    named("Blue", 0x001F),
    named("Yellow", 0xFFE0),
    named("Cyan", 0x07FF),
    named("Magenta", 0xF81F),
    named("Orange", 0xFD20),
    named("Pink", 0xFE19),
    named("Purple", 0x8010),
    named("Brown", 0x8200),
    named("Gray", 0x8410),
    named("Light Blue", 0x051D),
    named("Light Green", 0x07F0),
    named("Dark Blue", 0x0010),
    named("Dark Green", 0x0320),
    named("Dark Red", 0x7800),
];

/// Accent used for unread markers.
pub const ACCENT: Rgb565 = Rgb565::new(31, 63, 0);

/// Entry for `index`, falling back to the first colour.
pub fn lookup(index: u8) -> &'static NamedColor {
    COLORS.get(index as usize).unwrap_or(&COLORS[0])
}

pub fn next_index(index: u8) -> u8 {
    ((index as usize + 1) % COLORS.len()) as u8
}

pub fn prev_index(index: u8) -> u8 {
    ((index as usize + COLORS.len() - 1) % COLORS.len()) as u8
}

/// Light (foreground) and dark (background) inks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub light: Rgb565,
    pub dark: Rgb565,
}

impl Palette {
    pub fn from_indices(main: u8, secondary: u8) -> Self {
        Self {
            light: lookup(main).color(),
            dark: lookup(secondary).color(),
        }
    }
}
