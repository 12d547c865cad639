//! Display surface collaborator.
//!
//! Frame-bracketed drawing with a current ink, text size and cursor, the way
//! the rendering code expects a small TFT driver to behave.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::Point;
use embedded_graphics::primitives::Rectangle;

use crate::error::Error;

/// Logical colours; the surface maps them through the current palette.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Ink {
    /// Theme main colour (text, borders).
    Light,
    /// Theme secondary colour (background, inverted text).
    Dark,
    /// Unread markers.
    Accent,
}

pub trait DisplaySurface {
    fn is_on(&self) -> bool;

    fn turn_on(&mut self);

    fn turn_off(&mut self);

    /// Backlight level, 0..=255.
    fn set_brightness(&mut self, level: u8);

    fn set_palette(&mut self, light: Rgb565, dark: Rgb565);

    fn begin_frame(&mut self);

    /// Finish the frame; reports any drawing failure since `begin_frame`.
    fn end_frame(&mut self) -> Result<(), Error>;

    fn set_color(&mut self, ink: Ink);

    /// 1 = small font, 2 = large font.
    fn set_text_size(&mut self, size: u8);

    /// Top-left of the next printed text.
    fn set_cursor(&mut self, at: Point);

    fn draw_rect(&mut self, rect: Rectangle);

    fn fill_rect(&mut self, rect: Rectangle);

    /// Fill with an explicit colour, bypassing the palette.
    fn fill_rect_rgb(&mut self, rect: Rectangle, color: Rgb565);

    /// Print at the cursor and advance it.
    fn print(&mut self, text: &str);

    /// Width in pixels of `text` at the current text size.
    fn text_width(&self, text: &str) -> u32;
}
