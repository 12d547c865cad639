//! embedded-graphics display wrapper.
//!
//! Adapts any `DrawTarget<Color = Rgb565>` (ST7789 driver, simulator,
//! framebuffer) to [`DisplaySurface`]. Backlight and panel power are left to
//! the board glue, which reads [`EgSurface::brightness`] and
//! [`DisplaySurface::is_on`].

use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_9X15};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};

use super::surface::{DisplaySurface, Ink};
use super::theme::{Palette, ACCENT};
use crate::config::DEFAULT_BRIGHTNESS;
use crate::error::Error;

fn font(size: u8) -> &'static MonoFont<'static> {
    if size >= 2 {
        &FONT_9X15
    } else {
        &FONT_6X10
    }
}

fn text_style(size: u8, color: Rgb565) -> MonoTextStyle<'static, Rgb565> {
    MonoTextStyleBuilder::new()
        .font(font(size))
        .text_color(color)
        .build()
}

pub struct EgSurface<D> {
    target: D,
    on: bool,
    brightness: u8,
    palette: Palette,
    ink: Ink,
    text_size: u8,
    cursor: Point,
    failed: bool,
}

impl<D> EgSurface<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    /// Wrap `target`; the surface starts on, white on black.
    pub fn new(target: D) -> Self {
        Self {
            target,
            on: true,
            brightness: DEFAULT_BRIGHTNESS,
            palette: Palette::from_indices(0, 1),
            ink: Ink::Light,
            text_size: 1,
            cursor: Point::zero(),
            failed: false,
        }
    }

    pub fn brightness(&self) -> u8 {
        self.brightness
    }

    pub fn target(&self) -> &D {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut D {
        &mut self.target
    }

    pub fn into_inner(self) -> D {
        self.target
    }

    fn color(&self) -> Rgb565 {
        match self.ink {
            Ink::Light => self.palette.light,
            Ink::Dark => self.palette.dark,
            Ink::Accent => ACCENT,
        }
    }

    fn fill_with(&mut self, rect: Rectangle, color: Rgb565) {
        if rect
            .into_styled(PrimitiveStyle::with_fill(color))
            .draw(&mut self.target)
            .is_err()
        {
            self.failed = true;
        }
    }
}

impl<D> DisplaySurface for EgSurface<D>
where
    D: DrawTarget<Color = Rgb565>,
{
    fn is_on(&self) -> bool {
        self.on
    }

    fn turn_on(&mut self) {
        self.on = true;
    }

    fn turn_off(&mut self) {
        self.on = false;
    }

    fn set_brightness(&mut self, level: u8) {
        self.brightness = level;
    }

    fn set_palette(&mut self, light: Rgb565, dark: Rgb565) {
        self.palette = Palette { light, dark };
    }

    fn begin_frame(&mut self) {
        self.failed = false;
        self.ink = Ink::Light;
        self.text_size = 1;
        self.cursor = Point::zero();
    }

    fn end_frame(&mut self) -> Result<(), Error> {
        if self.failed {
            Err(Error::Display)
        } else {
            Ok(())
        }
    }

    fn set_color(&mut self, ink: Ink) {
        self.ink = ink;
    }

    fn set_text_size(&mut self, size: u8) {
        self.text_size = size.max(1);
    }

    fn set_cursor(&mut self, at: Point) {
        self.cursor = at;
    }

    fn draw_rect(&mut self, rect: Rectangle) {
        let color = self.color();
        if rect
            .into_styled(PrimitiveStyle::with_stroke(color, 1))
            .draw(&mut self.target)
            .is_err()
        {
            self.failed = true;
        }
    }

    fn fill_rect(&mut self, rect: Rectangle) {
        let color = self.color();
        self.fill_with(rect, color);
    }

    fn fill_rect_rgb(&mut self, rect: Rectangle, color: Rgb565) {
        self.fill_with(rect, color);
    }

    fn print(&mut self, text: &str) {
        let style = text_style(self.text_size, self.color());
        match Text::with_baseline(text, self.cursor, style, Baseline::Top).draw(&mut self.target) {
            Ok(next) => self.cursor = next,
            Err(_) => self.failed = true,
        }
    }

    fn text_width(&self, text: &str) -> u32 {
        let font = font(self.text_size);
        let advance = font.character_size.width + font.character_spacing;
        text.chars().count() as u32 * advance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::pixelcolor::RgbColor;

    /// Full-panel framebuffer.
    struct Framebuffer {
        pixels: std::vec::Vec<Rgb565>,
    }

    impl Framebuffer {
        fn new() -> Self {
            Self {
                pixels: std::vec![Rgb565::BLACK; 240 * 135],
            }
        }

        fn pixel(&self, x: i32, y: i32) -> Rgb565 {
            self.pixels[(y * 240 + x) as usize]
        }
    }

    impl OriginDimensions for Framebuffer {
        fn size(&self) -> Size {
            Size::new(240, 135)
        }
    }

    impl DrawTarget for Framebuffer {
        type Color = Rgb565;
        type Error = core::convert::Infallible;

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Self::Color>>,
        {
            for Pixel(point, color) in pixels {
                if (0..240).contains(&point.x) && (0..135).contains(&point.y) {
                    self.pixels[(point.y * 240 + point.x) as usize] = color;
                }
            }
            Ok(())
        }
    }

    #[test]
    fn fill_uses_palette_ink() {
        let mut surface = EgSurface::new(Framebuffer::new());
        surface.set_palette(Rgb565::RED, Rgb565::BLUE);
        surface.begin_frame();
        surface.set_color(Ink::Dark);
        surface.fill_rect(Rectangle::new(Point::new(10, 10), Size::new(4, 4)));
        surface.set_color(Ink::Light);
        surface.draw_rect(Rectangle::new(Point::new(20, 20), Size::new(5, 5)));
        assert!(surface.end_frame().is_ok());

        let fb = surface.target();
        assert_eq!(fb.pixel(11, 11), Rgb565::BLUE);
        assert_eq!(fb.pixel(20, 22), Rgb565::RED);
        assert_eq!(fb.pixel(22, 22), Rgb565::BLACK);
    }

    #[test]
    fn print_advances_cursor_by_text_width() {
        let mut surface = EgSurface::new(Framebuffer::new());
        surface.begin_frame();
        surface.set_text_size(2);
        assert_eq!(surface.text_width("abcd"), 36);
        surface.set_cursor(Point::new(0, 0));
        surface.print("ab");
        surface.print("cd");
        assert_eq!(surface.cursor, Point::new(36, 0));

        surface.set_text_size(1);
        assert_eq!(surface.text_width("abcd"), 24);
    }

    #[test]
    fn power_and_brightness_state() {
        let mut surface = EgSurface::new(Framebuffer::new());
        assert!(surface.is_on());
        surface.turn_off();
        assert!(!surface.is_on());
        surface.set_brightness(40);
        assert_eq!(surface.brightness(), 40);
    }
}
