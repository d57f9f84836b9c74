//! Flip-clock widget
//!
//! Draws two digit pairs and a colon from the sprite sheets onto any
//! `Rgb565` draw target. A pair is redrawn only when its value changes,
//! and only the digits that changed play the flip animation.

use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_hal_async::delay::DelayNs;

use flipclock_core::time::DigitPair;
use flipclock_core::traits::{ClockFace, FaceError};

use crate::palette::fade;
use crate::sheet::{Half, SpriteSheet, SpriteSheets};

/// Smallest supported scale
pub const MIN_SCALE: u8 = 1;

/// Largest supported scale; flipping gets visibly slow beyond it
pub const MAX_SCALE: u8 = 2;

/// Widget layout and animation parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlipClockConfig {
    /// Top-left corner on the panel
    pub position: Point,
    /// Integer pixel scale, clamped to `MIN_SCALE..=MAX_SCALE`
    pub scale: u8,
    pub colon_color: Rgb565,
    /// Fill behind transparent static pixels
    pub background: Rgb565,
    /// Shade the halves while they flip
    pub dynamic_fading: bool,
    /// Level of the upper half facing the light
    pub brighter_level: f32,
    /// Level of a half folded furthest from the light
    pub darker_level: f32,
    /// Level of the resting lower half
    pub medium_level: f32,
    /// Pause after each animation frame (ms)
    pub frame_delay_ms: u32,
}

impl Default for FlipClockConfig {
    fn default() -> Self {
        Self {
            position: Point::new(48, 54),
            scale: 1,
            colon_color: Rgb565::GREEN,
            background: Rgb565::BLACK,
            dynamic_fading: true,
            brighter_level: 0.99,
            darker_level: 0.5,
            medium_level: 0.9,
            frame_delay_ms: 20,
        }
    }
}

/// Which pair a write targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    First,
    Second,
}

/// Flip-clock widget
pub struct FlipClock<'a, D, Dl> {
    target: D,
    delay: Dl,
    sheets: SpriteSheets<'a>,
    config: FlipClockConfig,
    first: Option<DigitPair>,
    second: Option<DigitPair>,
    colon_drawn: bool,
}

impl<'a, D, Dl> FlipClock<'a, D, Dl>
where
    D: DrawTarget<Color = Rgb565>,
    Dl: DelayNs,
{
    /// Create the widget; nothing is drawn until the first pair is set
    pub fn new(target: D, delay: Dl, sheets: SpriteSheets<'a>, config: FlipClockConfig) -> Self {
        let config = FlipClockConfig {
            scale: config.scale.clamp(MIN_SCALE, MAX_SCALE),
            ..config
        };
        Self {
            target,
            delay,
            sheets,
            config,
            first: None,
            second: None,
            colon_drawn: false,
        }
    }

    pub fn config(&self) -> &FlipClockConfig {
        &self.config
    }

    /// Draw target, e.g. to clear the panel before first use
    pub fn target_mut(&mut self) -> &mut D {
        &mut self.target
    }

    /// Give back the draw target and delay
    pub fn release(self) -> (D, Dl) {
        (self.target, self.delay)
    }

    async fn set(&mut self, slot: Slot, text: &str) -> Result<(), FaceError> {
        let pair = DigitPair::parse(text).map_err(|_| FaceError::InvalidPair)?;
        let shown = match slot {
            Slot::First => self.first,
            Slot::Second => self.second,
        };
        if shown == Some(pair) {
            return Ok(());
        }

        if !self.colon_drawn {
            self.draw_colon().map_err(|_| FaceError::Render)?;
            self.colon_drawn = true;
        }

        let base = match slot {
            Slot::First => 0,
            Slot::Second => 2,
        };
        let old = shown.map(|p| p.digits());
        for (i, digit) in pair.digits().into_iter().enumerate() {
            let cell = base + i as u32;
            match old.map(|d| d[i]) {
                None => self.draw_digit(cell, digit).map_err(|_| FaceError::Render)?,
                Some(prev) if prev != digit => self.flip(cell, prev, digit).await?,
                Some(_) => {}
            }
        }

        match slot {
            Slot::First => self.first = Some(pair),
            Slot::Second => self.second = Some(pair),
        }
        Ok(())
    }

    /// Animate one digit cell from `old` to `new`
    ///
    /// The new top half shows behind the old top half folding down, then
    /// the new bottom half unfolds over the old bottom half.
    async fn flip(&mut self, cell: u32, old: u8, new: u8) -> Result<(), FaceError> {
        let frames = self.sheets.frame_count();
        let (top_level, bottom_level) = self.resting_levels();

        for frame in 0..frames {
            let level = self.frame_level(frame, self.config.brighter_level, self.config.darker_level);
            self.draw_static_half(cell, new, Half::Top, top_level)
                .and_then(|()| self.draw_frame(cell, old, Half::Top, frame, level))
                .map_err(|_| FaceError::Render)?;
            self.delay.delay_ms(self.config.frame_delay_ms).await;
        }

        for frame in 0..frames {
            let level = self.frame_level(frame, self.config.darker_level, self.config.medium_level);
            self.draw_static_half(cell, old, Half::Bottom, bottom_level)
                .and_then(|()| self.draw_frame(cell, new, Half::Bottom, frame, level))
                .map_err(|_| FaceError::Render)?;
            self.delay.delay_ms(self.config.frame_delay_ms).await;
        }

        self.draw_static_half(cell, new, Half::Bottom, bottom_level)
            .map_err(|_| FaceError::Render)
    }

    /// Levels of the resting top and bottom halves
    fn resting_levels(&self) -> (f32, f32) {
        if self.config.dynamic_fading {
            (self.config.brighter_level, self.config.medium_level)
        } else {
            (1.0, 1.0)
        }
    }

    /// Level of animation frame `frame`, moving from `from` to `to`
    fn frame_level(&self, frame: u8, from: f32, to: f32) -> f32 {
        if !self.config.dynamic_fading {
            return 1.0;
        }
        let last = self.sheets.frame_count().saturating_sub(1);
        if last == 0 {
            return to;
        }
        from + (to - from) * f32::from(frame) / f32::from(last)
    }

    fn draw_digit(&mut self, cell: u32, digit: u8) -> Result<(), D::Error> {
        let (top_level, bottom_level) = self.resting_levels();
        self.draw_static_half(cell, digit, Half::Top, top_level)?;
        self.draw_static_half(cell, digit, Half::Bottom, bottom_level)
    }

    fn draw_static_half(&mut self, cell: u32, digit: u8, half: Half, level: f32) -> Result<(), D::Error> {
        let (dst, size, scale) = (self.half_origin(cell, half), self.half_size(), self.scale());
        self.target
            .fill_solid(&Rectangle::new(dst, size * scale), self.config.background)?;
        let (sheet, src) = self.sheets.static_half(digit, half);
        blit(&mut self.target, sheet, src, size, dst, scale, level)
    }

    fn draw_frame(&mut self, cell: u32, digit: u8, half: Half, frame: u8, level: f32) -> Result<(), D::Error> {
        let (dst, size, scale) = (self.half_origin(cell, half), self.half_size(), self.scale());
        let (sheet, src) = self.sheets.anim_frame(digit, half, frame);
        blit(&mut self.target, sheet, src, size, dst, scale, level)
    }

    /// Two squares centred in the gap between the pairs
    fn draw_colon(&mut self) -> Result<(), D::Error> {
        let geometry = self.sheets.geometry();
        let side = (geometry.width / 4).max(1);
        let x = 2 * geometry.width + (self.colon_width() - side.min(self.colon_width())) / 2;
        for third in [1, 2] {
            let y = (geometry.height() * third / 3).saturating_sub(side / 2);
            let origin = self.config.position + self.scaled_point(x, y);
            let square = Rectangle::new(origin, Size::new(side, side) * self.scale());
            self.target.fill_solid(&square, self.config.colon_color)?;
        }
        Ok(())
    }

    fn scale(&self) -> u32 {
        u32::from(self.config.scale)
    }

    fn colon_width(&self) -> u32 {
        (self.sheets.geometry().width / 2).max(1)
    }

    fn half_size(&self) -> Size {
        let geometry = self.sheets.geometry();
        Size::new(geometry.width, geometry.half_height)
    }

    /// Screen origin of a half digit; cells 0-1 are the first pair, 2-3 the
    /// second
    fn half_origin(&self, cell: u32, half: Half) -> Point {
        let geometry = self.sheets.geometry();
        let mut x = cell * geometry.width;
        if cell >= 2 {
            x += self.colon_width();
        }
        let y = match half {
            Half::Top => 0,
            Half::Bottom => geometry.half_height,
        };
        self.config.position + self.scaled_point(x, y)
    }

    fn scaled_point(&self, x: u32, y: u32) -> Point {
        let scale = self.scale();
        Point::new((x * scale) as i32, (y * scale) as i32)
    }
}

/// Copy a tile's opaque pixels to the target, scaled and faded
fn blit<D>(
    target: &mut D,
    sheet: &SpriteSheet<'_>,
    src: Point,
    size: Size,
    dst: Point,
    scale: u32,
    level: f32,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb565>,
{
    let (sx, sy) = (src.x.max(0) as u32, src.y.max(0) as u32);
    let pixels = (0..size.height)
        .flat_map(move |y| (0..size.width).map(move |x| (x, y)))
        .filter_map(move |(x, y)| {
            let index = sheet.index_at(sx + x, sy + y)?;
            let color = sheet.palette().opaque(index)?;
            let color = if level < 1.0 { fade(color, level) } else { color };
            Some((x, y, color))
        })
        .flat_map(move |(x, y, color)| {
            (0..scale * scale).map(move |i| {
                let px = x * scale + i % scale;
                let py = y * scale + i / scale;
                Pixel(dst + Point::new(px as i32, py as i32), color)
            })
        });
    target.draw_iter(pixels)
}

impl<D, Dl> ClockFace for FlipClock<'_, D, Dl>
where
    D: DrawTarget<Color = Rgb565>,
    Dl: DelayNs,
{
    async fn set_first_pair(&mut self, pair: &str) -> Result<(), FaceError> {
        self.set(Slot::First, pair).await
    }

    async fn set_second_pair(&mut self, pair: &str) -> Result<(), FaceError> {
        self.set(Slot::Second, pair).await
    }

    fn first_pair(&self) -> &str {
        self.first.as_ref().map_or("", DigitPair::as_str)
    }

    fn second_pair(&self) -> &str {
        self.second.as_ref().map_or("", DigitPair::as_str)
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use crate::sheet::fixture::{anim_sheet, static_sheet};
    use embassy_futures::block_on;
    use embedded_graphics::pixelcolor::Rgb888;
    use std::vec;
    use std::vec::Vec;

    const WIDTH: u32 = 48;
    const HEIGHT: u32 = 16;

    /// Frame buffer that counts writes per pixel
    struct Canvas {
        pixels: Vec<Option<Rgb565>>,
        hits: Vec<u32>,
        fail: bool,
    }

    impl Canvas {
        fn new() -> Self {
            let len = (WIDTH * HEIGHT) as usize;
            Self {
                pixels: vec![None; len],
                hits: vec![0; len],
                fail: false,
            }
        }

        fn at(&self, x: u32, y: u32) -> Option<Rgb565> {
            self.pixels[(y * WIDTH + x) as usize]
        }

        fn hits(&self, x: u32, y: u32) -> u32 {
            self.hits[(y * WIDTH + x) as usize]
        }
    }

    impl DrawTarget for Canvas {
        type Color = Rgb565;
        type Error = ();

        fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
        where
            I: IntoIterator<Item = Pixel<Rgb565>>,
        {
            if self.fail {
                return Err(());
            }
            for Pixel(point, color) in pixels {
                if point.x < 0 || point.y < 0 {
                    continue;
                }
                let (x, y) = (point.x as u32, point.y as u32);
                if x < WIDTH && y < HEIGHT {
                    let i = (y * WIDTH + x) as usize;
                    self.pixels[i] = Some(color);
                    self.hits[i] += 1;
                }
            }
            Ok(())
        }
    }

    impl OriginDimensions for Canvas {
        fn size(&self) -> Size {
            Size::new(WIDTH, HEIGHT)
        }
    }

    #[derive(Default)]
    struct Frames {
        calls: Vec<u32>,
    }

    impl DelayNs for Frames {
        async fn delay_ns(&mut self, ns: u32) {
            self.calls.push(ns / 1_000_000);
        }

        async fn delay_ms(&mut self, ms: u32) {
            self.calls.push(ms);
        }
    }

    /// Grey of fixture palette index `i`
    fn grey(i: u8) -> Rgb565 {
        Rgb565::from(Rgb888::new(i * 16, i * 16, i * 16))
    }

    fn plain() -> FlipClockConfig {
        FlipClockConfig {
            position: Point::zero(),
            dynamic_fading: false,
            colon_color: Rgb565::RED,
            ..FlipClockConfig::default()
        }
    }

    struct Fixture {
        static_bmp: Vec<u8>,
        anim_bmp: Vec<u8>,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                static_bmp: static_sheet(),
                anim_bmp: anim_sheet(5),
            }
        }

        fn sheets(&self) -> SpriteSheets<'_> {
            SpriteSheets::load(&self.static_bmp, &self.anim_bmp, &self.anim_bmp, 5).unwrap()
        }
    }

    #[test]
    fn test_invalid_pair_rejected_without_drawing() {
        let fixture = Fixture::new();
        let mut clock = FlipClock::new(Canvas::new(), Frames::default(), fixture.sheets(), plain());

        for bad in ["7", "123", "a1", ""] {
            assert_eq!(block_on(clock.set_first_pair(bad)), Err(FaceError::InvalidPair));
        }
        assert_eq!(clock.first_pair(), "");
        let (canvas, _) = clock.release();
        assert!(canvas.hits.iter().all(|&h| h == 0));
    }

    #[test]
    fn test_first_write_draws_without_animation() {
        let fixture = Fixture::new();
        let mut clock = FlipClock::new(Canvas::new(), Frames::default(), fixture.sheets(), plain());

        block_on(clock.set_first_pair("07")).unwrap();
        assert_eq!(clock.first_pair(), "07");
        assert_eq!(clock.second_pair(), "");
        let (canvas, frames) = clock.release();

        assert!(frames.calls.is_empty());
        // Tile marker pixels carry digit + 1
        assert_eq!(canvas.at(0, 0), Some(grey(1)));
        assert_eq!(canvas.at(4, 0), Some(grey(8)));
        assert_eq!(canvas.at(1, 0), Some(grey(12)));
        assert_eq!(canvas.at(1, 3), Some(grey(13)));
        // Colon sits between the pairs
        assert_eq!(canvas.at(8, 1), Some(Rgb565::RED));
        assert_eq!(canvas.at(8, 2), Some(Rgb565::RED));
    }

    #[test]
    fn test_default_colon_is_green() {
        let fixture = Fixture::new();
        let config = FlipClockConfig {
            position: Point::zero(),
            dynamic_fading: false,
            ..FlipClockConfig::default()
        };
        let mut clock = FlipClock::new(Canvas::new(), Frames::default(), fixture.sheets(), config);

        block_on(clock.set_first_pair("12")).unwrap();
        let (canvas, _) = clock.release();
        assert_eq!(canvas.at(8, 1), Some(Rgb565::GREEN));
        assert_eq!(canvas.at(8, 2), Some(Rgb565::GREEN));
    }

    #[test]
    fn test_second_pair_follows_colon() {
        let fixture = Fixture::new();
        let mut clock = FlipClock::new(Canvas::new(), Frames::default(), fixture.sheets(), plain());

        block_on(clock.set_second_pair("10")).unwrap();
        let (canvas, _) = clock.release();

        assert_eq!(canvas.at(10, 0), Some(grey(2)));
        assert_eq!(canvas.at(14, 0), Some(grey(1)));
        assert_eq!(canvas.at(0, 0), None);
    }

    #[test]
    fn test_change_flips_only_changed_digit() {
        let fixture = Fixture::new();
        let mut clock = FlipClock::new(Canvas::new(), Frames::default(), fixture.sheets(), plain());

        block_on(clock.set_first_pair("07")).unwrap();
        block_on(clock.set_first_pair("08")).unwrap();
        assert_eq!(clock.first_pair(), "08");
        let (canvas, frames) = clock.release();

        // Five top frames and five bottom frames at 20 ms
        assert_eq!(frames.calls, vec![20; 10]);
        assert_eq!(canvas.at(4, 0), Some(grey(9)));
        assert_eq!(canvas.at(5, 3), Some(grey(13)));
        // Tens digit untouched after its first background fill and tile
        assert_eq!(canvas.hits(0, 0), 2);
    }

    #[test]
    fn test_same_value_is_not_redrawn() {
        let fixture = Fixture::new();
        let mut clock = FlipClock::new(Canvas::new(), Frames::default(), fixture.sheets(), plain());

        block_on(clock.set_first_pair("12")).unwrap();
        block_on(clock.set_first_pair("12")).unwrap();
        let (canvas, frames) = clock.release();

        assert!(frames.calls.is_empty());
        assert_eq!(canvas.hits(0, 0), 2);
    }

    #[test]
    fn test_scale_doubles_and_clamps() {
        let fixture = Fixture::new();
        let config = FlipClockConfig { scale: 5, ..plain() };
        let mut clock = FlipClock::new(Canvas::new(), Frames::default(), fixture.sheets(), config);
        assert_eq!(clock.config().scale, MAX_SCALE);

        block_on(clock.set_first_pair("00")).unwrap();
        let (canvas, _) = clock.release();

        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(canvas.at(x, y), Some(grey(1)));
        }
        assert_eq!(canvas.at(2, 0), Some(grey(12)));
        assert_eq!(canvas.at(8, 0), Some(grey(1)));

        let config = FlipClockConfig { scale: 0, ..plain() };
        let clock = FlipClock::new(Canvas::new(), Frames::default(), fixture.sheets(), config);
        assert_eq!(clock.config().scale, MIN_SCALE);
    }

    #[test]
    fn test_fading_shades_resting_halves() {
        let fixture = Fixture::new();
        let config = FlipClockConfig {
            dynamic_fading: true,
            ..plain()
        };
        let mut clock = FlipClock::new(Canvas::new(), Frames::default(), fixture.sheets(), config);

        block_on(clock.set_first_pair("34")).unwrap();
        let (canvas, _) = clock.release();

        assert_eq!(canvas.at(1, 0), Some(fade(grey(12), 0.99)));
        assert_eq!(canvas.at(1, 3), Some(fade(grey(13), 0.9)));
    }

    #[test]
    fn test_draw_failure_is_render_error() {
        let fixture = Fixture::new();
        let mut canvas = Canvas::new();
        canvas.fail = true;
        let mut clock = FlipClock::new(canvas, Frames::default(), fixture.sheets(), plain());

        assert_eq!(block_on(clock.set_second_pair("42")), Err(FaceError::Render));
        assert_eq!(clock.second_pair(), "");
    }
}
