//! Indexed colour palette
//!
//! Sprite sheets store one palette index per pixel. The palette maps each
//! index to an `Rgb565` colour and records which indices are transparent.

use embedded_graphics::pixelcolor::{Rgb565, Rgb888, RgbColor};

/// Largest palette an 8-bit image can carry
pub const MAX_COLORS: usize = 256;

/// Palette with per-index transparency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: [Rgb565; MAX_COLORS],
    len: usize,
    transparent: [u32; MAX_COLORS / 32],
}

impl Palette {
    /// Build a palette from 24-bit colours; entries past 256 are ignored
    pub fn from_rgb888<I>(colors: I) -> Self
    where
        I: IntoIterator<Item = Rgb888>,
    {
        let mut palette = Self {
            colors: [Rgb565::BLACK; MAX_COLORS],
            len: 0,
            transparent: [0; MAX_COLORS / 32],
        };
        for (slot, color) in palette.colors.iter_mut().zip(colors) {
            *slot = Rgb565::from(color);
            palette.len += 1;
        }
        palette
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Colour at `index`, or `None` past the end of the palette
    pub fn color(&self, index: u8) -> Option<Rgb565> {
        let index = usize::from(index);
        (index < self.len).then(|| self.colors[index])
    }

    /// Mark one index transparent
    pub fn make_transparent(&mut self, index: u8) {
        self.transparent[usize::from(index / 32)] |= 1 << (index % 32);
    }

    /// Mark every index in `0..=last` transparent
    pub fn make_transparent_through(&mut self, last: u8) {
        for index in 0..=last {
            self.make_transparent(index);
        }
    }

    pub fn is_transparent(&self, index: u8) -> bool {
        self.transparent[usize::from(index / 32)] & (1 << (index % 32)) != 0
    }

    /// Opaque colour at `index`; `None` for transparent or unknown indices
    pub fn opaque(&self, index: u8) -> Option<Rgb565> {
        if self.is_transparent(index) {
            return None;
        }
        self.color(index)
    }
}

/// Scale a colour's channels by `level` (clamped to 0.0..=1.0)
pub fn fade(color: Rgb565, level: f32) -> Rgb565 {
    let level = level.clamp(0.0, 1.0);
    let scale = |channel: u8| (f32::from(channel) * level + 0.5) as u8;
    Rgb565::new(scale(color.r()), scale(color.g()), scale(color.b()))
}
