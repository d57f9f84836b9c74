//! Paletted sprite sheets
//!
//! Three 8-bit BMP sheets drive the widget:
//!
//! - **static**: the ten digits as complete tiles, 3 columns by 4 rows in
//!   reading order. Each tile holds a top half above a bottom half.
//! - **top animation**: one row per digit, `frame_count` frames of that
//!   digit's top half folding down.
//! - **bottom animation**: one row per digit, `frame_count` frames of that
//!   digit's bottom half unfolding.
//!
//! Pixel data stays in the BMP slices (normally flash); only the palettes
//! are copied out.

use embedded_graphics::geometry::{Point, Size};
use tinybmp::{Bpp, RawBmp};

use crate::palette::Palette;

/// Columns of the static sheet
pub const STATIC_COLUMNS: u32 = 3;

/// Rows of the static sheet
pub const STATIC_ROWS: u32 = 4;

/// Digit rows of each animation sheet
pub const ANIM_ROWS: u32 = 10;

/// Last transparent palette index on the static sheet
pub const STATIC_TRANSPARENT_THROUGH: u8 = 0;

/// Last transparent palette index on the animation sheets
pub const ANIM_TRANSPARENT_THROUGH: u8 = 10;

/// Sprite sheet errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SheetError {
    /// Not a readable BMP file
    Bmp,
    /// Image is not 8 bits per pixel
    NotIndexed,
    /// Image carries no colour table
    MissingPalette,
    /// Sheet dimensions do not match the tile layout
    Geometry,
}

/// Which half of a digit tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Half {
    Top,
    Bottom,
}

/// One 8-bit paletted image
pub struct SpriteSheet<'a> {
    raw: RawBmp<'a>,
    palette: Palette,
    size: Size,
}

impl core::fmt::Debug for SpriteSheet<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SpriteSheet")
            .field("size", &self.size)
            .field("colors", &self.palette.len())
            .finish()
    }
}

impl<'a> SpriteSheet<'a> {
    /// Parse an 8-bit BMP; indices `0..=transparent_through` become
    /// transparent
    pub fn from_bmp(bytes: &'a [u8], transparent_through: u8) -> Result<Self, SheetError> {
        let raw = RawBmp::from_slice(bytes).map_err(|_| SheetError::Bmp)?;

        let header = raw.header();
        if !matches!(header.bpp, Bpp::Bits8) {
            return Err(SheetError::NotIndexed);
        }
        let size = header.image_size;

        let table = raw.color_table().ok_or(SheetError::MissingPalette)?;
        let count = u32::try_from(table.len()).map_err(|_| SheetError::MissingPalette)?;
        if count == 0 {
            return Err(SheetError::MissingPalette);
        }
        let mut palette = Palette::from_rgb888((0..count).filter_map(|i| table.get(i)));
        palette.make_transparent_through(transparent_through);

        Ok(Self { raw, palette, size })
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Palette index at `(x, y)`, top-left origin
    pub fn index_at(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let point = Point::new(x as i32, y as i32);
        self.raw.pixel(point).and_then(|index| u8::try_from(index).ok())
    }
}

/// Size of one half-tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TileGeometry {
    pub width: u32,
    pub half_height: u32,
}

impl TileGeometry {
    /// Tile size implied by a static sheet of `size`
    pub fn from_static(size: Size) -> Result<Self, SheetError> {
        let width = size.width / STATIC_COLUMNS;
        let half_height = size.height / STATIC_ROWS / 2;
        if width == 0 || half_height == 0 {
            return Err(SheetError::Geometry);
        }
        Ok(Self { width, half_height })
    }

    pub fn height(&self) -> u32 {
        self.half_height * 2
    }
}

/// The three sheets of a flip-clock face
#[derive(Debug)]
pub struct SpriteSheets<'a> {
    static_sheet: SpriteSheet<'a>,
    top_anim: SpriteSheet<'a>,
    bottom_anim: SpriteSheet<'a>,
    geometry: TileGeometry,
    frame_count: u8,
}

impl<'a> SpriteSheets<'a> {
    /// Load and cross-check the three sheets
    ///
    /// Each animation sheet must be `frame_count` tiles wide and ten half
    /// tiles tall.
    pub fn load(
        static_bmp: &'a [u8],
        top_anim_bmp: &'a [u8],
        bottom_anim_bmp: &'a [u8],
        frame_count: u8,
    ) -> Result<Self, SheetError> {
        let static_sheet = SpriteSheet::from_bmp(static_bmp, STATIC_TRANSPARENT_THROUGH)?;
        let top_anim = SpriteSheet::from_bmp(top_anim_bmp, ANIM_TRANSPARENT_THROUGH)?;
        let bottom_anim = SpriteSheet::from_bmp(bottom_anim_bmp, ANIM_TRANSPARENT_THROUGH)?;

        let geometry = TileGeometry::from_static(static_sheet.size())?;
        if frame_count == 0 {
            return Err(SheetError::Geometry);
        }
        let expected = Size::new(
            geometry.width * u32::from(frame_count),
            geometry.half_height * ANIM_ROWS,
        );
        if top_anim.size() != expected || bottom_anim.size() != expected {
            return Err(SheetError::Geometry);
        }

        Ok(Self {
            static_sheet,
            top_anim,
            bottom_anim,
            geometry,
            frame_count,
        })
    }

    pub fn geometry(&self) -> TileGeometry {
        self.geometry
    }

    pub fn frame_count(&self) -> u8 {
        self.frame_count
    }

    /// Sheet and source origin of a static half digit
    pub fn static_half(&self, digit: u8, half: Half) -> (&SpriteSheet<'a>, Point) {
        let digit = u32::from(digit % 10);
        let x = (digit % STATIC_COLUMNS) * self.geometry.width;
        let mut y = (digit / STATIC_COLUMNS) * self.geometry.height();
        if half == Half::Bottom {
            y += self.geometry.half_height;
        }
        (&self.static_sheet, Point::new(x as i32, y as i32))
    }

    /// Sheet and source origin of one animation frame
    pub fn anim_frame(&self, digit: u8, half: Half, frame: u8) -> (&SpriteSheet<'a>, Point) {
        let sheet = match half {
            Half::Top => &self.top_anim,
            Half::Bottom => &self.bottom_anim,
        };
        let x = u32::from(frame % self.frame_count) * self.geometry.width;
        let y = u32::from(digit % 10) * self.geometry.half_height;
        (sheet, Point::new(x as i32, y as i32))
    }
}

#[cfg(test)]
pub(crate) mod fixture {
    //! Hand-built 8-bit BMP files for tests

    extern crate std;

    use std::vec::Vec;

    /// Colours in the fixture palette
    pub const COLORS: u32 = 16;

    /// Build a bottom-up 8-bit BMP with a grey palette
    pub fn bmp8(width: u32, height: u32, index: impl Fn(u32, u32) -> u8) -> Vec<u8> {
        let stride = (width + 3) & !3;
        let data_offset = 14 + 40 + COLORS * 4;
        let file_size = data_offset + stride * height;

        let mut out = Vec::new();
        out.extend_from_slice(b"BM");
        out.extend_from_slice(&file_size.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&data_offset.to_le_bytes());

        out.extend_from_slice(&40u32.to_le_bytes());
        out.extend_from_slice(&(width as i32).to_le_bytes());
        out.extend_from_slice(&(height as i32).to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&8u16.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(&(stride * height).to_le_bytes());
        out.extend_from_slice(&2835u32.to_le_bytes());
        out.extend_from_slice(&2835u32.to_le_bytes());
        out.extend_from_slice(&COLORS.to_le_bytes());
        out.extend_from_slice(&0u32.to_le_bytes());

        for i in 0..COLORS {
            let v = (i * 16) as u8;
            out.extend_from_slice(&[v, v, v, 0]);
        }

        for row in (0..height).rev() {
            for x in 0..stride {
                out.push(if x < width { index(x, row) } else { 0 });
            }
        }
        out
    }

    /// Static sheet with 4x4 tiles: digit `d` top half uses index `d + 1`
    /// in its top-left pixel, the rest of each half is index 12 (top) or
    /// 13 (bottom)
    pub fn static_sheet() -> Vec<u8> {
        bmp8(12, 16, |x, y| {
            let digit = (y / 4) * 3 + x / 4;
            let in_tile = (x % 4, y % 4);
            match in_tile {
                (0, 0) if digit < 10 => (digit + 1) as u8,
                (_, 0..=1) => 12,
                _ => 13,
            }
        })
    }

    /// Animation sheet for 4x2 half tiles and `frames` frames: pixel (0,0)
    /// of each frame is transparent index 5, the rest index 14
    pub fn anim_sheet(frames: u32) -> Vec<u8> {
        bmp8(4 * frames, 20, |x, y| if x % 4 == 0 && y % 2 == 0 { 5 } else { 14 })
    }
}
