//! Deterministic synthetic glyphs for unit tests.

use std::collections::HashMap;

use super::raster::{GlyphRasterizer, RasterizedGlyph};

/// Glyph shapes derived from the character code, so every build of the same
/// character range produces identical metrics and bitmaps.
///
/// Space renders as a zero-area glyph. Individual characters can be pinned
/// with [`FakeRasterizer::with_glyph`].
#[derive(Default)]
pub(crate) struct FakeRasterizer {
    overrides: HashMap<char, RasterizedGlyph>,
}

impl FakeRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins `ch` to a solid `width × height` glyph.
    pub fn with_glyph(
        mut self,
        ch: char,
        width: u32,
        height: u32,
        bearing: (i32, i32),
        advance: u32,
    ) -> Self {
        let glyph = RasterizedGlyph {
            width,
            height,
            bearing_x: bearing.0,
            bearing_y: bearing.1,
            advance,
            bitmap: vec![255; (width * height) as usize],
        };
        self.overrides.insert(ch, glyph);
        self
    }
}

impl GlyphRasterizer for FakeRasterizer {
    fn rasterize(&self, ch: char, pixel_size: u32) -> RasterizedGlyph {
        if let Some(g) = self.overrides.get(&ch) {
            return g.clone();
        }
        if ch.is_whitespace() {
            return RasterizedGlyph { advance: pixel_size / 3, ..RasterizedGlyph::default() };
        }

        let code = ch as u32;
        let width = pixel_size / 4 + code % 5;
        let height = pixel_size / 2 + code % 7;
        let bitmap = (0..width * height).map(|i| ((i + code) % 255 + 1) as u8).collect();
        RasterizedGlyph {
            width,
            height,
            bearing_x: (code % 3) as i32 - 1,
            bearing_y: height as i32 - (code % 2) as i32,
            advance: width + 1,
            bitmap,
        }
    }
}
