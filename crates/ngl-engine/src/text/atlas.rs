use std::collections::BTreeMap;
use std::ops::RangeInclusive;
use std::path::Path;

use crate::device::TextureId;

use super::raster::{FontdueRasterizer, GlyphRasterizer};
use super::TextError;

// ── config ────────────────────────────────────────────────────────────────

/// Atlas layout parameters.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AtlasConfig {
    /// Fixed atlas width in pixels; height is computed from the packing.
    pub width: u32,
    /// Gap between glyphs, and below the last row.
    pub padding: u32,
    pub first_char: char,
    /// Inclusive.
    pub last_char: char,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            width: 1024,
            padding: 2,
            first_char: ' ',
            last_char: '~',
        }
    }
}

impl AtlasConfig {
    /// Characters packed into the atlas, in increasing code order.
    pub fn chars(&self) -> RangeInclusive<char> {
        self.first_char..=self.last_char
    }
}

// ── glyph table ───────────────────────────────────────────────────────────

/// Pixel-space rectangle inside the atlas bitmap.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct AtlasRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl AtlasRect {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// `(u0, v0, u1, v1)` in pixels.
    #[inline]
    pub fn corners(&self) -> [u32; 4] {
        [self.x, self.y, self.x + self.width, self.y + self.height]
    }

    /// True when the two rectangles share interior area.
    pub fn overlaps(&self, other: &AtlasRect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

/// Metrics and atlas placement of one glyph.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlyphMetrics {
    pub ch: char,
    /// Bitmap width in pixels.
    pub width: u32,
    /// Bitmap height in pixels.
    pub height: u32,
    pub bearing_x: i32,
    pub bearing_y: i32,
    pub advance: u32,
    pub rect: AtlasRect,
}

impl GlyphMetrics {
    /// Atlas rectangle normalized by the atlas dimensions.
    pub fn uv(&self, atlas_width: u32, atlas_height: u32) -> [f32; 4] {
        let [u0, v0, u1, v1] = self.rect.corners();
        let (w, h) = (atlas_width as f32, atlas_height as f32);
        [u0 as f32 / w, v0 as f32 / h, u1 as f32 / w, v1 as f32 / h]
    }
}

// ── atlas ─────────────────────────────────────────────────────────────────

/// Shelf-packed single-channel glyph atlas for one font at one pixel size.
///
/// The glyph table and bitmap are immutable after [`build`](FontAtlas::build).
/// The GPU texture is created by [`upload`](FontAtlas::upload) and must be
/// released with [`release`](FontAtlas::release) while the context is alive.
#[derive(Debug)]
pub struct FontAtlas {
    pixel_size: u32,
    glyphs: BTreeMap<char, GlyphMetrics>,
    bitmap: Vec<u8>,
    width: u32,
    height: u32,
    pub(super) texture: Option<TextureId>,
}

impl FontAtlas {
    /// Rasterizes `config.chars()` and shelf-packs them left to right.
    ///
    /// A glyph that does not fit on the current row starts a new one
    /// `row_height + padding` below. Zero-area glyphs (space) get a table
    /// entry but no bitmap copy.
    pub fn build(
        rasterizer: &dyn GlyphRasterizer,
        pixel_size: u32,
        config: &AtlasConfig,
    ) -> Result<Self, TextError> {
        if pixel_size == 0 {
            return Err(TextError::InvalidPixelSize(pixel_size));
        }
        let AtlasConfig { width: atlas_w, padding, .. } = *config;

        let (mut x, mut y, mut row_h) = (0u32, 0u32, 0u32);
        let mut glyphs = BTreeMap::new();
        let mut pending = Vec::new();

        for ch in config.chars() {
            let g = rasterizer.rasterize(ch, pixel_size);
            let (w, h) = (g.width, g.height);

            // Padding only separates neighbours; a row-leading glyph may fill the row.
            if w > atlas_w {
                return Err(TextError::GlyphTooLarge { ch, width: w, atlas_width: atlas_w });
            }
            // Advance to a new shelf row when the glyph doesn't fit horizontally.
            if x > 0 && x + w + padding > atlas_w {
                y += row_h + padding;
                x = 0;
                row_h = 0;
            }

            let rect = AtlasRect { x, y, width: w, height: h };
            glyphs.insert(
                ch,
                GlyphMetrics {
                    ch,
                    width: w,
                    height: h,
                    bearing_x: g.bearing_x,
                    bearing_y: g.bearing_y,
                    advance: g.advance,
                    rect,
                },
            );
            if !rect.is_empty() {
                pending.push((rect, g.bitmap));
            }

            x += w + padding;
            row_h = row_h.max(h);
        }

        let atlas_h = y + row_h + padding;
        let mut bitmap = vec![0u8; atlas_w as usize * atlas_h as usize];
        for (rect, src) in &pending {
            blit(&mut bitmap, atlas_w, rect, src);
        }

        log::debug!(
            "FontAtlas: packed {} glyphs at {pixel_size}px into {atlas_w}×{atlas_h}",
            glyphs.len()
        );

        Ok(Self {
            pixel_size,
            glyphs,
            bitmap,
            width: atlas_w,
            height: atlas_h,
            texture: None,
        })
    }

    /// Loads a font file with fontdue and builds its atlas.
    pub fn from_file(
        path: impl AsRef<Path>,
        pixel_size: u32,
        config: &AtlasConfig,
    ) -> Result<Self, TextError> {
        if pixel_size == 0 {
            return Err(TextError::InvalidPixelSize(pixel_size));
        }
        let rasterizer = FontdueRasterizer::from_file(path)?;
        Self::build(&rasterizer, pixel_size, config)
    }

    pub fn from_bytes(
        bytes: &[u8],
        pixel_size: u32,
        config: &AtlasConfig,
    ) -> Result<Self, TextError> {
        if pixel_size == 0 {
            return Err(TextError::InvalidPixelSize(pixel_size));
        }
        let rasterizer = FontdueRasterizer::from_bytes(bytes)?;
        Self::build(&rasterizer, pixel_size, config)
    }

    #[inline]
    pub fn glyph(&self, ch: char) -> Option<&GlyphMetrics> {
        self.glyphs.get(&ch)
    }

    /// Glyph table in character-code order.
    pub fn glyphs(&self) -> impl Iterator<Item = &GlyphMetrics> {
        self.glyphs.values()
    }

    #[inline]
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Row-major `width * height` coverage bytes.
    #[inline]
    pub fn bitmap(&self) -> &[u8] {
        &self.bitmap
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn pixel_size(&self) -> u32 {
        self.pixel_size
    }

    #[inline]
    pub fn texture(&self) -> Option<TextureId> {
        self.texture
    }
}

fn blit(dst: &mut [u8], dst_w: u32, rect: &AtlasRect, src: &[u8]) {
    let w = rect.width as usize;
    for (row, line) in src.chunks_exact(w).take(rect.height as usize).enumerate() {
        let start = (rect.y as usize + row) * dst_w as usize + rect.x as usize;
        dst[start..start + w].copy_from_slice(line);
    }
}
