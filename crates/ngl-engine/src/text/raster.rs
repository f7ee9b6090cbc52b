use std::path::Path;

use super::TextError;

/// One rendered glyph, as the atlas builder consumes it.
///
/// Bearings follow the baseline convention: `bearing_x` is the offset from
/// the pen to the bitmap's left edge, `bearing_y` the height of the bitmap's
/// top edge above the baseline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RasterizedGlyph {
    pub width: u32,
    pub height: u32,
    pub bearing_x: i32,
    pub bearing_y: i32,
    /// Horizontal pen advance in whole pixels.
    pub advance: u32,
    /// Row-major coverage, `width * height` bytes.
    pub bitmap: Vec<u8>,
}

/// Source of glyph bitmaps for the atlas builder.
pub trait GlyphRasterizer {
    /// Renders `ch` at `pixel_size`. Characters the font lacks render as
    /// whatever fallback glyph the font provides.
    fn rasterize(&self, ch: char, pixel_size: u32) -> RasterizedGlyph;
}

/// [`GlyphRasterizer`] backed by a parsed `fontdue::Font`.
pub struct FontdueRasterizer {
    font: fontdue::Font,
}

impl FontdueRasterizer {
    /// Parses a TrueType or OpenType font from raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TextError> {
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| TextError::FontParse(e.to_string()))?;
        Ok(Self { font })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TextError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| TextError::ResourceLoad {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!("FontdueRasterizer: read {} bytes from {}", bytes.len(), path.display());
        Self::from_bytes(&bytes)
    }

    pub fn font(&self) -> &fontdue::Font {
        &self.font
    }
}

impl GlyphRasterizer for FontdueRasterizer {
    fn rasterize(&self, ch: char, pixel_size: u32) -> RasterizedGlyph {
        let (m, bitmap) = self.font.rasterize(ch, pixel_size as f32);
        RasterizedGlyph {
            width: m.width as u32,
            height: m.height as u32,
            bearing_x: m.xmin,
            // fontdue reports the bitmap's bottom edge relative to the baseline.
            bearing_y: m.ymin + m.height as i32,
            advance: m.advance_width.round().max(0.0) as u32,
            bitmap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_fail_to_parse() {
        let err = FontdueRasterizer::from_bytes(b"definitely not a font").err().unwrap();
        assert!(matches!(err, TextError::FontParse(_)));
    }

    #[test]
    fn missing_file_is_resource_load_error() {
        let err = FontdueRasterizer::from_file("/no/such/font.ttf").err().unwrap();
        match err {
            TextError::ResourceLoad { path, .. } => {
                assert_eq!(path, Path::new("/no/such/font.ttf"))
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
