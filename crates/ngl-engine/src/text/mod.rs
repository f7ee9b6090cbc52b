//! Bitmap-font text.
//!
//! This module is responsible for:
//! - rasterizing a fixed character range into a single-channel atlas
//! - uploading the atlas as a swizzled GL texture
//! - turning strings into per-glyph point instances
//! - drawing those instances with the geometry-shader text program

mod atlas;
mod error;
mod instances;
mod raster;
mod renderer;
mod upload;

#[cfg(test)]
pub(crate) mod fake;

pub use atlas::{AtlasConfig, AtlasRect, FontAtlas, GlyphMetrics};
pub use error::TextError;
pub use instances::{build_instances, collect_instances, Instances, TextInstance};
pub use raster::{FontdueRasterizer, GlyphRasterizer, RasterizedGlyph};
pub use renderer::{render_text, TextRenderer};
