use std::path::PathBuf;

use thiserror::Error;

use crate::device::GlError;
use crate::render::VaoError;

/// Errors raised by the glyph atlas and text pipeline.
#[derive(Error, Debug)]
pub enum TextError {
    /// Font file could not be read.
    #[error("failed to read font {path}: {source}")]
    ResourceLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Font bytes are not a usable TrueType/OpenType font.
    #[error("failed to parse font: {0}")]
    FontParse(String),

    #[error("invalid font pixel size {0}, must be positive")]
    InvalidPixelSize(u32),

    /// A single glyph is wider than the atlas.
    #[error("glyph {ch:?} is {width} px wide, the atlas is only {atlas_width} px")]
    GlyphTooLarge { ch: char, width: u32, atlas_width: u32 },

    /// Drawing needs the atlas texture; call `FontAtlas::upload` first.
    #[error("font atlas texture has not been uploaded")]
    NotUploaded,

    #[error(transparent)]
    Gl(#[from] GlError),

    #[error(transparent)]
    Vao(#[from] VaoError),
}
