use crate::device::{Channel, Filter, GlContext, SwizzleSource, TexParam, TextureId, Wrap};

use super::{FontAtlas, TextError};

/// Sampling state for the atlas: linear, clamped, and swizzled so the single
/// red channel reads as `(1, 1, 1, coverage)`.
const ATLAS_PARAMS: [TexParam; 8] = [
    TexParam::MinFilter(Filter::Linear),
    TexParam::MagFilter(Filter::Linear),
    TexParam::WrapS(Wrap::ClampToEdge),
    TexParam::WrapT(Wrap::ClampToEdge),
    TexParam::Swizzle(Channel::R, SwizzleSource::One),
    TexParam::Swizzle(Channel::G, SwizzleSource::One),
    TexParam::Swizzle(Channel::B, SwizzleSource::One),
    TexParam::Swizzle(Channel::A, SwizzleSource::Red),
];

impl FontAtlas {
    /// Creates the GPU texture for this atlas.
    ///
    /// An atlas that already owns a texture keeps it: the call warns and
    /// returns the existing handle.
    pub fn upload(&mut self, gl: &mut dyn GlContext) -> Result<TextureId, TextError> {
        if let Some(existing) = self.texture {
            log::warn!("FontAtlas: texture {} already uploaded, reusing it", existing.raw());
            return Ok(existing);
        }

        let texture = gl.create_texture()?;
        gl.pixel_unpack_alignment(1);
        gl.bind_texture_2d(Some(texture));
        gl.tex_image_2d_r8(self.width(), self.height(), self.bitmap());
        for param in ATLAS_PARAMS {
            gl.tex_parameter(param);
        }

        log::info!(
            "FontAtlas: uploaded {}×{} atlas ({}px) as texture {}",
            self.width(),
            self.height(),
            self.pixel_size(),
            texture.raw()
        );
        self.texture = Some(texture);
        Ok(texture)
    }

    /// Deletes the GPU texture, if any. The CPU-side atlas stays usable and
    /// can be uploaded again.
    pub fn release(&mut self, gl: &mut dyn GlContext) {
        if let Some(texture) = self.texture.take() {
            gl.delete_texture(texture);
        }
    }
}
