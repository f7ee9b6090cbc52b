use std::collections::HashMap;
use std::path::Path;

use crate::coords::{Rgb, Vec2, Viewport};
use crate::device::{BufferUsage, GlContext, Primitive};
use crate::render::{SimpleVao, VertexArray, VertexData};
use crate::shader::{DefaultShader, ShaderLib};

use super::instances::{collect_instances, TextInstance};
use super::{AtlasConfig, FontAtlas, TextError};

/// Draws `text` with its baseline starting at `origin` (screen pixels,
/// origin top-left).
///
/// Uploads one point per visible glyph into `vao` and draws them with the
/// text program, which expands each point into a textured quad. Text with
/// no drawable glyphs issues no GL calls at all.
pub fn render_text(
    gl: &mut dyn GlContext,
    shaders: &mut ShaderLib,
    vao: &mut SimpleVao,
    atlas: &FontAtlas,
    text: &str,
    origin: Vec2,
    colour: Rgb,
) -> Result<(), TextError> {
    let Some(instances) = collect_instances(atlas, text, origin) else {
        return Ok(());
    };
    let texture = atlas.texture().ok_or(TextError::NotUploaded)?;
    let count = instances.len() as u32;

    vao.bind(gl);
    let data = VertexData::from_slice(&instances, count).with_usage(BufferUsage::DynamicDraw);
    if let Err(e) = vao.set_data(gl, data) {
        vao.unbind(gl);
        return Err(e.into());
    }
    let stride = TextInstance::STRIDE;
    vao.set_vertex_attribute_pointer(gl, 0, 2, stride, 0);
    vao.set_vertex_attribute_pointer(gl, 1, 4, stride, 8);
    vao.set_vertex_attribute_pointer(gl, 2, 2, stride, 24);
    vao.set_mode(Primitive::Points);

    gl.active_texture(0);
    gl.bind_texture_2d(Some(texture));

    shaders.use_program(gl, DefaultShader::Text);
    shaders.set_uniform(gl, "u_textColor", colour.clamped().with_alpha(1.0));
    shaders.set_uniform(gl, "u_texture", 0i32);

    vao.set_num_indices(count);
    vao.draw(gl);
    vao.unbind(gl);
    Ok(())
}

/// Named fonts plus the shared point VAO used to draw them.
///
/// ```no_run
/// # use ngl_engine::{coords::Rgb, device::GlContext, shader::ShaderLib, text::TextRenderer};
/// # fn demo(gl: &mut dyn GlContext) -> Result<(), Box<dyn std::error::Error>> {
/// let mut shaders = ShaderLib::with_defaults(gl)?;
/// let mut text = TextRenderer::new(gl)?;
/// text.add_font(gl, "mono", "fonts/DejaVuSansMono.ttf", 24)?;
/// text.set_screen_size(gl, &mut shaders, 1024, 720);
/// text.render_text(gl, &mut shaders, "mono", 10.0, 30.0, "hello", Rgb::white())?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct TextRenderer {
    fonts: HashMap<String, FontAtlas>,
    vao: SimpleVao,
    config: AtlasConfig,
}

impl TextRenderer {
    pub fn new(gl: &mut dyn GlContext) -> Result<Self, TextError> {
        Self::with_config(gl, AtlasConfig::default())
    }

    /// Renderer whose fonts are packed with `config`.
    pub fn with_config(gl: &mut dyn GlContext, config: AtlasConfig) -> Result<Self, TextError> {
        Ok(Self {
            fonts: HashMap::new(),
            vao: SimpleVao::new(gl, Primitive::Points)?,
            config,
        })
    }

    /// Loads `path` at `pixel_size`, uploads its atlas and registers it under `name`.
    pub fn add_font(
        &mut self,
        gl: &mut dyn GlContext,
        name: &str,
        path: impl AsRef<Path>,
        pixel_size: u32,
    ) -> Result<(), TextError> {
        let atlas = FontAtlas::from_file(path, pixel_size, &self.config)?;
        self.add_atlas(gl, name, atlas)
    }

    pub fn add_font_from_bytes(
        &mut self,
        gl: &mut dyn GlContext,
        name: &str,
        bytes: &[u8],
        pixel_size: u32,
    ) -> Result<(), TextError> {
        let atlas = FontAtlas::from_bytes(bytes, pixel_size, &self.config)?;
        self.add_atlas(gl, name, atlas)
    }

    /// Registers a prebuilt atlas, uploading it if needed. A font already
    /// registered under `name` is released and replaced.
    pub fn add_atlas(
        &mut self,
        gl: &mut dyn GlContext,
        name: &str,
        mut atlas: FontAtlas,
    ) -> Result<(), TextError> {
        atlas.upload(gl)?;
        if let Some(mut old) = self.fonts.insert(name.to_string(), atlas) {
            log::debug!("TextRenderer: replacing font '{name}'");
            old.release(gl);
        }
        log::info!("TextRenderer: font '{name}' ready");
        Ok(())
    }

    pub fn font(&self, name: &str) -> Option<&FontAtlas> {
        self.fonts.get(name)
    }

    /// Sets the text program's screen-space uniforms.
    ///
    /// Call once after creation and again on every resize. A zero-sized
    /// screen (minimized window) is ignored.
    pub fn set_screen_size(
        &self,
        gl: &mut dyn GlContext,
        shaders: &mut ShaderLib,
        width: u32,
        height: u32,
    ) {
        let viewport = Viewport::from_pixels(width, height);
        if !viewport.is_valid() {
            log::warn!("TextRenderer: ignoring screen size {width}×{height}");
            return;
        }
        shaders.use_program(gl, DefaultShader::Text);
        shaders.set_uniform(gl, "u_texture", 0i32);
        shaders.set_uniform(gl, "u_screenSize", viewport);
        shaders.set_uniform(gl, "u_fontSize", 1.0f32);
        shaders.set_uniform(gl, "u_textColor", [1.0f32; 4]);
    }

    /// Draws `text` in font `name` with its baseline starting at `(x, y)`.
    ///
    /// An unregistered font logs a warning and draws nothing.
    #[allow(clippy::too_many_arguments)]
    pub fn render_text(
        &mut self,
        gl: &mut dyn GlContext,
        shaders: &mut ShaderLib,
        name: &str,
        x: f32,
        y: f32,
        text: &str,
        colour: Rgb,
    ) -> Result<(), TextError> {
        let Some(atlas) = self.fonts.get(name) else {
            log::warn!("TextRenderer: font '{name}' not found");
            return Ok(());
        };
        render_text(gl, shaders, &mut self.vao, atlas, text, Vec2::new(x, y), colour)
    }

    /// Releases every atlas texture and the VAO.
    pub fn destroy(self, gl: &mut dyn GlContext) {
        for (_, mut atlas) in self.fonts {
            atlas.release(gl);
        }
        self.vao.release(gl);
    }
}
