use glow::HasContext;

use crate::shader::UniformValue;

use super::gl::{
    ActiveUniform, ActiveUniformBlock, BufferId, BufferTarget, BufferUsage, GlContext, IndexType,
    Primitive, ProgramId, ProgramInfo, ShaderId, ShaderStage, TexParam, TextureId, UniformKind,
    UniformLocation, VertexArrayId,
};
use super::GlError;

/// [`GlContext`] backed by a `glow::Context`.
///
/// The wrapped context must be current on the calling thread for as long as
/// this value is used. Creating the context (window, surface, loader) is the
/// caller's job.
pub struct GlowContext {
    gl: glow::Context,
}

impl GlowContext {
    pub fn new(gl: glow::Context) -> Self {
        log::debug!("GlowContext: wrapping GL context, version {:?}", gl.version());
        Self { gl }
    }

    /// Raw `glow` access for calls this crate does not wrap (clears, blend state).
    pub fn raw(&self) -> &glow::Context {
        &self.gl
    }
}

#[inline]
fn texture(id: TextureId) -> glow::NativeTexture {
    glow::NativeTexture(id.0)
}

#[inline]
fn buffer(id: BufferId) -> glow::NativeBuffer {
    glow::NativeBuffer(id.0)
}

#[inline]
fn vertex_array(id: VertexArrayId) -> glow::NativeVertexArray {
    glow::NativeVertexArray(id.0)
}

#[inline]
fn shader(id: ShaderId) -> glow::NativeShader {
    glow::NativeShader(id.0)
}

#[inline]
fn program(id: ProgramId) -> glow::NativeProgram {
    glow::NativeProgram(id.0)
}

#[inline]
fn location(loc: UniformLocation) -> glow::NativeUniformLocation {
    glow::NativeUniformLocation(loc.0)
}

impl GlContext for GlowContext {
    // ── textures ───────────────────────────────────────────────────────────

    fn create_texture(&mut self) -> Result<TextureId, GlError> {
        let t = unsafe { self.gl.create_texture() }.map_err(|e| GlError::create("texture", e))?;
        Ok(TextureId(t.0))
    }

    fn delete_texture(&mut self, id: TextureId) {
        unsafe { self.gl.delete_texture(texture(id)) };
    }

    fn active_texture(&mut self, unit: u32) {
        unsafe { self.gl.active_texture(glow::TEXTURE0 + unit) };
    }

    fn bind_texture_2d(&mut self, id: Option<TextureId>) {
        unsafe { self.gl.bind_texture(glow::TEXTURE_2D, id.map(texture)) };
    }

    fn pixel_unpack_alignment(&mut self, alignment: i32) {
        unsafe { self.gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, alignment) };
    }

    fn tex_image_2d_r8(&mut self, width: u32, height: u32, pixels: &[u8]) {
        unsafe {
            self.gl.tex_image_2d(
                glow::TEXTURE_2D,
                0,
                glow::RED as i32,
                width as i32,
                height as i32,
                0,
                glow::RED,
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(pixels)),
            );
        }
    }

    fn tex_parameter(&mut self, param: TexParam) {
        let (pname, value) = param.to_gl();
        unsafe { self.gl.tex_parameter_i32(glow::TEXTURE_2D, pname, value) };
    }

    // ── buffers ────────────────────────────────────────────────────────────

    fn create_buffer(&mut self) -> Result<BufferId, GlError> {
        let b = unsafe { self.gl.create_buffer() }.map_err(|e| GlError::create("buffer", e))?;
        Ok(BufferId(b.0))
    }

    fn delete_buffer(&mut self, id: BufferId) {
        unsafe { self.gl.delete_buffer(buffer(id)) };
    }

    fn bind_buffer(&mut self, target: BufferTarget, id: Option<BufferId>) {
        unsafe { self.gl.bind_buffer(target.to_gl(), id.map(buffer)) };
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        unsafe { self.gl.buffer_data_u8_slice(target.to_gl(), data, usage.to_gl()) };
    }

    fn bind_buffer_base(&mut self, target: BufferTarget, index: u32, id: Option<BufferId>) {
        unsafe { self.gl.bind_buffer_base(target.to_gl(), index, id.map(buffer)) };
    }

    fn map_buffer(&mut self, target: BufferTarget, f: &mut dyn FnMut(&mut [u8])) -> bool {
        let target = target.to_gl();
        unsafe {
            let size = self.gl.get_buffer_parameter_i32(target, glow::BUFFER_SIZE);
            if size <= 0 {
                return false;
            }
            let access = glow::MAP_READ_BIT | glow::MAP_WRITE_BIT;
            let ptr = self.gl.map_buffer_range(target, 0, size, access);
            if ptr.is_null() {
                log::error!("GlowContext: glMapBufferRange returned null for {size} bytes");
                return false;
            }
            // The mapping stays valid until unmap_buffer below.
            f(std::slice::from_raw_parts_mut(ptr, size as usize));
            self.gl.unmap_buffer(target);
        }
        true
    }

    // ── vertex arrays ──────────────────────────────────────────────────────

    fn create_vertex_array(&mut self) -> Result<VertexArrayId, GlError> {
        let v = unsafe { self.gl.create_vertex_array() }
            .map_err(|e| GlError::create("vertex array", e))?;
        Ok(VertexArrayId(v.0))
    }

    fn delete_vertex_array(&mut self, id: VertexArrayId) {
        unsafe { self.gl.delete_vertex_array(vertex_array(id)) };
    }

    fn bind_vertex_array(&mut self, id: Option<VertexArrayId>) {
        unsafe { self.gl.bind_vertex_array(id.map(vertex_array)) };
    }

    fn vertex_attrib_pointer_f32(
        &mut self,
        index: u32,
        size: i32,
        normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        unsafe {
            self.gl
                .vertex_attrib_pointer_f32(index, size, glow::FLOAT, normalized, stride, offset)
        };
    }

    fn enable_vertex_attrib_array(&mut self, index: u32) {
        unsafe { self.gl.enable_vertex_attrib_array(index) };
    }

    fn draw_arrays(&mut self, mode: Primitive, first: i32, count: i32) {
        unsafe { self.gl.draw_arrays(mode.to_gl(), first, count) };
    }

    fn draw_elements(&mut self, mode: Primitive, count: i32, index_type: IndexType, offset: i32) {
        unsafe { self.gl.draw_elements(mode.to_gl(), count, index_type.to_gl(), offset) };
    }

    // ── shaders ────────────────────────────────────────────────────────────

    fn create_shader(&mut self, stage: ShaderStage) -> Result<ShaderId, GlError> {
        let s = unsafe { self.gl.create_shader(stage.to_gl()) }
            .map_err(|e| GlError::create("shader", e))?;
        Ok(ShaderId(s.0))
    }

    fn shader_source(&mut self, id: ShaderId, source: &str) {
        unsafe { self.gl.shader_source(shader(id), source) };
    }

    fn compile_shader(&mut self, id: ShaderId) -> Result<(), String> {
        unsafe {
            self.gl.compile_shader(shader(id));
            if self.gl.get_shader_compile_status(shader(id)) {
                Ok(())
            } else {
                Err(self.gl.get_shader_info_log(shader(id)))
            }
        }
    }

    fn delete_shader(&mut self, id: ShaderId) {
        unsafe { self.gl.delete_shader(shader(id)) };
    }

    // ── programs ───────────────────────────────────────────────────────────

    fn create_program(&mut self) -> Result<ProgramId, GlError> {
        let p = unsafe { self.gl.create_program() }.map_err(|e| GlError::create("program", e))?;
        Ok(ProgramId(p.0))
    }

    fn attach_shader(&mut self, prog: ProgramId, sh: ShaderId) {
        unsafe { self.gl.attach_shader(program(prog), shader(sh)) };
    }

    fn link_program(&mut self, prog: ProgramId) -> Result<(), String> {
        unsafe {
            self.gl.link_program(program(prog));
            if self.gl.get_program_link_status(program(prog)) {
                Ok(())
            } else {
                Err(self.gl.get_program_info_log(program(prog)))
            }
        }
    }

    fn use_program(&mut self, prog: Option<ProgramId>) {
        unsafe { self.gl.use_program(prog.map(program)) };
    }

    fn delete_program(&mut self, prog: ProgramId) {
        unsafe { self.gl.delete_program(program(prog)) };
    }

    fn program_info(&mut self, prog: ProgramId) -> ProgramInfo {
        let p = program(prog);
        unsafe {
            ProgramInfo {
                link_status: self.gl.get_program_link_status(p),
                attached_shaders: self.gl.get_program_parameter_i32(p, glow::ATTACHED_SHADERS),
                active_attributes: self.gl.get_active_attributes(p) as i32,
                active_uniforms: self.gl.get_active_uniforms(p) as i32,
            }
        }
    }

    fn active_uniforms(&mut self, prog: ProgramId) -> Vec<ActiveUniform> {
        let p = program(prog);
        let count = unsafe { self.gl.get_active_uniforms(p) };
        let mut out = Vec::with_capacity(count as usize);

        for index in 0..count {
            let Some(active) = (unsafe { self.gl.get_active_uniform(p, index) }) else {
                continue;
            };
            let name = active.name.strip_suffix("[0]").unwrap_or(&active.name).to_string();
            // Uniforms inside blocks have no location.
            let Some(loc) = (unsafe { self.gl.get_uniform_location(p, &name) }) else {
                continue;
            };
            out.push(ActiveUniform {
                name,
                kind: UniformKind::from_gl(active.utype),
                location: UniformLocation(loc.0),
            });
        }
        out
    }

    fn active_uniform_blocks(&mut self, prog: ProgramId) -> Vec<ActiveUniformBlock> {
        let p = program(prog);
        let count = unsafe { self.gl.get_program_parameter_i32(p, glow::ACTIVE_UNIFORM_BLOCKS) };

        (0..count.max(0) as u32)
            .map(|index| unsafe {
                let size = self.gl.get_active_uniform_block_parameter_i32(
                    p,
                    index,
                    glow::UNIFORM_BLOCK_DATA_SIZE,
                );
                ActiveUniformBlock {
                    name: self.gl.get_active_uniform_block_name(p, index),
                    index,
                    size: size.max(0) as usize,
                }
            })
            .collect()
    }

    fn uniform_block_binding(&mut self, prog: ProgramId, index: u32, binding: u32) {
        unsafe { self.gl.uniform_block_binding(program(prog), index, binding) };
    }

    // ── uniforms ───────────────────────────────────────────────────────────

    fn set_uniform(&mut self, loc: UniformLocation, value: &UniformValue) {
        let l = location(loc);
        let l = Some(&l);
        unsafe {
            match *value {
                UniformValue::Int(v) => self.gl.uniform_1_i32(l, v),
                UniformValue::Float(v) => self.gl.uniform_1_f32(l, v),
                UniformValue::Vec2([x, y]) => self.gl.uniform_2_f32(l, x, y),
                UniformValue::Vec3([x, y, z]) => self.gl.uniform_3_f32(l, x, y, z),
                UniformValue::Vec4([x, y, z, w]) => self.gl.uniform_4_f32(l, x, y, z, w),
                UniformValue::Mat2(ref m) => self.gl.uniform_matrix_2_f32_slice(l, false, m),
                UniformValue::Mat3(ref m) => self.gl.uniform_matrix_3_f32_slice(l, false, m),
                UniformValue::Mat4(ref m) => self.gl.uniform_matrix_4_f32_slice(l, false, m),
            }
        }
    }

    fn get_uniform_f32(&mut self, prog: ProgramId, loc: UniformLocation, out: &mut [f32]) {
        unsafe { self.gl.get_uniform_f32(program(prog), &location(loc), out) };
    }
}
