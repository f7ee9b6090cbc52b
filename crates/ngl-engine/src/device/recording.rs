//! In-memory [`GlContext`] used by unit tests.
//!
//! Every call is appended to [`RecordingContext::calls`]. Bind state is
//! tracked so tests can assert what a draw left behind, and uniform
//! introspection is emulated by scanning `uniform <type> <name>;` lines and
//! `uniform <Block> { ... };` declarations in the sources attached to a
//! program.

use std::collections::HashMap;
use std::num::NonZeroU32;

use crate::shader::UniformValue;

use super::gl::{
    ActiveUniform, ActiveUniformBlock, BufferId, BufferTarget, BufferUsage, GlContext, IndexType,
    Primitive, ProgramId, ProgramInfo, ShaderId, ShaderStage, TexParam, TextureId, UniformKind,
    UniformLocation, VertexArrayId,
};
use super::GlError;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum GlCall {
    CreateTexture(TextureId),
    DeleteTexture(TextureId),
    ActiveTexture(u32),
    BindTexture(Option<TextureId>),
    UnpackAlignment(i32),
    TexImage2dR8 { width: u32, height: u32, len: usize },
    TexParameter(TexParam),
    CreateBuffer(BufferId),
    DeleteBuffer(BufferId),
    BindBuffer(BufferTarget, Option<BufferId>),
    BufferData { target: BufferTarget, len: usize, usage: BufferUsage },
    BindBufferBase { target: BufferTarget, index: u32, buffer: Option<BufferId> },
    MapBuffer(BufferTarget),
    UnmapBuffer(BufferTarget),
    CreateVertexArray(VertexArrayId),
    DeleteVertexArray(VertexArrayId),
    BindVertexArray(Option<VertexArrayId>),
    AttribPointer { index: u32, size: i32, stride: i32, offset: i32 },
    EnableAttrib(u32),
    DrawArrays { mode: Primitive, first: i32, count: i32 },
    DrawElements { mode: Primitive, count: i32, index_type: IndexType },
    CreateShader(ShaderId, ShaderStage),
    CompileShader(ShaderId),
    DeleteShader(ShaderId),
    CreateProgram(ProgramId),
    LinkProgram(ProgramId),
    UseProgram(Option<ProgramId>),
    DeleteProgram(ProgramId),
    UniformBlockBinding { program: ProgramId, index: u32, binding: u32 },
    SetUniform(UniformLocation, UniformValue),
}

/// Snapshot of the context's bind points.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub(crate) struct BindState {
    pub program: Option<ProgramId>,
    pub array_buffer: Option<BufferId>,
    pub element_buffer: Option<BufferId>,
    pub uniform_buffer: Option<BufferId>,
    pub texture: Option<TextureId>,
    pub vertex_array: Option<VertexArrayId>,
    pub texture_unit: u32,
}

#[derive(Default)]
pub(crate) struct RecordingContext {
    pub calls: Vec<GlCall>,
    pub bound: BindState,
    /// Last uploaded bytes per buffer.
    pub buffers: HashMap<BufferId, Vec<u8>>,
    /// Shader sources containing this marker fail to compile.
    pub fail_compile_marker: Option<String>,
    /// Programs whose sources contain this marker fail to link.
    pub fail_link_marker: Option<String>,
    /// Buffer attached to each indexed uniform binding point.
    pub uniform_bindings: HashMap<u32, BufferId>,
    /// Binding point assigned to each `(program, block index)`.
    pub block_bindings: HashMap<(ProgramId, u32), u32>,

    next_id: u32,
    shader_sources: HashMap<ShaderId, String>,
    program_shaders: HashMap<ProgramId, Vec<ShaderId>>,
    linked: HashMap<ProgramId, Vec<ActiveUniform>>,
    blocks: HashMap<ProgramId, Vec<ActiveUniformBlock>>,
    uniform_values: HashMap<(ProgramId, UniformLocation), Vec<f32>>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self) -> NonZeroU32 {
        self.next_id += 1;
        NonZeroU32::new(self.next_id).unwrap_or(NonZeroU32::MIN)
    }

    pub fn draw_calls(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, GlCall::DrawArrays { .. } | GlCall::DrawElements { .. }))
            .count()
    }

    pub fn count(&self, pred: impl Fn(&GlCall) -> bool) -> usize {
        self.calls.iter().filter(|c| pred(c)).count()
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    fn bound_buffer(&self, target: BufferTarget) -> Option<BufferId> {
        match target {
            BufferTarget::Array => self.bound.array_buffer,
            BufferTarget::ElementArray => self.bound.element_buffer,
            BufferTarget::Uniform => self.bound.uniform_buffer,
        }
    }

    /// Uniform value last written through `set_uniform`, by uniform name.
    pub fn uniform(&self, program: ProgramId, name: &str) -> Option<&[f32]> {
        let loc = self.linked.get(&program)?.iter().find(|u| u.name == name)?.location;
        self.uniform_values.get(&(program, loc)).map(Vec::as_slice)
    }
}

fn parse_uniforms(sources: &[&str]) -> Vec<(String, UniformKind)> {
    let mut out: Vec<(String, UniformKind)> = Vec::new();
    for src in sources {
        for line in src.lines() {
            let line = line.trim();
            let Some(rest) = line.strip_prefix("uniform ") else { continue };
            let mut parts = rest.split_whitespace();
            let (Some(ty), Some(name)) = (parts.next(), parts.next()) else { continue };
            let Some(name) = name.strip_suffix(';') else { continue };
            let name = name.split('[').next().unwrap_or(name).to_string();
            let kind = match ty {
                "float" => UniformKind::Float,
                "vec2" => UniformKind::Vec2,
                "vec3" => UniformKind::Vec3,
                "vec4" => UniformKind::Vec4,
                "int" => UniformKind::Int,
                "bool" => UniformKind::Bool,
                "mat2" => UniformKind::Mat2,
                "mat3" => UniformKind::Mat3,
                "mat4" => UniformKind::Mat4,
                "sampler2D" => UniformKind::Sampler2D,
                _ => UniformKind::Other(0),
            };
            if !out.iter().any(|(n, _)| *n == name) {
                out.push((name, kind));
            }
        }
    }
    out
}

/// Components of `value` widened to `f32`.
fn widen(value: &UniformValue) -> Vec<f32> {
    match value {
        UniformValue::Int(v) => vec![*v as f32],
        UniformValue::Float(v) => vec![*v],
        UniformValue::Vec2(v) => v.to_vec(),
        UniformValue::Vec3(v) => v.to_vec(),
        UniformValue::Vec4(v) | UniformValue::Mat2(v) => v.to_vec(),
        UniformValue::Mat3(v) => v.to_vec(),
        UniformValue::Mat4(v) => v.to_vec(),
    }
}

/// std140 size of a block member, rounded the way the layout pads it.
fn std140_size(ty: &str) -> usize {
    match ty {
        "float" | "int" | "uint" | "bool" => 4,
        "vec2" => 8,
        "vec3" | "vec4" => 16,
        "mat3" => 48,
        "mat4" => 64,
        _ => 0,
    }
}

fn parse_uniform_blocks(sources: &[&str]) -> Vec<(String, usize)> {
    let mut out: Vec<(String, usize)> = Vec::new();
    for src in sources {
        let mut open: Option<(String, usize)> = None;
        for line in src.lines() {
            let line = line.trim();
            if open.is_some() {
                if line.starts_with('}') {
                    if let Some((name, size)) = open.take() {
                        if !out.iter().any(|(n, _)| *n == name) {
                            out.push((name, size.next_multiple_of(16)));
                        }
                    }
                } else if let (Some((_, size)), Some(ty)) =
                    (open.as_mut(), line.split_whitespace().next())
                {
                    *size += std140_size(ty);
                }
                continue;
            }

            let decl = match line.strip_prefix("layout(") {
                Some(rest) => rest.split_once(')').map_or("", |(_, r)| r.trim()),
                None => line,
            };
            let Some(rest) = decl.strip_prefix("uniform ") else { continue };
            if rest.ends_with(';') {
                continue;
            }
            let name = rest.trim_end_matches('{').trim();
            if !name.is_empty() {
                open = Some((name.to_string(), 0));
            }
        }
    }
    out
}

impl GlContext for RecordingContext {
    fn create_texture(&mut self) -> Result<TextureId, GlError> {
        let id = TextureId(self.next());
        self.calls.push(GlCall::CreateTexture(id));
        Ok(id)
    }

    fn delete_texture(&mut self, texture: TextureId) {
        if self.bound.texture == Some(texture) {
            self.bound.texture = None;
        }
        self.calls.push(GlCall::DeleteTexture(texture));
    }

    fn active_texture(&mut self, unit: u32) {
        self.bound.texture_unit = unit;
        self.calls.push(GlCall::ActiveTexture(unit));
    }

    fn bind_texture_2d(&mut self, texture: Option<TextureId>) {
        self.bound.texture = texture;
        self.calls.push(GlCall::BindTexture(texture));
    }

    fn pixel_unpack_alignment(&mut self, alignment: i32) {
        self.calls.push(GlCall::UnpackAlignment(alignment));
    }

    fn tex_image_2d_r8(&mut self, width: u32, height: u32, pixels: &[u8]) {
        self.calls.push(GlCall::TexImage2dR8 { width, height, len: pixels.len() });
    }

    fn tex_parameter(&mut self, param: TexParam) {
        self.calls.push(GlCall::TexParameter(param));
    }

    fn create_buffer(&mut self) -> Result<BufferId, GlError> {
        let id = BufferId(self.next());
        self.calls.push(GlCall::CreateBuffer(id));
        Ok(id)
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        self.buffers.remove(&buffer);
        self.calls.push(GlCall::DeleteBuffer(buffer));
    }

    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferId>) {
        match target {
            BufferTarget::Array => self.bound.array_buffer = buffer,
            BufferTarget::ElementArray => self.bound.element_buffer = buffer,
            BufferTarget::Uniform => self.bound.uniform_buffer = buffer,
        }
        self.calls.push(GlCall::BindBuffer(target, buffer));
    }

    fn buffer_data(&mut self, target: BufferTarget, data: &[u8], usage: BufferUsage) {
        if let Some(id) = self.bound_buffer(target) {
            self.buffers.insert(id, data.to_vec());
        }
        self.calls.push(GlCall::BufferData { target, len: data.len(), usage });
    }

    fn bind_buffer_base(&mut self, target: BufferTarget, index: u32, buffer: Option<BufferId>) {
        // glBindBufferBase also binds the generic target.
        match target {
            BufferTarget::Array => self.bound.array_buffer = buffer,
            BufferTarget::ElementArray => self.bound.element_buffer = buffer,
            BufferTarget::Uniform => self.bound.uniform_buffer = buffer,
        }
        if target == BufferTarget::Uniform {
            match buffer {
                Some(id) => self.uniform_bindings.insert(index, id),
                None => self.uniform_bindings.remove(&index),
            };
        }
        self.calls.push(GlCall::BindBufferBase { target, index, buffer });
    }

    fn map_buffer(&mut self, target: BufferTarget, f: &mut dyn FnMut(&mut [u8])) -> bool {
        let Some(id) = self.bound_buffer(target) else { return false };
        let Some(bytes) = self.buffers.get_mut(&id).filter(|b| !b.is_empty()) else {
            return false;
        };
        f(bytes.as_mut_slice());
        self.calls.push(GlCall::MapBuffer(target));
        self.calls.push(GlCall::UnmapBuffer(target));
        true
    }

    fn create_vertex_array(&mut self) -> Result<VertexArrayId, GlError> {
        let id = VertexArrayId(self.next());
        self.calls.push(GlCall::CreateVertexArray(id));
        Ok(id)
    }

    fn delete_vertex_array(&mut self, vao: VertexArrayId) {
        self.calls.push(GlCall::DeleteVertexArray(vao));
    }

    fn bind_vertex_array(&mut self, vao: Option<VertexArrayId>) {
        self.bound.vertex_array = vao;
        self.calls.push(GlCall::BindVertexArray(vao));
    }

    fn vertex_attrib_pointer_f32(
        &mut self,
        index: u32,
        size: i32,
        _normalized: bool,
        stride: i32,
        offset: i32,
    ) {
        self.calls.push(GlCall::AttribPointer { index, size, stride, offset });
    }

    fn enable_vertex_attrib_array(&mut self, index: u32) {
        self.calls.push(GlCall::EnableAttrib(index));
    }

    fn draw_arrays(&mut self, mode: Primitive, first: i32, count: i32) {
        self.calls.push(GlCall::DrawArrays { mode, first, count });
    }

    fn draw_elements(&mut self, mode: Primitive, count: i32, index_type: IndexType, _offset: i32) {
        self.calls.push(GlCall::DrawElements { mode, count, index_type });
    }

    fn create_shader(&mut self, stage: ShaderStage) -> Result<ShaderId, GlError> {
        let id = ShaderId(self.next());
        self.calls.push(GlCall::CreateShader(id, stage));
        Ok(id)
    }

    fn shader_source(&mut self, shader: ShaderId, source: &str) {
        self.shader_sources.insert(shader, source.to_string());
    }

    fn compile_shader(&mut self, shader: ShaderId) -> Result<(), String> {
        self.calls.push(GlCall::CompileShader(shader));
        let source = self.shader_sources.get(&shader).map(String::as_str).unwrap_or("");
        if source.trim().is_empty() {
            return Err("0:0: error: empty shader source".to_string());
        }
        match &self.fail_compile_marker {
            Some(marker) if source.contains(marker.as_str()) => {
                Err(format!("0:1: error: syntax error near '{marker}'"))
            }
            _ => Ok(()),
        }
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        self.calls.push(GlCall::DeleteShader(shader));
    }

    fn create_program(&mut self) -> Result<ProgramId, GlError> {
        let id = ProgramId(self.next());
        self.calls.push(GlCall::CreateProgram(id));
        Ok(id)
    }

    fn attach_shader(&mut self, program: ProgramId, shader: ShaderId) {
        self.program_shaders.entry(program).or_default().push(shader);
    }

    fn link_program(&mut self, program: ProgramId) -> Result<(), String> {
        self.calls.push(GlCall::LinkProgram(program));
        let shaders = self.program_shaders.get(&program).cloned().unwrap_or_default();
        let sources: Vec<&str> = shaders
            .iter()
            .filter_map(|s| self.shader_sources.get(s).map(String::as_str))
            .collect();

        if sources.is_empty() {
            return Err("error: no shaders attached".to_string());
        }
        if let Some(marker) = &self.fail_link_marker {
            if sources.iter().any(|s| s.contains(marker.as_str())) {
                return Err(format!("error: unresolved symbol '{marker}'"));
            }
        }

        let uniforms = parse_uniforms(&sources)
            .into_iter()
            .enumerate()
            .map(|(i, (name, kind))| ActiveUniform {
                name,
                kind,
                location: UniformLocation(i as u32),
            })
            .collect();
        self.linked.insert(program, uniforms);

        let blocks = parse_uniform_blocks(&sources)
            .into_iter()
            .enumerate()
            .map(|(i, (name, size))| ActiveUniformBlock { name, index: i as u32, size })
            .collect();
        self.blocks.insert(program, blocks);
        Ok(())
    }

    fn use_program(&mut self, program: Option<ProgramId>) {
        self.bound.program = program;
        self.calls.push(GlCall::UseProgram(program));
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.linked.remove(&program);
        self.blocks.remove(&program);
        self.calls.push(GlCall::DeleteProgram(program));
    }

    fn program_info(&mut self, program: ProgramId) -> ProgramInfo {
        ProgramInfo {
            link_status: self.linked.contains_key(&program),
            attached_shaders: self.program_shaders.get(&program).map_or(0, Vec::len) as i32,
            active_attributes: 0,
            active_uniforms: self.linked.get(&program).map_or(0, Vec::len) as i32,
        }
    }

    fn active_uniforms(&mut self, program: ProgramId) -> Vec<ActiveUniform> {
        self.linked.get(&program).cloned().unwrap_or_default()
    }

    fn active_uniform_blocks(&mut self, program: ProgramId) -> Vec<ActiveUniformBlock> {
        self.blocks.get(&program).cloned().unwrap_or_default()
    }

    fn uniform_block_binding(&mut self, program: ProgramId, index: u32, binding: u32) {
        self.block_bindings.insert((program, index), binding);
        self.calls.push(GlCall::UniformBlockBinding { program, index, binding });
    }

    fn set_uniform(&mut self, location: UniformLocation, value: &UniformValue) {
        if let Some(program) = self.bound.program {
            self.uniform_values.insert((program, location), widen(value));
        }
        self.calls.push(GlCall::SetUniform(location, value.clone()));
    }

    fn get_uniform_f32(&mut self, program: ProgramId, location: UniformLocation, out: &mut [f32]) {
        if let Some(values) = self.uniform_values.get(&(program, location)) {
            for (dst, src) in out.iter_mut().zip(values) {
                *dst = *src;
            }
        }
    }
}
