use std::collections::BTreeMap;

use crate::device::{
    BufferId, BufferTarget, BufferUsage, GlContext, ProgramId, ShaderId, UniformKind,
    UniformLocation,
};

use super::{Shader, ShaderError, UniformValue};

/// Location and GLSL type of a uniform found during link.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RegisteredUniform {
    pub location: UniformLocation,
    pub kind: UniformKind,
}

/// A uniform block found during link, bound to binding point `binding`.
///
/// `buffer` is the uniform buffer created by the first
/// [`ShaderProgram::set_uniform_buffer`] for this block.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UniformBlock {
    pub index: u32,
    pub binding: u32,
    /// Block data size in bytes.
    pub size: usize,
    pub buffer: Option<BufferId>,
}

/// Scalar count a uniform of `kind` takes; `None` for opaque types.
fn kind_components(kind: UniformKind) -> Option<usize> {
    match kind {
        UniformKind::Float
        | UniformKind::Double
        | UniformKind::Int
        | UniformKind::UnsignedInt
        | UniformKind::Bool
        | UniformKind::Sampler2D
        | UniformKind::SamplerCube => Some(1),
        UniformKind::Vec2 => Some(2),
        UniformKind::Vec3 => Some(3),
        UniformKind::Vec4 | UniformKind::Mat2 => Some(4),
        UniformKind::Mat3 => Some(9),
        UniformKind::Mat4 => Some(16),
        UniformKind::Other(_) => None,
    }
}

/// A linked (or linkable) GL program plus its uniform registry.
///
/// The registry is filled from program introspection right after a
/// successful link; lookups never query the driver again.
#[derive(Debug)]
pub struct ShaderProgram {
    name: String,
    id: ProgramId,
    shaders: Vec<ShaderId>,
    uniforms: BTreeMap<String, RegisteredUniform>,
    blocks: BTreeMap<String, UniformBlock>,
    linked: bool,
}

impl ShaderProgram {
    pub fn new(gl: &mut dyn GlContext, name: impl Into<String>) -> Result<Self, ShaderError> {
        let id = gl.create_program()?;
        Ok(Self {
            name: name.into(),
            id,
            shaders: Vec::new(),
            uniforms: BTreeMap::new(),
            blocks: BTreeMap::new(),
            linked: false,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn id(&self) -> ProgramId {
        self.id
    }

    #[inline]
    pub fn is_linked(&self) -> bool {
        self.linked
    }

    #[inline]
    pub fn attached(&self) -> &[ShaderId] {
        &self.shaders
    }

    pub fn uniforms(&self) -> impl Iterator<Item = (&str, &RegisteredUniform)> {
        self.uniforms.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn uniform_blocks(&self) -> impl Iterator<Item = (&str, &UniformBlock)> {
        self.blocks.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn uniform_block(&self, name: &str) -> Option<&UniformBlock> {
        self.blocks.get(name)
    }

    pub fn attach(&mut self, gl: &mut dyn GlContext, shader: &Shader) {
        gl.attach_shader(self.id, shader.id());
        self.shaders.push(shader.id());
    }

    /// Links the program and registers its active uniforms and blocks.
    pub fn link(&mut self, gl: &mut dyn GlContext) -> Result<(), ShaderError> {
        if let Err(log) = gl.link_program(self.id) {
            self.linked = false;
            log::error!("ShaderProgram '{}': link failed\n{log}", self.name);
            return Err(ShaderError::Link { name: self.name.clone(), log });
        }
        self.linked = true;
        self.register_uniforms(gl);
        self.register_uniform_blocks(gl);
        Ok(())
    }

    fn register_uniforms(&mut self, gl: &mut dyn GlContext) {
        self.uniforms.clear();
        for u in gl.active_uniforms(self.id) {
            let name = u.name.strip_suffix("[0]").map(str::to_owned).unwrap_or(u.name);
            self.uniforms.insert(name, RegisteredUniform { location: u.location, kind: u.kind });
        }
        log::debug!("ShaderProgram '{}': registered {} uniforms", self.name, self.uniforms.len());
    }

    /// Re-reads the active uniform blocks and binds block `i` to binding
    /// point `i`.
    ///
    /// Buffers of blocks that are still active are kept; the rest are
    /// deleted.
    pub fn register_uniform_blocks(&mut self, gl: &mut dyn GlContext) {
        let mut old = std::mem::take(&mut self.blocks);
        for b in gl.active_uniform_blocks(self.id) {
            gl.uniform_block_binding(self.id, b.index, b.index);
            let buffer = old.remove(&b.name).and_then(|o| o.buffer);
            let block = UniformBlock { index: b.index, binding: b.index, size: b.size, buffer };
            self.blocks.insert(b.name, block);
        }
        for buffer in old.into_values().filter_map(|o| o.buffer) {
            gl.delete_buffer(buffer);
        }
        let count = self.blocks.len();
        log::debug!("ShaderProgram '{}': registered {count} uniform blocks", self.name);
    }

    pub fn use_program(&self, gl: &mut dyn GlContext) {
        gl.use_program(Some(self.id));
    }

    /// Registered location of `name`; warns and returns `None` if absent.
    pub fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        match self.uniforms.get(name) {
            Some(u) => Some(u.location),
            None => {
                log::warn!("Uniform '{name}' not found in shader '{}'", self.name);
                None
            }
        }
    }

    /// Writes a uniform. The program must be the one currently in use.
    ///
    /// A missing uniform is reported through [`uniform_location`] and
    /// otherwise ignored.
    ///
    /// [`uniform_location`]: ShaderProgram::uniform_location
    pub fn set_uniform(&self, gl: &mut dyn GlContext, name: &str, value: impl Into<UniformValue>) {
        let Some(loc) = self.uniform_location(name) else { return };
        let value = value.into();
        if let Some(u) = self.uniforms.get(name) {
            if kind_components(u.kind).is_some_and(|n| n != value.components()) {
                log::warn!(
                    "Uniform '{name}' in shader '{}' is {} but got {} components",
                    self.name,
                    u.kind.glsl_name(),
                    value.components()
                );
            }
        }
        gl.set_uniform(loc, &value);
    }

    /// Uploads `data` into the uniform buffer backing block `name`.
    ///
    /// The buffer is created on first use and attached to the block's
    /// binding point on every call.
    pub fn set_uniform_buffer(
        &mut self,
        gl: &mut dyn GlContext,
        name: &str,
        data: &[u8],
    ) -> Result<(), ShaderError> {
        let Some(block) = self.blocks.get_mut(name) else {
            log::warn!("Uniform block '{name}' not found in shader '{}'", self.name);
            return Err(ShaderError::UnknownUniformBlock {
                program: self.name.clone(),
                block: name.to_string(),
            });
        };
        if data.len() < block.size {
            log::warn!(
                "Uniform block '{name}' is {} bytes, only {} supplied",
                block.size,
                data.len()
            );
        }

        let buffer = match block.buffer {
            Some(buffer) => buffer,
            None => {
                let buffer = gl.create_buffer()?;
                block.buffer = Some(buffer);
                buffer
            }
        };
        gl.bind_buffer(BufferTarget::Uniform, Some(buffer));
        gl.buffer_data(BufferTarget::Uniform, data, BufferUsage::DynamicDraw);
        gl.bind_buffer_base(BufferTarget::Uniform, block.binding, Some(buffer));
        Ok(())
    }

    /// Reads back `N` float components of a uniform; zeros when missing.
    pub fn get_uniform<const N: usize>(&self, gl: &mut dyn GlContext, name: &str) -> [f32; N] {
        let mut out = [0.0; N];
        if let Some(loc) = self.uniform_location(name) {
            gl.get_uniform_f32(self.id, loc, &mut out);
        }
        out
    }

    pub fn log_registered_uniforms(&self) {
        log::info!("Registered uniforms for {}:", self.name);
        for (name, u) in &self.uniforms {
            log::info!("  {name} (type: {}, location: {})", u.kind.glsl_name(), u.location.0);
        }
        for (name, b) in &self.blocks {
            log::info!("  block {name} (size: {}, binding: {})", b.size, b.binding);
        }
    }

    pub fn log_properties(&self, gl: &mut dyn GlContext) {
        let info = gl.program_info(self.id);
        log::info!("Properties for shader program {}:", self.name);
        log::info!("  ID: {}", self.id.raw());
        log::info!("  Link status: {}", info.link_status);
        log::info!("  Attached shaders: {}", info.attached_shaders);
        log::info!("  Active attributes: {}", info.active_attributes);
        log::info!("  Active uniforms: {}", info.active_uniforms);
    }

    pub fn delete(self, gl: &mut dyn GlContext) {
        for buffer in self.blocks.into_values().filter_map(|b| b.buffer) {
            gl.delete_buffer(buffer);
        }
        gl.delete_program(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::recording::{GlCall, RecordingContext};
    use crate::device::ShaderStage;

    const VERT: &str = "\
#version 330 core
uniform mat4 MVP;
uniform vec3 offsets[0];
void main() {}
";
    const FRAG: &str = "\
#version 330 core
uniform vec4 colour;
uniform float scale;
void main() {}
";

    const BLOCK_VERT: &str = "\
#version 330 core
layout(std140) uniform Transforms
{
    mat4 MVP;
    mat3 normalMatrix;
    vec3 eye;
};
uniform vec4 tint;
void main() {}
";

    fn program_from(gl: &mut RecordingContext, vert: &str, frag: &str) -> ShaderProgram {
        let mut v = Shader::new(gl, "TVertex", ShaderStage::Vertex).unwrap();
        v.load_source(gl, vert);
        v.compile(gl).unwrap();
        let mut f = Shader::new(gl, "TFragment", ShaderStage::Fragment).unwrap();
        f.load_source(gl, frag);
        f.compile(gl).unwrap();

        let mut p = ShaderProgram::new(gl, "T").unwrap();
        p.attach(gl, &v);
        p.attach(gl, &f);
        p.link(gl).unwrap();
        p
    }

    fn linked_program(gl: &mut RecordingContext) -> ShaderProgram {
        program_from(gl, VERT, FRAG)
    }

    #[test]
    fn link_registers_active_uniforms() {
        let mut gl = RecordingContext::new();
        let p = linked_program(&mut gl);
        let names: Vec<&str> = p.uniforms().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["MVP", "colour", "offsets", "scale"]);
        assert!(p.uniform_location("MVP").is_some());
        assert!(p.uniform_location("missing").is_none());
    }

    #[test]
    fn link_failure_reports_program_name() {
        let mut gl = RecordingContext::new();
        let mut p = ShaderProgram::new(&mut gl, "Empty").unwrap();
        let err = p.link(&mut gl).unwrap_err();
        assert!(matches!(err, ShaderError::Link { ref name, .. } if name == "Empty"));
        assert!(!p.is_linked());
    }

    // ── uniforms ──────────────────────────────────────────────────────────

    #[test]
    fn set_then_get_round_trips_through_context() {
        let mut gl = RecordingContext::new();
        let p = linked_program(&mut gl);
        p.use_program(&mut gl);

        p.set_uniform(&mut gl, "colour", [0.25f32, 0.5, 0.75, 1.0]);
        p.set_uniform(&mut gl, "scale", 2.0f32);

        assert_eq!(p.get_uniform::<4>(&mut gl, "colour"), [0.25, 0.5, 0.75, 1.0]);
        assert_eq!(p.get_uniform::<1>(&mut gl, "scale"), [2.0]);
    }

    #[test]
    fn missing_uniform_reads_zeros_and_writes_nothing() {
        let mut gl = RecordingContext::new();
        let p = linked_program(&mut gl);
        p.use_program(&mut gl);
        gl.clear_calls();

        p.set_uniform(&mut gl, "nope", 1i32);
        assert!(gl.calls.is_empty());
        assert_eq!(p.get_uniform::<3>(&mut gl, "nope"), [0.0; 3]);
    }

    #[test]
    fn properties_reflect_link_state() {
        let mut gl = RecordingContext::new();
        let p = linked_program(&mut gl);
        let info = gl.program_info(p.id());
        assert!(info.link_status);
        assert_eq!(info.attached_shaders, 2);
        assert_eq!(info.active_uniforms, 4);
    }

    #[test]
    fn mismatched_component_count_still_writes() {
        let mut gl = RecordingContext::new();
        let p = linked_program(&mut gl);
        p.use_program(&mut gl);
        gl.clear_calls();

        p.set_uniform(&mut gl, "colour", 1.0f32);
        assert_eq!(gl.count(|c| matches!(c, GlCall::SetUniform(..))), 1);
    }

    // ── uniform blocks ────────────────────────────────────────────────────

    #[test]
    fn link_registers_uniform_blocks_at_their_index() {
        let mut gl = RecordingContext::new();
        let p = program_from(&mut gl, BLOCK_VERT, FRAG);

        let names: Vec<&str> = p.uniform_blocks().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["Transforms"]);
        let block = p.uniform_block("Transforms").unwrap();
        assert_eq!((block.index, block.binding, block.size), (0, 0, 128));
        assert_eq!(block.buffer, None);
        assert_eq!(gl.block_bindings.get(&(p.id(), 0)), Some(&0));

        // Block members are not plain uniforms.
        assert!(p.uniforms().all(|(n, _)| n != "MVP" && n != "Transforms"));
        assert!(p.uniform_location("tint").is_some());
    }

    #[test]
    fn set_uniform_buffer_creates_once_and_binds_base() {
        let mut gl = RecordingContext::new();
        let mut p = program_from(&mut gl, BLOCK_VERT, FRAG);
        gl.clear_calls();

        let data = [7u8; 128];
        p.set_uniform_buffer(&mut gl, "Transforms", &data).unwrap();
        p.set_uniform_buffer(&mut gl, "Transforms", &data).unwrap();

        assert_eq!(gl.count(|c| matches!(c, GlCall::CreateBuffer(_))), 1);
        let buffer = p.uniform_block("Transforms").and_then(|b| b.buffer).unwrap();
        assert_eq!(gl.uniform_bindings.get(&0), Some(&buffer));
        assert_eq!(gl.buffers.get(&buffer).map(Vec::len), Some(128));
        assert!(gl.calls.contains(&GlCall::BufferData {
            target: BufferTarget::Uniform,
            len: 128,
            usage: BufferUsage::DynamicDraw,
        }));
    }

    #[test]
    fn unknown_uniform_block_is_an_error() {
        let mut gl = RecordingContext::new();
        let mut p = linked_program(&mut gl);
        gl.clear_calls();

        let err = p.set_uniform_buffer(&mut gl, "Lights", &[0; 16]).unwrap_err();
        assert!(matches!(
            err,
            ShaderError::UnknownUniformBlock { ref program, ref block }
                if program == "T" && block == "Lights"
        ));
        assert!(gl.calls.is_empty());
    }

    #[test]
    fn delete_releases_block_buffers() {
        let mut gl = RecordingContext::new();
        let mut p = program_from(&mut gl, BLOCK_VERT, FRAG);
        p.set_uniform_buffer(&mut gl, "Transforms", &[0; 128]).unwrap();
        let buffer = p.uniform_block("Transforms").and_then(|b| b.buffer).unwrap();

        p.delete(&mut gl);
        assert!(gl.calls.contains(&GlCall::DeleteBuffer(buffer)));
        assert!(matches!(gl.calls.last(), Some(GlCall::DeleteProgram(_))));
    }
}
