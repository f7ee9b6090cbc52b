use std::num::NonZeroU32;

use crate::shader::UniformValue;

use super::GlError;

// ── handles ───────────────────────────────────────────────────────────────

/// GL texture object name.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextureId(pub(crate) NonZeroU32);

/// GL buffer object name.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct BufferId(pub(crate) NonZeroU32);

/// GL vertex array object name.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct VertexArrayId(pub(crate) NonZeroU32);

/// GL shader object name.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ShaderId(pub(crate) NonZeroU32);

/// GL program object name.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ProgramId(pub(crate) NonZeroU32);

impl TextureId {
    /// Raw GL name, for logging.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0.get()
    }
}

impl ProgramId {
    #[inline]
    pub fn raw(self) -> u32 {
        self.0.get()
    }
}

/// Location of an active uniform inside a linked program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct UniformLocation(pub(crate) u32);

// ── enums ─────────────────────────────────────────────────────────────────

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
    TessControl,
    TessEval,
    Compute,
}

impl ShaderStage {
    pub(crate) fn to_gl(self) -> u32 {
        match self {
            ShaderStage::Vertex => glow::VERTEX_SHADER,
            ShaderStage::Fragment => glow::FRAGMENT_SHADER,
            ShaderStage::Geometry => glow::GEOMETRY_SHADER,
            ShaderStage::TessControl => glow::TESS_CONTROL_SHADER,
            ShaderStage::TessEval => glow::TESS_EVALUATION_SHADER,
            ShaderStage::Compute => glow::COMPUTE_SHADER,
        }
    }

    /// Suffix appended to program names for stage shaders (`"TextVertex"`).
    pub fn label(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "Vertex",
            ShaderStage::Fragment => "Fragment",
            ShaderStage::Geometry => "Geometry",
            ShaderStage::TessControl => "TessControl",
            ShaderStage::TessEval => "TessEval",
            ShaderStage::Compute => "Compute",
        }
    }
}

/// Primitive topology for draw calls.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Primitive {
    Points,
    Lines,
    LineStrip,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl Primitive {
    pub(crate) fn to_gl(self) -> u32 {
        match self {
            Primitive::Points => glow::POINTS,
            Primitive::Lines => glow::LINES,
            Primitive::LineStrip => glow::LINE_STRIP,
            Primitive::Triangles => glow::TRIANGLES,
            Primitive::TriangleStrip => glow::TRIANGLE_STRIP,
            Primitive::TriangleFan => glow::TRIANGLE_FAN,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum BufferTarget {
    Array,
    ElementArray,
    Uniform,
}

impl BufferTarget {
    pub(crate) fn to_gl(self) -> u32 {
        match self {
            BufferTarget::Array => glow::ARRAY_BUFFER,
            BufferTarget::ElementArray => glow::ELEMENT_ARRAY_BUFFER,
            BufferTarget::Uniform => glow::UNIFORM_BUFFER,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum BufferUsage {
    #[default]
    StaticDraw,
    DynamicDraw,
    StreamDraw,
}

impl BufferUsage {
    pub(crate) fn to_gl(self) -> u32 {
        match self {
            BufferUsage::StaticDraw => glow::STATIC_DRAW,
            BufferUsage::DynamicDraw => glow::DYNAMIC_DRAW,
            BufferUsage::StreamDraw => glow::STREAM_DRAW,
        }
    }
}

/// Element type of an index buffer.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum IndexType {
    U8,
    U16,
    U32,
}

impl IndexType {
    pub(crate) fn to_gl(self) -> u32 {
        match self {
            IndexType::U8 => glow::UNSIGNED_BYTE,
            IndexType::U16 => glow::UNSIGNED_SHORT,
            IndexType::U32 => glow::UNSIGNED_INT,
        }
    }

    #[inline]
    pub fn size_bytes(self) -> usize {
        match self {
            IndexType::U8 => 1,
            IndexType::U16 => 2,
            IndexType::U32 => 4,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Filter {
    Nearest,
    Linear,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Wrap {
    ClampToEdge,
    Repeat,
    MirroredRepeat,
}

/// Texture channel addressed by a swizzle parameter.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Channel {
    R,
    G,
    B,
    A,
}

/// Value a swizzled channel reads from.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SwizzleSource {
    Red,
    Green,
    Blue,
    Alpha,
    Zero,
    One,
}

/// 2D texture parameter applied to the currently bound texture.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TexParam {
    MinFilter(Filter),
    MagFilter(Filter),
    WrapS(Wrap),
    WrapT(Wrap),
    Swizzle(Channel, SwizzleSource),
}

impl TexParam {
    /// `(pname, value)` pair for `glTexParameteri`.
    pub(crate) fn to_gl(self) -> (u32, i32) {
        let filter = |f: Filter| match f {
            Filter::Nearest => glow::NEAREST,
            Filter::Linear => glow::LINEAR,
        };
        let wrap = |w: Wrap| match w {
            Wrap::ClampToEdge => glow::CLAMP_TO_EDGE,
            Wrap::Repeat => glow::REPEAT,
            Wrap::MirroredRepeat => glow::MIRRORED_REPEAT,
        };

        let (pname, value) = match self {
            TexParam::MinFilter(f) => (glow::TEXTURE_MIN_FILTER, filter(f)),
            TexParam::MagFilter(f) => (glow::TEXTURE_MAG_FILTER, filter(f)),
            TexParam::WrapS(w) => (glow::TEXTURE_WRAP_S, wrap(w)),
            TexParam::WrapT(w) => (glow::TEXTURE_WRAP_T, wrap(w)),
            TexParam::Swizzle(channel, source) => {
                let pname = match channel {
                    Channel::R => glow::TEXTURE_SWIZZLE_R,
                    Channel::G => glow::TEXTURE_SWIZZLE_G,
                    Channel::B => glow::TEXTURE_SWIZZLE_B,
                    Channel::A => glow::TEXTURE_SWIZZLE_A,
                };
                let value = match source {
                    SwizzleSource::Red => glow::RED,
                    SwizzleSource::Green => glow::GREEN,
                    SwizzleSource::Blue => glow::BLUE,
                    SwizzleSource::Alpha => glow::ALPHA,
                    SwizzleSource::Zero => glow::ZERO,
                    SwizzleSource::One => glow::ONE,
                };
                (pname, value)
            }
        };
        (pname, value as i32)
    }
}

/// GLSL type of an active uniform as reported by program introspection.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum UniformKind {
    Float,
    Vec2,
    Vec3,
    Vec4,
    Double,
    Int,
    UnsignedInt,
    Bool,
    Mat2,
    Mat3,
    Mat4,
    Sampler2D,
    SamplerCube,
    Other(u32),
}

impl UniformKind {
    pub fn from_gl(ty: u32) -> Self {
        match ty {
            glow::FLOAT => UniformKind::Float,
            glow::FLOAT_VEC2 => UniformKind::Vec2,
            glow::FLOAT_VEC3 => UniformKind::Vec3,
            glow::FLOAT_VEC4 => UniformKind::Vec4,
            glow::DOUBLE => UniformKind::Double,
            glow::INT => UniformKind::Int,
            glow::UNSIGNED_INT => UniformKind::UnsignedInt,
            glow::BOOL => UniformKind::Bool,
            glow::FLOAT_MAT2 => UniformKind::Mat2,
            glow::FLOAT_MAT3 => UniformKind::Mat3,
            glow::FLOAT_MAT4 => UniformKind::Mat4,
            glow::SAMPLER_2D => UniformKind::Sampler2D,
            glow::SAMPLER_CUBE => UniformKind::SamplerCube,
            other => UniformKind::Other(other),
        }
    }

    /// GLSL spelling, used when logging the uniform registry.
    pub fn glsl_name(self) -> String {
        match self {
            UniformKind::Float => "float".into(),
            UniformKind::Vec2 => "vec2".into(),
            UniformKind::Vec3 => "vec3".into(),
            UniformKind::Vec4 => "vec4".into(),
            UniformKind::Double => "double".into(),
            UniformKind::Int => "int".into(),
            UniformKind::UnsignedInt => "unsigned int".into(),
            UniformKind::Bool => "bool".into(),
            UniformKind::Mat2 => "mat2".into(),
            UniformKind::Mat3 => "mat3".into(),
            UniformKind::Mat4 => "mat4".into(),
            UniformKind::Sampler2D => "sampler2D".into(),
            UniformKind::SamplerCube => "samplerCube".into(),
            UniformKind::Other(ty) => format!("unknown type {ty:#06x}"),
        }
    }
}

/// One entry of a program's active uniform table.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveUniform {
    pub name: String,
    pub kind: UniformKind,
    pub location: UniformLocation,
}

/// One entry of a program's active uniform block table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveUniformBlock {
    pub name: String,
    pub index: u32,
    /// `GL_UNIFORM_BLOCK_DATA_SIZE`, in bytes.
    pub size: usize,
}

/// Link/validate state of a program, as reported by the driver.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct ProgramInfo {
    pub link_status: bool,
    pub attached_shaders: i32,
    pub active_attributes: i32,
    pub active_uniforms: i32,
}

// ── context ───────────────────────────────────────────────────────────────

/// The current GL context.
///
/// Every GPU-facing operation in this crate receives the context explicitly
/// instead of relying on ambient global state. All calls must originate from
/// the thread that owns the context; implementations do no locking.
///
/// Bind state (current program, array buffer, texture, vertex array) lives
/// inside the context and is mutated by the calls below.
pub trait GlContext {
    // textures
    fn create_texture(&mut self) -> Result<TextureId, GlError>;
    fn delete_texture(&mut self, texture: TextureId);
    /// Selects texture unit `GL_TEXTURE0 + unit`.
    fn active_texture(&mut self, unit: u32);
    fn bind_texture_2d(&mut self, texture: Option<TextureId>);
    fn pixel_unpack_alignment(&mut self, alignment: i32);
    /// Uploads a single-channel `RED`/`UNSIGNED_BYTE` image to the bound texture.
    fn tex_image_2d_r8(&mut self, width: u32, height: u32, pixels: &[u8]);
    fn tex_parameter(&mut self, param: TexParam);

    // buffers
    fn create_buffer(&mut self) -> Result<BufferId, GlError>;
    fn delete_buffer(&mut self, buffer: BufferId);
    fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferId>);
    fn buffer_data(&mut self, target: BufferTarget, data: &[u8], usage: BufferUsage);
    /// Binds `buffer` to indexed binding point `index` of `target`.
    fn bind_buffer_base(&mut self, target: BufferTarget, index: u32, buffer: Option<BufferId>);
    /// Maps the whole buffer bound to `target` read-write, hands the bytes
    /// to `f`, then unmaps it. Returns `false` if nothing could be mapped.
    fn map_buffer(&mut self, target: BufferTarget, f: &mut dyn FnMut(&mut [u8])) -> bool;

    // vertex arrays
    fn create_vertex_array(&mut self) -> Result<VertexArrayId, GlError>;
    fn delete_vertex_array(&mut self, vao: VertexArrayId);
    fn bind_vertex_array(&mut self, vao: Option<VertexArrayId>);
    /// Float attribute layout; `stride` and `offset` are in bytes.
    fn vertex_attrib_pointer_f32(
        &mut self,
        index: u32,
        size: i32,
        normalized: bool,
        stride: i32,
        offset: i32,
    );
    fn enable_vertex_attrib_array(&mut self, index: u32);
    fn draw_arrays(&mut self, mode: Primitive, first: i32, count: i32);
    fn draw_elements(&mut self, mode: Primitive, count: i32, index_type: IndexType, offset: i32);

    // shaders
    fn create_shader(&mut self, stage: ShaderStage) -> Result<ShaderId, GlError>;
    fn shader_source(&mut self, shader: ShaderId, source: &str);
    /// Compiles `shader`; on failure returns the driver's info log.
    fn compile_shader(&mut self, shader: ShaderId) -> Result<(), String>;
    fn delete_shader(&mut self, shader: ShaderId);

    // programs
    fn create_program(&mut self) -> Result<ProgramId, GlError>;
    fn attach_shader(&mut self, program: ProgramId, shader: ShaderId);
    /// Links `program`; on failure returns the driver's info log.
    fn link_program(&mut self, program: ProgramId) -> Result<(), String>;
    fn use_program(&mut self, program: Option<ProgramId>);
    fn delete_program(&mut self, program: ProgramId);
    fn program_info(&mut self, program: ProgramId) -> ProgramInfo;
    fn active_uniforms(&mut self, program: ProgramId) -> Vec<ActiveUniform>;
    fn active_uniform_blocks(&mut self, program: ProgramId) -> Vec<ActiveUniformBlock>;
    fn uniform_block_binding(&mut self, program: ProgramId, index: u32, binding: u32);

    // uniforms
    /// Writes `value` to `location` of the program currently in use.
    fn set_uniform(&mut self, location: UniformLocation, value: &UniformValue);
    /// Reads back a float uniform of `program` into `out`.
    fn get_uniform_f32(&mut self, program: ProgramId, location: UniformLocation, out: &mut [f32]);
}
