//! GL context abstraction.
//!
//! This module is responsible for:
//! - the [`GlContext`] trait that every GPU-facing call goes through
//! - typed object handles and GL enums
//! - the `glow`-backed implementation used at runtime

mod error;
mod gl;
mod glow_ctx;

#[cfg(test)]
pub(crate) mod recording;

pub use error::GlError;
pub use gl::{
    ActiveUniform, ActiveUniformBlock, BufferId, BufferTarget, BufferUsage, Channel, Filter,
    GlContext, IndexType, Primitive, ProgramId, ProgramInfo, ShaderId, ShaderStage,
    SwizzleSource, TexParam, TextureId, UniformKind, UniformLocation, VertexArrayId, Wrap,
};
pub use glow_ctx::GlowContext;
