//! Shader stages, programs and the named program registry.
//!
//! Uniform values are a tagged union ([`UniformValue`]) so the GL context
//! can dispatch to the right `glUniform*` call without runtime type probing.

mod error;
mod program;
mod registry;
mod source;
mod uniform;

pub use error::ShaderError;
pub use program::{RegisteredUniform, ShaderProgram, UniformBlock};
pub use registry::{DefaultShader, ShaderLib, StageSources};
pub use source::Shader;
pub use uniform::UniformValue;
