use std::path::PathBuf;

use thiserror::Error;

use crate::device::GlError;

/// Errors raised while building or addressing shader programs.
#[derive(Error, Debug)]
pub enum ShaderError {
    #[error(transparent)]
    Gl(#[from] GlError),

    /// Shader source file could not be read.
    #[error("failed to read shader source {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Driver rejected the shader; `log` is the compile info log.
    #[error("failed to compile shader '{name}': {log}")]
    Compile { name: String, log: String },

    /// Driver rejected the program; `log` is the link info log.
    #[error("failed to link program '{name}': {log}")]
    Link { name: String, log: String },

    #[error("shader '{0}' not found")]
    UnknownShader(String),

    #[error("program '{0}' not found")]
    UnknownProgram(String),

    #[error("uniform block '{block}' not found in program '{program}'")]
    UnknownUniformBlock { program: String, block: String },

    /// A per-program call was made with no program selected.
    #[error("no current shader active")]
    NoCurrentProgram,
}
