use std::path::Path;

use crate::device::{GlContext, ShaderId, ShaderStage};

use super::ShaderError;

/// A single shader stage object and the source it was built from.
///
/// `source` is what the driver currently holds; `original` is the text as
/// first loaded, so textual edits can be undone with [`Shader::reset_edits`].
#[derive(Debug)]
pub struct Shader {
    name: String,
    stage: ShaderStage,
    id: ShaderId,
    source: String,
    original: String,
    compiled: bool,
}

impl Shader {
    /// Creates the GL shader object. No source is attached yet.
    pub fn new(
        gl: &mut dyn GlContext,
        name: impl Into<String>,
        stage: ShaderStage,
    ) -> Result<Self, ShaderError> {
        let id = gl.create_shader(stage)?;
        Ok(Self {
            name: name.into(),
            stage,
            id,
            source: String::new(),
            original: String::new(),
            compiled: false,
        })
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    #[inline]
    pub fn id(&self) -> ShaderId {
        self.id
    }

    #[inline]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[inline]
    pub fn is_compiled(&self) -> bool {
        self.compiled
    }

    /// Reads `path` and hands its contents to the driver.
    pub fn load(
        &mut self,
        gl: &mut dyn GlContext,
        path: impl AsRef<Path>,
    ) -> Result<(), ShaderError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ShaderError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!(
            "Shader '{}': loaded {} bytes from {}",
            self.name,
            source.len(),
            path.display()
        );
        self.load_source(gl, source);
        Ok(())
    }

    /// Replaces the source text. The new text also becomes the reset point.
    pub fn load_source(&mut self, gl: &mut dyn GlContext, source: impl Into<String>) {
        self.source = source.into();
        self.original = self.source.clone();
        self.compiled = false;
        gl.shader_source(self.id, &self.source);
    }

    pub fn compile(&mut self, gl: &mut dyn GlContext) -> Result<(), ShaderError> {
        match gl.compile_shader(self.id) {
            Ok(()) => {
                self.compiled = true;
                Ok(())
            }
            Err(log) => {
                self.compiled = false;
                let stage = self.stage.label();
                log::error!("Shader '{}' ({stage}): compile failed\n{log}", self.name);
                Err(ShaderError::Compile { name: self.name.clone(), log })
            }
        }
    }

    /// Replaces every occurrence of `find` and re-sends the source.
    ///
    /// Returns `false` (and leaves the driver untouched) when no source has
    /// been loaded. The shader must be recompiled for the edit to take effect.
    pub fn edit(&mut self, gl: &mut dyn GlContext, find: &str, replace: &str) -> bool {
        if self.source.is_empty() {
            return false;
        }
        self.source = self.source.replace(find, replace);
        self.compiled = false;
        gl.shader_source(self.id, &self.source);
        true
    }

    /// Restores the source as originally loaded.
    pub fn reset_edits(&mut self, gl: &mut dyn GlContext) {
        if self.original.is_empty() {
            return;
        }
        self.source.clone_from(&self.original);
        self.compiled = false;
        gl.shader_source(self.id, &self.source);
    }

    pub fn delete(self, gl: &mut dyn GlContext) {
        gl.delete_shader(self.id);
    }
}
