use std::collections::HashMap;
use std::path::Path;

use crate::device::{GlContext, ProgramId, ShaderStage};

use super::{Shader, ShaderError, ShaderProgram, UniformBlock, UniformValue};

/// Programs every [`ShaderLib::with_defaults`] registry provides.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DefaultShader {
    /// Flat colour: `MVP` (mat4) and `Colour` (vec4).
    Colour,
    /// Point-expanded glyph quads; see the text pipeline.
    Text,
    /// Lambert shading: `MVP`, `normalMatrix`, `Colour`, `lightPos`,
    /// `lightDiffuse`.
    Diffuse,
    /// Diffuse-lit checkerboard over the mesh uvs: `colour1`, `colour2`,
    /// `checkSize` and `checkOn` on top of the diffuse inputs.
    Checker,
}

impl DefaultShader {
    pub const ALL: [DefaultShader; 4] = [
        DefaultShader::Colour,
        DefaultShader::Text,
        DefaultShader::Diffuse,
        DefaultShader::Checker,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DefaultShader::Colour => "nglColourShader",
            DefaultShader::Text => "nglTextShader",
            DefaultShader::Diffuse => "nglDiffuseShader",
            DefaultShader::Checker => "nglCheckerShader",
        }
    }

    fn sources(self) -> StageSources<'static> {
        match self {
            DefaultShader::Colour => StageSources {
                vertex: include_str!("shaders/colour_vertex.glsl"),
                fragment: include_str!("shaders/colour_fragment.glsl"),
                geometry: None,
            },
            DefaultShader::Text => StageSources {
                vertex: include_str!("shaders/text_vertex.glsl"),
                fragment: include_str!("shaders/text_fragment.glsl"),
                geometry: Some(include_str!("shaders/text_geometry.glsl")),
            },
            DefaultShader::Diffuse => StageSources {
                vertex: include_str!("shaders/diffuse_vertex.glsl"),
                fragment: include_str!("shaders/diffuse_fragment.glsl"),
                geometry: None,
            },
            DefaultShader::Checker => StageSources {
                vertex: include_str!("shaders/checker_vertex.glsl"),
                fragment: include_str!("shaders/checker_fragment.glsl"),
                geometry: None,
            },
        }
    }
}

impl AsRef<str> for DefaultShader {
    fn as_ref(&self) -> &str {
        self.name()
    }
}

/// GLSL text for the stages of one program.
#[derive(Debug, Copy, Clone)]
pub struct StageSources<'a> {
    pub vertex: &'a str,
    pub fragment: &'a str,
    pub geometry: Option<&'a str>,
}

/// Named registry of shader stages and programs plus the "current" program.
///
/// Uniform writes and reads are routed to whichever program was last
/// selected with [`use_program`](ShaderLib::use_program). The registry does
/// not own the GL context; every GPU-facing call takes it explicitly.
#[derive(Debug, Default)]
pub struct ShaderLib {
    programs: HashMap<String, ShaderProgram>,
    shaders: HashMap<String, Shader>,
    current: Option<String>,
}

impl ShaderLib {
    /// Empty registry; no GL work is done.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every [`DefaultShader`] compiled and linked.
    pub fn with_defaults(gl: &mut dyn GlContext) -> Result<Self, ShaderError> {
        let mut lib = Self::new();
        for shader in DefaultShader::ALL {
            lib.load_shader_from_sources(gl, shader.name(), shader.sources())?;
        }
        Ok(lib)
    }

    // ── whole programs ────────────────────────────────────────────────────

    /// Loads, compiles and links a program from source files.
    ///
    /// Stage shaders are registered as `{name}Vertex`, `{name}Fragment` and
    /// `{name}Geometry` so they can be edited later.
    pub fn load_shader(
        &mut self,
        gl: &mut dyn GlContext,
        name: &str,
        vertex: impl AsRef<Path>,
        fragment: impl AsRef<Path>,
        geometry: Option<&Path>,
    ) -> Result<(), ShaderError> {
        let read = |path: &Path| {
            std::fs::read_to_string(path).map_err(|source| ShaderError::Io {
                path: path.to_path_buf(),
                source,
            })
        };
        let vertex = read(vertex.as_ref())?;
        let fragment = read(fragment.as_ref())?;
        let geometry = geometry.map(read).transpose()?;

        self.load_shader_from_sources(
            gl,
            name,
            StageSources {
                vertex: &vertex,
                fragment: &fragment,
                geometry: geometry.as_deref(),
            },
        )
    }

    /// Compiles and links a program from in-memory GLSL.
    ///
    /// On failure every GL object created for the program is deleted and
    /// nothing is registered.
    pub fn load_shader_from_sources(
        &mut self,
        gl: &mut dyn GlContext,
        name: &str,
        sources: StageSources<'_>,
    ) -> Result<(), ShaderError> {
        let mut stages = vec![
            (ShaderStage::Vertex, sources.vertex),
            (ShaderStage::Fragment, sources.fragment),
        ];
        if let Some(geometry) = sources.geometry {
            stages.push((ShaderStage::Geometry, geometry));
        }

        let mut built: Vec<Shader> = Vec::with_capacity(stages.len());
        let result = Self::build_program(gl, name, stages, &mut built);

        match result {
            Ok(program) => {
                if let Some(old) = self.programs.insert(name.to_string(), program) {
                    log::warn!("ShaderLib: replacing existing program '{name}'");
                    old.delete(gl);
                }
                for shader in built {
                    if let Some(old) = self.shaders.insert(shader.name().to_string(), shader) {
                        old.delete(gl);
                    }
                }
                log::info!("Shader program '{name}' created");
                Ok(())
            }
            Err(e) => {
                log::error!("ShaderLib: failed to build program '{name}': {e}");
                for shader in built {
                    shader.delete(gl);
                }
                Err(e)
            }
        }
    }

    fn build_program(
        gl: &mut dyn GlContext,
        name: &str,
        stages: Vec<(ShaderStage, &str)>,
        built: &mut Vec<Shader>,
    ) -> Result<ShaderProgram, ShaderError> {
        for (stage, src) in stages {
            let mut shader = Shader::new(gl, format!("{name}{}", stage.label()), stage)?;
            shader.load_source(gl, src);
            let compiled = shader.compile(gl);
            built.push(shader);
            compiled?;
        }

        let mut program = ShaderProgram::new(gl, name)?;
        for shader in built.iter() {
            program.attach(gl, shader);
        }
        if let Err(e) = program.link(gl) {
            program.delete(gl);
            return Err(e);
        }
        Ok(program)
    }

    // ── piecewise construction ────────────────────────────────────────────

    /// Registers an empty program object under `name`.
    pub fn create_program(
        &mut self,
        gl: &mut dyn GlContext,
        name: &str,
    ) -> Result<(), ShaderError> {
        let program = ShaderProgram::new(gl, name)?;
        if let Some(old) = self.programs.insert(name.to_string(), program) {
            old.delete(gl);
        }
        Ok(())
    }

    /// Registers an empty shader object of `stage` under `name`.
    pub fn attach_shader(
        &mut self,
        gl: &mut dyn GlContext,
        name: &str,
        stage: ShaderStage,
    ) -> Result<(), ShaderError> {
        let shader = Shader::new(gl, name, stage)?;
        if let Some(old) = self.shaders.insert(name.to_string(), shader) {
            old.delete(gl);
        }
        Ok(())
    }

    pub fn load_shader_source(
        &mut self,
        gl: &mut dyn GlContext,
        name: &str,
        path: impl AsRef<Path>,
    ) -> Result<(), ShaderError> {
        self.shader_mut(name)?.load(gl, path)
    }

    pub fn load_shader_source_from_string(
        &mut self,
        gl: &mut dyn GlContext,
        name: &str,
        source: &str,
    ) -> Result<(), ShaderError> {
        self.shader_mut(name)?.load_source(gl, source);
        Ok(())
    }

    pub fn compile_shader(
        &mut self,
        gl: &mut dyn GlContext,
        name: &str,
    ) -> Result<(), ShaderError> {
        self.shader_mut(name)?.compile(gl)
    }

    pub fn attach_shader_to_program(
        &mut self,
        gl: &mut dyn GlContext,
        program: &str,
        shader: &str,
    ) -> Result<(), ShaderError> {
        let shader = self
            .shaders
            .get(shader)
            .ok_or_else(|| ShaderError::UnknownShader(shader.to_string()))?;
        let program = self
            .programs
            .get_mut(program)
            .ok_or_else(|| ShaderError::UnknownProgram(program.to_string()))?;
        program.attach(gl, shader);
        Ok(())
    }

    pub fn link_program(&mut self, gl: &mut dyn GlContext, name: &str) -> Result<(), ShaderError> {
        self.programs
            .get_mut(name)
            .ok_or_else(|| ShaderError::UnknownProgram(name.to_string()))?
            .link(gl)
    }

    fn shader_mut(&mut self, name: &str) -> Result<&mut Shader, ShaderError> {
        self.shaders.get_mut(name).ok_or_else(|| {
            log::error!("ShaderLib: shader '{name}' not found");
            ShaderError::UnknownShader(name.to_string())
        })
    }

    // ── selection ─────────────────────────────────────────────────────────

    /// Makes `name` the current program.
    ///
    /// An unknown name unbinds any program and clears the current selection.
    /// Returns whether the program was found.
    pub fn use_program(&mut self, gl: &mut dyn GlContext, name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        match self.programs.get(name) {
            Some(program) => {
                program.use_program(gl);
                self.current = Some(name.to_string());
                true
            }
            None => {
                log::error!("ShaderLib: shader '{name}' not found");
                gl.use_program(None);
                self.current = None;
                false
            }
        }
    }

    pub fn current_shader_name(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn program_id(&self, name: impl AsRef<str>) -> Option<ProgramId> {
        self.programs.get(name.as_ref()).map(ShaderProgram::id)
    }

    pub fn program(&self, name: impl AsRef<str>) -> Option<&ShaderProgram> {
        self.programs.get(name.as_ref())
    }

    pub fn shader(&self, name: &str) -> Option<&Shader> {
        self.shaders.get(name)
    }

    fn current_program(&self) -> Option<&ShaderProgram> {
        self.current.as_deref().and_then(|n| self.programs.get(n))
    }

    // ── uniforms ──────────────────────────────────────────────────────────

    /// Writes a uniform on the current program.
    pub fn set_uniform(&self, gl: &mut dyn GlContext, name: &str, value: impl Into<UniformValue>) {
        match self.current_program() {
            Some(program) => program.set_uniform(gl, name, value),
            None => log::warn!("ShaderLib: no current shader, uniform '{name}' ignored"),
        }
    }

    /// Reads `N` float components of a uniform on the current program.
    pub fn get_uniform<const N: usize>(&self, gl: &mut dyn GlContext, name: &str) -> [f32; N] {
        self.current_program()
            .map(|p| p.get_uniform::<N>(gl, name))
            .unwrap_or([0.0; N])
    }

    // ── uniform blocks ────────────────────────────────────────────────────

    /// Uploads `data` to uniform block `block` of the current program.
    pub fn set_uniform_buffer(
        &mut self,
        gl: &mut dyn GlContext,
        block: &str,
        data: &[u8],
    ) -> Result<(), ShaderError> {
        let current = self.current.as_deref();
        let Some(program) = current.and_then(|n| self.programs.get_mut(n)) else {
            log::error!("ShaderLib: no current shader active, uniform block '{block}' ignored");
            return Err(ShaderError::NoCurrentProgram);
        };
        program.set_uniform_buffer(gl, block, data)
    }

    /// Re-registers the uniform blocks of `name`, or of the current program.
    pub fn auto_register_uniform_blocks(
        &mut self,
        gl: &mut dyn GlContext,
        name: Option<&str>,
    ) -> Result<(), ShaderError> {
        let Some(name) = name.or(self.current.as_deref()) else {
            return Err(ShaderError::NoCurrentProgram);
        };
        let program = self
            .programs
            .get_mut(name)
            .ok_or_else(|| ShaderError::UnknownProgram(name.to_string()))?;
        program.register_uniform_blocks(gl);
        Ok(())
    }

    /// Registered blocks of `program` (or the current program), by name.
    pub fn uniform_block_data(
        &self,
        program: Option<&str>,
    ) -> Option<impl Iterator<Item = (&str, &UniformBlock)>> {
        let name = program.or(self.current.as_deref())?;
        self.programs.get(name).map(|p| p.uniform_blocks())
    }

    /// One registered block of `program` (or the current program).
    pub fn uniform_block(&self, program: Option<&str>, block: &str) -> Option<&UniformBlock> {
        let name = program.or(self.current.as_deref())?;
        self.programs.get(name)?.uniform_block(block)
    }

    // ── source edits ──────────────────────────────────────────────────────

    /// Text replacement on a registered shader; recompile and relink to apply.
    pub fn edit_shader(
        &mut self,
        gl: &mut dyn GlContext,
        shader: &str,
        find: &str,
        replace: &str,
    ) -> bool {
        self.shaders
            .get_mut(shader)
            .is_some_and(|s| s.edit(gl, find, replace))
    }

    pub fn reset_edits(&mut self, gl: &mut dyn GlContext, shader: &str) {
        if let Some(s) = self.shaders.get_mut(shader) {
            s.reset_edits(gl);
        }
    }

    // ── diagnostics ───────────────────────────────────────────────────────

    /// Logs the uniform registry of `name`, or of the current program.
    pub fn log_registered_uniforms(&self, name: Option<&str>) {
        let name = name.or(self.current.as_deref());
        match name.and_then(|n| self.programs.get(n)) {
            Some(program) => program.log_registered_uniforms(),
            None => log::error!("ShaderLib: shader '{}' not found", name.unwrap_or("<none>")),
        }
    }

    pub fn log_properties(&self, gl: &mut dyn GlContext) {
        match self.current_program() {
            Some(program) => program.log_properties(gl),
            None => log::warn!("ShaderLib: no currently active shader to log properties for"),
        }
    }

    /// Deletes every program and shader object.
    pub fn destroy(self, gl: &mut dyn GlContext) {
        if self.current.is_some() {
            gl.use_program(None);
        }
        for (_, program) in self.programs {
            program.delete(gl);
        }
        for (_, shader) in self.shaders {
            shader.delete(gl);
        }
        log::debug!("ShaderLib: destroyed");
    }
}
