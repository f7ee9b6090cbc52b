mod config;
mod window;

use anyhow::{Context, Result};
use glow::HasContext;
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::WindowId;

use ngl_engine::coords::Rgb;
use ngl_engine::device::GlowContext;
use ngl_engine::logging::{LoggingConfig, init_logging};
use ngl_engine::shader::ShaderLib;
use ngl_engine::text::TextRenderer;

use config::StudioConfig;
use window::GlWindow;

const FONT: &str = "body";

/// Everything that only exists while a window and context are alive.
struct Scene {
    window: GlWindow,
    gl: GlowContext,
    shaders: ShaderLib,
    text: TextRenderer,
    size: (u32, u32),
}

impl Scene {
    fn new(event_loop: &ActiveEventLoop, config: &StudioConfig) -> Result<Self> {
        let (window, mut gl) = GlWindow::open(event_loop, config)?;
        let shaders = ShaderLib::with_defaults(&mut gl).context("failed to build default shaders")?;
        shaders.log_registered_uniforms(None);

        let mut text = TextRenderer::new(&mut gl)?;
        text.add_font(&mut gl, FONT, &config.font_path, config.pixel_size)
            .with_context(|| format!("failed to load font {}", config.font_path.display()))?;

        let size = window.window.inner_size();
        let mut scene = Self { window, gl, shaders, text, size: (size.width, size.height) };
        scene.apply_size();
        Ok(scene)
    }

    fn apply_size(&mut self) {
        let (w, h) = self.size;
        unsafe { self.gl.raw().viewport(0, 0, w as i32, h as i32) };
        self.text.set_screen_size(&mut self.gl, &mut self.shaders, w, h);
    }

    fn render(&mut self, config: &StudioConfig) -> Result<()> {
        unsafe {
            let raw = self.gl.raw();
            raw.clear_color(0.12, 0.12, 0.14, 1.0);
            raw.clear(glow::COLOR_BUFFER_BIT);
            raw.enable(glow::BLEND);
            raw.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
        }

        let line_height = config.pixel_size as f32 * 1.5;
        let colours = [Rgb::white(), Rgb::from_u8(240, 200, 80), Rgb::new(0.5, 0.8, 1.0)];
        for (i, line) in config.lines.iter().enumerate() {
            let y = line_height * (i + 1) as f32;
            let colour = colours[i % colours.len()];
            self.text.render_text(&mut self.gl, &mut self.shaders, FONT, 16.0, y, line, colour)?;
        }

        self.window.swap_buffers()
    }

    fn destroy(self) {
        let Scene { mut gl, shaders, text, .. } = self;
        text.destroy(&mut gl);
        shaders.destroy(&mut gl);
    }
}

struct Studio {
    config: StudioConfig,
    scene: Option<Scene>,
}

impl Studio {
    fn shutdown(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(scene) = self.scene.take() {
            scene.destroy();
        }
        event_loop.exit();
    }
}

impl ApplicationHandler for Studio {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.scene.is_some() {
            return;
        }
        match Scene::new(event_loop, &self.config) {
            Ok(scene) => {
                scene.window.window.request_redraw();
                self.scene = Some(scene);
            }
            Err(e) => {
                log::error!("startup failed: {e:#}");
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        let Some(scene) = self.scene.as_mut() else { return };

        match event {
            WindowEvent::CloseRequested => self.shutdown(event_loop),
            WindowEvent::KeyboardInput { event, .. }
                if event.logical_key == Key::Named(NamedKey::Escape) =>
            {
                self.shutdown(event_loop)
            }
            WindowEvent::Resized(size) => {
                if scene.window.resize(size) {
                    scene.size = (size.width, size.height);
                    scene.apply_size();
                }
                scene.window.window.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = scene.render(&self.config) {
                    log::error!("render failed: {e:#}");
                }
            }
            _ => {}
        }
    }
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let config = StudioConfig::from_env()?;
    log::info!("ngl-studio: font {} at {}px", config.font_path.display(), config.pixel_size);

    let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut studio = Studio { config, scene: None };
    event_loop.run_app(&mut studio).context("event loop terminated with an error")
}
