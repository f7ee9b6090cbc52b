use std::num::NonZeroU32;

use anyhow::{Context, Result, anyhow};
use glutin::config::{ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContext, PossiblyCurrentContext,
    Version,
};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface, Surface, SurfaceAttributesBuilder, WindowSurface};
use raw_window_handle::HasWindowHandle;
use winit::dpi::{LogicalSize, PhysicalSize};
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;

use ngl_engine::device::GlowContext;

use crate::config::StudioConfig;

/// A window with a current OpenGL 3.3 core context.
pub struct GlWindow {
    pub window: Window,
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
}

impl GlWindow {
    /// Opens the window and returns it with a `GlowContext` over its context.
    pub fn open(
        event_loop: &ActiveEventLoop,
        config: &StudioConfig,
    ) -> Result<(Self, GlowContext)> {
        let attributes = Window::default_attributes()
            .with_title(config.title.clone())
            .with_inner_size(LogicalSize::new(config.width as f64, config.height as f64));

        let (window, gl_config) = glutin_winit::DisplayBuilder::new()
            .with_window_attributes(Some(attributes))
            .build(event_loop, ConfigTemplateBuilder::new(), |configs| {
                // glutin only calls the picker with a non-empty iterator.
                configs
                    .max_by_key(|c| c.num_samples())
                    .expect("glutin always offers at least one config")
            })
            .map_err(|e| anyhow!("failed to create GL display: {e}"))?;
        let window = window.context("display builder returned no window")?;
        let raw_handle = window.window_handle().context("window has no handle")?.as_raw();

        let context_attributes = ContextAttributesBuilder::new()
            .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
            .with_profile(GlProfile::Core)
            .build(Some(raw_handle));
        let display = gl_config.display();
        let context = unsafe { display.create_context(&gl_config, &context_attributes) }
            .context("failed to create OpenGL 3.3 core context")?;

        let size = window.inner_size();
        let surface_attributes = SurfaceAttributesBuilder::<WindowSurface>::new().build(
            raw_handle,
            NonZeroU32::new(size.width.max(1)).context("zero window width")?,
            NonZeroU32::new(size.height.max(1)).context("zero window height")?,
        );
        let surface = unsafe { display.create_window_surface(&gl_config, &surface_attributes) }
            .context("failed to create window surface")?;
        let context = context.make_current(&surface).context("failed to make context current")?;

        let gl = unsafe {
            glow::Context::from_loader_function_cstr(|s| display.get_proc_address(s).cast())
        };
        log::info!("GlWindow: {}×{} surface ready", size.width, size.height);

        Ok((Self { window, surface, context }, GlowContext::new(gl)))
    }

    /// Resizes the surface. Zero-sized (minimized) windows are ignored.
    pub fn resize(&self, size: PhysicalSize<u32>) -> bool {
        match (NonZeroU32::new(size.width), NonZeroU32::new(size.height)) {
            (Some(w), Some(h)) => {
                self.surface.resize(&self.context, w, h);
                true
            }
            _ => false,
        }
    }

    pub fn swap_buffers(&self) -> Result<()> {
        self.surface.swap_buffers(&self.context).context("swap_buffers failed")
    }
}
