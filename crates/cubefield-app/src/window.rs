//! Window creation and event handling via winit.
//!
//! Provides [`AppState`], which implements winit's [`ApplicationHandler`],
//! and [`run`] to drive it.

use std::path::PathBuf;
use std::sync::Arc;

use cubefield_config::Config;
use cubefield_render::{
    CubeVertex, RenderContext, Renderer, Simulation, SimulationSettings, SurfaceError,
    init_render_context_blocking,
};
use tracing::{debug, error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::error::EventLoopError;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

use crate::frame_clock::FrameClock;
use crate::settings::apply_effects;

/// Radians added to the camera rotation per arrow key press.
pub const CAMERA_NUDGE: f32 = 0.1;

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    let attributes = WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ));
    if config.window.fullscreen {
        attributes.with_fullscreen(Some(Fullscreen::Borderless(None)))
    } else {
        attributes
    }
}

/// A runtime keyboard control.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    ToggleGodRays,
    ToggleBackground,
    RotateLeft,
    RotateRight,
    ReloadConfig,
}

impl Control {
    pub fn from_key(key: KeyCode) -> Option<Self> {
        match key {
            KeyCode::KeyG => Some(Self::ToggleGodRays),
            KeyCode::KeyB => Some(Self::ToggleBackground),
            KeyCode::ArrowLeft => Some(Self::RotateLeft),
            KeyCode::ArrowRight => Some(Self::RotateRight),
            KeyCode::F5 => Some(Self::ReloadConfig),
            _ => None,
        }
    }

    /// Whether holding the key keeps firing the control.
    pub fn repeats(self) -> bool {
        matches!(self, Self::RotateLeft | Self::RotateRight)
    }

    fn from_event(event: &KeyEvent) -> Option<Self> {
        if event.state != ElementState::Pressed {
            return None;
        }
        let PhysicalKey::Code(code) = event.physical_key else {
            return None;
        };
        Self::from_key(code).filter(|control| !event.repeat || control.repeats())
    }
}

/// Apply a control that only touches the simulation.
///
/// Returns `false` for [`Control::ReloadConfig`], which the caller handles.
pub fn apply_control(simulation: &mut Simulation, control: Control) -> bool {
    match control {
        Control::ToggleGodRays => {
            let enabled = !simulation.god_rays_enabled();
            simulation.set_god_rays_enabled(enabled);
            info!(enabled, "God rays toggled");
        }
        Control::ToggleBackground => {
            let enabled = !simulation.background_enabled();
            simulation.set_background_enabled(enabled);
            info!(enabled, "Background toggled");
        }
        Control::RotateLeft => simulation.nudge_camera(-CAMERA_NUDGE),
        Control::RotateRight => simulation.nudge_camera(CAMERA_NUDGE),
        Control::ReloadConfig => return false,
    }
    true
}

/// GPU-side state created once the window exists.
struct Graphics {
    gpu: RenderContext,
    renderer: Renderer,
    simulation: Simulation,
}

/// Application state: configuration, the window, and everything rendered
/// into it.
pub struct AppState {
    pub config: Config,
    /// Where `config.ron` lives; `None` disables reloading.
    pub config_dir: Option<PathBuf>,
    pub window: Option<Arc<Window>>,
    graphics: Option<Graphics>,
    /// Uploaded on first resume, then released.
    cube_vertices: Vec<CubeVertex>,
    settings: SimulationSettings,
    clock: FrameClock,
}

impl AppState {
    pub fn new(
        config: Config,
        config_dir: Option<PathBuf>,
        cube_vertices: Vec<CubeVertex>,
        settings: SimulationSettings,
    ) -> Self {
        Self {
            config,
            config_dir,
            window: None,
            graphics: None,
            cube_vertices,
            settings,
            clock: FrameClock::new(),
        }
    }

    pub fn simulation(&self) -> Option<&Simulation> {
        self.graphics.as_ref().map(|g| &g.simulation)
    }

    #[instrument(skip_all)]
    fn initialize_graphics(&mut self, window: Arc<Window>) -> Result<Graphics, String> {
        let gpu = init_render_context_blocking(window, self.config.window.vsync)
            .map_err(|e| format!("GPU initialization failed: {e}"))?;
        let (width, height) = gpu.size();

        let renderer = Renderer::new(
            &gpu.device,
            gpu.surface_format,
            width,
            height,
            &self.cube_vertices,
        )
        .map_err(|e| format!("Renderer initialization failed: {e}"))?;

        let mut simulation = Simulation::new(
            renderer.cube_vertex_count(),
            width,
            height,
            &self.settings,
        );
        apply_effects(&mut simulation, &self.config.effects)
            .map_err(|e| format!("Invalid effect settings: {e}"))?;

        info!(
            cubes = self.cube_vertices.len() / cubefield_render::geometry::VERTICES_PER_CUBE,
            width,
            height,
            format = ?gpu.surface_format,
            "Rendering initialized"
        );
        self.cube_vertices = Vec::new();
        Ok(Graphics {
            gpu,
            renderer,
            simulation,
        })
    }

    fn handle_key(&mut self, event: &KeyEvent) {
        let Some(control) = Control::from_event(event) else {
            return;
        };
        let Some(graphics) = &mut self.graphics else {
            return;
        };
        if !apply_control(&mut graphics.simulation, control) {
            self.reload_config();
        }
    }

    fn reload_config(&mut self) {
        let Some(dir) = &self.config_dir else {
            warn!("No config directory; reload skipped");
            return;
        };
        match self.config.reload(dir) {
            Ok(Some(config)) => {
                if let Some(graphics) = &mut self.graphics
                    && let Err(e) = apply_effects(&mut graphics.simulation, &config.effects)
                {
                    warn!("Reloaded effects rejected: {e}");
                    return;
                }
                info!("Configuration reloaded");
                self.config = config;
            }
            Ok(None) => info!("Configuration unchanged"),
            Err(e) => warn!("Config reload failed: {e}"),
        }
    }

    fn resize(&mut self, event_loop: &ActiveEventLoop, width: u32, height: u32) {
        let Some(graphics) = &mut self.graphics else {
            return;
        };
        graphics.gpu.resize(width, height);
        let (width, height) = graphics.gpu.size();
        if let Err(e) = graphics.renderer.resize(&graphics.gpu.device, width, height) {
            error!("Render target resize failed: {e}");
            event_loop.exit();
            return;
        }
        if let Err(e) = graphics.simulation.resize(width, height) {
            warn!("Blur steps not updated: {e}");
        }
        debug!(width, height, "Window resized");
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        let delta = self.clock.tick();
        if self.config.debug.log_frame_stats
            && let Some(stats) = self.clock.take_stats()
        {
            info!(frames = stats.frames, fps = stats.fps, "Frame stats");
        }

        let Some(graphics) = &mut self.graphics else {
            return;
        };
        graphics.simulation.advance(delta);
        if let Err(e) = graphics.simulation.plan_frame() {
            error!("Frame planning failed: {e}");
            event_loop.exit();
            return;
        }

        match graphics.gpu.get_current_texture() {
            Ok(surface_texture) => {
                if let Err(e) = graphics.renderer.render(
                    &graphics.gpu.device,
                    &graphics.gpu.queue,
                    surface_texture,
                    &graphics.simulation,
                ) {
                    error!("Render failed: {e}");
                    event_loop.exit();
                }
            }
            Err(SurfaceError::Lost) => {
                let (width, height) = graphics.gpu.size();
                graphics.gpu.resize(width, height);
            }
            Err(SurfaceError::OutOfMemory) => {
                error!("GPU out of memory");
                event_loop.exit();
            }
            Err(SurfaceError::Timeout) => {
                warn!("Surface timeout, skipping frame");
            }
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let window = match event_loop.create_window(window_attributes_from_config(&self.config)) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                error!("Window creation failed: {e}");
                event_loop.exit();
                return;
            }
        };

        match self.initialize_graphics(window.clone()) {
            Ok(graphics) => self.graphics = Some(graphics),
            Err(e) => {
                error!("{e}");
                event_loop.exit();
                return;
            }
        }
        window.request_redraw();
        self.window = Some(window);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => self.resize(event_loop, size.width, size.height),
            WindowEvent::KeyboardInput { event, .. } => self.handle_key(&event),
            WindowEvent::RedrawRequested => {
                self.redraw(event_loop);
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }
}

/// Creates an event loop and runs the application until the window closes.
#[instrument(skip_all)]
pub fn run(app: &mut AppState) -> Result<(), EventLoopError> {
    let event_loop = EventLoop::new()?;
    event_loop.run_app(app)
}
