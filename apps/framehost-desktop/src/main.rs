use anyhow::Result;
use clap::Parser;
use framehost_common::{FrameRate, HostConfig, ResumePolicy};
use framehost_input::TouchEvent;
use framehost_kernel::{EventSink, FrameHost, LoopError};
use framehost_render_wgpu::{ClearPassDrawer, GpuContext, WindowSurface};
use glam::Vec2;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::{PhysicalPosition, PhysicalSize};
use winit::event::{ElementState, MouseButton, TouchPhase, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "framehost-desktop", about = "Frame host desktop application")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Frames per second (overrides the configuration file)
    #[arg(long)]
    fps: Option<u32>,

    /// What resume does to a paused render loop: await-surface | restart-ticker
    #[arg(long)]
    resume_policy: Option<ResumePolicy>,
}

impl Cli {
    fn host_config(&self) -> Result<HostConfig> {
        let mut config = match &self.config {
            Some(path) => HostConfig::load(path)?,
            None => HostConfig::default(),
        };
        if let Some(fps) = self.fps {
            config.frames_per_second = FrameRate::new(fps)?;
        }
        if let Some(policy) = self.resume_policy {
            config.resume_policy = policy;
        }
        Ok(config)
    }
}

/// Translates winit callbacks into host events for the frame host.
struct DesktopHost {
    config: HostConfig,
    window: Option<Arc<Window>>,
    gpu: Option<Arc<GpuContext>>,
    host: Option<FrameHost<WindowSurface>>,
    sink: Option<EventSink<WindowSurface>>,
    pointer_down: bool,
    cursor: Vec2,
    failure: Option<anyhow::Error>,
}

impl DesktopHost {
    fn new(config: HostConfig) -> Self {
        Self {
            config,
            window: None,
            gpu: None,
            host: None,
            sink: None,
            pointer_down: false,
            cursor: Vec2::ZERO,
            failure: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title("Frame Host")
            .with_inner_size(PhysicalSize::new(800u32, 600));
        let window = Arc::new(event_loop.create_window(attrs)?);
        let gpu = GpuContext::new(window.clone())?;
        let host = FrameHost::start(self.config, ClearPassDrawer::new)?;
        let sink = host.events();
        sink.surface_created(WindowSurface::new(window.clone(), gpu.clone()))?;

        self.window = Some(window);
        self.gpu = Some(gpu);
        self.host = Some(host);
        self.sink = Some(sink);
        Ok(())
    }

    /// Hand the render loop a fresh surface at the window's current size.
    fn send_surface(&self) -> Result<(), LoopError> {
        if let (Some(window), Some(gpu), Some(sink)) = (&self.window, &self.gpu, &self.sink) {
            sink.surface_created(WindowSurface::new(window.clone(), gpu.clone()))?;
        }
        Ok(())
    }

    fn send(
        &self,
        event: impl FnOnce(&EventSink<WindowSurface>) -> Result<(), LoopError>,
    ) -> Result<(), LoopError> {
        match &self.sink {
            Some(sink) => event(sink),
            None => Ok(()),
        }
    }

    fn touch(&self, touch: TouchEvent) -> Result<(), LoopError> {
        self.send(|sink| sink.touch(touch))
    }

    fn check(&mut self, event_loop: &ActiveEventLoop, result: Result<(), LoopError>) {
        if let Err(err) = result {
            tracing::error!("frame host failed: {err}");
            if self.failure.is_none() {
                self.failure = Some(err.into());
            }
            event_loop.exit();
        }
    }

    fn finish(mut self) -> Result<()> {
        if let Some(host) = self.host.take() {
            let report = host.shutdown()?;
            tracing::info!(
                frames = report.render.frames_presented,
                surfaces = report.render.surfaces_bound,
                pauses = report.render.pauses,
                touches = report.dispatch.touches,
                "frame host finished"
            );
        }
        match self.failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl ApplicationHandler for DesktopHost {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            if let Err(err) = self.start(event_loop) {
                tracing::error!("failed to start: {err}");
                self.failure = Some(err);
                event_loop.exit();
            }
            return;
        }

        let result = self
            .send(|sink| sink.resume())
            .and_then(|()| self.send_surface());
        self.check(event_loop, result);
    }

    fn suspended(&mut self, event_loop: &ActiveEventLoop) {
        // Blocks until the render loop stopped drawing.
        let result = self.send(|sink| sink.pause());
        self.check(event_loop, result);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let result = match event {
            WindowEvent::CloseRequested => {
                let result = self.send(|sink| sink.destroy());
                event_loop.exit();
                result
            }
            WindowEvent::Resized(size) if size.width > 0 && size.height > 0 => self.send_surface(),
            WindowEvent::RedrawRequested => self.send(|sink| sink.redraw_needed()),
            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                self.pointer_down = state == ElementState::Pressed;
                if self.pointer_down {
                    self.touch(TouchEvent::Down(self.cursor))
                } else {
                    self.touch(TouchEvent::Up)
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = to_vec2(position);
                if self.pointer_down {
                    self.touch(TouchEvent::Move(self.cursor))
                } else {
                    Ok(())
                }
            }
            WindowEvent::Touch(touch) => {
                let at = to_vec2(touch.location);
                match touch.phase {
                    TouchPhase::Started => self.touch(TouchEvent::Down(at)),
                    TouchPhase::Moved => self.touch(TouchEvent::Move(at)),
                    TouchPhase::Ended | TouchPhase::Cancelled => self.touch(TouchEvent::Up),
                }
            }
            _ => Ok(()),
        };
        self.check(event_loop, result);
    }
}

fn to_vec2(position: PhysicalPosition<f64>) -> Vec2 {
    Vec2::new(position.x as f32, position.y as f32)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("framehost-desktop starting");
    let config = cli.host_config()?;

    let event_loop = EventLoop::new()?;
    // Frames are produced by the render loop's ticker, not by winit.
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = DesktopHost::new(config);
    event_loop.run_app(&mut app)?;

    app.finish()
}
