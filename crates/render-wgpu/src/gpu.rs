use framehost_common::ViewportSize;
use framehost_render::{RenderError, Surface};
use std::sync::Arc;
use winit::window::Window;

/// Errors while creating the shared GPU context.
#[derive(Debug, thiserror::Error)]
pub enum GpuError {
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no compatible GPU adapter found")]
    NoAdapter,
    #[error("failed to create device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
}

/// Instance, adapter, device and queue shared by every surface of a window.
pub struct GpuContext {
    pub instance: wgpu::Instance,
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
}

impl GpuContext {
    /// Pick an adapter able to present to `window`.
    pub fn new(window: Arc<Window>) -> Result<Arc<Self>, GpuError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        // Only used to find a compatible adapter; the render thread creates its own.
        let probe = instance.create_surface(window)?;
        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&probe),
            force_fallback_adapter: false,
        }))
        .ok_or(GpuError::NoAdapter)?;
        drop(probe);

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("framehost_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        tracing::info!(
            "GPU initialized with {} backend",
            adapter.get_info().backend.to_str()
        );
        Ok(Arc::new(Self {
            instance,
            adapter,
            device,
            queue,
        }))
    }
}

struct Frame {
    texture: wgpu::SurfaceTexture,
    view: wgpu::TextureView,
}

/// A window handed to the render loop as its drawing surface.
pub struct WindowSurface {
    window: Arc<Window>,
    gpu: Arc<GpuContext>,
    size: ViewportSize,
    surface: Option<wgpu::Surface<'static>>,
    config: Option<wgpu::SurfaceConfiguration>,
    frame: Option<Frame>,
}

impl WindowSurface {
    /// Capture the window at its current size.
    pub fn new(window: Arc<Window>, gpu: Arc<GpuContext>) -> Self {
        let inner = window.inner_size();
        Self {
            window,
            gpu,
            size: ViewportSize::new(inner.width, inner.height),
            surface: None,
            config: None,
            frame: None,
        }
    }

    pub fn gpu(&self) -> &Arc<GpuContext> {
        &self.gpu
    }

    /// Acquire the texture for the next frame.
    pub fn acquire(&mut self) -> Result<&wgpu::TextureView, RenderError> {
        let surface = self
            .surface
            .as_ref()
            .ok_or_else(|| RenderError::ContextUnavailable("surface is not current".into()))?;

        let texture = match surface.get_current_texture() {
            Ok(texture) => texture,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("surface outdated, reconfiguring");
                if let Some(config) = &self.config {
                    surface.configure(&self.gpu.device, config);
                }
                surface
                    .get_current_texture()
                    .map_err(|e| RenderError::Draw(e.to_string()))?
            }
            Err(e) => return Err(RenderError::Draw(e.to_string())),
        };
        let view = texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let frame = self.frame.insert(Frame { texture, view });
        Ok(&frame.view)
    }
}

impl Surface for WindowSurface {
    fn make_current(&mut self) -> Result<(), RenderError> {
        let surface = match self.surface.take() {
            Some(surface) => surface,
            None => self
                .gpu
                .instance
                .create_surface(self.window.clone())
                .map_err(|e| RenderError::ContextUnavailable(e.to_string()))?,
        };

        let caps = surface.get_capabilities(&self.gpu.adapter);
        let format = caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .or(caps.formats.first())
            .copied()
            .ok_or_else(|| {
                RenderError::ContextUnavailable("surface reports no texture formats".into())
            })?;
        let alpha_mode = caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: self.size.width.max(1),
            height: self.size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&self.gpu.device, &config);

        self.surface = Some(surface);
        self.config = Some(config);
        Ok(())
    }

    fn size(&self) -> ViewportSize {
        self.size
    }

    fn swap_buffers(&mut self) -> Result<(), RenderError> {
        let frame = self
            .frame
            .take()
            .ok_or_else(|| RenderError::Present("no frame was drawn".into()))?;
        drop(frame.view);
        frame.texture.present();
        Ok(())
    }
}
