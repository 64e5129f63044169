use crate::gpu::WindowSurface;
use framehost_common::Viewport;
use framehost_render::{BackgroundScene, FrameDrawer, RenderError};

/// Clears the window with the background scene's color once per frame.
#[derive(Debug, Default)]
pub struct ClearPassDrawer {
    scene: BackgroundScene,
}

impl ClearPassDrawer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl FrameDrawer<WindowSurface> for ClearPassDrawer {
    fn configure(
        &mut self,
        _surface: &mut WindowSurface,
        viewport: &Viewport,
    ) -> Result<(), RenderError> {
        // The surface configuration already matches the viewport extent.
        self.scene.resize(*viewport);
        Ok(())
    }

    fn draw_frame(&mut self, surface: &mut WindowSurface) -> Result<(), RenderError> {
        self.scene.advance();
        let [r, g, b, a] = self.scene.modulated_color();

        let gpu = surface.gpu().clone();
        let view = surface.acquire()?;
        let mut encoder = gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("background_encoder"),
            });
        {
            let _pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("background_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: f64::from(r),
                            g: f64::from(g),
                            b: f64::from(b),
                            a: f64::from(a),
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                ..Default::default()
            });
        }
        gpu.queue.submit(std::iter::once(encoder.finish()));
        tracing::trace!(
            frame = self.scene.frames(),
            radius = self.scene.window_radius(),
            "background cleared"
        );
        Ok(())
    }
}
