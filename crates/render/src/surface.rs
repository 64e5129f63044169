use framehost_common::{Viewport, ViewportSize};

/// Errors raised by a graphics backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("graphics context unavailable: {0}")]
    ContextUnavailable(String),
    #[error("viewport configuration failed: {0}")]
    Viewport(String),
    #[error("frame draw failed: {0}")]
    Draw(String),
    #[error("present failed: {0}")]
    Present(String),
}

/// A native drawing surface handed from the host to the render loop.
///
/// The handle is moved, never shared: once sent to the render loop, only
/// the render thread touches it.
pub trait Surface: Send + 'static {
    /// Bind the graphics context to this surface on the calling thread.
    fn make_current(&mut self) -> Result<(), RenderError>;

    /// Current pixel size of the surface.
    fn size(&self) -> ViewportSize;

    /// Present the frame drawn since the last swap.
    fn swap_buffers(&mut self) -> Result<(), RenderError>;
}

/// Draws the scene into the current surface.
///
/// Lives on the render thread for its whole lifetime, so implementations
/// may hold thread-bound graphics state.
pub trait FrameDrawer<S: Surface> {
    /// Called once per surface assignment, after `make_current`. Sets the
    /// backend viewport and any per-surface render state.
    fn configure(&mut self, surface: &mut S, viewport: &Viewport) -> Result<(), RenderError>;

    /// Issue the draw calls for one frame. Must not present.
    fn draw_frame(&mut self, surface: &mut S) -> Result<(), RenderError>;
}
