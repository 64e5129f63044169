use crate::scene::BackgroundScene;
use crate::surface::{FrameDrawer, RenderError, Surface};
use framehost_common::{Viewport, ViewportSize};

/// In-memory surface for hosts without a window system.
///
/// Counts binds and presents; can be told to fail to exercise error paths.
#[derive(Debug, Clone)]
pub struct HeadlessSurface {
    size: ViewportSize,
    current: bool,
    binds: u64,
    presented: u64,
    fail_bind: bool,
    fail_present_after: Option<u64>,
}

impl HeadlessSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: ViewportSize::new(width, height),
            current: false,
            binds: 0,
            presented: 0,
            fail_bind: false,
            fail_present_after: None,
        }
    }

    /// `make_current` always fails.
    pub fn failing_bind(mut self) -> Self {
        self.fail_bind = true;
        self
    }

    /// Presents succeed `frames` times, then fail.
    pub fn failing_present_after(mut self, frames: u64) -> Self {
        self.fail_present_after = Some(frames);
        self
    }

    pub fn is_current(&self) -> bool {
        self.current
    }

    pub fn binds(&self) -> u64 {
        self.binds
    }

    pub fn presented(&self) -> u64 {
        self.presented
    }
}

impl Surface for HeadlessSurface {
    fn make_current(&mut self) -> Result<(), RenderError> {
        if self.fail_bind {
            return Err(RenderError::ContextUnavailable(
                "headless surface refused binding".into(),
            ));
        }
        self.current = true;
        self.binds += 1;
        Ok(())
    }

    fn size(&self) -> ViewportSize {
        self.size
    }

    fn swap_buffers(&mut self) -> Result<(), RenderError> {
        if !self.current {
            return Err(RenderError::ContextUnavailable(
                "surface is not current".into(),
            ));
        }
        if self.fail_present_after.is_some_and(|limit| self.presented >= limit) {
            return Err(RenderError::Present(format!(
                "headless present failed after {} frames",
                self.presented
            )));
        }
        self.presented += 1;
        Ok(())
    }
}

/// Drives a `BackgroundScene` on any surface without issuing GPU work.
#[derive(Debug, Default)]
pub struct SceneDrawer {
    scene: BackgroundScene,
}

impl SceneDrawer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scene(&self) -> &BackgroundScene {
        &self.scene
    }
}

impl<S: Surface> FrameDrawer<S> for SceneDrawer {
    fn configure(&mut self, _surface: &mut S, viewport: &Viewport) -> Result<(), RenderError> {
        self.scene.resize(*viewport);
        Ok(())
    }

    fn draw_frame(&mut self, _surface: &mut S) -> Result<(), RenderError> {
        self.scene.advance();
        tracing::trace!(
            frame = self.scene.frames(),
            rotation = self.scene.rotation(),
            "background drawn"
        );
        Ok(())
    }
}
