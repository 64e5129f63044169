//! Rendering seams: the surface handle and frame drawer the render loop drives.
//!
//! # Invariants
//! - Every call on a `Surface` or `FrameDrawer` happens on the render loop's thread.
//! - Drawers never present; the render loop presents after `draw_frame` returns.
//!
//! A headless surface and a background-scene drawer are provided for hosts
//! without a window system and for tests.

mod headless;
mod scene;
mod surface;

pub use headless::{HeadlessSurface, SceneDrawer};
pub use scene::{BackgroundScene, CLEAR_COLOR, ROTATION_STEP_DEGREES};
pub use surface::{FrameDrawer, RenderError, Surface};

pub fn crate_info() -> &'static str {
    "framehost-render v0.1.0"
}
