//! wgpu render backend for window surfaces.
//!
//! A `WindowSurface` is a cheap handle created on the host thread. The wgpu
//! surface behind it is created and configured lazily by `make_current`,
//! i.e. on the render thread.
//!
//! # Invariants
//! - One `WindowSurface` owns at most one wgpu surface; a resize produces a new handle.
//! - A frame texture acquired by the drawer is presented only by `swap_buffers`.

mod clear;
mod gpu;

pub use clear::ClearPassDrawer;
pub use gpu::{GpuContext, GpuError, WindowSurface};
