//! Shared types: viewport geometry derived from surfaces and the startup configuration.
//!
//! # Invariants
//! - A `Viewport` is always derived from a surface size; its radius is never set independently.
//! - Configuration is read once at startup and never changes while the loops run.

mod config;
mod types;

pub use config::{ConfigError, FrameRate, HostConfig, ResumePolicy};
pub use types::{Viewport, ViewportSize};

pub fn crate_info() -> &'static str {
    "framehost-common v0.1.0"
}
