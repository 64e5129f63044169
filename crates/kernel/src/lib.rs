//! Frame host kernel: a render loop that owns the graphics context and an
//! event loop that translates host events into render-loop commands.
//!
//! # Invariants
//! - Graphics calls happen only on the render loop's thread.
//! - The event dispatcher never touches a surface; it only moves handles.
//! - A pause is acknowledged by the render loop before the dispatcher moves on.
//! - Surface assignments are never dropped or overwritten.

pub mod control;
pub mod dispatcher;
pub mod error;
pub mod host;
pub mod scheduler;

pub use control::{
    ControlHandle, PauseAck, PauseRequest, RenderCommands, RenderLoopControl, StopHandle,
};
pub use dispatcher::{DispatchExit, DispatchReport, EventDispatcher};
pub use error::{LoopError, RenderStage};
pub use host::{EventSink, FrameHost, FrameHostBuilder, HostReport};
pub use scheduler::{RenderReport, RenderScheduler, SchedulerEvent, SchedulerState};
