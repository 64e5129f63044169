//! Host events: the closed set of lifecycle and input events a host delivers.
//!
//! # Invariants
//! - Hosts emit events only through `HostEvent`; nothing downstream inspects host-specific types.
//! - A pause is not reported complete to the host until its `PauseNotice` is completed.

pub mod event;
pub mod touch;

pub use event::{HostEvent, PauseNotice, PauseWaiter};
pub use touch::{TouchEvent, TouchTracker};
