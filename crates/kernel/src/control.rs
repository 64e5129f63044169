//! Conduits between the event dispatcher and the render loop.
//!
//! | Conduit | Capacity | Sender blocks until |
//! |---|---|---|
//! | surface assigned | 1 | the slot is free |
//! | pause requested | 0 | the render loop receives the request |
//! | resume requested | 0 | the render loop receives the notification |
//! | stop requested | 1 | never |

use crate::error::LoopError;
use crossbeam_channel::{Receiver, Sender, bounded};

/// A pause travelling from the dispatcher to the render loop.
///
/// The render loop must call [`PauseRequest::acknowledge`] once frame
/// production has stopped. Acknowledging consumes the request, so it can
/// only happen once.
#[derive(Debug)]
pub struct PauseRequest {
    ack: Sender<()>,
}

/// Dispatcher side of a pause request.
#[derive(Debug)]
pub struct PauseAck {
    ack: Receiver<()>,
}

impl PauseRequest {
    pub fn new() -> (Self, PauseAck) {
        let (tx, rx) = bounded(1);
        (Self { ack: tx }, PauseAck { ack: rx })
    }

    pub fn acknowledge(self) {
        // The requester only disappears when the dispatcher itself died.
        let _ = self.ack.send(());
    }
}

impl PauseAck {
    /// Block until the render loop acknowledges. Fails if the request was
    /// dropped unacknowledged, which only happens when the render loop exits.
    pub fn wait(self) -> Result<(), LoopError> {
        self.ack
            .recv()
            .map_err(|_| LoopError::RenderLoopGone("pause acknowledgment"))
    }
}

/// Fires the render loop's stop signal. Cloneable.
///
/// Dropping every handle also stops the loop.
#[derive(Debug, Clone)]
pub struct StopHandle {
    stop: Sender<()>,
}

impl StopHandle {
    pub fn stop(&self) {
        // A full slot means a stop is already pending.
        let _ = self.stop.try_send(());
    }
}

/// Sending half held by the event dispatcher.
#[derive(Debug)]
pub struct ControlHandle<S> {
    surface_assigned: Sender<S>,
    pause_requested: Sender<PauseRequest>,
    resume_requested: Sender<()>,
}

impl<S> ControlHandle<S> {
    /// Hand a surface to the render loop. Blocks while a previous surface
    /// is still waiting to be picked up.
    pub fn assign_surface(&self, surface: S) -> Result<(), LoopError> {
        self.surface_assigned
            .send(surface)
            .map_err(|_| LoopError::RenderLoopGone("surface"))
    }

    /// Ask the render loop to pause and wait until it has stopped rendering.
    pub fn request_pause(&self) -> Result<(), LoopError> {
        let (request, ack) = PauseRequest::new();
        self.pause_requested
            .send(request)
            .map_err(|_| LoopError::RenderLoopGone("pause"))?;
        ack.wait()
    }

    /// Tell the render loop the application resumed. Not acknowledged.
    pub fn notify_resume(&self) -> Result<(), LoopError> {
        self.resume_requested
            .send(())
            .map_err(|_| LoopError::RenderLoopGone("resume"))
    }
}

/// Receiving half owned by the render loop.
#[derive(Debug)]
pub struct RenderCommands<S> {
    pub(crate) surface_assigned: Receiver<S>,
    pub(crate) pause_requested: Receiver<PauseRequest>,
    pub(crate) resume_requested: Receiver<()>,
    pub(crate) stop_requested: Receiver<()>,
}

/// The full set of conduits binding the two loops.
#[derive(Debug)]
pub struct RenderLoopControl<S> {
    pub handle: ControlHandle<S>,
    pub commands: RenderCommands<S>,
    pub stop: StopHandle,
}

impl<S> RenderLoopControl<S> {
    pub fn new() -> Self {
        let (surface_tx, surface_rx) = bounded(1);
        let (pause_tx, pause_rx) = bounded(0);
        let (resume_tx, resume_rx) = bounded(0);
        let (stop_tx, stop_rx) = bounded(1);
        Self {
            handle: ControlHandle {
                surface_assigned: surface_tx,
                pause_requested: pause_tx,
                resume_requested: resume_tx,
            },
            commands: RenderCommands {
                surface_assigned: surface_rx,
                pause_requested: pause_rx,
                resume_requested: resume_rx,
                stop_requested: stop_rx,
            },
            stop: StopHandle { stop: stop_tx },
        }
    }
}

impl<S> Default for RenderLoopControl<S> {
    fn default() -> Self {
        Self::new()
    }
}
