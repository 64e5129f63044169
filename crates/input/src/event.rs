use crate::touch::TouchEvent;
use crossbeam_channel::{Receiver, Sender, bounded};

/// A lifecycle or input event delivered by the host environment.
///
/// `S` is the host's surface handle type. The handle is moved through the
/// event so that exactly one owner holds it at any time.
#[derive(Debug)]
pub enum HostEvent<S> {
    /// A native surface became available (or was recreated after a resize).
    SurfaceCreated(S),
    /// The host asks for the surface to be redrawn.
    RedrawNeeded,
    /// The application is being paused. The host waits on the notice.
    Pause(PauseNotice),
    /// The application came back to the foreground.
    Resume,
    /// Finger/pointer input.
    Touch(TouchEvent),
    /// The application is being destroyed. Last event of the stream.
    Destroy,
}

impl<S> HostEvent<S> {
    /// Short name used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SurfaceCreated(_) => "surface-created",
            Self::RedrawNeeded => "redraw-needed",
            Self::Pause(_) => "pause",
            Self::Resume => "resume",
            Self::Touch(TouchEvent::Down(_)) => "touch-down",
            Self::Touch(TouchEvent::Up) => "touch-up",
            Self::Touch(TouchEvent::Move(_)) => "touch-move",
            Self::Destroy => "destroy",
        }
    }
}

/// Host side of a pause: completed once rendering has actually stopped.
#[derive(Debug)]
pub struct PauseNotice {
    done: Sender<()>,
}

/// Waits for a `PauseNotice` to be completed.
#[derive(Debug)]
pub struct PauseWaiter {
    done: Receiver<()>,
}

impl PauseNotice {
    /// A notice paired with a waiter the host can block on.
    pub fn new() -> (Self, PauseWaiter) {
        let (tx, rx) = bounded(1);
        (Self { done: tx }, PauseWaiter { done: rx })
    }

    pub fn complete(self) {
        // The host may have stopped waiting; that is fine.
        let _ = self.done.send(());
    }
}

impl PauseWaiter {
    /// Block until the pause completes. Returns `false` if the notice was
    /// dropped without completing (the dispatcher went away).
    pub fn wait(self) -> bool {
        self.done.recv().is_ok()
    }
}
