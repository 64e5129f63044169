//! The event loop: drains the host event stream and forwards the few
//! decisions the render loop cares about.
//!
//! The dispatcher never touches a surface. Surface handles pass through it
//! by value.

use crate::control::ControlHandle;
use crate::error::LoopError;
use crossbeam_channel::Receiver;
use framehost_input::{HostEvent, PauseNotice, TouchEvent, TouchTracker};
use std::ops::ControlFlow;
use std::thread::{self, JoinHandle};

/// Name of the dispatcher's thread.
pub const EVENT_THREAD_NAME: &str = "event-loop";

/// How the dispatcher loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchExit {
    /// The host sent its destroy event.
    Destroyed,
    /// The host dropped the event stream without a destroy event.
    StreamClosed,
}

/// Counters returned when the dispatcher exits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchReport {
    pub events: u64,
    pub surfaces_forwarded: u64,
    pub pauses: u64,
    pub resumes: u64,
    pub touches: u64,
    pub redraws: u64,
    pub exit: DispatchExit,
}

type TouchHandler = Box<dyn FnMut(&TouchEvent) + Send>;

pub struct EventDispatcher<S> {
    events: Receiver<HostEvent<S>>,
    control: ControlHandle<S>,
    touch: TouchTracker,
    touch_handler: Option<TouchHandler>,
    report: DispatchReport,
}

impl<S: Send + 'static> EventDispatcher<S> {
    pub fn new(events: Receiver<HostEvent<S>>, control: ControlHandle<S>) -> Self {
        Self {
            events,
            control,
            touch: TouchTracker::new(),
            touch_handler: None,
            report: DispatchReport {
                events: 0,
                surfaces_forwarded: 0,
                pauses: 0,
                resumes: 0,
                touches: 0,
                redraws: 0,
                exit: DispatchExit::StreamClosed,
            },
        }
    }

    /// Receive every touch event after it has been tracked. The handler runs
    /// on the dispatcher thread and must not block.
    pub fn with_touch_handler(
        mut self,
        handler: impl FnMut(&TouchEvent) + Send + 'static,
    ) -> Self {
        self.touch_handler = Some(Box::new(handler));
        self
    }

    pub fn touch(&self) -> &TouchTracker {
        &self.touch
    }

    pub fn spawn(self) -> Result<JoinHandle<Result<DispatchReport, LoopError>>, LoopError> {
        thread::Builder::new()
            .name(EVENT_THREAD_NAME.into())
            .spawn(move || self.run())
            .map_err(|source| LoopError::ThreadSpawn {
                thread: EVENT_THREAD_NAME,
                source,
            })
    }

    /// Dispatch events until the host destroys the application.
    pub fn run(mut self) -> Result<DispatchReport, LoopError> {
        tracing::debug!("event loop started");
        while let Ok(event) = self.events.recv() {
            if let ControlFlow::Break(exit) = self.dispatch(event)? {
                self.report.exit = exit;
                return Ok(self.report);
            }
        }
        tracing::warn!("host event stream closed without a destroy event");
        self.report.exit = DispatchExit::StreamClosed;
        Ok(self.report)
    }

    /// Handle one host event.
    pub fn dispatch(
        &mut self,
        event: HostEvent<S>,
    ) -> Result<ControlFlow<DispatchExit>, LoopError> {
        self.report.events += 1;
        tracing::trace!(kind = event.kind(), "host event");
        match event {
            HostEvent::SurfaceCreated(surface) => {
                self.control.assign_surface(surface)?;
                self.report.surfaces_forwarded += 1;
            }
            HostEvent::Touch(touch) => {
                self.touch.observe(&touch);
                if let Some(handler) = self.touch_handler.as_mut() {
                    handler(&touch);
                }
                self.report.touches += 1;
            }
            HostEvent::RedrawNeeded => {
                // The ticker already redraws at the configured rate.
                self.report.redraws += 1;
            }
            HostEvent::Pause(notice) => self.pause(notice)?,
            HostEvent::Resume => {
                tracing::info!("application was resumed");
                self.control.notify_resume()?;
                self.report.resumes += 1;
            }
            HostEvent::Destroy => {
                tracing::info!("stop rendering, quitting from application");
                return Ok(ControlFlow::Break(DispatchExit::Destroyed));
            }
        }
        Ok(ControlFlow::Continue(()))
    }

    fn pause(&mut self, notice: PauseNotice) -> Result<(), LoopError> {
        tracing::info!("application was paused, stopping rendering");
        // On failure the notice is dropped, which releases the host.
        self.control.request_pause()?;
        notice.complete();
        self.report.pauses += 1;
        Ok(())
    }
}
