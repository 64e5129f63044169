//! Orchestration of both loops on behalf of a host.

use crate::control::{RenderLoopControl, StopHandle};
use crate::dispatcher::{DispatchReport, EventDispatcher};
use crate::error::LoopError;
use crate::scheduler::{RenderReport, RenderScheduler, SchedulerEvent};
use crossbeam_channel::{Sender, unbounded};
use framehost_common::HostConfig;
use framehost_input::{HostEvent, PauseNotice, TouchEvent};
use framehost_render::{FrameDrawer, Surface};
use std::thread::JoinHandle;

/// Reports of both loops after a clean shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostReport {
    pub dispatch: DispatchReport,
    pub render: RenderReport,
}

/// The host's way into the event stream. Cheap to clone.
#[derive(Debug)]
pub struct EventSink<S> {
    events: Sender<HostEvent<S>>,
}

impl<S> Clone for EventSink<S> {
    fn clone(&self) -> Self {
        Self {
            events: self.events.clone(),
        }
    }
}

impl<S> EventSink<S> {
    pub fn send(&self, event: HostEvent<S>) -> Result<(), LoopError> {
        let kind = event.kind();
        self.events
            .send(event)
            .map_err(|_| LoopError::DispatcherGone(kind))
    }

    pub fn surface_created(&self, surface: S) -> Result<(), LoopError> {
        self.send(HostEvent::SurfaceCreated(surface))
    }

    /// Pause and block until the render loop has stopped producing frames.
    pub fn pause(&self) -> Result<(), LoopError> {
        let (notice, waiter) = PauseNotice::new();
        self.send(HostEvent::Pause(notice))?;
        if waiter.wait() {
            Ok(())
        } else {
            Err(LoopError::DispatcherGone("pause"))
        }
    }

    pub fn resume(&self) -> Result<(), LoopError> {
        self.send(HostEvent::Resume)
    }

    pub fn touch(&self, touch: TouchEvent) -> Result<(), LoopError> {
        self.send(HostEvent::Touch(touch))
    }

    pub fn redraw_needed(&self) -> Result<(), LoopError> {
        self.send(HostEvent::RedrawNeeded)
    }

    pub fn destroy(&self) -> Result<(), LoopError> {
        self.send(HostEvent::Destroy)
    }
}

type TouchHandler = Box<dyn FnMut(&TouchEvent) + Send>;

/// Optional wiring for [`FrameHost`].
pub struct FrameHostBuilder {
    config: HostConfig,
    status: Option<Sender<SchedulerEvent>>,
    touch_handler: Option<TouchHandler>,
}

impl FrameHostBuilder {
    pub fn new(config: HostConfig) -> Self {
        Self {
            config,
            status: None,
            touch_handler: None,
        }
    }

    /// Publish render loop progress on `status`.
    pub fn status(mut self, status: Sender<SchedulerEvent>) -> Self {
        self.status = Some(status);
        self
    }

    pub fn touch_handler(mut self, handler: impl FnMut(&TouchEvent) + Send + 'static) -> Self {
        self.touch_handler = Some(Box::new(handler));
        self
    }

    /// Spawn both loops. `make_drawer` runs on the render thread.
    pub fn start<S, D, F>(self, make_drawer: F) -> Result<FrameHost<S>, LoopError>
    where
        S: Surface,
        D: FrameDrawer<S> + 'static,
        F: FnOnce() -> D + Send + 'static,
    {
        let RenderLoopControl {
            handle,
            commands,
            stop,
        } = RenderLoopControl::new();
        let (events, stream) = unbounded();

        let renderer = RenderScheduler::spawn(commands, &self.config, make_drawer, self.status)?;

        let mut dispatcher = EventDispatcher::new(stream, handle);
        if let Some(handler) = self.touch_handler {
            dispatcher = dispatcher.with_touch_handler(handler);
        }
        let dispatcher = match dispatcher.spawn() {
            Ok(dispatcher) => dispatcher,
            Err(err) => {
                stop.stop();
                let _ = renderer.join();
                return Err(err);
            }
        };

        tracing::info!(
            fps = self.config.frames_per_second.frames_per_second(),
            resume_policy = %self.config.resume_policy,
            "frame host started"
        );
        Ok(FrameHost {
            sink: EventSink { events },
            stop,
            dispatcher,
            renderer,
        })
    }
}

/// Both loops, running on their own threads.
pub struct FrameHost<S> {
    sink: EventSink<S>,
    stop: StopHandle,
    dispatcher: JoinHandle<Result<DispatchReport, LoopError>>,
    renderer: JoinHandle<Result<RenderReport, LoopError>>,
}

impl<S: Surface> FrameHost<S> {
    pub fn start<D, F>(config: HostConfig, make_drawer: F) -> Result<Self, LoopError>
    where
        D: FrameDrawer<S> + 'static,
        F: FnOnce() -> D + Send + 'static,
    {
        FrameHostBuilder::new(config).start(make_drawer)
    }

    pub fn events(&self) -> EventSink<S> {
        self.sink.clone()
    }

    /// Stop the render loop without touching the dispatcher.
    pub fn stop_rendering(&self) {
        self.stop.stop();
    }

    pub fn is_rendering(&self) -> bool {
        !self.renderer.is_finished()
    }

    /// Destroy the application, then stop the render loop and collect both
    /// reports. A render failure takes precedence over a dispatcher failure.
    pub fn shutdown(self) -> Result<HostReport, LoopError> {
        // Already destroyed or dead dispatchers make this a no-op.
        let _ = self.sink.destroy();
        drop(self.sink);
        let dispatch = join(self.dispatcher, crate::dispatcher::EVENT_THREAD_NAME);

        self.stop.stop();
        let render = join(self.renderer, crate::scheduler::RENDER_THREAD_NAME);

        let report = HostReport {
            render: render?,
            dispatch: dispatch?,
        };
        tracing::info!(
            frames = report.render.frames_presented,
            events = report.dispatch.events,
            "frame host shut down"
        );
        Ok(report)
    }
}

fn join<T>(handle: JoinHandle<Result<T, LoopError>>, thread: &'static str) -> Result<T, LoopError> {
    handle
        .join()
        .map_err(|_| LoopError::Panicked { thread })?
}
