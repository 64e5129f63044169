//! The render loop: owns the surface and graphics context, produces frames on
//! a fixed-rate ticker and follows commands from the dispatcher.
//!
//! ```text
//!            surface            surface
//!   Idle ─────────────▶ Active ◀────────── Paused
//!     ▲                 │  ▲ tick           ▲  │
//!     │                 │  └────┘           │  │ resume (restart-ticker)
//!     │ pause           └──── pause ────────┘  │
//!     └─┘                                      ▼
//!                                            Active
//!   any ── stop ──▶ Stopped
//! ```
//!
//! The ticker runs if and only if the state is `Active`. A pause that finds a
//! surface still waiting in the slot binds it and ends in `Paused`.

use crate::control::{PauseRequest, RenderCommands};
use crate::error::{LoopError, RenderStage};
use crossbeam_channel::{Receiver, Sender, never, select, tick};
use framehost_common::{HostConfig, ResumePolicy, Viewport};
use framehost_render::{FrameDrawer, Surface};
use std::fmt;
use std::ops::ControlFlow;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Name of the render loop's thread.
pub const RENDER_THREAD_NAME: &str = "render-loop";

/// Lifecycle state of the render loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// No surface, ticker stopped.
    Idle,
    /// Surface bound, ticker running.
    Active,
    /// Surface retained, ticker stopped.
    Paused,
    /// Loop exited.
    Stopped,
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Progress notifications published by the render loop, in the order the
/// loop performed them.
#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerEvent {
    StateChanged {
        from: SchedulerState,
        to: SchedulerState,
    },
    ViewportConfigured(Viewport),
    FramePresented {
        frame: u64,
    },
    PauseAcknowledged,
    TickerStarted,
    TickerStopped,
}

/// Summary returned when the render loop exits cleanly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderReport {
    pub frames_presented: u64,
    pub surfaces_bound: u64,
    pub pauses: u64,
    pub resumes: u64,
    pub final_state: SchedulerState,
}

enum Command<S> {
    Surface(S),
    Tick,
    Pause(PauseRequest),
    Resume,
    Stop,
    Disconnected(Conduit),
}

#[derive(Debug, Clone, Copy)]
enum Conduit {
    Surface,
    Pause,
    Resume,
}

/// The render loop state machine.
///
/// Construct it on the thread that will run it, or use
/// [`RenderScheduler::spawn`], which builds the drawer on a dedicated thread.
pub struct RenderScheduler<S: Surface, D: FrameDrawer<S>> {
    commands: RenderCommands<S>,
    drawer: D,
    interval: Duration,
    resume_policy: ResumePolicy,
    state: SchedulerState,
    surface: Option<S>,
    viewport: Option<Viewport>,
    ticker: Receiver<Instant>,
    ticking: bool,
    status: Option<Sender<SchedulerEvent>>,
    report: RenderReport,
}

impl<S: Surface, D: FrameDrawer<S>> RenderScheduler<S, D> {
    pub fn new(commands: RenderCommands<S>, config: &HostConfig, drawer: D) -> Self {
        Self {
            commands,
            drawer,
            interval: config.frame_interval(),
            resume_policy: config.resume_policy,
            state: SchedulerState::Idle,
            surface: None,
            viewport: None,
            // Nothing may be presented before a surface is bound.
            ticker: never(),
            ticking: false,
            status: None,
            report: RenderReport {
                frames_presented: 0,
                surfaces_bound: 0,
                pauses: 0,
                resumes: 0,
                final_state: SchedulerState::Idle,
            },
        }
    }

    /// Publish progress on `status`. Slow or absent readers never block the loop.
    pub fn with_status(mut self, status: Sender<SchedulerEvent>) -> Self {
        self.status = Some(status);
        self
    }

    /// Run the loop on a new thread. The drawer is created on that thread
    /// and never leaves it.
    pub fn spawn<F>(
        commands: RenderCommands<S>,
        config: &HostConfig,
        make_drawer: F,
        status: Option<Sender<SchedulerEvent>>,
    ) -> Result<JoinHandle<Result<RenderReport, LoopError>>, LoopError>
    where
        F: FnOnce() -> D + Send + 'static,
        D: 'static,
    {
        let config = *config;
        thread::Builder::new()
            .name(RENDER_THREAD_NAME.into())
            .spawn(move || {
                let mut scheduler = Self::new(commands, &config, make_drawer());
                if let Some(status) = status {
                    scheduler = scheduler.with_status(status);
                }
                scheduler.run()
            })
            .map_err(|source| LoopError::ThreadSpawn {
                thread: RENDER_THREAD_NAME,
                source,
            })
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Viewport of the current surface, if one is bound.
    pub fn viewport(&self) -> Option<&Viewport> {
        self.viewport.as_ref()
    }

    pub fn drawer(&self) -> &D {
        &self.drawer
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn is_ticking(&self) -> bool {
        self.ticking
    }

    pub fn report(&self) -> RenderReport {
        RenderReport {
            final_state: self.state,
            ..self.report
        }
    }

    /// Service commands until stopped or a fatal error occurs.
    pub fn run(mut self) -> Result<RenderReport, LoopError> {
        tracing::info!(
            interval_ms = self.interval.as_secs_f64() * 1000.0,
            "render loop started"
        );
        loop {
            let command = self.next_command();
            match self.apply(command) {
                Ok(ControlFlow::Continue(())) => {}
                Ok(ControlFlow::Break(())) => break,
                Err(err) => {
                    tracing::error!("render loop terminated: {err}");
                    self.halt();
                    return Err(err);
                }
            }
        }
        let report = self.report();
        tracing::info!(
            frames = report.frames_presented,
            surfaces = report.surfaces_bound,
            "render loop stopped"
        );
        Ok(report)
    }

    /// Wait for whichever conduit is ready first.
    fn next_command(&self) -> Command<S> {
        let commands = &self.commands;
        select! {
            recv(commands.surface_assigned) -> msg => match msg {
                Ok(surface) => Command::Surface(surface),
                Err(_) => Command::Disconnected(Conduit::Surface),
            },
            recv(self.ticker) -> _ => Command::Tick,
            recv(commands.pause_requested) -> msg => match msg {
                Ok(request) => Command::Pause(request),
                Err(_) => Command::Disconnected(Conduit::Pause),
            },
            recv(commands.resume_requested) -> msg => match msg {
                Ok(()) => Command::Resume,
                Err(_) => Command::Disconnected(Conduit::Resume),
            },
            // A disconnected stop conduit also means stop.
            recv(commands.stop_requested) -> _ => Command::Stop,
        }
    }

    fn apply(&mut self, command: Command<S>) -> Result<ControlFlow<()>, LoopError> {
        match command {
            Command::Surface(surface) => self.on_surface(surface)?,
            Command::Tick => self.on_tick()?,
            Command::Pause(request) => self.on_pause(request)?,
            Command::Resume => self.on_resume(),
            Command::Stop => {
                self.on_stop();
                return Ok(ControlFlow::Break(()));
            }
            Command::Disconnected(conduit) => self.on_disconnected(conduit),
        }
        Ok(ControlFlow::Continue(()))
    }

    /// Bind a newly assigned surface and (re)start the ticker.
    pub fn on_surface(&mut self, surface: S) -> Result<(), LoopError> {
        self.stop_ticker();
        self.bind(surface)?;
        self.start_ticker();
        self.set_state(SchedulerState::Active);
        Ok(())
    }

    /// Make `surface` current and configure the drawer for it. The ticker
    /// must already be stopped.
    fn bind(&mut self, mut surface: S) -> Result<(), LoopError> {
        // Release the previous surface before binding the next one.
        self.surface = None;
        self.viewport = None;

        surface
            .make_current()
            .map_err(LoopError::render(RenderStage::Bind))?;
        let viewport = Viewport::from_size(surface.size());
        self.drawer
            .configure(&mut surface, &viewport)
            .map_err(LoopError::render(RenderStage::Viewport))?;

        tracing::info!(
            width = viewport.size.width,
            height = viewport.size.height,
            radius = viewport.radius,
            "restarting rendering loop"
        );
        self.surface = Some(surface);
        self.viewport = Some(viewport);
        self.report.surfaces_bound += 1;
        self.publish(SchedulerEvent::ViewportConfigured(viewport));
        Ok(())
    }

    /// Draw and present one frame.
    pub fn on_tick(&mut self) -> Result<(), LoopError> {
        if self.state != SchedulerState::Active {
            return Err(LoopError::ProtocolViolation("frame tick outside the active state"));
        }
        let Some(surface) = self.surface.as_mut() else {
            return Err(LoopError::ProtocolViolation("frame tick with no current surface"));
        };
        self.drawer
            .draw_frame(surface)
            .map_err(LoopError::render(RenderStage::Draw))?;
        surface
            .swap_buffers()
            .map_err(LoopError::render(RenderStage::Present))?;
        self.report.frames_presented += 1;
        tracing::trace!(frame = self.report.frames_presented, "frame presented");
        self.publish(SchedulerEvent::FramePresented {
            frame: self.report.frames_presented,
        });
        Ok(())
    }

    /// Stop producing frames, then acknowledge.
    ///
    /// A surface the dispatcher queued before the pause is bound here
    /// without restarting the ticker, so nothing is drawn after the
    /// acknowledgment until the next resume or surface.
    pub fn on_pause(&mut self, request: PauseRequest) -> Result<(), LoopError> {
        self.stop_ticker();
        let pending = self.commands.surface_assigned.try_recv().ok();
        let had_surface = pending.is_some();
        if let Some(surface) = pending {
            tracing::debug!("binding surface queued ahead of pause");
            self.bind(surface)?;
        }

        if self.state == SchedulerState::Active || had_surface {
            tracing::info!("application paused, stopping rendering ticker");
            self.set_state(SchedulerState::Paused);
        } else {
            tracing::debug!(state = %self.state, "pause while not rendering");
        }
        debug_assert!(!self.ticking, "ticker running at pause acknowledgment");
        self.report.pauses += 1;
        self.publish(SchedulerEvent::PauseAcknowledged);
        request.acknowledge();
        Ok(())
    }

    pub fn on_resume(&mut self) {
        self.report.resumes += 1;
        match (self.state, self.resume_policy) {
            (SchedulerState::Paused, ResumePolicy::RestartTicker) if self.surface.is_some() => {
                tracing::info!("application resumed, reactivating rendering ticker");
                self.start_ticker();
                self.set_state(SchedulerState::Active);
            }
            (SchedulerState::Paused, _) => {
                tracing::info!("application resumed, waiting for a surface");
            }
            (state, _) => {
                tracing::debug!(%state, "resume ignored");
            }
        }
    }

    pub fn on_stop(&mut self) {
        tracing::info!("stop requested");
        self.halt();
    }

    fn on_disconnected(&mut self, conduit: Conduit) {
        tracing::debug!(?conduit, "dispatcher closed conduit");
        match conduit {
            Conduit::Surface => self.commands.surface_assigned = never(),
            Conduit::Pause => self.commands.pause_requested = never(),
            Conduit::Resume => self.commands.resume_requested = never(),
        }
    }

    fn halt(&mut self) {
        self.stop_ticker();
        self.set_state(SchedulerState::Stopped);
    }

    fn start_ticker(&mut self) {
        self.ticker = tick(self.interval);
        self.ticking = true;
        self.publish(SchedulerEvent::TickerStarted);
    }

    fn stop_ticker(&mut self) {
        // Dropping the old receiver discards any tick it still holds.
        self.ticker = never();
        if self.ticking {
            self.ticking = false;
            self.publish(SchedulerEvent::TickerStopped);
        }
    }

    fn set_state(&mut self, to: SchedulerState) {
        let from = self.state;
        if from == to {
            return;
        }
        tracing::debug!(%from, %to, "render loop state changed");
        self.state = to;
        self.publish(SchedulerEvent::StateChanged { from, to });
    }

    fn publish(&self, event: SchedulerEvent) {
        if let Some(status) = &self.status {
            let _ = status.send(event);
        }
    }
}
