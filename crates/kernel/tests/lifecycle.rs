//! Threaded lifecycle scenarios for the two loops.
//!
//! When several conduits are ready at once the render loop may service them
//! in any order. These tests only assert per-conduit ordering and the
//! pause/tick exclusion, never a cross-conduit order.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, unbounded};
use framehost_common::{FrameRate, HostConfig, ResumePolicy, Viewport, ViewportSize};
use framehost_kernel::{
    FrameHost, FrameHostBuilder, LoopError, RenderStage, SchedulerEvent, SchedulerState,
};
use framehost_render::{FrameDrawer, HeadlessSurface, RenderError, SceneDrawer, Surface};
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

const WAIT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Bind(ViewportSize),
    Configure(Viewport),
    Draw,
    Present,
}

#[derive(Debug, Clone)]
struct Record {
    thread: ThreadId,
    thread_name: Option<String>,
    call: Call,
}

fn record(calls: &Sender<Record>, call: Call) {
    let current = thread::current();
    let _ = calls.send(Record {
        thread: current.id(),
        thread_name: current.name().map(String::from),
        call,
    });
}

/// Surface that reports every graphics call it receives.
struct ProbeSurface {
    size: ViewportSize,
    calls: Sender<Record>,
}

impl ProbeSurface {
    fn new(width: u32, height: u32, calls: &Sender<Record>) -> Self {
        Self {
            size: ViewportSize::new(width, height),
            calls: calls.clone(),
        }
    }
}

impl Surface for ProbeSurface {
    fn make_current(&mut self) -> Result<(), RenderError> {
        record(&self.calls, Call::Bind(self.size));
        Ok(())
    }

    fn size(&self) -> ViewportSize {
        self.size
    }

    fn swap_buffers(&mut self) -> Result<(), RenderError> {
        record(&self.calls, Call::Present);
        Ok(())
    }
}

/// Drawer that reports its calls and can be slowed down.
struct ProbeDrawer {
    calls: Sender<Record>,
    configure_delay: Duration,
    draw_delay: Duration,
}

impl FrameDrawer<ProbeSurface> for ProbeDrawer {
    fn configure(
        &mut self,
        _surface: &mut ProbeSurface,
        viewport: &Viewport,
    ) -> Result<(), RenderError> {
        thread::sleep(self.configure_delay);
        record(&self.calls, Call::Configure(*viewport));
        Ok(())
    }

    fn draw_frame(&mut self, _surface: &mut ProbeSurface) -> Result<(), RenderError> {
        thread::sleep(self.draw_delay);
        record(&self.calls, Call::Draw);
        Ok(())
    }
}

struct Harness {
    host: FrameHost<ProbeSurface>,
    status: Receiver<SchedulerEvent>,
    calls_tx: Sender<Record>,
    calls: Receiver<Record>,
}

fn config(policy: ResumePolicy) -> HostConfig {
    HostConfig {
        frames_per_second: FrameRate::new(200).unwrap(),
        resume_policy: policy,
    }
}

fn harness(policy: ResumePolicy, configure_delay: Duration) -> Harness {
    slow_harness(policy, configure_delay, Duration::ZERO)
}

fn slow_harness(
    policy: ResumePolicy,
    configure_delay: Duration,
    draw_delay: Duration,
) -> Harness {
    let (status_tx, status) = unbounded();
    let (calls_tx, calls) = unbounded();
    let drawer_calls = calls_tx.clone();
    let host = FrameHostBuilder::new(config(policy))
        .status(status_tx)
        .start(move || ProbeDrawer {
            calls: drawer_calls,
            configure_delay,
            draw_delay,
        })
        .unwrap();
    Harness {
        host,
        status,
        calls_tx,
        calls,
    }
}

/// Collect status events up to and including the first one matching `done`.
fn wait_for(
    status: &Receiver<SchedulerEvent>,
    done: impl Fn(&SchedulerEvent) -> bool,
) -> Vec<SchedulerEvent> {
    let deadline = Instant::now() + WAIT;
    let mut seen = Vec::new();
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match status.recv_timeout(remaining) {
            Ok(event) => {
                let matched = done(&event);
                seen.push(event);
                if matched {
                    return seen;
                }
            }
            Err(RecvTimeoutError::Timeout) => panic!("timed out; saw {seen:?}"),
            Err(RecvTimeoutError::Disconnected) => panic!("status closed; saw {seen:?}"),
        }
    }
}

fn entered(state: SchedulerState) -> impl Fn(&SchedulerEvent) -> bool {
    move |event| matches!(event, SchedulerEvent::StateChanged { to, .. } if *to == state)
}

fn presented(event: &SchedulerEvent) -> bool {
    matches!(event, SchedulerEvent::FramePresented { .. })
}

fn configured_viewport(events: &[SchedulerEvent]) -> Viewport {
    events
        .iter()
        .find_map(|event| match event {
            SchedulerEvent::ViewportConfigured(vp) => Some(*vp),
            _ => None,
        })
        .expect("no viewport configured")
}

#[test]
fn surface_activates_with_viewport_and_radius() {
    let h = harness(ResumePolicy::AwaitSurface, Duration::ZERO);
    let sink = h.host.events();
    sink.surface_created(ProbeSurface::new(640, 480, &h.calls_tx))
        .unwrap();

    let events = wait_for(&h.status, entered(SchedulerState::Active));
    let vp = configured_viewport(&events);
    assert_eq!(vp.rect(), (0, 0, 640, 480));
    assert!((vp.radius - 800.0).abs() < 1e-9);

    wait_for(&h.status, presented);
    let report = h.host.shutdown().unwrap();
    assert_eq!(report.render.surfaces_bound, 1);
    assert!(report.render.frames_presented >= 1);
    assert_eq!(report.render.final_state, SchedulerState::Stopped);
}

#[test]
fn pause_stops_frames_before_acknowledging() {
    let h = harness(ResumePolicy::AwaitSurface, Duration::ZERO);
    let sink = h.host.events();
    sink.surface_created(ProbeSurface::new(640, 480, &h.calls_tx))
        .unwrap();
    wait_for(&h.status, presented);

    sink.pause().unwrap();
    let events = wait_for(&h.status, |e| *e == SchedulerEvent::PauseAcknowledged);
    assert_eq!(
        events[events.len() - 2],
        SchedulerEvent::StateChanged {
            from: SchedulerState::Active,
            to: SchedulerState::Paused
        }
    );

    // Give a running ticker many chances to fire.
    thread::sleep(Duration::from_millis(100));
    assert!(h.status.try_iter().all(|e| !presented(&e)));

    let report = h.host.shutdown().unwrap();
    assert_eq!(report.dispatch.pauses, 1);
    assert_eq!(report.render.pauses, 1);
}

#[test]
fn surface_after_pause_reactivates() {
    let h = harness(ResumePolicy::AwaitSurface, Duration::ZERO);
    let sink = h.host.events();
    sink.surface_created(ProbeSurface::new(640, 480, &h.calls_tx))
        .unwrap();
    wait_for(&h.status, presented);
    sink.pause().unwrap();
    wait_for(&h.status, |e| *e == SchedulerEvent::PauseAcknowledged);

    sink.surface_created(ProbeSurface::new(320, 240, &h.calls_tx))
        .unwrap();
    let events = wait_for(&h.status, entered(SchedulerState::Active));
    assert!(events.iter().all(|e| !presented(e)));
    let vp = configured_viewport(&events);
    assert_eq!(vp.rect(), (0, 0, 320, 240));
    assert!((vp.radius - 400.0).abs() < 1e-9);

    wait_for(&h.status, presented);
    let report = h.host.shutdown().unwrap();
    assert_eq!(report.render.surfaces_bound, 2);
}

#[test]
fn stop_while_active_ends_drawing() {
    let h = harness(ResumePolicy::AwaitSurface, Duration::ZERO);
    let sink = h.host.events();
    sink.surface_created(ProbeSurface::new(64, 64, &h.calls_tx))
        .unwrap();
    wait_for(&h.status, presented);

    h.host.stop_rendering();
    wait_for(&h.status, entered(SchedulerState::Stopped));
    let draws_at_stop = h
        .calls
        .try_iter()
        .filter(|r| r.call == Call::Draw)
        .count() as u64;

    // Many intervals pass; a live ticker would draw again.
    thread::sleep(Duration::from_millis(60));
    let draws_after_stop = h.calls.try_iter().filter(|r| r.call == Call::Draw).count();
    assert_eq!(draws_after_stop, 0);

    let report = h.host.shutdown().unwrap();
    drop(h.calls_tx);
    assert_eq!(h.calls.iter().filter(|r| r.call == Call::Draw).count(), 0);
    assert_eq!(draws_at_stop, report.render.frames_presented);
    assert_eq!(report.render.final_state, SchedulerState::Stopped);
}

#[test]
fn surface_queued_before_pause_does_not_restart_frames() {
    let h = slow_harness(
        ResumePolicy::AwaitSurface,
        Duration::ZERO,
        Duration::from_millis(30),
    );
    let sink = h.host.events();
    sink.surface_created(ProbeSurface::new(64, 64, &h.calls_tx))
        .unwrap();
    wait_for(&h.status, presented);

    // Queued while the render loop is busy drawing, just ahead of the pause.
    sink.surface_created(ProbeSurface::new(32, 32, &h.calls_tx))
        .unwrap();
    sink.pause().unwrap();
    let events = wait_for(&h.status, |e| *e == SchedulerEvent::PauseAcknowledged);
    assert!(events.iter().any(|e| matches!(
        e,
        SchedulerEvent::ViewportConfigured(vp) if vp.size == ViewportSize::new(32, 32)
    )));

    thread::sleep(Duration::from_millis(150));
    let after_ack: Vec<_> = h.status.try_iter().collect();
    assert!(after_ack.iter().all(|e| !presented(e)), "{after_ack:?}");
    assert!(!after_ack.iter().any(entered(SchedulerState::Active)));
    assert!(!after_ack.contains(&SchedulerEvent::TickerStarted));

    let report = h.host.shutdown().unwrap();
    assert_eq!(report.render.surfaces_bound, 2);
    assert_eq!(report.render.pauses, 1);
}

#[test]
fn queued_surfaces_are_all_bound_in_order() {
    let h = harness(
        ResumePolicy::AwaitSurface,
        Duration::from_millis(15),
    );
    let sink = h.host.events();
    for width in 1..=8 {
        sink.surface_created(ProbeSurface::new(width, 10, &h.calls_tx))
            .unwrap();
    }

    let mut widths = Vec::new();
    while widths.len() < 8 {
        let events = wait_for(&h.status, |e| {
            matches!(e, SchedulerEvent::ViewportConfigured(_))
        });
        widths.push(configured_viewport(&events[events.len() - 1..]).size.width);
    }
    assert_eq!(widths, (1..=8).collect::<Vec<u32>>());

    let report = h.host.shutdown().unwrap();
    assert_eq!(report.dispatch.surfaces_forwarded, 8);
    assert_eq!(report.render.surfaces_bound, 8);
}

#[test]
fn resume_waits_for_surface_by_default() {
    let h = harness(ResumePolicy::AwaitSurface, Duration::ZERO);
    let sink = h.host.events();
    sink.surface_created(ProbeSurface::new(64, 64, &h.calls_tx))
        .unwrap();
    wait_for(&h.status, presented);
    sink.pause().unwrap();
    wait_for(&h.status, |e| *e == SchedulerEvent::PauseAcknowledged);

    sink.resume().unwrap();
    thread::sleep(Duration::from_millis(100));
    let after_resume: Vec<_> = h.status.try_iter().collect();
    assert!(after_resume.iter().all(|e| !presented(e)));
    assert!(!after_resume.iter().any(entered(SchedulerState::Active)));

    let report = h.host.shutdown().unwrap();
    assert_eq!(report.render.resumes, 1);
}

#[test]
fn resume_restarts_ticker_when_configured() {
    let h = harness(ResumePolicy::RestartTicker, Duration::ZERO);
    let sink = h.host.events();
    sink.surface_created(ProbeSurface::new(64, 64, &h.calls_tx))
        .unwrap();
    wait_for(&h.status, presented);
    sink.pause().unwrap();
    wait_for(&h.status, |e| *e == SchedulerEvent::PauseAcknowledged);

    sink.resume().unwrap();
    let events = wait_for(&h.status, entered(SchedulerState::Active));
    assert!(events.iter().all(|e| !presented(e)));
    wait_for(&h.status, presented);

    let report = h.host.shutdown().unwrap();
    assert_eq!(report.render.surfaces_bound, 1);
}

#[test]
fn resume_while_active_changes_nothing() {
    let h = harness(ResumePolicy::RestartTicker, Duration::ZERO);
    let sink = h.host.events();
    sink.surface_created(ProbeSurface::new(64, 64, &h.calls_tx))
        .unwrap();
    wait_for(&h.status, entered(SchedulerState::Active));

    for _ in 0..3 {
        sink.resume().unwrap();
    }
    wait_for(&h.status, presented);
    wait_for(&h.status, presented);

    let report = h.host.shutdown().unwrap();
    let changes: Vec<_> = h
        .status
        .try_iter()
        .filter(|e| matches!(e, SchedulerEvent::StateChanged { .. }))
        .collect();
    // Only the final transition to Stopped remains unread.
    assert_eq!(
        changes,
        [SchedulerEvent::StateChanged {
            from: SchedulerState::Active,
            to: SchedulerState::Stopped
        }]
    );
    assert_eq!(report.render.resumes, 3);
    assert_eq!(report.render.surfaces_bound, 1);
}

#[test]
fn graphics_calls_stay_on_the_render_thread() {
    let h = harness(ResumePolicy::AwaitSurface, Duration::ZERO);
    let sink = h.host.events();
    sink.surface_created(ProbeSurface::new(64, 64, &h.calls_tx))
        .unwrap();
    wait_for(&h.status, presented);
    sink.surface_created(ProbeSurface::new(32, 32, &h.calls_tx))
        .unwrap();
    wait_for(&h.status, |e| matches!(e, SchedulerEvent::ViewportConfigured(_)));
    wait_for(&h.status, presented);
    h.host.shutdown().unwrap();
    drop(h.calls_tx);

    let records: Vec<_> = h.calls.iter().collect();
    assert!(records.len() >= 6);
    let render_thread = records[0].thread;
    assert_ne!(render_thread, thread::current().id());
    assert!(records.iter().all(|r| r.thread == render_thread));
    assert!(
        records
            .iter()
            .all(|r| r.thread_name.as_deref() == Some("render-loop"))
    );
    // Every present is preceded by its draw.
    let mut pending_draw = false;
    for r in &records {
        match r.call {
            Call::Draw => pending_draw = true,
            Call::Present => {
                assert!(pending_draw);
                pending_draw = false;
            }
            Call::Bind(_) | Call::Configure(_) => assert!(!pending_draw),
        }
    }
}

#[test]
fn present_failure_stops_the_render_loop() {
    let (status_tx, status) = unbounded();
    let host = FrameHostBuilder::new(config(ResumePolicy::AwaitSurface))
        .status(status_tx)
        .start(SceneDrawer::new)
        .unwrap();
    let sink = host.events();
    sink.surface_created(HeadlessSurface::new(64, 64).failing_present_after(2))
        .unwrap();
    let events = wait_for(&status, entered(SchedulerState::Stopped));
    assert_eq!(events.iter().filter(|e| presented(e)).count(), 2);

    // The dispatcher cannot complete a pause without a render loop.
    assert!(matches!(
        sink.pause(),
        Err(LoopError::DispatcherGone("pause"))
    ));

    let err = host.shutdown().unwrap_err();
    assert!(matches!(
        err,
        LoopError::Render {
            stage: RenderStage::Present,
            ..
        }
    ));
}

#[test]
fn bind_failure_is_reported() {
    let host = FrameHost::start(config(ResumePolicy::AwaitSurface), SceneDrawer::new).unwrap();
    host.events()
        .surface_created(HeadlessSurface::new(64, 64).failing_bind())
        .unwrap();
    let err = host.shutdown().unwrap_err();
    assert!(matches!(
        err,
        LoopError::Render {
            stage: RenderStage::Bind,
            ..
        }
    ));
}

#[test]
fn touch_input_never_reaches_the_render_loop() {
    let (seen_tx, seen) = unbounded();
    let (status_tx, status) = unbounded();
    let host = FrameHostBuilder::new(config(ResumePolicy::AwaitSurface))
        .status(status_tx)
        .touch_handler(move |touch| {
            let _ = seen_tx.send(*touch);
        })
        .start(SceneDrawer::new)
        .unwrap();
    let sink = host.events();
    sink.surface_created(HeadlessSurface::new(64, 64)).unwrap();
    sink.touch(framehost_input::TouchEvent::Down(glam::Vec2::new(3.0, 4.0)))
        .unwrap();
    sink.touch(framehost_input::TouchEvent::Up).unwrap();
    sink.redraw_needed().unwrap();

    let report = host.shutdown().unwrap();
    assert_eq!(report.dispatch.touches, 2);
    assert_eq!(report.dispatch.redraws, 1);
    assert_eq!(seen.try_iter().count(), 2);
    assert!(
        status
            .try_iter()
            .all(|e| !matches!(e, SchedulerEvent::PauseAcknowledged))
    );
}
