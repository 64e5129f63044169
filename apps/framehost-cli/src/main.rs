use clap::{Parser, Subcommand};
use crossbeam_channel::unbounded;
use framehost_common::{FrameRate, HostConfig, ResumePolicy};
use framehost_input::TouchEvent;
use framehost_kernel::{FrameHostBuilder, SchedulerEvent};
use framehost_render::{HeadlessSurface, SceneDrawer};
use glam::Vec2;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "framehost-cli", about = "Headless frame host")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Frames per second (overrides the configuration file)
    #[arg(long)]
    fps: Option<u32>,

    /// What resume does to a paused render loop: await-surface | restart-ticker
    #[arg(long)]
    resume_policy: Option<ResumePolicy>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and the effective configuration
    Info,
    /// Run a scripted mobile lifecycle against headless surfaces
    Simulate {
        /// How long each rendering phase lasts, in milliseconds
        #[arg(long, default_value = "250")]
        phase_ms: u64,
        /// Number of finger moves in the simulated touch stroke
        #[arg(long, default_value = "3")]
        moves: u32,
    },
}

impl Cli {
    fn host_config(&self) -> anyhow::Result<HostConfig> {
        let mut config = match &self.config {
            Some(path) => HostConfig::load(path)?,
            None => HostConfig::default(),
        };
        if let Some(fps) = self.fps {
            config.frames_per_second = FrameRate::new(fps)?;
        }
        if let Some(policy) = self.resume_policy {
            config.resume_policy = policy;
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = cli.host_config()?;

    match cli.command {
        Commands::Info => {
            println!("framehost-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("common: {}", framehost_common::crate_info());
            println!("render: {}", framehost_render::crate_info());
            println!(
                "frames per second: {} (interval {:?})",
                config.frames_per_second.frames_per_second(),
                config.frame_interval()
            );
            println!("resume policy: {}", config.resume_policy);
        }
        Commands::Simulate { phase_ms, moves } => simulate(config, phase_ms, moves)?,
    }

    Ok(())
}

/// Replays the typical mobile sequence: window created, input, pause,
/// resume, window recreated at a new size, destroy.
fn simulate(config: HostConfig, phase_ms: u64, moves: u32) -> anyhow::Result<()> {
    let phase = Duration::from_millis(phase_ms);
    let (status_tx, status) = unbounded();
    let host = FrameHostBuilder::new(config)
        .status(status_tx)
        .start(SceneDrawer::new)?;
    let sink = host.events();

    sink.surface_created(HeadlessSurface::new(640, 480))?;
    sink.redraw_needed()?;
    thread::sleep(phase);

    sink.touch(TouchEvent::Down(Vec2::new(100.0, 100.0)))?;
    for i in 1..=moves {
        let step = i as f32 * 10.0;
        sink.touch(TouchEvent::Move(Vec2::new(100.0 + step, 100.0 + step)))?;
    }
    sink.touch(TouchEvent::Up)?;

    sink.pause()?;
    println!("paused: rendering stopped");
    thread::sleep(phase / 2);

    sink.resume()?;
    sink.surface_created(HeadlessSurface::new(320, 240))?;
    thread::sleep(phase);

    let report = host.shutdown()?;
    tracing::info!("simulation finished");

    for event in status.try_iter() {
        match event {
            SchedulerEvent::StateChanged { from, to } => println!("state: {from} -> {to}"),
            SchedulerEvent::ViewportConfigured(vp) => println!(
                "viewport: {}x{} radius={:.1}",
                vp.size.width, vp.size.height, vp.radius
            ),
            SchedulerEvent::PauseAcknowledged => println!("pause acknowledged"),
            SchedulerEvent::FramePresented { .. }
            | SchedulerEvent::TickerStarted
            | SchedulerEvent::TickerStopped => {}
        }
    }
    println!(
        "render: frames={} surfaces={} pauses={} resumes={} final={}",
        report.render.frames_presented,
        report.render.surfaces_bound,
        report.render.pauses,
        report.render.resumes,
        report.render.final_state
    );
    println!(
        "events: total={} surfaces={} touches={} redraws={} exit={:?}",
        report.dispatch.events,
        report.dispatch.surfaces_forwarded,
        report.dispatch.touches,
        report.dispatch.redraws,
        report.dispatch.exit
    );
    Ok(())
}
