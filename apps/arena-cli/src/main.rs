use std::path::{Path, PathBuf};

use anyhow::Context;
use arena_common::{ArenaConfig, RoomLayout, ViewerPose};
use arena_input::{Action, HandPose, StaticHands};
use arena_kernel::{Arena, Clock, ManualClock, SessionState};
use arena_render::{DebugTextRenderer, HeadlessScene, RenderView, Renderer, TextPanel};
use arena_tools::SessionInspector;
use clap::{Parser, Subcommand};
use glam::Vec3;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "arena-cli", about = "CLI tool for the neon arena core")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print the effective configuration as YAML
    Config {
        /// YAML or JSON config file; defaults when omitted
        #[arg(short, long)]
        path: Option<PathBuf>,
    },
    /// Run a scripted headless session: the hand points, the viewer turns to each glyph
    Simulate {
        /// YAML or JSON config file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// RNG seed for glyph placement (overrides the config)
        #[arg(short, long, default_value = "42")]
        seed: u64,
        /// Tick length in seconds
        #[arg(long, default_value = "0.015625")]
        dt: f64,
        /// Simulated duration in seconds
        #[arg(long, default_value = "30")]
        seconds: f64,
        /// Time at which the right hand starts pointing
        #[arg(long, default_value = "1.0")]
        point_at: f64,
        /// Delay before the viewer turns towards a new glyph
        #[arg(long, default_value = "0.5")]
        reaction: f64,
        /// Skip the teaser countdown
        #[arg(long)]
        no_teaser: bool,
        /// Developer key press as TIME:KEY (e.g. 2.5:space); repeatable
        #[arg(long = "key", value_parser = parse_key_press)]
        keys: Vec<KeyPress>,
    },
}

/// A scripted developer key press.
#[derive(Debug, Clone)]
struct KeyPress {
    at: f64,
    key: String,
}

fn parse_key_press(s: &str) -> Result<KeyPress, String> {
    let (at, key) = s
        .split_once(':')
        .ok_or_else(|| format!("expected TIME:KEY, got {s:?}"))?;
    let at = at
        .parse::<f64>()
        .map_err(|e| format!("bad key time {at:?}: {e}"))?;
    if key.is_empty() {
        return Err(format!("missing key name in {s:?}"));
    }
    Ok(KeyPress {
        at,
        key: key.to_string(),
    })
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ArenaConfig> {
    match path {
        Some(path) => ArenaConfig::load(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(ArenaConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("arena-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("input: {}", arena_input::crate_info());
            println!("glyph: {}", arena_glyph::crate_info());
            println!("kernel: {}", arena_kernel::crate_info());
            println!("render: {}", arena_render::crate_info());
            println!("tools: {}", arena_tools::crate_info());
        }
        Commands::Config { path } => {
            let config = load_config(path.as_deref())?;
            print!("{}", config.to_yaml_string()?);
        }
        Commands::Simulate {
            config,
            seed,
            dt,
            seconds,
            point_at,
            reaction,
            no_teaser,
            mut keys,
        } => {
            anyhow::ensure!(dt > 0.0, "--dt must be positive");
            let mut config = load_config(config.as_deref())?;
            config.seed = Some(seed);
            if no_teaser {
                config.teaser.enabled = false;
            }
            keys.sort_by(|a, b| a.at.total_cmp(&b.at));
            simulate(config, dt, seconds, point_at, reaction, &keys)?;
        }
    }

    Ok(())
}

fn simulate(
    config: ArenaConfig,
    dt: f64,
    seconds: f64,
    point_at: f64,
    reaction: f64,
    keys: &[KeyPress],
) -> anyhow::Result<()> {
    println!(
        "Simulating: seed={:?} dt={dt} seconds={seconds} teaser={}",
        config.seed, config.teaser.enabled
    );

    let mut viewer = ViewerPose::default();
    let anchor = RoomLayout::anchor_for(
        Some(viewer.position),
        Vec3::ZERO,
        config.room.floor_y,
        config.room.spawn_around_viewer,
    );
    let layout = RoomLayout::build(config.room.size, anchor);
    let hands = StaticHands {
        right: HandPose::open(),
        ..StaticHands::default()
    };
    let mut arena = Arena::new(
        config,
        layout,
        ManualClock::new(0.0),
        hands,
        HeadlessScene::new(),
        TextPanel::new(),
    )?;

    let mut pending = keys.iter().peekable();
    let mut pointed = false;
    let mut turn: Option<(f64, Vec3)> = None;
    let steps = (seconds / dt).ceil() as u64;
    for _ in 0..steps {
        arena.clock_mut().advance(dt);
        let now = arena.clock_mut().now();

        if !pointed && now >= point_at {
            arena.hands_mut().right = HandPose::pointing();
            pointed = true;
        }
        if let Some((at, target)) = turn {
            if now >= at {
                viewer = ViewerPose::looking_at(viewer.position, target);
                turn = None;
            }
        }

        while let Some(press) = pending.next_if(|p| p.at <= now) {
            match Action::from_key(&press.key) {
                Action::Noop => println!("[{now:>8.3}] key {:?} is not bound", press.key),
                action => match arena.apply(action) {
                    Ok(Some(t)) => {
                        println!("[{:>8.3}] {:?} -> {:?} ({:?})", t.at, t.from, t.to, t.trigger)
                    }
                    Ok(None) => println!("[{now:>8.3}] {action:?} applied"),
                    Err(err) => println!("[{now:>8.3}] {action:?} rejected: {err}"),
                },
            }
        }

        let report = arena.tick(viewer);

        for t in &report.transitions {
            println!("[{:>8.3}] {:?} -> {:?} ({:?})", t.at, t.from, t.to, t.trigger);
        }
        for id in &report.expired {
            println!("[{now:>8.3}] {id} expired");
        }
        if let Some(id) = report.spawned {
            if let Some(target) = arena.scheduler().get(id) {
                let p = target.pose.position;
                println!(
                    "[{now:>8.3}] {id} spawned on {:?} at ({:.2}, {:.2}, {:.2})",
                    target.wall, p.x, p.y, p.z
                );
                turn = Some((now + reaction, p));
            }
        }
        if report.state == SessionState::Won {
            break;
        }
    }

    println!();
    println!("UI log:");
    for line in arena.ui().log() {
        println!("  {line}");
    }

    let snapshot = arena.snapshot();
    tracing::info!(state = ?snapshot.state, transitions = snapshot.transitions, "simulation finished");
    println!();
    print!(
        "{}",
        DebugTextRenderer::new().render(&snapshot, &RenderView::from_viewer(viewer))
    );
    println!("{}", SessionInspector::summary(&snapshot));
    println!(
        "Scene: spawned={} destroyed={} live={}",
        arena.visuals().spawned(),
        arena.visuals().destroyed(),
        arena.visuals().live_count()
    );

    arena.teardown();
    Ok(())
}
