//! orb-sim: runs the Orb agent headless in a generated sandbox.
//!
//! - `orb-sim run` - autonomous run for a fixed number of ticks
//! - `orb-sim build` - same, with a build goal queued up front
//! - `orb-sim config` - print the effective configuration as YAML

mod executor;
mod scene;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use orb_brain::{DriverReport, OrbBrain, OrbConfig, OrbDriver, OrbHandle, OrbState, PlayerAction};
use orb_core::Vec3;
use orb_goals::{Goal, GoalKind};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing_subscriber::{fmt, EnvFilter};

use crate::executor::{LogSpeech, SandboxExecutor};

#[derive(Parser)]
#[command(name = "orb-sim")]
#[command(about = "Headless Orb agent simulation", version)]
struct Cli {
    /// YAML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Number of cognition ticks to run
    #[arg(short, long, global = true, default_value_t = 40)]
    ticks: u64,

    /// Overrides the configured seed
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print the final state as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Let the orb run on its own
    Run {
        /// Trees scattered over the floor
        #[arg(long, default_value_t = 12)]
        trees: usize,

        /// Have the player place a few blocks next to the orb partway through
        #[arg(long)]
        player_builds: bool,
    },

    /// Queue a tower-building goal before starting
    Build {
        /// Tower height in blocks
        #[arg(long, default_value_t = 4)]
        height: i32,
    },

    /// Print the effective configuration
    Config,
}

#[derive(Serialize)]
struct RunSummary {
    ticks: u64,
    skipped: u64,
    frames: u64,
    tool_calls: u64,
    world_blocks: usize,
    state: OrbState,
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let mut config = OrbConfig::load_or_default(cli.config.as_deref())?;
    if let Some(seed) = cli.seed {
        config.brain.seed = seed;
    }

    match cli.command.take() {
        Some(Commands::Config) => {
            let yaml = serde_yaml::to_string(&config).context("Failed to render config")?;
            print!("{yaml}");
            Ok(())
        }
        Some(Commands::Build { height }) => {
            let spawn = config.brain.spawn_position;
            let goal = Goal::new(GoalKind::Build, 8, 0)
                .with_description("stack a marker tower")
                .with_target_blocks(scene::tower(spawn, height));
            simulate(&config, &cli, 12, false, Some(goal)).await
        }
        Some(Commands::Run {
            trees,
            player_builds,
        }) => simulate(&config, &cli, trees, player_builds, None).await,
        None => simulate(&config, &cli, 12, false, None).await,
    }
}

async fn simulate(
    config: &OrbConfig,
    cli: &Cli,
    trees: usize,
    player_builds: bool,
    goal: Option<Goal>,
) -> Result<()> {
    let mut world = scene::build_scene(config.world, config.brain.seed, trees);
    let spawn = config.brain.spawn_position;
    world.set_player(spawn + Vec3::new(6.0, 0.0, 6.0), Vec3::new(-1.0, 0.0, 0.0));
    let world = Arc::new(RwLock::new(world));

    let mut brain = OrbBrain::new(config).with_speech_sink(Box::new(LogSpeech));
    if let Some(goal) = goal {
        tracing::info!(kind = %goal.kind, blocks = goal.total_blocks(), "queued goal");
        brain.add_goal(goal);
    }
    let handle = OrbHandle::new(brain);
    let executor = Arc::new(SandboxExecutor::new(
        world.clone(),
        Duration::from_millis(config.brain.behavior_tick_rate_ms / 2),
    ));
    let driver = OrbDriver::new(handle.clone(), world.clone(), executor);

    let player = player_builds.then(|| {
        let world = world.clone();
        let handle = handle.clone();
        let delay = Duration::from_millis(config.brain.behavior_tick_rate_ms * cli.ticks / 3);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let near = handle.state().position.floor().offset(-2, 0, 1);
            for (i, y) in (0..3).enumerate() {
                let cell = near.offset(0, y, 0);
                world.write().await.set_block(cell, orb_core::BlockType::WOOD);
                let now_ms = delay.as_millis() as u64 + i as u64 * 200;
                let action = PlayerAction::place_block(cell.center());
                handle.with_brain(|b| b.on_player_action(action, now_ms));
            }
            tracing::info!("player placed blocks near the orb");
        })
    });

    let shutdown = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "ctrl-c handler unavailable");
            std::future::pending::<()>().await;
        }
    };
    let report = driver.run(Some(cli.ticks), shutdown).await;
    if let Some(player) = player {
        player.abort();
    }

    let world_blocks = world.read().await.block_count();
    print_summary(report, world_blocks, handle.state(), cli.json)
}

fn print_summary(
    report: DriverReport,
    world_blocks: usize,
    state: OrbState,
    json: bool,
) -> Result<()> {
    if json {
        let summary = RunSummary {
            ticks: report.ticks,
            skipped: report.skipped,
            frames: report.frames,
            tool_calls: report.tool_calls,
            world_blocks,
            state,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
        );
        return Ok(());
    }

    println!("Orb Simulation");
    println!("==============");
    println!();
    println!(
        "Ticks: {} run, {} skipped ({} frames)",
        report.ticks, report.skipped, report.frames
    );
    println!("Tool calls: {}", report.tool_calls);
    println!("World blocks: {world_blocks}");
    println!();
    let p = state.position;
    println!("Mode: {:?}", state.mode);
    println!("Position: ({:.1}, {:.1}, {:.1})", p.x, p.y, p.z);
    println!(
        "Curiosity: {:.2}  Energy: {:.2}  Mood: {:?}",
        state.memory.curiosity(),
        state.memory.energy(),
        state.memory.mood()
    );
    println!("Regions visited: {}", state.memory.region_count());
    println!();
    println!("Goals:");
    for goal in &state.goals {
        let marker = if state.active_goal == Some(goal.id) { "*" } else { " " };
        println!(
            " {marker} {:<14} p={:<2} {:?} {:>3.0}%",
            goal.kind.name(),
            goal.effective_priority,
            goal.status,
            goal.progress * 100.0
        );
    }
    Ok(())
}
