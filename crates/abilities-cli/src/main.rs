//! Abilities CLI - inspect and simulate ability action-buffer layouts.
//!
//! Single binary that provides:
//! - `abilities shape` - print the decision-vector shape of the demo loadout as JSON
//! - `abilities simulate` - tick demo agents and print their final state

mod config;
mod demo;

use std::path::PathBuf;

use ai_abilities::{tick_controllers, DispatchFlags, FnDecisionSource};
use ai_core::TickContext;
use ai_tools::{TraceLog, TRACE_LOG};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::SimConfig;

#[derive(Parser)]
#[command(name = "abilities")]
#[command(about = "Ability action-buffer inspection and simulation", version)]
struct Cli {
    /// Simulation config (YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the shape a decision process must produce for the demo loadout
    Shape {
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Simulate the demo agents
    Simulate {
        /// Override the configured tick count
        #[arg(long)]
        ticks: Option<u64>,

        /// Override the configured number of agents
        #[arg(long)]
        agents: Option<u32>,

        /// How decision vectors are applied
        #[arg(long, value_enum, default_value_t = Mode::Normal)]
        mode: Mode,

        /// Also print every activation as JSON
        #[arg(long)]
        trace: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Forward the decision process's values
    Normal,
    /// Send zeros to every ability
    Suppressed,
    /// Replace every value with a seeded random one
    Randomized,
}

impl From<Mode> for DispatchFlags {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Normal => DispatchFlags::NORMAL,
            Mode::Suppressed => DispatchFlags::SUPPRESSED,
            Mode::Randomized => DispatchFlags::RANDOMIZED,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

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

    let config = SimConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Shape { pretty } => print_shape(&config, pretty),
        Commands::Simulate {
            ticks,
            agents,
            mode,
            trace,
        } => {
            let mut config = config;
            if let Some(ticks) = ticks {
                config.ticks = ticks;
            }
            if let Some(agents) = agents {
                config.agents = agents;
            }
            simulate(&config, mode, trace)
        }
    }
}

fn print_shape(config: &SimConfig, pretty: bool) -> Result<()> {
    let mut controller = demo::loadout(1, config.controller)?;
    let shape = controller
        .reconcile()
        .context("Demo loadout has an invalid layout")?;

    let json = if pretty {
        serde_json::to_string_pretty(shape)?
    } else {
        serde_json::to_string(shape)?
    };
    println!("{json}");
    Ok(())
}

fn simulate(config: &SimConfig, mode: Mode, trace: bool) -> Result<()> {
    tracing::info!(
        agents = config.agents,
        ticks = config.ticks,
        seed = config.seed,
        ?mode,
        "Starting simulation"
    );

    let mut world = demo::DemoWorld::default();
    let mut controllers = Vec::with_capacity(config.agents as usize);
    for agent in 1..=config.agents {
        world.spawn(agent);
        let mut controller = demo::loadout(agent, config.controller)?;
        if trace {
            controller.blackboard.set(TRACE_LOG, TraceLog::default());
        }
        let report = controller
            .begin_episode()
            .with_context(|| format!("Failed to start episode for agent {agent}"))?;
        for failure in &report.failures {
            tracing::warn!(agent, %failure, "Ability will run without setup");
        }
        controllers.push(controller);
    }

    let mut source = FnDecisionSource::new(demo::patrol);
    let flags = DispatchFlags::from(mode);
    let mut dispatches = 0u64;

    let mut ctx = TickContext::new(0, config.dt_seconds, config.seed);
    for _ in 0..config.ticks {
        for (agent, result) in tick_controllers(&ctx, &mut world, &mut controllers, &mut source, flags)
        {
            let report = result
                .with_context(|| format!("Dispatch failed for agent {agent} at tick {}", ctx.tick))?;
            if report.is_some() {
                dispatches += 1;
            }
        }
        ctx = ctx.next();
    }

    for controller in &mut controllers {
        controller.end_episode();
    }
    tracing::info!(dispatches, "Simulation finished");

    println!("{}", serde_json::to_string_pretty(&world)?);

    if trace {
        let traces: Vec<_> = controllers
            .iter()
            .filter_map(|c| c.blackboard.get(TRACE_LOG).map(|log| (c.agent, log)))
            .collect();
        println!("{}", serde_json::to_string_pretty(&traces)?);
    }

    Ok(())
}
