use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use catalog::ImageryItemConfig;
use clap::{Parser, Subcommand, ValueEnum};
use foundation::time::Time;
use tools::{SimulationOptions, SimulationReport, check, format_time, initial_time, simulate};
use tracing::info;
use tracing_subscriber::EnvFilter;
use viewer::{GlobeViewer, TileMapViewer};

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect and replay time-dynamic imagery items")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate an item configuration and print its time coverage
    Check {
        config: PathBuf,
    },

    /// Print the time playback would start at
    InitialTime {
        config: PathBuf,

        /// Treat this ISO8601 instant as "now" (default: system clock)
        #[arg(long)]
        now: Option<String>,
    },

    /// Enable the item on an in-memory viewer and drive the clock
    Simulate {
        config: PathBuf,

        #[arg(long, value_enum, default_value_t = ViewerChoice::Globe)]
        viewer: ViewerChoice,

        /// Wall seconds per tick
        #[arg(long, default_value_t = 1.0)]
        step: f64,

        #[arg(long, default_value_t = 10)]
        ticks: u32,

        /// Simulated seconds per wall second; negative plays backwards
        #[arg(long, default_value_t = 1.0, allow_hyphen_values = true)]
        multiplier: f64,

        /// Treat this ISO8601 instant as "now" (default: system clock)
        #[arg(long)]
        now: Option<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum ViewerChoice {
    Globe,
    TileMap,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    match args.command {
        Command::Check { config } => cmd_check(&config),
        Command::InitialTime { config, now } => cmd_initial_time(&config, now.as_deref()),
        Command::Simulate {
            config,
            viewer,
            step,
            ticks,
            multiplier,
            now,
            json,
        } => {
            let options = SimulationOptions {
                step_s: step,
                ticks,
                multiplier,
            };
            cmd_simulate(&config, viewer, options, now.as_deref(), json)
        }
    }
}

fn load(path: &Path) -> Result<ImageryItemConfig> {
    let raw = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    ImageryItemConfig::from_json(&raw).with_context(|| format!("parse {}", path.display()))
}

fn parse_now(now: Option<&str>) -> Result<Time> {
    match now {
        Some(raw) => {
            Time::parse_iso8601(raw).ok_or_else(|| anyhow!("--now: not an ISO8601 time: {raw}"))
        }
        None => Ok(Time::now()),
    }
}

fn cmd_check(path: &Path) -> Result<()> {
    let summary = check(&load(path)?)?;
    if !summary.time_dynamic {
        println!("{}: static imagery", summary.name);
        return Ok(());
    }
    println!(
        "{}: {} intervals, {} .. {}, {} gap(s)",
        summary.name,
        summary.intervals,
        summary.start.as_deref().unwrap_or("?"),
        summary.stop.as_deref().unwrap_or("?"),
        summary.gaps
    );
    Ok(())
}

fn cmd_initial_time(path: &Path, now: Option<&str>) -> Result<()> {
    let config = load(path)?;
    match initial_time(&config, parse_now(now)?)? {
        Some(t) => println!("{}", format_time(t)),
        None => println!("{}: static imagery has no initial time", config.name),
    }
    Ok(())
}

fn cmd_simulate(
    path: &Path,
    viewer: ViewerChoice,
    options: SimulationOptions,
    now: Option<&str>,
    json: bool,
) -> Result<()> {
    let config = load(path)?;
    let now = parse_now(now)?;
    let (report, viewer_metrics) = match viewer {
        ViewerChoice::Globe => {
            let mut globe = GlobeViewer::new();
            let report = simulate(&config, &mut globe, now, options)?;
            (report, globe.metrics().snapshot())
        }
        ViewerChoice::TileMap => {
            let mut map = TileMapViewer::new();
            let report = simulate(&config, &mut map, now, options)?;
            (report, map.metrics().snapshot())
        }
    };
    info!(
        counters = ?viewer_metrics.counters,
        gauges = ?viewer_metrics.gauges,
        "simulation finished"
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    if report.layers_created != report.layers_released {
        return Err(anyhow!(
            "{} layers created but {} released",
            report.layers_created,
            report.layers_released
        ));
    }
    Ok(())
}

fn print_report(report: &SimulationReport) {
    println!("{} on the {}", report.item, report.viewer);
    if let Some((start, stop)) = &report.span {
        println!("coverage {start} .. {stop}");
    }
    for tick in &report.ticks {
        println!(
            "{:<28} current={:<16} next={}",
            tick.time,
            tick.current.as_deref().unwrap_or("-"),
            tick.next.as_deref().unwrap_or("-")
        );
    }
    for note in &report.notifications {
        println!("! {note}");
    }
    println!(
        "layers: {} created, {} released; {} promotions, {} stale prefetches",
        report.layers_created, report.layers_released, report.promotions, report.prefetch_discarded
    );
}
