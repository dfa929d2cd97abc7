#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless survivor session.

mod config;

use std::{
    io::{self, Write},
    path::PathBuf,
    time::Duration,
};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use serde::Serialize;
use survivor_core::{Event, SessionConfig, Vector2};
use survivor_simulation::Simulation;
use survivor_world::query;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Seconds the scripted player keeps one heading before turning.
const TURN_PERIOD_SECS: f32 = 4.0;

/// Command-line arguments accepted by the survivor session runner.
#[derive(Debug, Parser)]
#[command(name = "survivor", about = "Runs a scripted headless survivor session")]
struct CliArgs {
    /// Path to the TOML session description.
    #[arg(long, default_value = "configs/default.toml")]
    config: PathBuf,
    /// Simulated seconds to run before stopping.
    #[arg(long, default_value_t = 60)]
    seconds: u64,
    /// Simulated frame length in milliseconds.
    #[arg(long, default_value_t = 16, value_parser = clap::value_parser!(u64).range(1..))]
    frame_ms: u64,
    /// Overrides the spawner seed from the session file.
    #[arg(long)]
    seed: Option<u64>,
    /// Prints events as JSON lines instead of text.
    #[arg(long)]
    json: bool,
    /// Log filter used when `RUST_LOG` is not set.
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Entry point for the survivor command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_tracing(&args.log_level)?;

    let mut config = config::load(&args.config)?;
    if let Some(seed) = args.seed {
        config.rng_seed = seed;
    }

    let script = Script {
        duration: Duration::from_secs(args.seconds),
        frame: Duration::from_millis(args.frame_ms),
        json: args.json,
    };
    let stdout = io::stdout();
    let summary = run(config, &script, &mut stdout.lock())?;
    info!(
        survived = ?summary.survived,
        level = summary.level,
        enemies_destroyed = summary.enemies_destroyed,
        "session finished"
    );
    Ok(())
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .with_context(|| format!("invalid log filter `{level}`"))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|error| anyhow!("failed to install tracing subscriber: {error}"))
}

#[derive(Clone, Copy, Debug)]
struct Script {
    duration: Duration,
    frame: Duration,
    json: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
struct Summary {
    survived: Duration,
    alive: bool,
    level: u32,
    enemies_destroyed: u32,
    damage_dealt: f32,
    upgrades: u32,
}

#[derive(Serialize)]
struct EventLine<'a> {
    at_ms: u64,
    event: &'a Event,
}

#[derive(Serialize)]
struct SummaryLine<'a> {
    summary: &'a Summary,
}

/// Runs a scripted session, writing every drained event to `out`.
///
/// The scripted player circles the arena and always takes the offered upgrade.
fn run(config: SessionConfig, script: &Script, out: &mut impl Write) -> Result<Summary> {
    let mut simulation = Simulation::new(config).context("session configuration is invalid")?;
    let mut summary = Summary {
        survived: Duration::ZERO,
        alive: true,
        level: 0,
        enemies_destroyed: 0,
        damage_dealt: 0.0,
        upgrades: 0,
    };

    let mut clock = Duration::ZERO;
    while clock < script.duration && !query::is_game_over(simulation.world()) {
        simulation.set_movement_intent(heading_at(clock));
        simulation.advance(script.frame);
        clock = clock.saturating_add(script.frame);

        if let Some(offer) = query::upgrade_offer(simulation.world()) {
            info!(weapon = %offer.name, description = %offer.description, "taking upgrade");
            simulation.choose_upgrade(offer.weapon);
        }

        let at_ms = u64::try_from(clock.as_millis()).unwrap_or(u64::MAX);
        for event in simulation.drain_events() {
            tally(&mut summary, &event);
            write_event(out, at_ms, &event, script.json)?;
        }
    }

    let player = query::player(simulation.world());
    summary.survived = simulation.elapsed();
    summary.alive = player.alive;
    summary.level = player.level;

    if script.json {
        serde_json::to_writer(&mut *out, &SummaryLine { summary: &summary })
            .context("failed to encode session summary")?;
        writeln!(out).context("failed to write session summary")?;
    } else {
        writeln!(out, "{summary:?}").context("failed to write session summary")?;
    }
    Ok(summary)
}

fn heading_at(clock: Duration) -> Vector2 {
    let turns = clock.as_secs_f32() / TURN_PERIOD_SECS;
    let angle = turns * std::f32::consts::FRAC_PI_2;
    Vector2::new(angle.cos(), angle.sin())
}

fn tally(summary: &mut Summary, event: &Event) {
    match event {
        Event::EnemyDestroyed { .. } => summary.enemies_destroyed += 1,
        Event::DamageDealt { amount, .. } => summary.damage_dealt += amount,
        Event::UpgradeApplied { .. } => summary.upgrades += 1,
        _ => {}
    }
}

fn write_event(out: &mut impl Write, at_ms: u64, event: &Event, json: bool) -> Result<()> {
    if json {
        serde_json::to_writer(&mut *out, &EventLine { at_ms, event })
            .context("failed to encode event")?;
        writeln!(out).context("failed to write event")?;
    } else {
        writeln!(out, "[{at_ms:>7} ms] {event:?}").context("failed to write event")?;
    }
    Ok(())
}
