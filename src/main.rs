//! Nestguard - headless key-guarding simulation
//!
//! Loads settings and a level, then runs guards against a scripted player
//! for a fixed number of ticks, logging every state change.
//!
//! Usage: `nestguard [settings.toml]`, or `nestguard --save-settings` to write
//! the current settings to the config directory

mod player;
mod settings;
mod sim;

use std::ffi::OsStr;
use std::path::Path;

use anyhow::{Context, Result};
use nestguard_game::Level;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use settings::SimSettings;
use sim::Simulation;

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")?;

    info!("Starting Nestguard simulation...");

    let arg = std::env::args_os().nth(1);
    if arg.as_deref() == Some(OsStr::new("--save-settings")) {
        return SimSettings::load().save();
    }
    let settings = match arg {
        Some(path) => SimSettings::load_from(Path::new(&path))?,
        None => SimSettings::load(),
    };
    settings.validate()?;

    let level_path = &settings.simulation.level;
    let level = Level::load(level_path)
        .with_context(|| format!("Failed to load level {}", level_path.display()))?;

    let mut sim = Simulation::new(level, &settings);
    let report_every = (settings.simulation.tick_rate.round() as u64).max(1);

    let mut route_done = false;

    for _ in 0..settings.simulation.ticks {
        sim.tick();
        if sim.tick_count() % report_every == 0 {
            sim.log_summary();
        }
        if !route_done && sim.player_finished() {
            route_done = true;
            info!(tick = sim.tick_count(), "Player finished route");
        }
    }

    let keys = sim.keys();
    let resting = keys.ids().filter(|&k| keys.is_resting(k)).count();
    info!(
        ticks = sim.tick_count(),
        elapsed = sim.elapsed(),
        resting,
        total_keys = keys.len(),
        "Simulation finished"
    );
    Ok(())
}
