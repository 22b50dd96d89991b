//! Simulation settings with persistence
//!
//! Settings are saved to `~/.config/nestguard/settings.toml`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use nestguard_game::{NpcConfig, NpcTuning, SensorConfig, WanderConfig};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// All simulation settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    pub simulation: SimulationSettings,
    pub npc: NpcTuning,
    pub wander: WanderConfig,
    pub sensors: SensorConfig,
}

impl SimSettings {
    fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("nestguard"))
    }

    fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.toml"))
    }

    /// Load settings from the config directory, or return defaults if not found
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("Could not determine config directory");
            return Self::default();
        };

        if !path.exists() {
            info!("No settings file found, using defaults");
            return Self::default();
        }

        match Self::load_from(&path) {
            Ok(settings) => {
                info!("Loaded settings from {:?}", path);
                settings
            }
            Err(e) => {
                warn!("{:#}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Load settings from an explicit file
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))
    }

    /// Save settings to the config directory
    pub fn save(&self) -> anyhow::Result<()> {
        let Some(dir) = Self::config_dir() else {
            anyhow::bail!("Could not determine config directory");
        };
        self.save_to(&dir.join("settings.toml"))
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(dir) = path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }

    pub fn npc_config(&self) -> NpcConfig {
        NpcConfig {
            tuning: self.npc,
            wander: self.wander,
            sensors: self.sensors,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.simulation
            .validate()
            .context("Invalid simulation settings")?;
        self.npc_config()
            .validate()
            .context("Invalid NPC settings")?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Simulation ticks per second
    pub tick_rate: f32,
    /// Number of ticks to run before exiting
    pub ticks: u64,
    /// Seed for every NPC's random number generator
    pub seed: u64,
    pub level: PathBuf,
    /// Walking speed of the scripted player, in units per second
    pub player_speed: f32,
    /// How close the player must get to a nest to take its key
    pub pickup_reach: f32,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            tick_rate: 60.0,
            ticks: 3600,
            seed: 7,
            level: PathBuf::from("levels/keep.toml"),
            player_speed: 18.0,
            pickup_reach: 3.0,
        }
    }
}

impl SimulationSettings {
    pub fn delta(&self) -> f32 {
        1.0 / self.tick_rate
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, value) in [
            ("tick_rate", self.tick_rate),
            ("player_speed", self.player_speed),
            ("pickup_reach", self.pickup_reach),
        ] {
            anyhow::ensure!(
                value.is_finite() && value > 0.0,
                "{name} must be positive and finite, got {value}"
            );
        }
        Ok(())
    }
}
