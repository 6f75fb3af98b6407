//! Simulation configuration.
//!
//! Every section falls back to the defaults in [`crate::constants`], so a
//! config file only needs the keys it changes. The runner layers environment
//! overrides on top:
//!
//! - `CAVERN_SEED` - level RNG seed
//! - `CAVERN_WIDTH` / `CAVERN_HEIGHT` - grid size in cells
//! - `CAVERN_WALL_PERCENT` - initial wall probability, 0..=1
//! - `CAVERN_SMOOTHING` - smoothing passes
//! - `CAVERN_FRAMES` - frames the headless runner simulates

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::dungeon_gen::CavernParams;
use crate::error::ConfigError;
use crate::input::Keybinds;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CavernConfig {
    pub seed: u64,
    #[serde(flatten)]
    pub params: CavernParams,
}

impl Default for CavernConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            params: CavernParams::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Largest step per frame, seconds
    pub max_step: f32,
    /// Scale from simulation units to screen units
    pub display_units_per_meter: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            max_step: PHYSICS_MAX_STEP,
            display_units_per_meter: DISPLAY_UNITS_PER_METER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawningConfig {
    pub player_region: usize,
    pub chest_region: usize,
    pub cluster_region: usize,
    pub exit_region: usize,
    /// Minimum distance between the player and any cluster or chest
    pub safe_radius: f32,
    pub placement_attempts: u32,
}

impl Default for SpawningConfig {
    fn default() -> Self {
        Self {
            player_region: PLAYER_SPAWN_REGION,
            chest_region: CHEST_SPAWN_REGION,
            cluster_region: CLUSTER_SPAWN_REGION,
            exit_region: EXIT_SPAWN_REGION,
            safe_radius: SPAWN_SAFE_RADIUS,
            placement_attempts: SPAWN_PLACEMENT_ATTEMPTS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub health: i32,
    pub armour: i32,
    pub move_force: f32,
    pub starting_weapon: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            health: PLAYER_STARTING_HEALTH,
            armour: PLAYER_STARTING_ARMOUR,
            move_force: PLAYER_MOVE_FORCE,
            starting_weapon: PLAYER_STARTING_WEAPON.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Frames simulated by the headless runner
    pub frames: u32,
    /// Fixed frame time fed to each update, milliseconds
    pub frame_ms: f32,
    /// Log a HUD snapshot every this many frames
    pub hud_interval: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            frames: 3600,
            frame_ms: 1000.0 / 60.0,
            hud_interval: 300,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub cavern: CavernConfig,
    pub physics: PhysicsConfig,
    pub spawning: SpawningConfig,
    pub player: PlayerConfig,
    pub run: RunConfig,
    pub keybinds: Keybinds,
}

impl SimConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults with process environment overrides applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env(|key| env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from any variable source. Unset variables leave the
    /// field alone; unparseable ones are an error.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(seed) = read_var::<u64>(&lookup, "CAVERN_SEED", "u64")? {
            self.cavern.seed = seed;
        }
        if let Some(width) = read_var::<usize>(&lookup, "CAVERN_WIDTH", "cell count")? {
            self.cavern.params.width = width;
        }
        if let Some(height) = read_var::<usize>(&lookup, "CAVERN_HEIGHT", "cell count")? {
            self.cavern.params.height = height;
        }
        if let Some(percent) = read_var::<f32>(&lookup, "CAVERN_WALL_PERCENT", "probability")? {
            self.cavern.params.wall_percent = percent;
        }
        if let Some(passes) = read_var::<u32>(&lookup, "CAVERN_SMOOTHING", "pass count")? {
            self.cavern.params.smoothing_iterations = passes;
        }
        if let Some(frames) = read_var::<u32>(&lookup, "CAVERN_FRAMES", "frame count")? {
            self.run.frames = frames;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let params = &self.cavern.params;
        if params.width < 3 || params.height < 3 {
            return Err(ConfigError::Invalid(format!(
                "cavern must be at least 3x3, got {}x{}",
                params.width, params.height
            )));
        }
        if !(0.0..=1.0).contains(&params.wall_percent) {
            return Err(ConfigError::Invalid(format!(
                "wall_percent {} is outside 0..=1",
                params.wall_percent
            )));
        }
        if self.physics.max_step <= 0.0 {
            return Err(ConfigError::Invalid("physics.max_step must be positive".into()));
        }
        if self.player.health <= 0 {
            return Err(ConfigError::Invalid("player.health must be positive".into()));
        }
        Ok(())
    }
}

fn read_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    expected: &'static str,
) -> Result<Option<T>, ConfigError> {
    let Some(value) = lookup(name) else {
        return Ok(None);
    };
    value
        .trim()
        .parse()
        .map(Some)
        .map_err(|_| ConfigError::BadEnv {
            name,
            value,
            expected,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_empty_json_is_default() {
        let config = SimConfig::from_json("{}").expect("config");
        assert_eq!(config, SimConfig::default());
        assert_eq!(config.cavern.params.smoothing_iterations, CAVERN_SMOOTHING_ITERATIONS);
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config = SimConfig::from_json(
            r#"{ "cavern": { "seed": 9, "width": 30 }, "player": { "armour": 0 } }"#,
        )
        .expect("config");
        assert_eq!(config.cavern.seed, 9);
        assert_eq!(config.cavern.params.width, 30);
        assert_eq!(config.cavern.params.height, CAVERN_DEFAULT_HEIGHT);
        assert_eq!(config.player.armour, 0);
        assert_eq!(config.player.starting_weapon, PLAYER_STARTING_WEAPON);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = SimConfig::default();
        config
            .apply_env(vars(&[
                ("CAVERN_SEED", "42"),
                ("CAVERN_WIDTH", "20"),
                ("CAVERN_WALL_PERCENT", "0.5"),
                ("CAVERN_FRAMES", "10"),
            ]))
            .expect("overrides");
        assert_eq!(config.cavern.seed, 42);
        assert_eq!(config.cavern.params.width, 20);
        assert_eq!(config.cavern.params.wall_percent, 0.5);
        assert_eq!(config.run.frames, 10);
        assert_eq!(config.cavern.params.height, CAVERN_DEFAULT_HEIGHT);
    }

    #[test]
    fn test_bad_env_value_names_variable() {
        let mut config = SimConfig::default();
        let err = config
            .apply_env(vars(&[("CAVERN_SMOOTHING", "lots")]))
            .expect_err("should fail");
        assert!(matches!(err, ConfigError::BadEnv { name: "CAVERN_SMOOTHING", .. }));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(SimConfig::from_json(r#"{ "cavern": { "width": 2 } }"#).is_err());
        assert!(SimConfig::from_json(r#"{ "cavern": { "wall_percent": 1.5 } }"#).is_err());
        assert!(SimConfig::from_json(r#"{ "physics": { "max_step": 0.0 } }"#).is_err());
    }
}
