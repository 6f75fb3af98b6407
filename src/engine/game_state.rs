//! Run state - the current level plus what carries between floors.

use tracing::info;

use crate::config::SimConfig;
use crate::content::Content;
use crate::error::ContentError;
use crate::systems::movement::PlayerIntent;

use super::floor_transition::PlayerCarryOver;
use super::initialization::build_level;
use super::level::Level;
use super::simulation::FrameReport;

/// Owns the run: configuration, validated content and the active level.
pub struct GameState {
    pub config: SimConfig,
    pub content: Content,
    /// Zero-based floor number
    pub floor: u32,
    pub run_seed: u64,
    pub level: Level,
}

impl GameState {
    /// Start a run on floor 0 with the configured starting kit.
    pub fn new(config: SimConfig, content: Content) -> Result<Self, ContentError> {
        let run_seed = config.cavern.seed;
        let carry = PlayerCarryOver::fresh(&config.player, &content)?;
        let level = build_level(&config, &content, 0, derive_seed(run_seed, 0), carry)?;
        Ok(Self {
            config,
            content,
            floor: 0,
            run_seed,
            level,
        })
    }

    /// Advance the active level one frame.
    pub fn update(&mut self, intent: PlayerIntent, dt_ms: f32) -> FrameReport {
        self.level.update(&self.content, intent, dt_ms)
    }

    /// Replace the level with the next floor, carrying the player over.
    /// A level whose player cannot be read restarts the kit from config.
    pub fn advance_floor(&mut self) -> Result<(), ContentError> {
        let carry = match PlayerCarryOver::extract(&mut self.level) {
            Some(carry) => carry,
            None => PlayerCarryOver::fresh(&self.config.player, &self.content)?,
        };
        let floor = self.floor + 1;
        let seed = derive_seed(self.run_seed, floor);
        self.level = build_level(&self.config, &self.content, floor, seed, carry)?;
        self.floor = floor;
        info!(floor, theme = %self.level.theme, "advanced to next floor");
        Ok(())
    }
}

/// Per-floor level seed. Distinct floors of one run get unrelated seeds, and
/// the same run seed always reproduces the same sequence.
pub fn derive_seed(run_seed: u64, floor: u32) -> u64 {
    run_seed ^ (u64::from(floor) + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}
