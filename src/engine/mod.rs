//! Game engine - owns the level and provides a clean API to the runner.
//!
//! The engine handles:
//! - Level construction from generated caverns and validated content
//! - The fixed per-frame update order and collision reactions
//! - Floor transitions and the player state that survives them
//!
//! The runner (main.rs) only handles configuration, feeding intents in and
//! logging what comes out.

pub mod floor_transition;
mod game_state;
pub mod initialization;
mod level;
mod simulation;

pub use floor_transition::PlayerCarryOver;
pub use game_state::{derive_seed, GameState};
pub use initialization::build_level;
pub use level::{Level, PendingDrop};
pub use simulation::FrameReport;
