//! Simulation constants organized by domain.
//!
//! Centralizing magic numbers makes tuning easier and documents intent.
//! Constants are split into submodules by domain for easier navigation.
//! Most of these are the defaults behind `SimConfig`.

mod animation;
mod combat;
mod dungeon;
mod enemies;
mod gameplay;
mod items;
mod physics;

pub use animation::*;
pub use combat::*;
pub use dungeon::*;
pub use enemies::*;
pub use gameplay::*;
pub use items::*;
pub use physics::*;
