//! Game systems organized by domain.
//!
//! This module contains the gameplay rules, split into focused submodules:
//! - `ai`: Enemy decision-making and behavior
//! - `combat`: The armour-then-health law and enemy damage
//! - `items`: Loot rolls and pickup collection
//! - `movement`: Player intent, steering and firing
//! - `rendering`: Draw list and HUD collection

pub mod ai;
pub mod combat;
pub mod items;
pub mod movement;
pub mod rendering;

// Re-export commonly used items
pub use combat::{absorb_damage, ArmourOutcome};
pub use items::roll_drops;
pub use movement::PlayerIntent;
pub use rendering::{DrawItem, DrawLayer, HudSnapshot};
