//! Core gameplay constants (player stats, loadout).

/// Player's starting and maximum health
pub const PLAYER_STARTING_HEALTH: i32 = 10;
/// Player's starting and maximum armour
pub const PLAYER_STARTING_ARMOUR: i32 = 5;
/// Force applied to the player body at full stick deflection
pub const PLAYER_MOVE_FORCE: f32 = 30.0;
/// Weapon the player starts every run with
pub const PLAYER_STARTING_WEAPON: &str = "pistol";
/// Number of weapon slots in the player's loadout
pub const LOADOUT_SLOTS: usize = 3;

/// Distance at which the autopilot notices enemies and pickups
pub const AUTOPILOT_SIGHT: f32 = 7.0;
/// Time without meaningful movement before the autopilot gives up on its goal
pub const AUTOPILOT_STUCK_MS: f32 = 600.0;
/// How long the autopilot wanders after getting stuck
pub const AUTOPILOT_WANDER_MS: f32 = 1200.0;
/// Movement per frame below which the autopilot counts as stuck
pub const AUTOPILOT_STUCK_DISTANCE: f32 = 0.01;
