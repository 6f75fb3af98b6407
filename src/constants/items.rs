//! Pickup constants.

/// Health restored by a heart pickup
pub const HEART_HEAL: i32 = 2;
/// Armour restored by a shield pickup
pub const SHIELD_ARMOUR: i32 = 2;
/// Maximum jitter applied to dropped pickups on each axis (units)
pub const DROP_JITTER: f32 = 0.4;
/// Pickups inside this radius drift toward a living player (units)
pub const PICKUP_MAGNET_RADIUS: f32 = 2.5;
/// Force pulling a pickup toward the player inside the magnet radius
pub const PICKUP_MAGNET_FORCE: f32 = 1.2;
