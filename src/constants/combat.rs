//! Combat system constants.

/// Knockback impulse a projectile applies along its travel direction
pub const PROJECTILE_KNOCKBACK_IMPULSE: f32 = 2.5;
/// Spawn offset of a projectile from the shooter's centre (units)
pub const PROJECTILE_MUZZLE_OFFSET: f32 = 0.45;
