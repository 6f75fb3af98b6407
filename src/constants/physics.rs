//! Physics world constants (simulation units are tiles).

/// Largest time step the physics world advances in one frame (seconds)
pub const PHYSICS_MAX_STEP: f32 = 1.0 / 30.0;
/// Display units (pixels) per simulation unit
pub const DISPLAY_UNITS_PER_METER: f32 = 32.0;

/// Linear damping applied to walking actors (top-down friction)
pub const ACTOR_LINEAR_DAMPING: f32 = 10.0;
/// Linear damping applied to loose pickups
pub const PICKUP_LINEAR_DAMPING: f32 = 6.0;
/// Collider density for actors
pub const ACTOR_DENSITY: f32 = 1.0;
/// Extra mass given to sensor-only bodies so impulses stay finite
pub const SENSOR_BODY_MASS: f32 = 0.05;

/// Player collider radius
pub const PLAYER_RADIUS: f32 = 0.35;
/// Projectile collider radius
pub const PROJECTILE_RADIUS: f32 = 0.12;
/// Pickup collider radius
pub const PICKUP_RADIUS: f32 = 0.25;
/// Chest half extent
pub const CHEST_HALF_EXTENT: f32 = 0.4;
/// Exit portal radius
pub const EXIT_RADIUS: f32 = 0.5;
