//! Enemy stats and AI tuning constants.

/// Distance under which a seeker switches from wandering to seeking (units)
pub const AI_AGGRO_RADIUS: f32 = 5.0;
/// Force applied along the movement direction every frame
pub const AI_MOVE_FORCE: f32 = 20.0;
/// Lower bound of the randomized wander re-roll threshold (ms)
pub const AI_WALK_THRESHOLD_MIN_MS: u32 = 100;
/// Upper bound of the randomized wander re-roll threshold (ms)
pub const AI_WALK_THRESHOLD_MAX_MS: u32 = 3000;

// SLIME
/// Slime health
pub const SLIME_HEALTH: i32 = 4;
/// Slime contact damage
pub const SLIME_DAMAGE: i32 = 1;
/// Slime collider radius
pub const SLIME_RADIUS: f32 = 0.35;
/// Slime move force (sluggish)
pub const SLIME_MOVE_FORCE: f32 = 12.0;

// BAT
/// Bat health (fragile)
pub const BAT_HEALTH: i32 = 2;
/// Bat contact damage
pub const BAT_DAMAGE: i32 = 1;
/// Bat collider radius
pub const BAT_RADIUS: f32 = 0.25;
/// Bat move force (fast)
pub const BAT_MOVE_FORCE: f32 = 28.0;
/// Bat aggro radius (keen hearing)
pub const BAT_AGGRO_RADIUS: f32 = 7.0;

// SKELETON
/// Skeleton health
pub const SKELETON_HEALTH: i32 = 6;
/// Skeleton contact damage
pub const SKELETON_DAMAGE: i32 = 2;
/// Skeleton collider radius
pub const SKELETON_RADIUS: f32 = 0.38;

// SKELETON ARCHER
/// Skeleton archer health
pub const SKELETON_ARCHER_HEALTH: i32 = 5;
/// Skeleton archer contact damage (weak, prefers ranged)
pub const SKELETON_ARCHER_DAMAGE: i32 = 1;
/// Skeleton archer move force (keeps a slow approach while shooting)
pub const SKELETON_ARCHER_MOVE_FORCE: f32 = 8.0;
