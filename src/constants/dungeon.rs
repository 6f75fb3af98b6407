//! Cavern generation and placement constants.

/// Default cavern width in cells
pub const CAVERN_DEFAULT_WIDTH: usize = 64;
/// Default cavern height in cells
pub const CAVERN_DEFAULT_HEIGHT: usize = 48;
/// Probability that a non-border cell starts as wall
pub const CAVERN_WALL_PERCENT: f32 = 0.45;
/// Number of smoothing passes applied after seeding
pub const CAVERN_SMOOTHING_ITERATIONS: u32 = 10;

/// A wall cell with at least this many wall neighbours stays wall
pub const WALL_SURVIVE_NEIGHBOURS: u8 = 4;
/// A wall cell with fewer than this many wall neighbours crumbles to floor
pub const WALL_CRUMBLE_NEIGHBOURS: u8 = 2;
/// A floor cell with at least this many wall neighbours fills in
pub const FLOOR_FILL_NEIGHBOURS: u8 = 5;

/// Side of the open square the player spawns in
pub const PLAYER_SPAWN_REGION: usize = 3;
/// Side of the open square a chest is placed in
pub const CHEST_SPAWN_REGION: usize = 2;
/// Side of the open square an enemy cluster is placed in
pub const CLUSTER_SPAWN_REGION: usize = 4;
/// Side of the open square the exit portal is placed in
pub const EXIT_SPAWN_REGION: usize = 3;
/// Enemy clusters and chests are not placed closer than this to the player (units)
pub const SPAWN_SAFE_RADIUS: f32 = 8.0;
/// Placement attempts before accepting whatever region was found last
pub const SPAWN_PLACEMENT_ATTEMPTS: u32 = 16;
