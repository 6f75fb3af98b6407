//! Level construction - turns a generated cavern into a populated level.

use glam::Vec2;
use hecs::World;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::components::EntityKind;
use crate::config::{SimConfig, SpawningConfig};
use crate::content::{Content, ThemeDef};
use crate::dungeon_gen;
use crate::error::ContentError;
use crate::events::EventQueue;
use crate::grid::{cell_center, region_center, Grid};
use crate::physics::{BodyTag, PhysicsWorld};
use crate::spawning::{spawn_chest, spawn_exit, spawn_player, ChestSetup};
use crate::systems::items::roll_count;
use crate::tile::{self, EdgeType, Tile};
use crate::weapon::{ProjectileIds, Weapon};

use super::floor_transition::PlayerCarryOver;
use super::level::Level;

/// Generate and populate the level for `floor`.
pub fn build_level(
    config: &SimConfig,
    content: &Content,
    floor: u32,
    seed: u64,
    carry: PlayerCarryOver,
) -> Result<Level, ContentError> {
    puffin::profile_function!();

    let mut rng = StdRng::seed_from_u64(seed);
    let grid = dungeon_gen::generate(&config.cavern.params, &mut rng);
    let theme = content.theme_for_floor(floor);

    let mut level = Level::from_grid(grid, config, content, theme, floor, rng, carry);
    populate(&mut level, config, content, theme)?;

    info!(
        floor,
        seed,
        theme = %theme.name,
        enemies = level.count_kind(EntityKind::Enemy),
        chests = level.count_kind(EntityKind::Chest),
        "level built"
    );
    Ok(level)
}

impl Level {
    /// Terrain and player only. Enemies, chests and the exit are placed by
    /// [`build_level`]; tests use this directly on hand-made grids.
    pub fn from_grid(
        grid: Grid,
        config: &SimConfig,
        content: &Content,
        theme: &ThemeDef,
        floor: u32,
        mut rng: StdRng,
        carry: PlayerCarryOver,
    ) -> Self {
        let mut physics = PhysicsWorld::new(config.physics.max_step);
        let tiles = build_tiles(&grid, theme, &mut physics);

        let start = random_cell(&grid, &mut rng);
        let position = grid.spawn_point(config.spawning.player_region, start);
        let mut world = World::new();
        let player = spawn_player(
            &mut world,
            &mut physics,
            position,
            content.presentation.player,
            carry.into_setup(),
        );
        debug!(x = position.x, y = position.y, "player placed");

        Self {
            floor,
            theme: theme.name.clone(),
            grid,
            tiles,
            physics,
            world,
            entities: vec![player],
            player,
            exit: None,
            rng,
            projectile_ids: ProjectileIds::default(),
            events: EventQueue::new(),
            pending_drops: Vec::new(),
            completed: false,
            display_scale: config.physics.display_units_per_meter,
            move_force: config.player.move_force,
            frame: 0,
        }
    }
}

/// One tile per cell. Every wall cell also gets a fixture on the shared
/// terrain body.
fn build_tiles(grid: &Grid, theme: &ThemeDef, physics: &mut PhysicsWorld) -> Vec<Tile> {
    let mut tiles = Vec::with_capacity(grid.width * grid.height);
    for y in 0..grid.height as i32 {
        for x in 0..grid.width as i32 {
            let edge = tile::classify(grid, x, y);
            let texture = match edge {
                EdgeType::Floor => theme.floor_texture,
                EdgeType::FloorPocket => theme.pocket_texture,
                _ => theme.wall_texture,
            };
            if edge.needs_fixture() {
                physics.add_terrain_fixture(cell_center(x, y), Vec2::splat(0.5), BodyTag::Wall { x, y });
            }
            tiles.push(Tile::new(x, y, edge, texture));
        }
    }
    tiles
}

fn populate(
    level: &mut Level,
    config: &SimConfig,
    content: &Content,
    theme: &ThemeDef,
) -> Result<(), ContentError> {
    let spawning = &config.spawning;
    let player = level.player_position().unwrap_or_else(|| level.grid.center());
    let mut occupied = vec![player];

    let exit = place_exit(&level.grid, &mut level.rng, spawning, player);
    let entity = spawn_exit(&mut level.world, &mut level.physics, exit, content.presentation.exit);
    level.add(entity);
    level.exit = Some(entity);
    occupied.push(exit);

    for _ in 0..roll_count(theme.chests, &mut level.rng) {
        let Some(position) = find_position(level, spawning, spawning.chest_region, player, &occupied) else {
            debug!("no room for chest");
            continue;
        };
        let setup = ChestSetup {
            drops: theme.chest_drops,
            hearts: theme.chest_hearts,
            shields: theme.chest_shields,
            weapons: theme.chest_weapons.clone(),
            closed_texture: content.presentation.chest_closed,
            open_texture: content.presentation.chest_open,
        };
        let chest = spawn_chest(&mut level.world, &mut level.physics, position, setup);
        level.add(chest);
        occupied.push(position);
    }

    for _ in 0..roll_count(theme.clusters, &mut level.rng) {
        let Some(center) = find_position(level, spawning, spawning.cluster_region, player, &occupied) else {
            debug!("no room for enemy cluster");
            continue;
        };
        occupied.push(center);
        let size = roll_count(theme.cluster_size, &mut level.rng).max(1);
        let spread = (spawning.cluster_region as f32 / 2.0 - 0.5).max(0.0);
        for _ in 0..size {
            let Some(entry) = theme.pick_enemy(&mut level.rng) else {
                break;
            };
            let weapon = match entry.enemy.weapon {
                Some(id) => {
                    let def = content.weapon(id).ok_or_else(|| ContentError::UnknownWeapon {
                        owner: entry.enemy.key.to_string(),
                        id: id.to_string(),
                    })?;
                    Some(Weapon::new(def))
                }
                None => None,
            };
            let offset = Vec2::new(
                level.rng.gen_range(-spread..=spread),
                level.rng.gen_range(-spread..=spread),
            );
            let enemy = entry.enemy.spawn(
                &mut level.world,
                &mut level.physics,
                center + offset,
                entry.texture,
                weapon,
                &mut level.rng,
            );
            level.add(enemy);
        }
    }
    Ok(())
}

/// Farthest open region from the player over several tries. Falls back to
/// the grid's deterministic spawn point.
fn place_exit(grid: &Grid, rng: &mut StdRng, spawning: &SpawningConfig, player: Vec2) -> Vec2 {
    let size = spawning.exit_region;
    (0..spawning.placement_attempts.max(1))
        .filter_map(|_| grid.find_spawn_region(size, random_cell(grid, rng)))
        .map(|(x, y)| region_center(x, y, size))
        .max_by(|a, b| a.distance(player).total_cmp(&b.distance(player)))
        .unwrap_or_else(|| grid.spawn_point(size, (0, 0)))
}

/// Open region outside the player's safe radius and clear of everything
/// already placed, or `None` after the configured number of tries.
fn find_position(
    level: &mut Level,
    spawning: &SpawningConfig,
    size: usize,
    player: Vec2,
    occupied: &[Vec2],
) -> Option<Vec2> {
    for _ in 0..spawning.placement_attempts {
        let start = random_cell(&level.grid, &mut level.rng);
        let Some((x, y)) = level.grid.find_spawn_region(size, start) else {
            // No region of this size anywhere; more tries will not help
            return None;
        };
        let position = region_center(x, y, size);
        let clear = occupied.iter().all(|other| other.distance(position) >= size as f32);
        if position.distance(player) >= spawning.safe_radius && clear {
            return Some(position);
        }
    }
    None
}

fn random_cell(grid: &Grid, rng: &mut impl Rng) -> (i32, i32) {
    (
        rng.gen_range(0..grid.width.max(1)) as i32,
        rng.gen_range(0..grid.height.max(1)) as i32,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ResourceManifest;

    fn content() -> Content {
        let resources = ResourceManifest::builtin().expect("manifest");
        Content::builtin(&resources).expect("content")
    }

    fn build(seed: u64) -> Level {
        let config = SimConfig::default();
        let content = content();
        let carry = PlayerCarryOver::fresh(&config.player, &content).expect("kit");
        build_level(&config, &content, 0, seed, carry).expect("level")
    }

    #[test]
    fn test_level_has_player_exit_and_terrain() {
        let level = build(7);
        assert_eq!(level.count_kind(EntityKind::Player), 1);
        assert_eq!(level.count_kind(EntityKind::Exit), 1);
        assert_eq!(level.tiles().len(), level.grid().width * level.grid().height);
        assert_eq!(level.physics().terrain_fixture_count(), level.grid().wall_count());
        assert!(level.exit_position().is_some());
    }

    #[test]
    fn test_same_seed_same_layout() {
        let a = build(42);
        let b = build(42);
        assert_eq!(a.grid(), b.grid());
        assert_eq!(a.player_position(), b.player_position());
        assert_eq!(a.exit_position(), b.exit_position());
        assert_eq!(a.entities().len(), b.entities().len());
    }

    #[test]
    fn test_enemies_respect_safe_radius() {
        let config = SimConfig::default();
        let level = build(3);
        let player = level.player_position().expect("player");
        // Cluster centres are at least the safe radius away; members spread
        // by at most half the region around them
        let slack = config.spawning.cluster_region as f32;
        for &entity in level.entities() {
            let is_enemy = level
                .world()
                .get::<&EntityKind>(entity)
                .map_or(false, |k| *k == EntityKind::Enemy);
            if !is_enemy {
                continue;
            }
            let position = crate::queries::body_position(level.world(), level.physics(), entity).expect("position");
            assert!(position.distance(player) >= config.spawning.safe_radius - slack);
        }
    }

    #[test]
    fn test_all_wall_grid_falls_back_to_center() {
        let config = SimConfig::default();
        let content = content();
        let carry = PlayerCarryOver::fresh(&config.player, &content).expect("kit");
        let grid = Grid::filled(10, 8, true);
        let level = Level::from_grid(
            grid,
            &config,
            &content,
            content.theme_for_floor(0),
            0,
            StdRng::seed_from_u64(1),
            carry,
        );
        assert_eq!(level.player_position(), Some(Vec2::new(5.0, 4.0)));
        assert_eq!(level.physics().terrain_fixture_count(), 80);
    }
}
