//! The level container.
//!
//! A [`Level`] is the composition root for one floor: it owns the physics
//! world, the static tiles and the ordered entity list, and it is the only
//! thing that steps physics. Entities enter through [`Level::add`] and leave
//! only through the sweep, which disposes their body before despawning them.

use glam::Vec2;
use hecs::{Entity, World};
use rand::rngs::StdRng;
use tracing::debug;

use crate::components::{Body, EntityKind, Lifecycle, PickupKind};
use crate::events::{EventQueue, GameEvent};
use crate::grid::Grid;
use crate::physics::PhysicsWorld;
use crate::queries;
use crate::systems::rendering::{self, DrawItem, HudSnapshot};
use crate::tile::Tile;
use crate::weapon::{Loadout, ProjectileIds, Weapon};

/// Loot waiting to be spawned once the current step's callbacks are done.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingDrop {
    pub kind: PickupKind,
    pub position: Vec2,
}

pub struct Level {
    pub floor: u32,
    pub theme: String,
    pub(crate) grid: Grid,
    pub(crate) tiles: Vec<Tile>,
    pub(crate) physics: PhysicsWorld,
    pub(crate) world: World,
    /// Update and draw order
    pub(crate) entities: Vec<Entity>,
    pub(crate) player: Entity,
    pub(crate) exit: Option<Entity>,
    pub(crate) rng: StdRng,
    pub(crate) projectile_ids: ProjectileIds,
    pub(crate) events: EventQueue,
    pub(crate) pending_drops: Vec<PendingDrop>,
    pub(crate) completed: bool,
    pub(crate) display_scale: f32,
    pub(crate) move_force: f32,
    pub(crate) frame: u64,
}

impl Level {
    /// Append an entity created by one of the spawn factories.
    pub fn add(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    /// Mark an entity for the next sweep. Returns false if it was already
    /// marked or is gone.
    pub fn remove(&mut self, entity: Entity) -> bool {
        match self.world.get::<&mut Lifecycle>(entity) {
            Ok(mut lifecycle) => lifecycle.mark_removed(),
            Err(_) => false,
        }
    }

    /// Dispose and unlink every entity marked removed. The player is never
    /// swept; a dead player stays in the level.
    pub fn sweep(&mut self) -> usize {
        puffin::profile_function!();

        let world = &mut self.world;
        let physics = &mut self.physics;
        let player = self.player;
        let before = self.entities.len();
        self.entities.retain(|&entity| {
            if entity == player || !queries::is_removed(world, entity) {
                return true;
            }
            if let Ok(mut weapon) = world.get::<&mut Weapon>(entity) {
                weapon.dispose(physics);
            }
            if let Ok(body) = world.get::<&Body>(entity) {
                physics.remove_body(body.handle);
            }
            if world.despawn(entity).is_err() {
                debug!(?entity, "swept entity was already despawned");
            }
            false
        });
        before - self.entities.len()
    }

    pub fn player(&self) -> Entity {
        self.player
    }

    pub fn player_position(&self) -> Option<Vec2> {
        queries::body_position(&self.world, &self.physics, self.player)
    }

    pub fn is_player_alive(&self) -> bool {
        queries::is_player_alive(&self.world, self.player)
    }

    pub fn exit_position(&self) -> Option<Vec2> {
        self.exit
            .and_then(|exit| queries::body_position(&self.world, &self.physics, exit))
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn count_kind(&self, kind: EntityKind) -> usize {
        self.entities
            .iter()
            .filter(|&&e| self.world.get::<&EntityKind>(e).map_or(false, |k| *k == kind))
            .count()
    }

    /// Position of the closest live enemy within `radius` of `from`.
    pub fn nearest_enemy(&self, from: Vec2, radius: f32) -> Option<Vec2> {
        self.positions_of(EntityKind::Enemy)
            .filter(|p| p.distance(from) <= radius)
            .min_by(|a, b| a.distance(from).total_cmp(&b.distance(from)))
    }

    /// Position of the closest pickup within `radius` of `from`.
    pub fn nearest_pickup(&self, from: Vec2, radius: f32) -> Option<Vec2> {
        self.positions_of(EntityKind::Pickup)
            .filter(|p| p.distance(from) <= radius)
            .min_by(|a, b| a.distance(from).total_cmp(&b.distance(from)))
    }

    fn positions_of(&self, kind: EntityKind) -> impl Iterator<Item = Vec2> + '_ {
        self.entities.iter().filter_map(move |&entity| {
            let matches = self
                .world
                .get::<&EntityKind>(entity)
                .map_or(false, |k| *k == kind);
            if !matches || queries::is_removed(&self.world, entity) {
                return None;
            }
            queries::body_position(&self.world, &self.physics, entity)
        })
    }

    /// Events pushed since the last drain.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain().collect()
    }

    /// Everything visible this frame, sorted for drawing.
    pub fn draw(&self) -> Vec<DrawItem> {
        puffin::profile_function!();

        let scale = self.display_scale;
        let mut items = Vec::with_capacity(self.tiles.len() + self.entities.len());
        rendering::collect_tiles(&self.tiles, scale, &mut items);
        rendering::collect_entities(&self.world, &self.physics, &self.entities, scale, &mut items);
        for &entity in &self.entities {
            if let Ok(loadout) = self.world.get::<&Loadout>(entity) {
                for weapon in loadout.weapons() {
                    rendering::collect_projectiles(weapon, &self.physics, scale, &mut items);
                }
            }
            if let Ok(weapon) = self.world.get::<&Weapon>(entity) {
                rendering::collect_projectiles(&weapon, &self.physics, scale, &mut items);
            }
        }
        rendering::sort_draw_items(&mut items);
        items
    }

    pub fn hud(&self) -> Option<HudSnapshot> {
        HudSnapshot::collect(&self.world, self.player, self.floor)
    }

    /// Total live projectiles across every weapon in the level.
    pub fn projectile_count(&self) -> usize {
        let mut count = 0;
        for &entity in &self.entities {
            if let Ok(loadout) = self.world.get::<&Loadout>(entity) {
                count += loadout.weapons().map(|w| w.projectiles().len()).sum::<usize>();
            }
            if let Ok(weapon) = self.world.get::<&Weapon>(entity) {
                count += weapon.projectiles().len();
            }
        }
        count
    }
}
