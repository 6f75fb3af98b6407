//! Render data collection.
//!
//! The simulation draws nothing itself. Each frame it hands presentation a
//! list of [`DrawItem`]s, already ordered, plus a [`HudSnapshot`].

use glam::Vec2;
use hecs::{Entity, World};

use crate::components::{Armour, Blink, Body, Gems, Health, Lifecycle, PlayerState, Sprite};
use crate::physics::PhysicsWorld;
use crate::resources::TextureId;
use crate::tile::Tile;
use crate::weapon::{Loadout, Weapon};

/// Coarse draw layer; depth only orders items within a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DrawLayer {
    Tiles,
    Actors,
}

/// One renderable
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawItem {
    pub texture: TextureId,
    /// Simulation units
    pub world: Vec2,
    /// `world` scaled to display units
    pub screen: Vec2,
    pub layer: DrawLayer,
    /// World Y; larger is drawn later
    pub depth: f32,
    /// Draw with the hit-flash effect this frame
    pub flash: bool,
}

impl DrawItem {
    pub fn new(texture: TextureId, world: Vec2, layer: DrawLayer, scale: f32) -> Self {
        Self {
            texture,
            world,
            screen: world * scale,
            layer,
            depth: world.y,
            flash: false,
        }
    }
}

/// Order by layer, then depth. The sort is stable, so equal keys keep their
/// collection order.
pub fn sort_draw_items(items: &mut [DrawItem]) {
    items.sort_by(|a, b| a.layer.cmp(&b.layer).then(a.depth.total_cmp(&b.depth)));
}

pub fn collect_tiles(tiles: &[Tile], scale: f32, out: &mut Vec<DrawItem>) {
    out.extend(
        tiles
            .iter()
            .map(|tile| DrawItem::new(tile.texture, tile.center(), DrawLayer::Tiles, scale)),
    );
}

/// Entities in list order, skipping any already marked removed.
pub fn collect_entities(
    world: &World,
    physics: &PhysicsWorld,
    entities: &[Entity],
    scale: f32,
    out: &mut Vec<DrawItem>,
) {
    for &entity in entities {
        let Ok(mut query) = world.query_one::<(&Body, &Sprite, &Lifecycle, Option<&Blink>)>(entity) else {
            continue;
        };
        let Some((body, sprite, lifecycle, blink)) = query.get() else {
            continue;
        };
        if lifecycle.is_removed() {
            continue;
        }
        let Some(position) = physics.position(body.handle) else {
            continue;
        };
        let mut item = DrawItem::new(sprite.texture, position, DrawLayer::Actors, scale);
        item.flash = blink.map_or(false, Blink::is_flashing);
        out.push(item);
    }
}

/// Live projectiles of one weapon.
pub fn collect_projectiles(weapon: &Weapon, physics: &PhysicsWorld, scale: f32, out: &mut Vec<DrawItem>) {
    out.extend(
        weapon
            .projectiles()
            .iter()
            .filter(|projectile| !projectile.is_removed())
            .map(|projectile| {
                DrawItem::new(projectile.texture, projectile.position(physics), DrawLayer::Actors, scale)
            }),
    );
}

/// Read-only view for the HUD
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HudSnapshot {
    pub floor: u32,
    pub health: i32,
    pub max_health: i32,
    pub armour: i32,
    pub max_armour: i32,
    pub gems: Gems,
    pub keys: u32,
    pub weapon: Option<String>,
    /// `None` for unlimited
    pub ammo: Option<u32>,
    pub dead: bool,
}

impl HudSnapshot {
    pub fn collect(world: &World, player: Entity, floor: u32) -> Option<Self> {
        let mut query = world
            .query_one::<(&Health, &Armour, &PlayerState, &Loadout)>(player)
            .ok()?;
        let (health, armour, state, loadout) = query.get()?;
        let equipped = loadout.equipped();
        Some(Self {
            floor,
            health: health.current,
            max_health: health.max,
            armour: armour.current,
            max_armour: armour.max,
            gems: state.gems,
            keys: state.keys,
            weapon: equipped.map(|w| w.id.clone()),
            ammo: equipped.and_then(|w| w.ammo),
            dead: state.dead,
        })
    }
}
