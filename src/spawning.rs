//! Data-driven entity spawning.
//!
//! Enemy types live in an explicit registry keyed by the strings theme spawn
//! tables use. Content validation resolves every key up front, so spawning
//! never meets an unknown type. The `spawn_*` factories create an entity,
//! attach its body to the level's physics world and return the handle; the
//! caller adds it to the level's entity list.

use glam::Vec2;
use hecs::{Entity, EntityBuilder, World};
use rand::Rng;

use crate::components::{
    Armour, Blink, Body, Chest, DropRange, DropTable, Enemy, EntityKind, Exit, Health, Lifecycle,
    Pickup, PickupKind, PlayerState, Sprite,
};
use crate::constants::*;
use crate::physics::{BodySpec, BodyTag, CollisionFilter, PhysicsWorld, Shape};
use crate::resources::TextureId;
use crate::systems::ai::{AiController, Behavior};
use crate::weapon::{Loadout, Weapon};

/// Definition of an enemy type - all the data needed to spawn one
#[derive(Debug, Clone)]
pub struct EnemyDef {
    /// Registry key used by spawn tables
    pub key: &'static str,
    /// Texture name looked up at theme validation
    pub texture: &'static str,
    pub health: i32,
    /// Contact damage
    pub damage: i32,
    pub radius: f32,
    pub move_force: f32,
    pub aggro_radius: f32,
    pub behavior: Behavior,
    pub drops: DropTable,
    /// Weapon id for ranged variants
    pub weapon: Option<&'static str>,
}

impl EnemyDef {
    /// Spawn this enemy type at the given position
    pub fn spawn(
        &self,
        world: &mut World,
        physics: &mut PhysicsWorld,
        position: Vec2,
        texture: TextureId,
        weapon: Option<Weapon>,
        rng: &mut impl Rng,
    ) -> Entity {
        let entity = world.reserve_entity();
        let handle = physics.create_body(
            BodySpec::actor(
                position,
                Shape::Ball {
                    radius: self.radius,
                },
                CollisionFilter::creature(),
                BodyTag::Enemy(entity),
            )
            .damping(ACTOR_LINEAR_DAMPING),
        );
        let mut builder = EntityBuilder::new();
        builder.add_bundle((
            EntityKind::Enemy,
            Body { handle },
            Lifecycle::default(),
            Blink::default(),
            Sprite { texture },
            Health::new(self.health),
            Enemy {
                kind: self.key,
                damage: self.damage,
            },
            AiController::new(self.behavior, self.aggro_radius, self.move_force, rng),
            self.drops,
        ));
        if let Some(weapon) = weapon {
            builder.add(weapon);
        }
        world.spawn_at(entity, builder.build());
        entity
    }
}

/// Predefined enemy types
pub mod enemies {
    use super::*;

    pub static SLIME: EnemyDef = EnemyDef {
        key: "slime",
        texture: "slime",
        health: SLIME_HEALTH,
        damage: SLIME_DAMAGE,
        radius: SLIME_RADIUS,
        move_force: SLIME_MOVE_FORCE,
        aggro_radius: AI_AGGRO_RADIUS,
        behavior: Behavior::Wanderer,
        drops: DropTable {
            red_gems: DropRange::new(0, 2),
            green_gems: DropRange::NONE,
            blue_gems: DropRange::NONE,
            keys: DropRange::NONE,
        },
        weapon: None,
    };

    pub static BAT: EnemyDef = EnemyDef {
        key: "bat",
        texture: "bat",
        health: BAT_HEALTH,
        damage: BAT_DAMAGE,
        radius: BAT_RADIUS,
        move_force: BAT_MOVE_FORCE,
        aggro_radius: BAT_AGGRO_RADIUS,
        behavior: Behavior::Seeker,
        drops: DropTable {
            red_gems: DropRange::new(0, 1),
            green_gems: DropRange::new(0, 1),
            blue_gems: DropRange::NONE,
            keys: DropRange::NONE,
        },
        weapon: None,
    };

    pub static SKELETON: EnemyDef = EnemyDef {
        key: "skeleton",
        texture: "skeleton",
        health: SKELETON_HEALTH,
        damage: SKELETON_DAMAGE,
        radius: SKELETON_RADIUS,
        move_force: AI_MOVE_FORCE,
        aggro_radius: AI_AGGRO_RADIUS,
        behavior: Behavior::Seeker,
        drops: DropTable {
            red_gems: DropRange::new(1, 2),
            green_gems: DropRange::new(0, 1),
            blue_gems: DropRange::NONE,
            keys: DropRange::new(0, 1),
        },
        weapon: None,
    };

    pub static SKELETON_ARCHER: EnemyDef = EnemyDef {
        key: "skeleton_archer",
        texture: "skeleton_archer",
        health: SKELETON_ARCHER_HEALTH,
        damage: SKELETON_ARCHER_DAMAGE,
        radius: SKELETON_RADIUS,
        move_force: SKELETON_ARCHER_MOVE_FORCE,
        aggro_radius: AI_AGGRO_RADIUS,
        behavior: Behavior::Shooter,
        drops: DropTable {
            red_gems: DropRange::new(0, 1),
            green_gems: DropRange::new(0, 1),
            blue_gems: DropRange::new(0, 1),
            keys: DropRange::new(0, 1),
        },
        weapon: Some("bone_bow"),
    };
}

/// Every enemy type a spawn table may name.
pub static ENEMY_REGISTRY: [&EnemyDef; 4] = [
    &enemies::SLIME,
    &enemies::BAT,
    &enemies::SKELETON,
    &enemies::SKELETON_ARCHER,
];

/// Resolve a spawn-table key.
pub fn enemy_def(key: &str) -> Option<&'static EnemyDef> {
    ENEMY_REGISTRY.iter().copied().find(|def| def.key == key)
}

/// Starting stats for a player entity
#[derive(Debug, Clone)]
pub struct PlayerSetup {
    pub health: Health,
    pub armour: Armour,
    pub state: PlayerState,
    pub loadout: Loadout,
}

pub fn spawn_player(
    world: &mut World,
    physics: &mut PhysicsWorld,
    position: Vec2,
    texture: TextureId,
    setup: PlayerSetup,
) -> Entity {
    let entity = world.reserve_entity();
    let handle = physics.create_body(
        BodySpec::actor(
            position,
            Shape::Ball {
                radius: PLAYER_RADIUS,
            },
            CollisionFilter::player(),
            BodyTag::Player(entity),
        )
        .damping(ACTOR_LINEAR_DAMPING),
    );
    world.spawn_at(
        entity,
        (
            EntityKind::Player,
            Body { handle },
            Lifecycle::default(),
            Blink::default(),
            Sprite { texture },
            setup.health,
            setup.armour,
            setup.state,
            setup.loadout,
        ),
    );
    entity
}

/// Loose pickup. Ghosts through everything and only reports player contact.
pub fn spawn_pickup(
    world: &mut World,
    physics: &mut PhysicsWorld,
    kind: PickupKind,
    position: Vec2,
    texture: TextureId,
) -> Entity {
    let entity = world.reserve_entity();
    let handle = physics.create_body(
        BodySpec::actor(
            position,
            Shape::Ball {
                radius: PICKUP_RADIUS,
            },
            CollisionFilter::player_trigger(),
            BodyTag::Pickup(entity),
        )
        .damping(PICKUP_LINEAR_DAMPING)
        .ghost(),
    );
    world.spawn_at(
        entity,
        (
            EntityKind::Pickup,
            Body { handle },
            Lifecycle::default(),
            Blink::default(),
            Sprite { texture },
            Health::new(1),
            Pickup { kind },
        ),
    );
    entity
}

/// Chest contents and art
#[derive(Debug, Clone)]
pub struct ChestSetup {
    pub drops: DropTable,
    pub hearts: DropRange,
    pub shields: DropRange,
    pub weapons: Vec<String>,
    pub closed_texture: TextureId,
    pub open_texture: TextureId,
}

/// Solid static chest, opened by the player with a key.
pub fn spawn_chest(
    world: &mut World,
    physics: &mut PhysicsWorld,
    position: Vec2,
    setup: ChestSetup,
) -> Entity {
    let entity = world.reserve_entity();
    let handle = physics.create_body(BodySpec::fixed(
        position,
        Shape::Cuboid {
            half_extents: Vec2::splat(CHEST_HALF_EXTENT),
        },
        CollisionFilter::terrain(),
        BodyTag::Chest(entity),
    ));
    world.spawn_at(
        entity,
        (
            EntityKind::Chest,
            Body { handle },
            Lifecycle::default(),
            Blink::default(),
            Sprite {
                texture: setup.closed_texture,
            },
            Health::new(1),
            Chest {
                opened: false,
                drops: setup.drops,
                hearts: setup.hearts,
                shields: setup.shields,
                weapons: setup.weapons,
                open_texture: setup.open_texture,
            },
        ),
    );
    entity
}

pub fn spawn_exit(
    world: &mut World,
    physics: &mut PhysicsWorld,
    position: Vec2,
    texture: TextureId,
) -> Entity {
    let entity = world.reserve_entity();
    let handle = physics.create_body(
        BodySpec::fixed(
            position,
            Shape::Ball { radius: EXIT_RADIUS },
            CollisionFilter::player_trigger(),
            BodyTag::Exit(entity),
        )
        .ghost(),
    );
    world.spawn_at(
        entity,
        (
            EntityKind::Exit,
            Exit,
            Body { handle },
            Lifecycle::default(),
            Blink::default(),
            Sprite { texture },
            Health::new(1),
        ),
    );
    entity
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::systems::ai::AiController;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_registry_keys_are_unique() {
        for (i, def) in ENEMY_REGISTRY.iter().enumerate() {
            assert!(ENEMY_REGISTRY[i + 1..].iter().all(|other| other.key != def.key));
        }
    }

    #[test]
    fn test_enemy_def_lookup() {
        assert_eq!(enemy_def("bat").map(|d| d.behavior), Some(Behavior::Seeker));
        assert_eq!(enemy_def("skeleton_archer").and_then(|d| d.weapon), Some("bone_bow"));
        assert!(enemy_def("dragon").is_none());
    }

    #[test]
    fn test_spawn_enemy_attaches_body_and_ai() {
        let mut world = World::new();
        let mut physics = PhysicsWorld::default();
        let mut rng = StdRng::seed_from_u64(9);
        let entity = enemies::SKELETON.spawn(
            &mut world,
            &mut physics,
            Vec2::new(4.0, 4.0),
            TextureId(0),
            None,
            &mut rng,
        );
        let body = *world.get::<&Body>(entity).expect("body");
        assert_eq!(physics.position(body.handle), Some(Vec2::new(4.0, 4.0)));
        assert_eq!(world.get::<&Health>(entity).map(|h| h.current).ok(), Some(SKELETON_HEALTH));
        assert!(world.get::<&AiController>(entity).is_ok());
        assert!(world.get::<&Weapon>(entity).is_err());
        assert_eq!(physics.filter(body.handle), Some(CollisionFilter::creature()));
    }

    #[test]
    fn test_pickup_is_player_trigger() {
        let mut world = World::new();
        let mut physics = PhysicsWorld::default();
        let entity = spawn_pickup(
            &mut world,
            &mut physics,
            PickupKind::Key,
            Vec2::new(2.0, 2.0),
            TextureId(1),
        );
        let body = *world.get::<&Body>(entity).expect("body");
        assert_eq!(physics.filter(body.handle), Some(CollisionFilter::player_trigger()));
        assert_eq!(*world.get::<&EntityKind>(entity).expect("kind"), EntityKind::Pickup);
    }
}
