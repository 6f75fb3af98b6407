//! Common entity query helpers.
//!
//! Read-only lookups shared by the AI, pickups and collision handlers. A miss
//! comes back as `None` or `false`; callers decide whether that matters.

use glam::Vec2;
use hecs::{Entity, World};

use crate::components::{Body, Lifecycle, PlayerState};
use crate::physics::PhysicsWorld;

/// World position of an entity's body.
pub fn body_position(world: &World, physics: &PhysicsWorld, entity: Entity) -> Option<Vec2> {
    let body = world.get::<&Body>(entity).ok()?;
    physics.position(body.handle)
}

/// Whether the player exists and has not died.
pub fn is_player_alive(world: &World, player: Entity) -> bool {
    world
        .get::<&PlayerState>(player)
        .map(|state| !state.dead)
        .unwrap_or(false)
}

/// Player position, only while alive. This is what enemies and pickups see.
pub fn living_player_position(world: &World, physics: &PhysicsWorld, player: Entity) -> Option<Vec2> {
    if !is_player_alive(world, player) {
        return None;
    }
    body_position(world, physics, player)
}

/// True when the entity is gone or marked for the sweep.
pub fn is_removed(world: &World, entity: Entity) -> bool {
    world
        .get::<&Lifecycle>(entity)
        .map(|lifecycle| lifecycle.is_removed())
        .unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_entities_read_as_removed_and_dead() {
        let mut world = World::new();
        let gone = world.spawn((Lifecycle::default(),));
        world.despawn(gone).expect("despawn");
        assert!(is_removed(&world, gone));
        assert!(!is_player_alive(&world, gone));
    }

    #[test]
    fn test_dead_player_has_no_position() {
        let mut world = World::new();
        let physics = PhysicsWorld::default();
        let player = world.spawn((PlayerState {
            dead: true,
            ..PlayerState::default()
        },));
        assert!(living_player_position(&world, &physics, player).is_none());
    }
}
