//! Player control.
//!
//! Input and the headless autopilot both boil down to a [`PlayerIntent`];
//! applying it is the same either way.

use glam::Vec2;
use hecs::{Entity, World};
use tracing::trace;

use crate::components::{Body, PlayerState};
use crate::events::EventQueue;
use crate::input::InputState;
use crate::physics::PhysicsWorld;
use crate::weapon::{Loadout, ProjectileIds, Shot};

/// What the player wants to do this frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerIntent {
    /// Length at most 1
    pub movement: Vec2,
    /// Zero keeps the previous aim
    pub aim: Vec2,
    pub fire: bool,
    pub select_slot: Option<usize>,
    pub cycle_weapon: bool,
}

impl PlayerIntent {
    pub fn from_input(input: &InputState, player_screen: Vec2) -> Self {
        let select_slot = ["slot_1", "slot_2", "slot_3"]
            .iter()
            .position(|name| input.keybind_pressed(name));
        Self {
            movement: input.move_axis(),
            aim: input.aim(player_screen),
            fire: input.keybind_down("fire"),
            select_slot,
            cycle_weapon: input.keybind_pressed("cycle_weapon"),
        }
    }
}

/// Steer, switch weapons and fire. Returns whether a shot went out.
///
/// A dead player is left without force and never fires.
pub fn apply_player_intent(
    world: &mut World,
    physics: &mut PhysicsWorld,
    ids: &mut ProjectileIds,
    events: &mut EventQueue,
    player: Entity,
    intent: PlayerIntent,
    move_force: f32,
) -> bool {
    let Ok(mut query) = world.query_one::<(&Body, &mut PlayerState, &mut Loadout)>(player) else {
        return false;
    };
    let Some((body, state, loadout)) = query.get() else {
        return false;
    };
    if state.dead {
        physics.set_force(body.handle, Vec2::ZERO);
        return false;
    }

    if let Some(slot) = intent.select_slot {
        loadout.select(slot);
    } else if intent.cycle_weapon {
        loadout.cycle();
    }

    physics.set_force(body.handle, intent.movement.clamp_length_max(1.0) * move_force);
    if intent.aim != Vec2::ZERO {
        state.aim = intent.aim.normalize_or_zero();
    }

    if !intent.fire || state.aim == Vec2::ZERO {
        return false;
    }
    let Some(origin) = physics.position(body.handle) else {
        return false;
    };
    let Some(weapon) = loadout.equipped_mut() else {
        return false;
    };
    if !weapon.has_ammo() {
        return false;
    }
    let shot = Shot {
        shooter: player,
        origin,
        direction: state.aim,
        friendly: true,
    };
    let fired = weapon.shoot(physics, ids, events, shot);
    if fired {
        weapon.consume_ammo();
        trace!(weapon = %weapon.id, ammo = ?weapon.ammo, "player fired");
    }
    fired
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Armour, Health};
    use crate::content::tests::weapon_def;
    use crate::spawning::{spawn_player, PlayerSetup};
    use crate::resources::TextureId;
    use crate::weapon::Weapon;

    fn setup(ammo: Option<u32>) -> (World, PhysicsWorld, Entity) {
        let mut world = World::new();
        let mut physics = PhysicsWorld::default();
        let mut def = weapon_def("pistol", 100.0);
        def.ammo = ammo;
        let player = spawn_player(
            &mut world,
            &mut physics,
            Vec2::new(5.0, 5.0),
            TextureId(0),
            PlayerSetup {
                health: Health::new(10),
                armour: Armour::new(5),
                state: PlayerState::default(),
                loadout: Loadout::new(Weapon::new(&def)),
            },
        );
        (world, physics, player)
    }

    fn fire_right() -> PlayerIntent {
        PlayerIntent {
            aim: Vec2::X,
            fire: true,
            ..PlayerIntent::default()
        }
    }

    #[test]
    fn test_fire_spends_ammo_only_on_success() {
        let (mut world, mut physics, player) = setup(Some(2));
        let mut ids = ProjectileIds::default();
        let mut events = EventQueue::new();

        let first = apply_player_intent(&mut world, &mut physics, &mut ids, &mut events, player, fire_right(), 30.0);
        // Fire rate blocks the second attempt, so no ammo is spent
        let second = apply_player_intent(&mut world, &mut physics, &mut ids, &mut events, player, fire_right(), 30.0);
        assert_eq!((first, second), (true, false));
        let loadout = world.get::<&Loadout>(player).expect("loadout");
        assert_eq!(loadout.equipped().and_then(|w| w.ammo), Some(1));
    }

    #[test]
    fn test_empty_weapon_does_not_fire() {
        let (mut world, mut physics, player) = setup(Some(0));
        let mut ids = ProjectileIds::default();
        let mut events = EventQueue::new();
        let fired = apply_player_intent(&mut world, &mut physics, &mut ids, &mut events, player, fire_right(), 30.0);
        assert!(!fired);
        assert!(events.is_empty());
    }

    #[test]
    fn test_dead_player_ignores_intent() {
        let (mut world, mut physics, player) = setup(None);
        world.get::<&mut PlayerState>(player).expect("state").dead = true;
        let mut ids = ProjectileIds::default();
        let mut events = EventQueue::new();
        let intent = PlayerIntent {
            movement: Vec2::X,
            ..fire_right()
        };
        assert!(!apply_player_intent(&mut world, &mut physics, &mut ids, &mut events, player, intent, 30.0));
        for _ in 0..10 {
            physics.advance(1.0 / 60.0);
        }
        let body = *world.get::<&Body>(player).expect("body");
        assert_eq!(physics.velocity(body.handle), Some(Vec2::ZERO));
    }

    #[test]
    fn test_movement_pushes_body() {
        let (mut world, mut physics, player) = setup(None);
        let mut ids = ProjectileIds::default();
        let mut events = EventQueue::new();
        let intent = PlayerIntent {
            movement: Vec2::X,
            ..PlayerIntent::default()
        };
        apply_player_intent(&mut world, &mut physics, &mut ids, &mut events, player, intent, 30.0);
        for _ in 0..10 {
            physics.advance(1.0 / 60.0);
        }
        let body = *world.get::<&Body>(player).expect("body");
        let position = physics.position(body.handle).expect("position");
        assert!(position.x > 5.0);
    }
}
