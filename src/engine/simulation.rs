//! Per-frame level update and collision reactions.
//!
//! Frame order is fixed: physics step (contact callbacks run inline), tile
//! update, sweep, queued loot, then every remaining entity in list order.
//! Callbacks only mark things removed or queue work; nothing is destroyed
//! until the sweep.

use glam::Vec2;
use hecs::{Entity, World};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use tracing::{debug, info, warn};

use crate::components::{
    Blink, Body, Chest, Enemy, EntityKind, Lifecycle, PickupKind, PlayerState, Sprite,
};
use crate::content::Content;
use crate::error::InteractionError;
use crate::events::{EventQueue, GameEvent};
use crate::physics::{BodyTag, ContactListener, Faction, PhysicsWorld, ProjectileId, StepReport};
use crate::queries;
use crate::spawning::spawn_pickup;
use crate::systems::ai::{AiController, Perception};
use crate::systems::combat::{apply_player_damage, damage_enemy, EnemyHit};
use crate::systems::items::{
    collect_pickup, jittered, magnet_force, pickup_texture, roll_count, roll_drops,
};
use crate::systems::movement::{apply_player_intent, PlayerIntent};
use crate::weapon::{Loadout, Shot, Strike, Weapon};

use super::level::{Level, PendingDrop};

/// What happened during one [`Level::update`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameReport {
    pub step: StepReport,
    /// Entities destroyed by this frame's sweep
    pub swept: usize,
    pub completed: bool,
    pub player_dead: bool,
}

impl Level {
    /// Advance the level by one frame of `dt_ms` milliseconds.
    pub fn update(&mut self, content: &Content, intent: PlayerIntent, dt_ms: f32) -> FrameReport {
        puffin::profile_function!();

        let step = {
            puffin::profile_scope!("physics");
            let mut interactions = Interactions {
                world: &mut self.world,
                content,
                events: &mut self.events,
                drops: &mut self.pending_drops,
                rng: &mut self.rng,
                completed: &mut self.completed,
                floor: self.floor,
            };
            self.physics.step(dt_ms / 1000.0, &mut interactions)
        };

        for tile in &mut self.tiles {
            tile.update(dt_ms);
        }

        let swept = self.sweep();
        self.flush_drops(content);

        {
            puffin::profile_scope!("entities");
            // Snapshot: nothing joins the list during the entity pass
            let entities = self.entities.clone();
            for entity in entities {
                self.update_entity(entity, intent, dt_ms);
            }
        }

        self.frame += 1;
        FrameReport {
            step,
            swept,
            completed: self.completed,
            player_dead: !self.is_player_alive(),
        }
    }

    /// Spawn the loot queued by this frame's callbacks.
    fn flush_drops(&mut self, content: &Content) {
        for drop in std::mem::take(&mut self.pending_drops) {
            let Some(texture) = pickup_texture(&drop.kind, content) else {
                warn!(kind = drop.kind.name(), "no texture for drop, skipped");
                continue;
            };
            let pickup = spawn_pickup(&mut self.world, &mut self.physics, drop.kind, drop.position, texture);
            self.add(pickup);
        }
    }

    fn update_entity(&mut self, entity: Entity, intent: PlayerIntent, dt_ms: f32) {
        let Ok(kind) = self.world.get::<&EntityKind>(entity).map(|k| *k) else {
            return;
        };
        match kind {
            EntityKind::Player => self.update_player(entity, intent, dt_ms),
            EntityKind::Enemy => self.update_enemy(entity, dt_ms),
            EntityKind::Pickup => {
                let player = queries::living_player_position(&self.world, &self.physics, self.player);
                if let Ok(body) = self.world.get::<&Body>(entity) {
                    if let Some(position) = self.physics.position(body.handle) {
                        self.physics.set_force(body.handle, magnet_force(position, player));
                    }
                }
            }
            EntityKind::Chest | EntityKind::Exit => {}
        }
        if let Ok(mut blink) = self.world.get::<&mut Blink>(entity) {
            blink.tick();
        }
    }

    fn update_player(&mut self, player: Entity, intent: PlayerIntent, dt_ms: f32) {
        apply_player_intent(
            &mut self.world,
            &mut self.physics,
            &mut self.projectile_ids,
            &mut self.events,
            player,
            intent,
            self.move_force,
        );
        if let Ok(mut loadout) = self.world.get::<&mut Loadout>(player) {
            loadout.update(&mut self.physics, dt_ms);
        }
    }

    fn update_enemy(&mut self, enemy: Entity, dt_ms: f32) {
        let player = queries::living_player_position(&self.world, &self.physics, self.player);
        let Ok(mut query) = self
            .world
            .query_one::<(&Body, &Lifecycle, &mut AiController, Option<&mut Weapon>)>(enemy)
        else {
            return;
        };
        let Some((body, lifecycle, ai, weapon)) = query.get() else {
            return;
        };
        if lifecycle.is_removed() {
            return;
        }
        let Some(position) = self.physics.position(body.handle) else {
            return;
        };

        let decision = ai.think(Perception { position, player }, dt_ms, &mut self.rng);
        self.physics.set_force(body.handle, decision.force);

        if let Some(weapon) = weapon {
            if let Some(direction) = decision.aim {
                let shot = Shot {
                    shooter: enemy,
                    origin: position,
                    direction,
                    friendly: false,
                };
                let ids = &mut self.projectile_ids;
                let fired =
                    weapon.has_ammo() && weapon.shoot(&mut self.physics, ids, &mut self.events, shot);
                if fired {
                    weapon.consume_ammo();
                }
            }
            weapon.update(&mut self.physics, dt_ms);
        }
    }
}

/// Collision reactions for one step. Borrows exactly the level state the
/// handlers may touch; physics arrives through the callback.
struct Interactions<'a> {
    world: &'a mut World,
    content: &'a Content,
    events: &'a mut EventQueue,
    drops: &'a mut Vec<PendingDrop>,
    rng: &'a mut StdRng,
    completed: &'a mut bool,
    floor: u32,
}

impl ContactListener for Interactions<'_> {
    fn begin_contact(
        &mut self,
        physics: &mut PhysicsWorld,
        ours: BodyTag,
        other: BodyTag,
    ) -> Result<(), InteractionError> {
        match (ours, other) {
            (BodyTag::Projectile { shooter, id, faction }, target) => {
                self.projectile_hit(physics, shooter, id, faction, target)
            }
            (BodyTag::Enemy(enemy), BodyTag::Player(player)) => self.melee(physics, enemy, player),
            (BodyTag::Pickup(pickup), BodyTag::Player(player)) => {
                collect_pickup(self.world, self.content, player, pickup, self.events).map(|_| ())
            }
            (BodyTag::Chest(chest), BodyTag::Player(player)) => self.open_chest(physics, chest, player),
            (BodyTag::Exit(_), BodyTag::Player(player)) => {
                self.reach_exit(player);
                Ok(())
            }
            // Every other pairing is handled from the other side, or not at all
            _ => Ok(()),
        }
    }
}

impl Interactions<'_> {
    fn projectile_hit(
        &mut self,
        physics: &mut PhysicsWorld,
        shooter: Entity,
        id: ProjectileId,
        faction: Faction,
        target: BodyTag,
    ) -> Result<(), InteractionError> {
        // Decide first whether this contact counts at all
        match (faction, target) {
            (_, BodyTag::Wall { .. } | BodyTag::Chest(_)) => {}
            (Faction::Player, BodyTag::Enemy(enemy)) => {
                if queries::is_removed(self.world, enemy) {
                    return Ok(());
                }
            }
            (Faction::Enemy, BodyTag::Player(player)) => {
                if !queries::is_player_alive(self.world, player) {
                    return Ok(());
                }
            }
            _ => return Ok(()),
        }

        let Some(strike) = self.strike(shooter, id)? else {
            return Ok(());
        };

        let victim = match target {
            BodyTag::Enemy(entity) | BodyTag::Player(entity) => entity,
            _ => return Ok(()),
        };
        let body = *self
            .world
            .get::<&Body>(victim)
            .map_err(|_| InteractionError::component::<Body>(victim))?;
        if physics.is_dynamic(body.handle) {
            physics.apply_impulse(body.handle, strike.direction * strike.knockback);
        }
        let position = physics.position(body.handle).unwrap_or_default();

        match target {
            BodyTag::Player(player) => {
                apply_player_damage(self.world, player, strike.damage, position, self.events)?;
            }
            BodyTag::Enemy(enemy) => {
                if let EnemyHit::Killed(table) =
                    damage_enemy(self.world, enemy, strike.damage, position, self.events)?
                {
                    for (kind, count) in roll_drops(&table, self.rng) {
                        self.queue_drops(kind, count, position);
                    }
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Consume the projectile. `None` if it already struck this step.
    fn strike(
        &mut self,
        shooter: Entity,
        id: ProjectileId,
    ) -> Result<Option<Strike>, InteractionError> {
        let unknown = || InteractionError::UnknownProjectile { shooter, id: id.0 };
        if let Ok(mut loadout) = self.world.get::<&mut Loadout>(shooter) {
            let projectile = loadout.projectile_mut(id).ok_or_else(unknown)?;
            return Ok(projectile.strike());
        }
        let mut weapon = self
            .world
            .get::<&mut Weapon>(shooter)
            .map_err(|_| unknown())?;
        let projectile = weapon.projectile_mut(id).ok_or_else(unknown)?;
        Ok(projectile.strike())
    }

    fn melee(
        &mut self,
        physics: &mut PhysicsWorld,
        enemy: Entity,
        player: Entity,
    ) -> Result<(), InteractionError> {
        if queries::is_removed(self.world, enemy) {
            return Ok(());
        }
        let damage = self
            .world
            .get::<&Enemy>(enemy)
            .map_err(|_| InteractionError::component::<Enemy>(enemy))?
            .damage;
        let position = queries::body_position(self.world, physics, player).unwrap_or_default();
        apply_player_damage(self.world, player, damage, position, self.events)?;
        Ok(())
    }

    fn open_chest(
        &mut self,
        physics: &mut PhysicsWorld,
        chest: Entity,
        player: Entity,
    ) -> Result<(), InteractionError> {
        if !queries::is_player_alive(self.world, player) {
            return Ok(());
        }
        let mut query = self
            .world
            .query_one::<(&Body, &mut Chest, &mut Sprite)>(chest)
            .map_err(|_| InteractionError::MissingEntity(chest))?;
        let (body, contents, sprite) = query
            .get()
            .ok_or_else(|| InteractionError::component::<Chest>(chest))?;
        if contents.opened {
            return Ok(());
        }

        let mut state = self
            .world
            .get::<&mut PlayerState>(player)
            .map_err(|_| InteractionError::component::<PlayerState>(player))?;
        if state.keys == 0 {
            debug!(?chest, "chest locked");
            self.events.push(GameEvent::ChestLocked { chest });
            return Ok(());
        }
        state.keys -= 1;
        drop(state);

        contents.opened = true;
        sprite.texture = contents.open_texture;
        let position = physics.position(body.handle).unwrap_or_default();

        let mut loot = roll_drops(&contents.drops, self.rng);
        loot.push((PickupKind::Heart, roll_count(contents.hearts, self.rng)));
        loot.push((PickupKind::Shield, roll_count(contents.shields, self.rng)));
        if let Some(weapon) = contents.weapons.choose(self.rng) {
            loot.push((PickupKind::Weapon(weapon.clone()), 1));
        }
        drop(query);

        for (kind, count) in loot {
            self.queue_drops(kind, count, position);
        }
        info!(?chest, "chest opened");
        self.events.push(GameEvent::ChestOpened { chest, position });
        Ok(())
    }

    fn reach_exit(&mut self, player: Entity) {
        if *self.completed || !queries::is_player_alive(self.world, player) {
            return;
        }
        *self.completed = true;
        info!(floor = self.floor, "level completed");
        self.events.push(GameEvent::LevelCompleted { floor: self.floor });
    }

    fn queue_drops(&mut self, kind: PickupKind, count: u32, origin: Vec2) {
        for _ in 0..count {
            self.drops.push(PendingDrop {
                kind: kind.clone(),
                position: jittered(origin, self.rng),
            });
        }
    }
}
