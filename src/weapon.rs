//! Weapons and the projectiles they own.
//!
//! A weapon is its own small collection: it spawns projectiles, sweeps the
//! ones marked removed (dispose body, drop from list) and only then updates
//! the survivors, the same two-phase pattern the level uses for entities.
//!
//! Projectiles expire by distance travelled, not by time. A projectile that is
//! slowed down lives longer but still covers the same range.

use glam::Vec2;
use hecs::Entity;
use tracing::debug;

use crate::constants::{LOADOUT_SLOTS, PROJECTILE_MUZZLE_OFFSET, PROJECTILE_RADIUS};
use crate::content::WeaponDef;
use crate::events::{EventQueue, GameEvent};
use crate::physics::{
    BodyHandle, BodySpec, BodyTag, CollisionFilter, Faction, PhysicsWorld, ProjectileId, Shape,
};
use crate::resources::{SoundId, TextureId};

/// Level-wide projectile id source
#[derive(Debug, Default)]
pub struct ProjectileIds {
    next: u64,
}

impl ProjectileIds {
    pub fn next_id(&mut self) -> ProjectileId {
        self.next += 1;
        ProjectileId(self.next)
    }
}

/// What a projectile delivers when it strikes something.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Strike {
    pub damage: i32,
    pub knockback: f32,
    pub direction: Vec2,
}

#[derive(Debug, Clone)]
pub struct Projectile {
    pub id: ProjectileId,
    pub body: BodyHandle,
    pub direction: Vec2,
    pub damage: i32,
    pub knockback: f32,
    pub texture: TextureId,
    /// Distance budget in simulation units
    pub range: f32,
    pub travelled: f32,
    last_position: Vec2,
    removed: bool,
}

impl Projectile {
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    pub fn mark_removed(&mut self) {
        self.removed = true;
    }

    /// Consume the projectile against a target. Only the first strike counts;
    /// later contacts in the same step get `None`.
    pub fn strike(&mut self) -> Option<Strike> {
        if self.removed {
            return None;
        }
        self.removed = true;
        Some(Strike {
            damage: self.damage,
            knockback: self.knockback,
            direction: self.direction,
        })
    }

    /// Accumulate distance moved since the last update and expire once past
    /// the range budget.
    pub fn update(&mut self, physics: &PhysicsWorld) {
        let Some(position) = physics.position(self.body) else {
            self.removed = true;
            return;
        };
        self.travelled += position.distance(self.last_position);
        self.last_position = position;
        if self.travelled > self.range {
            self.removed = true;
        }
    }

    pub fn position(&self, physics: &PhysicsWorld) -> Vec2 {
        physics.position(self.body).unwrap_or(self.last_position)
    }
}

/// Request to fire one shot
#[derive(Debug, Clone, Copy)]
pub struct Shot {
    pub shooter: Entity,
    pub origin: Vec2,
    pub direction: Vec2,
    pub friendly: bool,
}

#[derive(Debug, Clone)]
pub struct Weapon {
    pub id: String,
    pub texture: TextureId,
    pub fire_sound: SoundId,
    bullet_textures: Vec<TextureId>,
    pub fire_rate_ms: f32,
    /// Milliseconds since the last shot
    pub fire_timer_ms: f32,
    pub speed: f32,
    pub range: f32,
    pub damage: i32,
    pub knockback: f32,
    /// `None` means unlimited
    pub ammo: Option<u32>,
    shots_fired: usize,
    projectiles: Vec<Projectile>,
}

impl Weapon {
    pub fn new(def: &WeaponDef) -> Self {
        Self {
            id: def.id.clone(),
            texture: def.texture,
            fire_sound: def.fire_sound,
            bullet_textures: def.bullet_textures.clone(),
            fire_rate_ms: def.fire_rate_ms,
            // Ready to fire straight away
            fire_timer_ms: f32::MAX,
            speed: def.speed,
            range: def.range,
            damage: def.damage,
            knockback: def.knockback,
            ammo: def.ammo,
            shots_fired: 0,
            projectiles: Vec::new(),
        }
    }

    pub fn can_fire(&self) -> bool {
        self.fire_timer_ms > self.fire_rate_ms
    }

    pub fn has_ammo(&self) -> bool {
        self.ammo.map_or(true, |ammo| ammo > 0)
    }

    pub fn consume_ammo(&mut self) {
        if let Some(ammo) = self.ammo.as_mut() {
            *ammo = ammo.saturating_sub(1);
        }
    }

    /// Fire one projectile if the fire-rate timer allows it. Returns whether a
    /// shot happened; callers only spend ammo on `true`.
    pub fn shoot(
        &mut self,
        physics: &mut PhysicsWorld,
        ids: &mut ProjectileIds,
        events: &mut EventQueue,
        shot: Shot,
    ) -> bool {
        let direction = shot.direction.normalize_or_zero();
        if !self.can_fire() || direction == Vec2::ZERO {
            return false;
        }
        self.fire_timer_ms = 0.0;

        let faction = Faction::from_friendly(shot.friendly);
        let id = ids.next_id();
        let start = shot.origin + direction * PROJECTILE_MUZZLE_OFFSET;
        let body = physics.create_body(
            BodySpec::actor(
                start,
                Shape::Ball {
                    radius: PROJECTILE_RADIUS,
                },
                CollisionFilter::projectile(faction),
                BodyTag::Projectile {
                    shooter: shot.shooter,
                    id,
                    faction,
                },
            )
            .ghost()
            .with_ccd()
            .launched(direction * self.speed),
        );

        let texture = self
            .bullet_textures
            .get(self.shots_fired % self.bullet_textures.len().max(1))
            .copied()
            .unwrap_or(self.texture);
        self.shots_fired += 1;

        self.projectiles.push(Projectile {
            id,
            body,
            direction,
            damage: self.damage,
            knockback: self.knockback,
            texture,
            range: self.range,
            travelled: 0.0,
            last_position: start,
            removed: false,
        });
        events.push(GameEvent::WeaponFired {
            shooter: shot.shooter,
            weapon: self.id.clone(),
            sound: self.fire_sound,
        });
        true
    }

    /// Dispose removed projectiles, then update the rest.
    pub fn update(&mut self, physics: &mut PhysicsWorld, dt_ms: f32) {
        self.fire_timer_ms = (self.fire_timer_ms + dt_ms).min(f32::MAX);
        self.sweep(physics);
        for projectile in &mut self.projectiles {
            projectile.update(physics);
        }
    }

    /// Dispose every removed projectile's body and drop it from the list.
    pub fn sweep(&mut self, physics: &mut PhysicsWorld) -> usize {
        let before = self.projectiles.len();
        self.projectiles.retain(|projectile| {
            if projectile.removed {
                physics.remove_body(projectile.body);
                false
            } else {
                true
            }
        });
        before - self.projectiles.len()
    }

    /// Dispose every live projectile, used when the weapon itself goes away.
    pub fn dispose(&mut self, physics: &mut PhysicsWorld) {
        for projectile in self.projectiles.drain(..) {
            physics.remove_body(projectile.body);
        }
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn projectile_mut(&mut self, id: ProjectileId) -> Option<&mut Projectile> {
        self.projectiles.iter_mut().find(|p| p.id == id)
    }
}

/// The player's fixed set of weapon slots.
///
/// A weapon pushed out of a full loadout is retired rather than dropped: its
/// projectiles keep flying and are swept like any other until none are left.
#[derive(Debug, Clone)]
pub struct Loadout {
    slots: Vec<Option<Weapon>>,
    equipped: usize,
    retired: Vec<Weapon>,
}

/// Where an added weapon ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
    Slot(usize),
    Replaced { slot: usize, previous: String },
}

impl Loadout {
    pub fn new(starting: Weapon) -> Self {
        let mut slots: Vec<Option<Weapon>> = (0..LOADOUT_SLOTS).map(|_| None).collect();
        slots[0] = Some(starting);
        Self {
            slots,
            equipped: 0,
            retired: Vec::new(),
        }
    }

    pub fn equipped_slot(&self) -> usize {
        self.equipped
    }

    pub fn equipped(&self) -> Option<&Weapon> {
        self.slots.get(self.equipped).and_then(Option::as_ref)
    }

    pub fn equipped_mut(&mut self) -> Option<&mut Weapon> {
        self.slots.get_mut(self.equipped).and_then(Option::as_mut)
    }

    /// Equip a slot if it holds a weapon.
    pub fn select(&mut self, slot: usize) -> bool {
        if matches!(self.slots.get(slot), Some(Some(_))) {
            self.equipped = slot;
            return true;
        }
        false
    }

    /// Equip the next occupied slot.
    pub fn cycle(&mut self) {
        let count = self.slots.len();
        for step in 1..=count {
            let slot = (self.equipped + step) % count;
            if self.slots[slot].is_some() {
                self.equipped = slot;
                return;
            }
        }
    }

    /// Put a weapon in the first free slot, or replace the equipped one when
    /// the loadout is full. The new weapon becomes equipped. Safe to call from
    /// a contact callback: no physics body is touched.
    pub fn add(&mut self, weapon: Weapon) -> Placement {
        if let Some(slot) = self.slots.iter().position(Option::is_none) {
            self.slots[slot] = Some(weapon);
            self.equipped = slot;
            return Placement::Slot(slot);
        }
        let slot = self.equipped;
        match self.slots[slot].replace(weapon) {
            Some(old) => {
                debug!(weapon = %old.id, slot, "weapon replaced");
                let previous = old.id.clone();
                if !old.projectiles.is_empty() {
                    self.retired.push(old);
                }
                Placement::Replaced { slot, previous }
            }
            None => Placement::Slot(slot),
        }
    }

    /// Top up the ammo of a held weapon. `false` if no slot holds `id`.
    pub fn refill(&mut self, id: &str, ammo: Option<u32>) -> bool {
        match self.slots.iter_mut().flatten().find(|w| w.id == id) {
            Some(weapon) => {
                weapon.ammo = ammo;
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.slots.iter().flatten().any(|w| w.id == id)
    }

    /// Held weapons followed by retired ones that still have projectiles out.
    pub fn weapons(&self) -> impl Iterator<Item = &Weapon> {
        self.slots.iter().flatten().chain(&self.retired)
    }

    pub fn weapons_mut(&mut self) -> impl Iterator<Item = &mut Weapon> {
        self.slots.iter_mut().flatten().chain(&mut self.retired)
    }

    /// Update every weapon, then forget retired ones with nothing in flight.
    pub fn update(&mut self, physics: &mut PhysicsWorld, dt_ms: f32) {
        for weapon in self.weapons_mut() {
            weapon.update(physics, dt_ms);
        }
        self.retired.retain(|weapon| !weapon.projectiles.is_empty());
    }

    pub fn projectile_mut(&mut self, id: ProjectileId) -> Option<&mut Projectile> {
        self.weapons_mut().find_map(|w| w.projectile_mut(id))
    }

    pub fn dispose(&mut self, physics: &mut PhysicsWorld) {
        for weapon in self.weapons_mut() {
            weapon.dispose(physics);
        }
        self.retired.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::tests::weapon_def;

    fn setup() -> (hecs::World, Entity, PhysicsWorld, ProjectileIds, EventQueue) {
        let mut world = hecs::World::new();
        let shooter = world.spawn(());
        (world, shooter, PhysicsWorld::default(), ProjectileIds::default(), EventQueue::new())
    }

    fn shot(shooter: Entity) -> Shot {
        Shot {
            shooter,
            origin: Vec2::new(5.0, 5.0),
            direction: Vec2::X,
            friendly: true,
        }
    }

    #[test]
    fn test_fire_rate_gates_second_shot() {
        let (_world, shooter, mut physics, mut ids, mut events) = setup();
        let mut weapon = Weapon::new(&weapon_def("pistol", 250.0));

        let first = weapon.shoot(&mut physics, &mut ids, &mut events, shot(shooter));
        weapon.update(&mut physics, 100.0);
        let second = weapon.shoot(&mut physics, &mut ids, &mut events, shot(shooter));

        assert_eq!((first, second), (true, false));
        assert_eq!(weapon.projectiles().len(), 1);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn test_fires_again_after_rate_elapsed() {
        let (_world, shooter, mut physics, mut ids, mut events) = setup();
        let mut weapon = Weapon::new(&weapon_def("pistol", 250.0));
        assert!(weapon.shoot(&mut physics, &mut ids, &mut events, shot(shooter)));
        weapon.update(&mut physics, 251.0);
        assert!(weapon.shoot(&mut physics, &mut ids, &mut events, shot(shooter)));
        assert_eq!(weapon.projectiles().len(), 2);
    }

    #[test]
    fn test_zero_direction_does_not_fire() {
        let (_world, shooter, mut physics, mut ids, mut events) = setup();
        let mut weapon = Weapon::new(&weapon_def("pistol", 250.0));
        let mut aimless = shot(shooter);
        aimless.direction = Vec2::ZERO;
        assert!(!weapon.shoot(&mut physics, &mut ids, &mut events, aimless));
        assert!(weapon.can_fire());
    }

    #[test]
    fn test_projectile_expires_by_distance() {
        let (_world, shooter, mut physics, mut ids, mut events) = setup();
        let mut def = weapon_def("pistol", 0.0);
        def.speed = 10.0;
        def.range = 2.0;
        let mut weapon = Weapon::new(&def);
        assert!(weapon.shoot(&mut physics, &mut ids, &mut events, shot(shooter)));

        // 10 u/s for 1/60 s per step: about 12 steps to cover 2 units
        let mut steps = 0;
        while !weapon.projectiles().is_empty() && steps < 100 {
            physics.advance(1.0 / 60.0);
            weapon.update(&mut physics, 1000.0 / 60.0);
            steps += 1;
        }
        assert!(weapon.projectiles().is_empty());
        assert!((12..=16).contains(&steps), "expired after {steps} steps");
        assert_eq!(physics.body_count(), 0);
    }

    #[test]
    fn test_sweep_runs_before_update() {
        let (_world, shooter, mut physics, mut ids, mut events) = setup();
        let mut weapon = Weapon::new(&weapon_def("pistol", 0.0));
        assert!(weapon.shoot(&mut physics, &mut ids, &mut events, shot(shooter)));
        let id = weapon.projectiles()[0].id;
        let strike = weapon.projectile_mut(id).and_then(Projectile::strike);
        assert!(strike.is_some());
        // A second strike on the same projectile delivers nothing
        assert!(weapon.projectile_mut(id).and_then(Projectile::strike).is_none());

        weapon.update(&mut physics, 16.0);
        assert!(weapon.projectiles().is_empty());
        assert_eq!(physics.body_count(), 0);
    }

    #[test]
    fn test_ammo_only_spent_by_caller() {
        let mut def = weapon_def("shotgun", 500.0);
        def.ammo = Some(1);
        let mut weapon = Weapon::new(&def);
        assert!(weapon.has_ammo());
        weapon.consume_ammo();
        assert!(!weapon.has_ammo());
        weapon.consume_ammo();
        assert_eq!(weapon.ammo, Some(0));
    }

    #[test]
    fn test_loadout_fills_then_replaces() {
        let mut loadout = Loadout::new(Weapon::new(&weapon_def("pistol", 100.0)));
        assert_eq!(
            loadout.add(Weapon::new(&weapon_def("shotgun", 100.0))),
            Placement::Slot(1)
        );
        assert_eq!(
            loadout.add(Weapon::new(&weapon_def("rifle", 100.0))),
            Placement::Slot(2)
        );
        assert_eq!(
            loadout.add(Weapon::new(&weapon_def("bow", 100.0))),
            Placement::Replaced {
                slot: 2,
                previous: "rifle".to_string()
            }
        );
        assert!(loadout.select(0));
        assert_eq!(loadout.equipped().map(|w| w.id.as_str()), Some("pistol"));
        loadout.cycle();
        assert_eq!(loadout.equipped_slot(), 1);
    }

    #[test]
    fn test_select_empty_slot_fails() {
        let mut loadout = Loadout::new(Weapon::new(&weapon_def("pistol", 100.0)));
        assert!(!loadout.select(2));
        assert!(!loadout.select(7));
        loadout.cycle();
        assert_eq!(loadout.equipped_slot(), 0);
    }

    #[test]
    fn test_replaced_weapon_keeps_its_projectiles_until_swept() {
        let (_world, shooter, mut physics, mut ids, mut events) = setup();
        let mut loadout = Loadout::new(Weapon::new(&weapon_def("pistol", 100.0)));
        loadout.add(Weapon::new(&weapon_def("shotgun", 100.0)));
        loadout.add(Weapon::new(&weapon_def("rifle", 100.0)));
        assert!(loadout.select(0));
        let pistol = loadout.equipped_mut().expect("pistol");
        assert!(pistol.shoot(&mut physics, &mut ids, &mut events, shot(shooter)));
        let id = pistol.projectiles()[0].id;

        loadout.add(Weapon::new(&weapon_def("bow", 100.0)));
        assert!(!loadout.contains("pistol"));
        assert_eq!(physics.body_count(), 1);
        let strike = loadout.projectile_mut(id).and_then(Projectile::strike);
        assert!(strike.is_some());

        loadout.update(&mut physics, 16.0);
        assert_eq!(physics.body_count(), 0);
        assert_eq!(loadout.weapons().count(), 3);
    }

    #[test]
    fn test_refill_only_touches_held_weapon() {
        let mut def = weapon_def("shotgun", 100.0);
        def.ammo = Some(1);
        let mut loadout = Loadout::new(Weapon::new(&def));
        if let Some(weapon) = loadout.equipped_mut() {
            weapon.consume_ammo();
        }
        assert!(loadout.refill("shotgun", Some(6)));
        assert!(!loadout.refill("bow", Some(6)));
        assert_eq!(loadout.equipped().and_then(|w| w.ammo), Some(6));
    }
}
