//! Continuous 2D physics for the cavern.
//!
//! [`PhysicsWorld`] wraps a rapier2d simulation. Terrain cells and actors
//! register bodies through [`BodySpec`]; every collider carries a [`BodyTag`]
//! saying who owns it, so collision handling is a pattern match on tags rather
//! than a lookup through opaque user data.
//!
//! The level is the only caller of [`PhysicsWorld::step`]. Begin-contact
//! events gathered during a step are dispatched afterwards, one call per
//! collider perspective, to a [`ContactListener`]. A listener error is logged
//! and the remaining contacts are still delivered.

use std::collections::HashMap;

use bitflags::bitflags;
use glam::Vec2;
use hecs::Entity;
use rapier2d::prelude::*;
use tracing::{trace, warn};

use crate::constants::{ACTOR_DENSITY, PHYSICS_MAX_STEP, SENSOR_BODY_MASS};
use crate::error::InteractionError;

bitflags! {
    /// Collision class of a fixture. The set is closed: terrain, player,
    /// projectile and creature.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Category: u32 {
        const TERRAIN = 1 << 0;
        const PLAYER = 1 << 1;
        const PROJECTILE = 1 << 2;
        const CREATURE = 1 << 3;
    }
}

/// Which side fired a projectile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Faction {
    Player,
    Enemy,
}

impl Faction {
    pub fn from_friendly(friendly: bool) -> Self {
        if friendly {
            Faction::Player
        } else {
            Faction::Enemy
        }
    }
}

/// Category plus collides-with mask of one fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollisionFilter {
    pub category: Category,
    pub collides_with: Category,
}

impl CollisionFilter {
    pub const fn new(category: Category, collides_with: Category) -> Self {
        Self {
            category,
            collides_with,
        }
    }

    /// Cave walls, chests: block every moving class.
    pub fn terrain() -> Self {
        Self::new(
            Category::TERRAIN,
            Category::PLAYER.union(Category::PROJECTILE).union(Category::CREATURE),
        )
    }

    pub fn player() -> Self {
        Self::new(
            Category::PLAYER,
            Category::TERRAIN.union(Category::PROJECTILE).union(Category::CREATURE),
        )
    }

    pub fn creature() -> Self {
        Self::new(Category::CREATURE, Category::all())
    }

    /// Player-faction shots hit creatures and terrain, enemy shots hit the
    /// player and terrain. Neither meets its own side or other projectiles.
    pub fn projectile(faction: Faction) -> Self {
        let target = match faction {
            Faction::Player => Category::CREATURE,
            Faction::Enemy => Category::PLAYER,
        };
        Self::new(Category::PROJECTILE, target | Category::TERRAIN)
    }

    /// Pickups and exits are terrain-class props only the player can touch.
    pub fn player_trigger() -> Self {
        Self::new(Category::TERRAIN, Category::PLAYER)
    }

    /// Both sides must accept each other for a pair to interact.
    pub fn allows(&self, other: &CollisionFilter) -> bool {
        self.collides_with.intersects(other.category) && other.collides_with.intersects(self.category)
    }

    fn groups(&self) -> InteractionGroups {
        InteractionGroups::new(
            Group::from_bits_truncate(self.category.bits()),
            Group::from_bits_truncate(self.collides_with.bits()),
        )
    }
}

/// Identifier of a projectile within the level that spawned it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProjectileId(pub u64);

/// Owner of a collider, carried alongside every physics handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyTag {
    Wall { x: i32, y: i32 },
    Player(Entity),
    Enemy(Entity),
    Pickup(Entity),
    Chest(Entity),
    Exit(Entity),
    Projectile {
        shooter: Entity,
        id: ProjectileId,
        faction: Faction,
    },
}

impl BodyTag {
    /// Level entity owning the collider, if it is one.
    pub fn entity(&self) -> Option<Entity> {
        match *self {
            BodyTag::Player(e)
            | BodyTag::Enemy(e)
            | BodyTag::Pickup(e)
            | BodyTag::Chest(e)
            | BodyTag::Exit(e) => Some(e),
            BodyTag::Wall { .. } | BodyTag::Projectile { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Static,
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Ball { radius: f32 },
    Cuboid { half_extents: Vec2 },
}

/// Whether a contact is physically resolved or only reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactResponse {
    Solid,
    Ghost,
}

/// Everything needed to register a body with one collider.
#[derive(Debug, Clone, Copy)]
pub struct BodySpec {
    pub kind: BodyKind,
    pub position: Vec2,
    pub velocity: Vec2,
    pub shape: Shape,
    pub filter: CollisionFilter,
    pub response: ContactResponse,
    pub linear_damping: f32,
    pub density: f32,
    pub ccd: bool,
    pub tag: BodyTag,
}

impl BodySpec {
    /// Dynamic body with locked rotation, as every actor uses.
    pub fn actor(position: Vec2, shape: Shape, filter: CollisionFilter, tag: BodyTag) -> Self {
        Self {
            kind: BodyKind::Dynamic,
            position,
            velocity: Vec2::ZERO,
            shape,
            filter,
            response: ContactResponse::Solid,
            linear_damping: 0.0,
            density: ACTOR_DENSITY,
            ccd: false,
            tag,
        }
    }

    pub fn fixed(position: Vec2, shape: Shape, filter: CollisionFilter, tag: BodyTag) -> Self {
        Self {
            kind: BodyKind::Static,
            ..Self::actor(position, shape, filter, tag)
        }
    }

    pub fn damping(mut self, linear_damping: f32) -> Self {
        self.linear_damping = linear_damping;
        self
    }

    pub fn ghost(mut self) -> Self {
        self.response = ContactResponse::Ghost;
        self
    }

    pub fn launched(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_ccd(mut self) -> Self {
        self.ccd = true;
        self
    }
}

/// Handle to a body owned by an entity, projectile or the terrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(RigidBodyHandle);

/// A newly touching fixture pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contact {
    pub a: BodyTag,
    pub b: BodyTag,
}

/// Receives begin-contact callbacks after each step.
///
/// `ours` is the collider whose owner handles the callback, `other` the one it
/// touched. Each contact is delivered once from each side.
pub trait ContactListener {
    fn begin_contact(
        &mut self,
        physics: &mut PhysicsWorld,
        ours: BodyTag,
        other: BodyTag,
    ) -> Result<(), InteractionError>;
}

/// Outcome of one [`PhysicsWorld::step`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StepReport {
    /// Simulated seconds after capping.
    pub delta: f32,
    pub contacts: usize,
    pub failed_callbacks: usize,
}

/// Owns one rapier simulation. Lives exactly as long as its level.
pub struct PhysicsWorld {
    pipeline: PhysicsPipeline,
    gravity: Vector<Real>,
    integration_params: IntegrationParameters,
    island_manager: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    tags: HashMap<ColliderHandle, BodyTag>,
    filters: HashMap<ColliderHandle, CollisionFilter>,
    terrain: Option<RigidBodyHandle>,
    max_step: f32,
}

impl PhysicsWorld {
    /// Top-down world: no gravity, steps capped at `max_step` seconds.
    pub fn new(max_step: f32) -> Self {
        Self {
            pipeline: PhysicsPipeline::new(),
            gravity: vector![0.0, 0.0],
            integration_params: IntegrationParameters::default(),
            island_manager: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            tags: HashMap::new(),
            filters: HashMap::new(),
            terrain: None,
            max_step: if max_step > 0.0 { max_step } else { PHYSICS_MAX_STEP },
        }
    }

    pub fn max_step(&self) -> f32 {
        self.max_step
    }

    /// Register a body with a single collider.
    pub fn create_body(&mut self, spec: BodySpec) -> BodyHandle {
        let builder = match spec.kind {
            BodyKind::Static => RigidBodyBuilder::fixed(),
            BodyKind::Dynamic => RigidBodyBuilder::dynamic()
                .linear_damping(spec.linear_damping)
                .linvel(vector![spec.velocity.x, spec.velocity.y])
                .lock_rotations()
                .ccd_enabled(spec.ccd),
        };
        // Ghost bodies get no mass from their collider; give them a fixed one
        let builder = match (spec.kind, spec.response) {
            (BodyKind::Dynamic, ContactResponse::Ghost) => builder.additional_mass(SENSOR_BODY_MASS),
            _ => builder,
        };
        let body = builder
            .translation(vector![spec.position.x, spec.position.y])
            .build();
        let handle = self.bodies.insert(body);
        self.attach_collider(handle, spec, Vec2::ZERO);
        BodyHandle(handle)
    }

    /// Add a static terrain fixture for one wall cell, centred at `center`.
    /// All terrain fixtures share one fixed body.
    pub fn add_terrain_fixture(&mut self, center: Vec2, half_extents: Vec2, tag: BodyTag) {
        let terrain = match self.terrain {
            Some(handle) => handle,
            None => {
                let handle = self.bodies.insert(RigidBodyBuilder::fixed().build());
                self.terrain = Some(handle);
                handle
            }
        };
        let spec = BodySpec::fixed(
            Vec2::ZERO,
            Shape::Cuboid { half_extents },
            CollisionFilter::terrain(),
            tag,
        );
        self.attach_collider(terrain, spec, center);
    }

    fn attach_collider(&mut self, body: RigidBodyHandle, spec: BodySpec, offset: Vec2) {
        let shape = match spec.shape {
            Shape::Ball { radius } => SharedShape::ball(radius),
            Shape::Cuboid { half_extents } => SharedShape::cuboid(half_extents.x, half_extents.y),
        };
        let ghost = spec.response == ContactResponse::Ghost;
        let collider = ColliderBuilder::new(shape)
            .translation(vector![offset.x, offset.y])
            .density(if ghost { 0.0 } else { spec.density })
            .sensor(ghost)
            .collision_groups(spec.filter.groups())
            .active_events(ActiveEvents::COLLISION_EVENTS)
            .build();
        let handle = self
            .colliders
            .insert_with_parent(collider, body, &mut self.bodies);
        self.tags.insert(handle, spec.tag);
        self.filters.insert(handle, spec.filter);
    }

    /// Dispose a body and its colliders. Returns false when it was already gone,
    /// so a second disposal is harmless.
    pub fn remove_body(&mut self, handle: BodyHandle) -> bool {
        let Some(body) = self.bodies.get(handle.0) else {
            return false;
        };
        for collider in body.colliders() {
            self.tags.remove(collider);
            self.filters.remove(collider);
        }
        self.bodies
            .remove(
                handle.0,
                &mut self.island_manager,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                true,
            )
            .is_some()
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.bodies.contains(handle.0)
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    pub fn terrain_fixture_count(&self) -> usize {
        self.terrain
            .and_then(|handle| self.bodies.get(handle))
            .map(|body| body.colliders().len())
            .unwrap_or(0)
    }

    pub fn position(&self, handle: BodyHandle) -> Option<Vec2> {
        self.bodies.get(handle.0).map(|body| {
            let t = body.translation();
            Vec2::new(t.x, t.y)
        })
    }

    pub fn velocity(&self, handle: BodyHandle) -> Option<Vec2> {
        self.bodies.get(handle.0).map(|body| {
            let v = body.linvel();
            Vec2::new(v.x, v.y)
        })
    }

    pub fn is_dynamic(&self, handle: BodyHandle) -> bool {
        self.bodies
            .get(handle.0)
            .map(|body| body.is_dynamic())
            .unwrap_or(false)
    }

    pub fn apply_impulse(&mut self, handle: BodyHandle, impulse: Vec2) {
        if let Some(body) = self.bodies.get_mut(handle.0) {
            body.apply_impulse(vector![impulse.x, impulse.y], true);
        }
    }

    /// Replace the persistent force on a body. Forces stay applied across steps
    /// until replaced.
    pub fn set_force(&mut self, handle: BodyHandle, force: Vec2) {
        if let Some(body) = self.bodies.get_mut(handle.0) {
            body.reset_forces(false);
            if force != Vec2::ZERO {
                body.add_force(vector![force.x, force.y], true);
            }
        }
    }

    /// Filter registered for the first collider of a body.
    pub fn filter(&self, handle: BodyHandle) -> Option<CollisionFilter> {
        let body = self.bodies.get(handle.0)?;
        body.colliders()
            .first()
            .and_then(|collider| self.filters.get(collider))
            .copied()
    }

    /// Advance by `delta` seconds (capped) without dispatching contacts.
    /// Returns the newly started contacts in a deterministic order.
    pub fn advance(&mut self, delta: f32) -> (f32, Vec<Contact>) {
        puffin::profile_function!();

        let delta = delta.clamp(0.0, self.max_step);
        if delta <= 0.0 {
            return (0.0, Vec::new());
        }
        self.integration_params.dt = delta;

        let (collision_send, collision_recv) = rapier2d::crossbeam::channel::unbounded();
        let (force_send, _force_recv) = rapier2d::crossbeam::channel::unbounded();
        let event_handler = ChannelEventCollector::new(collision_send, force_send);

        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.bodies,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            &mut self.ccd_solver,
            None,
            &(),
            &event_handler,
        );

        let mut started = Vec::new();
        while let Ok(event) = collision_recv.try_recv() {
            if let CollisionEvent::Started(h1, h2, _flags) = event {
                started.push((h1, h2));
            }
        }
        // Channel delivery order is not stable across runs
        started.sort_by_key(|(h1, h2)| {
            let a = h1.into_raw_parts();
            let b = h2.into_raw_parts();
            (a.min(b), a.max(b))
        });
        started.dedup();

        let contacts = started
            .into_iter()
            .filter_map(|(h1, h2)| {
                let a = self.tags.get(&h1).copied();
                let b = self.tags.get(&h2).copied();
                match (a, b) {
                    (Some(a), Some(b)) => Some(Contact { a, b }),
                    _ => None,
                }
            })
            .collect();
        (delta, contacts)
    }

    /// Advance the simulation and deliver each begin-contact to `listener`
    /// from both sides. A failing callback is logged and skipped.
    pub fn step<L: ContactListener>(&mut self, delta: f32, listener: &mut L) -> StepReport {
        let (delta, contacts) = self.advance(delta);
        let mut report = StepReport {
            delta,
            contacts: contacts.len(),
            failed_callbacks: 0,
        };
        for contact in contacts {
            trace!(a = ?contact.a, b = ?contact.b, "begin contact");
            report.failed_callbacks += self.dispatch(listener, contact.a, contact.b);
            report.failed_callbacks += self.dispatch(listener, contact.b, contact.a);
        }
        report
    }

    fn dispatch<L: ContactListener>(
        &mut self,
        listener: &mut L,
        ours: BodyTag,
        other: BodyTag,
    ) -> usize {
        match listener.begin_contact(self, ours, other) {
            Ok(()) => 0,
            Err(err) => {
                warn!(?ours, ?other, error = %err, "contact handler failed");
                1
            }
        }
    }
}

impl Default for PhysicsWorld {
    fn default() -> Self {
        Self::new(PHYSICS_MAX_STEP)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::PLAYER_RADIUS;

    struct Recorder {
        seen: Vec<(BodyTag, BodyTag)>,
        fail_on_walls: bool,
    }

    impl ContactListener for Recorder {
        fn begin_contact(
            &mut self,
            _physics: &mut PhysicsWorld,
            ours: BodyTag,
            other: BodyTag,
        ) -> Result<(), InteractionError> {
            self.seen.push((ours, other));
            if self.fail_on_walls && matches!(ours, BodyTag::Wall { .. }) {
                return Err(InteractionError::Rejected("wall handler"));
            }
            Ok(())
        }
    }

    fn entity(world: &mut hecs::World) -> Entity {
        world.spawn(())
    }

    #[test]
    fn test_collision_matrix() {
        let player_shot = CollisionFilter::projectile(Faction::Player);
        let enemy_shot = CollisionFilter::projectile(Faction::Enemy);

        assert!(player_shot.allows(&CollisionFilter::creature()));
        assert!(player_shot.allows(&CollisionFilter::terrain()));
        assert!(!player_shot.allows(&CollisionFilter::player()));
        assert!(!player_shot.allows(&enemy_shot));
        assert!(!player_shot.allows(&player_shot));

        assert!(enemy_shot.allows(&CollisionFilter::player()));
        assert!(enemy_shot.allows(&CollisionFilter::terrain()));
        assert!(!enemy_shot.allows(&CollisionFilter::creature()));

        assert!(CollisionFilter::player_trigger().allows(&CollisionFilter::player()));
        assert!(!CollisionFilter::player_trigger().allows(&CollisionFilter::creature()));
        assert!(!CollisionFilter::player_trigger().allows(&player_shot));
        assert!(!CollisionFilter::player_trigger().allows(&CollisionFilter::terrain()));
    }

    #[test]
    fn test_step_is_capped() {
        let mut physics = PhysicsWorld::new(1.0 / 30.0);
        let (delta, _) = physics.advance(0.5);
        assert!((delta - 1.0 / 30.0).abs() < 1e-6);
        let (delta, _) = physics.advance(-1.0);
        assert_eq!(delta, 0.0);
    }

    #[test]
    fn test_remove_body_twice_is_harmless() {
        let mut world = hecs::World::new();
        let e = entity(&mut world);
        let mut physics = PhysicsWorld::default();
        let handle = physics.create_body(BodySpec::actor(
            Vec2::new(2.0, 2.0),
            Shape::Ball { radius: PLAYER_RADIUS },
            CollisionFilter::player(),
            BodyTag::Player(e),
        ));
        assert!(physics.contains(handle));
        assert!(physics.remove_body(handle));
        assert!(!physics.remove_body(handle));
        assert!(physics.position(handle).is_none());
        assert_eq!(physics.body_count(), 0);
    }

    #[test]
    fn test_damping_slows_actor() {
        let mut world = hecs::World::new();
        let e = entity(&mut world);
        let mut physics = PhysicsWorld::default();
        let handle = physics.create_body(
            BodySpec::actor(
                Vec2::new(5.0, 5.0),
                Shape::Ball { radius: PLAYER_RADIUS },
                CollisionFilter::player(),
                BodyTag::Player(e),
            )
            .damping(10.0)
            .launched(Vec2::new(4.0, 0.0)),
        );
        for _ in 0..30 {
            physics.advance(1.0 / 60.0);
        }
        let speed = physics.velocity(handle).map(|v| v.length()).unwrap_or(f32::MAX);
        assert!(speed < 1.0, "speed {speed} should have decayed");
    }

    #[test]
    fn test_listener_error_does_not_stop_dispatch() {
        let mut world = hecs::World::new();
        let e = entity(&mut world);
        let mut physics = PhysicsWorld::default();
        physics.add_terrain_fixture(Vec2::new(3.5, 3.5), Vec2::splat(0.5), BodyTag::Wall { x: 3, y: 3 });
        physics.create_body(
            BodySpec::actor(
                Vec2::new(2.0, 3.5),
                Shape::Ball { radius: PLAYER_RADIUS },
                CollisionFilter::player(),
                BodyTag::Player(e),
            )
            .launched(Vec2::new(10.0, 0.0)),
        );

        let mut recorder = Recorder {
            seen: Vec::new(),
            fail_on_walls: true,
        };
        let mut failures = 0;
        for _ in 0..30 {
            failures += physics.step(1.0 / 60.0, &mut recorder).failed_callbacks;
        }
        assert!(failures >= 1);
        // Both perspectives were delivered despite the wall side failing
        let wall_side = recorder
            .seen
            .iter()
            .filter(|seen| **seen == (BodyTag::Wall { x: 3, y: 3 }, BodyTag::Player(e)))
            .count();
        let player_side = recorder
            .seen
            .iter()
            .filter(|seen| **seen == (BodyTag::Player(e), BodyTag::Wall { x: 3, y: 3 }))
            .count();
        assert_eq!(wall_side, failures);
        assert_eq!(player_side, failures);
    }

    #[test]
    fn test_filtered_pair_never_reports() {
        let mut world = hecs::World::new();
        let shooter = entity(&mut world);
        let player = entity(&mut world);
        let mut physics = PhysicsWorld::default();
        physics.create_body(BodySpec::actor(
            Vec2::new(4.0, 4.0),
            Shape::Ball { radius: PLAYER_RADIUS },
            CollisionFilter::player(),
            BodyTag::Player(player),
        ));
        physics.create_body(
            BodySpec::actor(
                Vec2::new(4.0, 4.0),
                Shape::Ball { radius: 0.1 },
                CollisionFilter::projectile(Faction::Player),
                BodyTag::Projectile {
                    shooter,
                    id: ProjectileId(1),
                    faction: Faction::Player,
                },
            )
            .ghost(),
        );
        let mut recorder = Recorder {
            seen: Vec::new(),
            fail_on_walls: false,
        };
        for _ in 0..5 {
            physics.step(1.0 / 60.0, &mut recorder);
        }
        assert!(recorder.seen.is_empty());
    }
}
