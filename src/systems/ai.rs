//! Enemy AI decision-making.
//!
//! Each enemy carries an [`AiController`]. Once per frame the level hands it a
//! [`Perception`] and applies the returned [`Decision`]: a steering force (the
//! body's damping supplies deceleration) and, for shooters, an aim direction.
//! Decisions never depend on other enemies, so update order does not matter.

use glam::Vec2;
use rand::Rng;
use tracing::debug;

use crate::constants::{AI_WALK_THRESHOLD_MAX_MS, AI_WALK_THRESHOLD_MIN_MS};

/// How an enemy picks its direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Wanders forever, ignoring the player
    Wanderer,
    /// Wanders until the player comes within its aggro radius
    Seeker,
    /// Always closes in on the player and shoots
    Shooter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiState {
    Wander,
    Seek,
}

/// What an enemy knows this frame. `player` is `None` when the player is dead
/// or absent.
#[derive(Debug, Clone, Copy)]
pub struct Perception {
    pub position: Vec2,
    pub player: Option<Vec2>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Decision {
    pub force: Vec2,
    /// Direction to fire in, for shooters
    pub aim: Option<Vec2>,
}

#[derive(Debug, Clone, Copy)]
pub struct AiController {
    pub behavior: Behavior,
    pub state: AiState,
    pub direction: Vec2,
    pub walk_timer_ms: f32,
    pub walk_threshold_ms: f32,
    pub aggro_radius: f32,
    pub move_force: f32,
}

impl AiController {
    pub fn new(behavior: Behavior, aggro_radius: f32, move_force: f32, rng: &mut impl Rng) -> Self {
        Self {
            behavior,
            state: AiState::Wander,
            direction: Vec2::ZERO,
            walk_timer_ms: 0.0,
            walk_threshold_ms: walk_threshold(rng),
            aggro_radius,
            move_force,
        }
    }

    /// Pick this frame's direction and force.
    pub fn think(&mut self, perception: Perception, dt_ms: f32, rng: &mut impl Rng) -> Decision {
        let mut aim = None;
        match self.behavior {
            Behavior::Wanderer => self.wander(dt_ms, rng),
            Behavior::Seeker => {
                let next = update_state_machine(perception, self.aggro_radius);
                if next != self.state {
                    debug!(from = ?self.state, to = ?next, "ai state change");
                    self.state = next;
                }
                match (self.state, perception.player) {
                    (AiState::Seek, Some(target)) => {
                        self.direction = (target - perception.position).normalize_or_zero();
                    }
                    _ => self.wander(dt_ms, rng),
                }
            }
            Behavior::Shooter => match perception.player {
                Some(target) => {
                    self.state = AiState::Seek;
                    self.direction = (target - perception.position).normalize_or_zero();
                    if self.direction != Vec2::ZERO {
                        aim = Some(self.direction);
                    }
                }
                None => {
                    // Stand down entirely while the player is dead
                    self.state = AiState::Wander;
                    self.direction = Vec2::ZERO;
                }
            },
        }
        Decision {
            force: self.direction * self.move_force,
            aim,
        }
    }

    /// Keep the last direction until the walk timer passes its threshold,
    /// then re-roll both the direction and the threshold.
    fn wander(&mut self, dt_ms: f32, rng: &mut impl Rng) {
        self.walk_timer_ms += dt_ms;
        if self.walk_timer_ms > self.walk_threshold_ms {
            self.walk_timer_ms = 0.0;
            self.walk_threshold_ms = walk_threshold(rng);
            self.direction = random_direction(rng);
        }
    }
}

/// Seek while the player is alive and within `aggro_radius`, wander otherwise.
fn update_state_machine(perception: Perception, aggro_radius: f32) -> AiState {
    match perception.player {
        Some(target) if perception.position.distance(target) <= aggro_radius => AiState::Seek,
        _ => AiState::Wander,
    }
}

fn walk_threshold(rng: &mut impl Rng) -> f32 {
    rng.gen_range(AI_WALK_THRESHOLD_MIN_MS..=AI_WALK_THRESHOLD_MAX_MS) as f32
}

/// One of the nine combinations of {-1, 0, 1} on each axis.
fn random_direction(rng: &mut impl Rng) -> Vec2 {
    Vec2::new(rng.gen_range(-1..=1) as f32, rng.gen_range(-1..=1) as f32)
}
