//! Scripted player for the headless runner.
//!
//! Shoots the nearest enemy in sight, walks to pickups and then the exit, and
//! wanders for a while whenever it stops making progress against a wall.

use glam::Vec2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::constants::*;
use crate::engine::Level;
use crate::systems::movement::PlayerIntent;

#[derive(Debug, Clone)]
pub struct Autopilot {
    rng: StdRng,
    last_position: Option<Vec2>,
    stuck_ms: f32,
    wander_ms: f32,
    wander: Vec2,
}

impl Autopilot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            last_position: None,
            stuck_ms: 0.0,
            wander_ms: 0.0,
            wander: Vec2::ZERO,
        }
    }

    /// Intent for the next frame of `level`.
    pub fn decide(&mut self, level: &Level, dt_ms: f32) -> PlayerIntent {
        let Some(me) = level.player_position() else {
            return PlayerIntent::default();
        };
        if !level.is_player_alive() {
            return PlayerIntent::default();
        }
        self.track_progress(me, dt_ms);

        let target = level.nearest_enemy(me, AUTOPILOT_SIGHT);
        let aim = target.map_or(Vec2::ZERO, |enemy| (enemy - me).normalize_or_zero());

        let movement = if self.wander_ms > 0.0 {
            self.wander_ms -= dt_ms;
            self.wander
        } else {
            level
                .nearest_pickup(me, AUTOPILOT_SIGHT)
                .or_else(|| level.exit_position())
                .map_or(Vec2::ZERO, |goal| (goal - me).normalize_or_zero())
        };

        // Swap away from an empty weapon rather than clicking on it
        let empty = level.hud().map_or(false, |hud| hud.ammo == Some(0));

        PlayerIntent {
            movement,
            aim,
            fire: target.is_some() && !empty,
            select_slot: None,
            cycle_weapon: empty,
        }
    }

    fn track_progress(&mut self, me: Vec2, dt_ms: f32) {
        let moved = self
            .last_position
            .map_or(f32::MAX, |last| last.distance(me));
        self.last_position = Some(me);
        if moved > AUTOPILOT_STUCK_DISTANCE {
            self.stuck_ms = 0.0;
            return;
        }
        self.stuck_ms += dt_ms;
        if self.stuck_ms > AUTOPILOT_STUCK_MS && self.wander_ms <= 0.0 {
            self.stuck_ms = 0.0;
            self.wander_ms = AUTOPILOT_WANDER_MS;
            let angle = self.rng.gen_range(0.0..std::f32::consts::TAU);
            self.wander = Vec2::from_angle(angle);
            debug!(x = self.wander.x, y = self.wander.y, "autopilot stuck, wandering");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gets_unstuck() {
        let mut pilot = Autopilot::new(1);
        let here = Vec2::new(3.0, 3.0);
        for _ in 0..60 {
            pilot.track_progress(here, 16.0);
        }
        assert!(pilot.wander_ms > 0.0);
        assert!((pilot.wander.length() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_moving_resets_stuck_timer() {
        let mut pilot = Autopilot::new(1);
        let mut here = Vec2::new(3.0, 3.0);
        for _ in 0..120 {
            here.x += 0.1;
            pilot.track_progress(here, 16.0);
        }
        assert_eq!(pilot.wander_ms, 0.0);
    }
}
