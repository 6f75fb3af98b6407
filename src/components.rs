use glam::Vec2;
use serde::Deserialize;

use crate::constants::{BLINK_FRAMES, BLINK_PHASE_FRAMES, BLINK_REPEATS};
use crate::physics::BodyHandle;
use crate::resources::TextureId;

/// The rigid body an entity exclusively owns for its whole life.
#[derive(Debug, Clone, Copy)]
pub struct Body {
    pub handle: BodyHandle,
}

/// Closed set of actor variants living in the level's entity list.
/// Projectiles are owned by their weapon instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Player,
    Enemy,
    Pickup,
    Chest,
    Exit,
}

/// Soft-delete marker consumed by the level sweep.
#[derive(Debug, Clone, Copy, Default)]
pub struct Lifecycle {
    removed: bool,
}

impl Lifecycle {
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Mark for removal. Returns true only for the call that flipped the flag,
    /// so repeated handlers can tell they came second.
    pub fn mark_removed(&mut self) -> bool {
        !std::mem::replace(&mut self.removed, true)
    }
}

/// Health component, never below zero
#[derive(Debug, Clone, Copy)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        Self { current: max, max }
    }

    pub fn heal(&mut self, amount: i32) {
        self.current = (self.current + amount.max(0)).min(self.max);
    }

    /// Subtract and clamp at zero. Returns true when health is exhausted.
    pub fn take(&mut self, amount: i32) -> bool {
        self.current = (self.current - amount.max(0)).max(0);
        self.current <= 0
    }
}

/// Armour absorbs damage before health. Never below zero.
#[derive(Debug, Clone, Copy)]
pub struct Armour {
    pub current: i32,
    pub max: i32,
}

impl Armour {
    pub fn new(max: i32) -> Self {
        Self { current: max, max }
    }

    pub fn restore(&mut self, amount: i32) {
        self.current = (self.current + amount.max(0)).min(self.max);
    }
}

/// Hit-flash countdown. Frame based, re-triggerable, with a repeat counter.
///
/// Purely an overlay: an entity keeps updating normally while it blinks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Blink {
    pub frames_left: u32,
    pub repeats_left: u32,
}

impl Blink {
    pub fn trigger(&mut self) {
        self.frames_left = BLINK_FRAMES;
        self.repeats_left = BLINK_REPEATS;
    }

    pub fn tick(&mut self) {
        if self.frames_left == 0 {
            return;
        }
        self.frames_left -= 1;
        if self.frames_left == 0 && self.repeats_left > 0 {
            self.repeats_left -= 1;
            self.frames_left = BLINK_FRAMES;
        }
    }

    pub fn is_active(&self) -> bool {
        self.frames_left > 0
    }

    /// Whether the sprite is drawn flashed this frame.
    pub fn is_flashing(&self) -> bool {
        self.is_active() && (self.frames_left / BLINK_PHASE_FRAMES) % 2 == 0
    }
}

/// Sprite drawn for an entity
#[derive(Debug, Clone, Copy)]
pub struct Sprite {
    pub texture: TextureId,
}

/// Gem counters by tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Gems {
    pub red: u32,
    pub green: u32,
    pub blue: u32,
}

impl Gems {
    pub fn add(&mut self, tier: GemTier, amount: u32) {
        match tier {
            GemTier::Red => self.red += amount,
            GemTier::Green => self.green += amount,
            GemTier::Blue => self.blue += amount,
        }
    }

    pub fn total(&self) -> u32 {
        self.red + self.green + self.blue
    }
}

/// Player-only state. A dead player stays in the level but ignores input and
/// collision reactions.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerState {
    pub dead: bool,
    pub gems: Gems,
    pub keys: u32,
    /// Last non-zero aim direction
    pub aim: Vec2,
}

/// Enemy stats copied from its registry entry
#[derive(Debug, Clone, Copy)]
pub struct Enemy {
    pub kind: &'static str,
    pub damage: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GemTier {
    Red,
    Green,
    Blue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickupKind {
    Gem(GemTier),
    Key,
    Heart,
    Shield,
    Weapon(String),
}

impl PickupKind {
    pub fn name(&self) -> &str {
        match self {
            PickupKind::Gem(GemTier::Red) => "red gem",
            PickupKind::Gem(GemTier::Green) => "green gem",
            PickupKind::Gem(GemTier::Blue) => "blue gem",
            PickupKind::Key => "key",
            PickupKind::Heart => "heart",
            PickupKind::Shield => "shield",
            PickupKind::Weapon(id) => id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Pickup {
    pub kind: PickupKind,
}

/// Inclusive count range for one drop kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct DropRange {
    pub min: u32,
    pub max: u32,
}

impl DropRange {
    pub const NONE: DropRange = DropRange { min: 0, max: 0 };

    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }
}

/// Min/max counts for each resource an enemy or chest can drop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DropTable {
    pub red_gems: DropRange,
    pub green_gems: DropRange,
    pub blue_gems: DropRange,
    pub keys: DropRange,
}

impl DropTable {
    pub const EMPTY: DropTable = DropTable {
        red_gems: DropRange::NONE,
        green_gems: DropRange::NONE,
        blue_gems: DropRange::NONE,
        keys: DropRange::NONE,
    };

    /// Every kind paired with its range, in roll order.
    pub fn entries(&self) -> [(PickupKind, DropRange); 4] {
        [
            (PickupKind::Gem(GemTier::Red), self.red_gems),
            (PickupKind::Gem(GemTier::Green), self.green_gems),
            (PickupKind::Gem(GemTier::Blue), self.blue_gems),
            (PickupKind::Key, self.keys),
        ]
    }
}

/// Loot container opened with a key
#[derive(Debug, Clone)]
pub struct Chest {
    pub opened: bool,
    pub drops: DropTable,
    pub hearts: DropRange,
    pub shields: DropRange,
    /// One of these is dropped as a weapon pickup, if any
    pub weapons: Vec<String>,
    pub open_texture: TextureId,
}

/// Level exit marker
#[derive(Debug, Clone, Copy)]
pub struct Exit;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_clamps_at_zero() {
        let mut health = Health::new(3);
        assert!(!health.take(2));
        assert!(health.take(5));
        assert_eq!(health.current, 0);
        health.heal(10);
        assert_eq!(health.current, 3);
    }

    #[test]
    fn test_mark_removed_reports_first_call_only() {
        let mut life = Lifecycle::default();
        assert!(life.mark_removed());
        assert!(!life.mark_removed());
        assert!(life.is_removed());
    }

    #[test]
    fn test_blink_runs_all_repeats() {
        let mut blink = Blink::default();
        blink.trigger();
        let mut frames = 0;
        while blink.is_active() {
            blink.tick();
            frames += 1;
        }
        assert_eq!(frames, BLINK_FRAMES * (BLINK_REPEATS + 1));
    }

    #[test]
    fn test_blink_retrigger_restarts() {
        let mut blink = Blink::default();
        blink.trigger();
        for _ in 0..BLINK_FRAMES + 3 {
            blink.tick();
        }
        blink.trigger();
        assert_eq!(blink.frames_left, BLINK_FRAMES);
        assert_eq!(blink.repeats_left, BLINK_REPEATS);
    }

    #[test]
    fn test_blink_alternates() {
        let mut blink = Blink::default();
        blink.trigger();
        let mut phases = Vec::new();
        for _ in 0..BLINK_FRAMES {
            phases.push(blink.is_flashing());
            blink.tick();
        }
        assert!(phases.contains(&true));
        assert!(phases.contains(&false));
    }

    #[test]
    fn test_gems_by_tier() {
        let mut gems = Gems::default();
        gems.add(GemTier::Blue, 2);
        gems.add(GemTier::Red, 1);
        assert_eq!(gems.blue, 2);
        assert_eq!(gems.total(), 3);
    }
}
