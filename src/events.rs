//! Game event system for decoupled communication with presentation.
//!
//! The simulation pushes events while a frame runs; audio, VFX and UI drain
//! them afterwards. Nothing inside the simulation reads them back.

use glam::Vec2;
use hecs::Entity;

use crate::components::PickupKind;
use crate::resources::SoundId;

/// Game events that collaborators can subscribe to
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A weapon fired; presentation plays `sound`
    WeaponFired {
        shooter: Entity,
        weapon: String,
        sound: SoundId,
    },
    /// An entity took damage
    Damaged {
        target: Entity,
        amount: i32,
        position: Vec2,
    },
    /// An enemy ran out of health
    EnemyKilled {
        entity: Entity,
        kind: &'static str,
        position: Vec2,
    },
    /// The player picked something up
    PickupCollected { kind: PickupKind },
    /// A chest was opened with a key
    ChestOpened { chest: Entity, position: Vec2 },
    /// The player touched a chest without a key
    ChestLocked { chest: Entity },
    /// The player died; the entity stays in the level
    PlayerDied { position: Vec2 },
    /// The player reached the exit
    LevelCompleted { floor: u32 },
}

/// Simple event queue - events are pushed during update, drained after
#[derive(Debug, Default)]
pub struct EventQueue {
    events: Vec<GameEvent>,
}

impl EventQueue {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Push an event to be processed later
    pub fn push(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Drain all events for processing
    pub fn drain(&mut self) -> impl Iterator<Item = GameEvent> + '_ {
        self.events.drain(..)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameEvent> {
        self.events.iter()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if there are pending events
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
