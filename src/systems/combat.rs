//! Damage rules for the player and enemies.
//!
//! Both entry points are called from collision handlers. They tolerate an
//! already-removed or already-dead target by doing nothing, since one step can
//! deliver several contacts to the same entity.

use glam::Vec2;
use hecs::{Entity, World};
use tracing::{debug, info};

use crate::components::{Armour, Blink, DropTable, Enemy, Health, Lifecycle, PlayerState};
use crate::error::InteractionError;
use crate::events::{EventQueue, GameEvent};

/// Result of running one hit through armour and health.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArmourOutcome {
    pub armour: i32,
    pub health: i32,
    pub dead: bool,
}

/// Armour absorbs first, the remainder comes off health. Neither goes below 0.
pub fn absorb_damage(armour: i32, health: i32, damage: i32) -> ArmourOutcome {
    let damage = damage.max(0);
    let armour = armour.max(0);
    let overflow = (damage - armour).max(0);
    let health = (health - overflow).max(0);
    ArmourOutcome {
        armour: (armour - damage).max(0),
        health,
        dead: health <= 0,
    }
}

/// Apply damage to the player. Returns `None` when the player was already
/// dead and nothing changed.
pub fn apply_player_damage(
    world: &mut World,
    player: Entity,
    amount: i32,
    position: Vec2,
    events: &mut EventQueue,
) -> Result<Option<ArmourOutcome>, InteractionError> {
    let mut query = world
        .query_one::<(&mut Health, &mut Armour, &mut PlayerState, &mut Blink)>(player)
        .map_err(|_| InteractionError::MissingEntity(player))?;
    let Some((health, armour, state, blink)) = query.get() else {
        return Err(InteractionError::component::<PlayerState>(player));
    };
    if state.dead {
        return Ok(None);
    }

    let outcome = absorb_damage(armour.current, health.current, amount);
    armour.current = outcome.armour;
    health.current = outcome.health;
    blink.trigger();
    events.push(GameEvent::Damaged {
        target: player,
        amount,
        position,
    });

    if outcome.dead {
        state.dead = true;
        info!(x = position.x, y = position.y, "player died");
        events.push(GameEvent::PlayerDied { position });
    }
    Ok(Some(outcome))
}

/// What an enemy hit produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyHit {
    /// Target was already removed; nothing happened
    Ignored,
    Wounded,
    /// Health ran out; the enemy is marked removed and its table is ready to roll
    Killed(DropTable),
}

/// Apply damage straight to an enemy's health.
pub fn damage_enemy(
    world: &mut World,
    enemy: Entity,
    amount: i32,
    position: Vec2,
    events: &mut EventQueue,
) -> Result<EnemyHit, InteractionError> {
    let mut query = world
        .query_one::<(&mut Health, &mut Lifecycle, &mut Blink, &Enemy, &DropTable)>(enemy)
        .map_err(|_| InteractionError::MissingEntity(enemy))?;
    let Some((health, lifecycle, blink, kind, drops)) = query.get() else {
        return Err(InteractionError::component::<Enemy>(enemy));
    };
    if lifecycle.is_removed() {
        return Ok(EnemyHit::Ignored);
    }

    blink.trigger();
    events.push(GameEvent::Damaged {
        target: enemy,
        amount,
        position,
    });
    if !health.take(amount) {
        return Ok(EnemyHit::Wounded);
    }

    lifecycle.mark_removed();
    debug!(kind = kind.kind, "enemy killed");
    events.push(GameEvent::EnemyKilled {
        entity: enemy,
        kind: kind.kind,
        position,
    });
    Ok(EnemyHit::Killed(*drops))
}
