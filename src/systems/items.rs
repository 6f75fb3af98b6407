//! Loot rolls and pickup collection.

use glam::Vec2;
use hecs::{Entity, World};
use rand::Rng;
use tracing::{debug, warn};

use crate::components::{
    Armour, DropRange, DropTable, Health, Lifecycle, Pickup, PickupKind, PlayerState,
};
use crate::constants::*;
use crate::content::Content;
use crate::error::InteractionError;
use crate::events::{EventQueue, GameEvent};
use crate::resources::TextureId;
use crate::weapon::{Loadout, Weapon};

/// Independent uniform draw in `[min, max]` for each kind in the table.
/// Kinds that rolled zero are left out.
pub fn roll_drops(table: &DropTable, rng: &mut impl Rng) -> Vec<(PickupKind, u32)> {
    table
        .entries()
        .into_iter()
        .filter_map(|(kind, range)| {
            let count = roll_count(range, rng);
            (count > 0).then_some((kind, count))
        })
        .collect()
}

/// One uniform count. An inverted range never reaches here after content
/// validation, but yields zero rather than panicking.
pub fn roll_count(range: DropRange, rng: &mut impl Rng) -> u32 {
    if range.min > range.max {
        return 0;
    }
    rng.gen_range(range.min..=range.max)
}

/// Drop position around `origin`, offset by up to [`DROP_JITTER`] per axis.
pub fn jittered(origin: Vec2, rng: &mut impl Rng) -> Vec2 {
    origin
        + Vec2::new(
            rng.gen_range(-DROP_JITTER..=DROP_JITTER),
            rng.gen_range(-DROP_JITTER..=DROP_JITTER),
        )
}

/// Texture a pickup of this kind is drawn with.
pub fn pickup_texture(kind: &PickupKind, content: &Content) -> Option<TextureId> {
    let art = &content.presentation;
    match kind {
        PickupKind::Gem(tier) => Some(art.gem(*tier)),
        PickupKind::Key => Some(art.key),
        PickupKind::Heart => Some(art.heart),
        PickupKind::Shield => Some(art.shield),
        PickupKind::Weapon(id) => content.weapon(id).map(|def| def.texture),
    }
}

/// Pull toward the player while inside the magnet radius.
pub fn magnet_force(pickup: Vec2, player: Option<Vec2>) -> Vec2 {
    match player {
        Some(target) if pickup.distance(target) <= PICKUP_MAGNET_RADIUS => {
            (target - pickup).normalize_or_zero() * PICKUP_MAGNET_FORCE
        }
        _ => Vec2::ZERO,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Collection {
    Collected(PickupKind),
    /// Already collected this step, or the player is dead
    Ignored,
}

/// Hand a pickup to the player and mark it removed.
pub fn collect_pickup(
    world: &mut World,
    content: &Content,
    player: Entity,
    pickup: Entity,
    events: &mut EventQueue,
) -> Result<Collection, InteractionError> {
    let kind = {
        let mut query = world
            .query_one::<(&Pickup, &mut Lifecycle)>(pickup)
            .map_err(|_| InteractionError::MissingEntity(pickup))?;
        let (item, lifecycle) = query
            .get()
            .ok_or_else(|| InteractionError::component::<Pickup>(pickup))?;
        if lifecycle.is_removed() {
            return Ok(Collection::Ignored);
        }
        item.kind.clone()
    };

    let mut query = world
        .query_one::<(&mut PlayerState, &mut Health, &mut Armour, &mut Loadout)>(player)
        .map_err(|_| InteractionError::MissingEntity(player))?;
    let (state, health, armour, loadout) = query
        .get()
        .ok_or_else(|| InteractionError::component::<PlayerState>(player))?;
    if state.dead {
        return Ok(Collection::Ignored);
    }

    match &kind {
        PickupKind::Gem(tier) => state.gems.add(*tier, 1),
        PickupKind::Key => state.keys += 1,
        PickupKind::Heart => health.heal(HEART_HEAL),
        PickupKind::Shield => armour.restore(SHIELD_ARMOUR),
        PickupKind::Weapon(id) => {
            let Some(def) = content.weapon(id) else {
                warn!(weapon = %id, "pickup names unknown weapon");
                return Err(InteractionError::Rejected("unknown weapon pickup"));
            };
            // A duplicate refills instead of taking a slot
            if !loadout.refill(&def.id, def.ammo) {
                let placement = loadout.add(Weapon::new(def));
                debug!(weapon = %def.id, ?placement, "weapon picked up");
            }
        }
    }
    drop(query);

    if let Ok(mut lifecycle) = world.get::<&mut Lifecycle>(pickup) {
        lifecycle.mark_removed();
    }
    events.push(GameEvent::PickupCollected { kind: kind.clone() });
    Ok(Collection::Collected(kind))
}
