//! Carrying the player from one floor to the next.
//!
//! Each floor has its own physics world, so the player entity cannot move
//! between levels. What survives is the player's stats and loadout; in-flight
//! projectiles belong to the old world and are disposed with it.

use crate::components::{Armour, Gems, Health, PlayerState};
use crate::config::PlayerConfig;
use crate::content::Content;
use crate::error::ContentError;
use crate::spawning::PlayerSetup;
use crate::weapon::{Loadout, Weapon};

use super::level::Level;

/// Player state that outlives a level
#[derive(Debug, Clone)]
pub struct PlayerCarryOver {
    pub health: Health,
    pub armour: Armour,
    pub gems: Gems,
    pub keys: u32,
    pub loadout: Loadout,
}

impl PlayerCarryOver {
    /// Starting kit for a new run.
    pub fn fresh(config: &PlayerConfig, content: &Content) -> Result<Self, ContentError> {
        let def = content
            .weapon(&config.starting_weapon)
            .ok_or_else(|| ContentError::UnknownWeapon {
                owner: "player config".to_string(),
                id: config.starting_weapon.clone(),
            })?;
        Ok(Self {
            health: Health::new(config.health),
            armour: Armour::new(config.armour),
            gems: Gems::default(),
            keys: 0,
            loadout: Loadout::new(Weapon::new(def)),
        })
    }

    /// Take the player's state out of a finished level. Projectiles still in
    /// flight are disposed against the level's physics world first.
    pub fn extract(level: &mut Level) -> Option<Self> {
        let player = level.player;
        let mut query = level
            .world
            .query_one::<(&Health, &Armour, &PlayerState, &mut Loadout)>(player)
            .ok()?;
        let (health, armour, state, loadout) = query.get()?;
        loadout.dispose(&mut level.physics);
        // Ready to fire on arrival
        for weapon in loadout.weapons_mut() {
            weapon.fire_timer_ms = f32::MAX;
        }
        Some(Self {
            health: *health,
            armour: *armour,
            gems: state.gems,
            keys: state.keys,
            loadout: loadout.clone(),
        })
    }

    pub fn into_setup(self) -> PlayerSetup {
        PlayerSetup {
            health: self.health,
            armour: self.armour,
            state: PlayerState {
                gems: self.gems,
                keys: self.keys,
                ..PlayerState::default()
            },
            loadout: self.loadout,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::ResourceManifest;

    #[test]
    fn test_fresh_kit_uses_config() {
        let resources = ResourceManifest::builtin().expect("manifest");
        let content = Content::builtin(&resources).expect("content");
        let config = PlayerConfig::default();
        let kit = PlayerCarryOver::fresh(&config, &content).expect("kit");
        assert_eq!(kit.health.current, config.health);
        assert_eq!(kit.loadout.equipped().map(|w| w.id.as_str()), Some("pistol"));

        let setup = kit.into_setup();
        assert!(!setup.state.dead);
    }

    #[test]
    fn test_unknown_starting_weapon_is_an_error() {
        let resources = ResourceManifest::builtin().expect("manifest");
        let content = Content::builtin(&resources).expect("content");
        let config = PlayerConfig {
            starting_weapon: "laser".to_string(),
            ..PlayerConfig::default()
        };
        assert!(matches!(
            PlayerCarryOver::fresh(&config, &content),
            Err(ContentError::UnknownWeapon { .. })
        ));
    }
}
