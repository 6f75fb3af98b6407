//! Weapon, theme and presentation definitions.
//!
//! Definitions are authored as JSON (`assets/content.json`) and validated
//! eagerly against the resource manifest and the enemy registry. Every name is
//! resolved to a handle here; a missing texture, an empty bullet list or an
//! unknown enemy type aborts loading with a [`ContentError`]. Once loaded, the
//! simulation only ever sees resolved definitions.

use std::collections::BTreeMap;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Deserialize;
use tracing::info;

use crate::components::{DropRange, DropTable, GemTier};
use crate::error::ContentError;
use crate::resources::{
    require_effect, require_font, require_sound, require_texture, EffectId, FontId, ResourceProvider,
    SoundId, TextureId,
};
use crate::spawning::{enemy_def, EnemyDef};

// Raw definitions as authored

#[derive(Debug, Clone, Deserialize)]
struct ContentFile {
    presentation: PresentationSpec,
    weapons: Vec<WeaponSpec>,
    themes: Vec<ThemeSpec>,
}

#[derive(Debug, Clone, Deserialize)]
struct PresentationSpec {
    player: String,
    red_gem: String,
    green_gem: String,
    blue_gem: String,
    key: String,
    heart: String,
    shield: String,
    chest_closed: String,
    chest_open: String,
    exit: String,
    hud_font: String,
    flash_effect: String,
}

#[derive(Debug, Clone, Deserialize)]
struct WeaponSpec {
    id: String,
    texture: String,
    bullets: Vec<String>,
    fire_sound: String,
    fire_rate_ms: f32,
    speed: f32,
    range: f32,
    damage: i32,
    knockback: f32,
    #[serde(default)]
    ammo: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
struct SpawnSpec {
    enemy: String,
    #[serde(default = "default_weight")]
    weight: u32,
}

fn default_weight() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
struct ThemeSpec {
    name: String,
    wall_texture: String,
    floor_texture: String,
    pocket_texture: String,
    clusters: DropRange,
    cluster_size: DropRange,
    spawn_table: Vec<SpawnSpec>,
    chests: DropRange,
    #[serde(default)]
    chest_drops: DropTable,
    #[serde(default)]
    chest_hearts: DropRange,
    #[serde(default)]
    chest_shields: DropRange,
    #[serde(default)]
    chest_weapons: Vec<String>,
}

// Resolved definitions

#[derive(Debug, Clone)]
pub struct WeaponDef {
    pub id: String,
    pub texture: TextureId,
    pub bullet_textures: Vec<TextureId>,
    pub fire_sound: SoundId,
    pub fire_rate_ms: f32,
    pub speed: f32,
    /// Distance budget of each projectile
    pub range: f32,
    pub damage: i32,
    pub knockback: f32,
    pub ammo: Option<u32>,
}

/// One spawn-table row, resolved against the enemy registry.
#[derive(Debug, Clone)]
pub struct SpawnEntry {
    pub enemy: &'static EnemyDef,
    pub texture: TextureId,
    pub weight: u32,
}

#[derive(Debug, Clone)]
pub struct ThemeDef {
    pub name: String,
    pub wall_texture: TextureId,
    pub floor_texture: TextureId,
    /// Floor cells walled in on all four sides
    pub pocket_texture: TextureId,
    pub clusters: DropRange,
    pub cluster_size: DropRange,
    pub spawn_table: Vec<SpawnEntry>,
    pub chests: DropRange,
    pub chest_drops: DropTable,
    pub chest_hearts: DropRange,
    pub chest_shields: DropRange,
    pub chest_weapons: Vec<String>,
}

impl ThemeDef {
    /// Weighted pick from the spawn table.
    pub fn pick_enemy(&self, rng: &mut impl Rng) -> Option<&SpawnEntry> {
        self.spawn_table
            .choose_weighted(rng, |entry| entry.weight)
            .ok()
    }
}

/// Textures and handles used by entities that are not theme specific.
#[derive(Debug, Clone)]
pub struct Presentation {
    pub player: TextureId,
    pub gems: [TextureId; 3],
    pub key: TextureId,
    pub heart: TextureId,
    pub shield: TextureId,
    pub chest_closed: TextureId,
    pub chest_open: TextureId,
    pub exit: TextureId,
    pub hud_font: FontId,
    pub flash_effect: EffectId,
}

impl Presentation {
    pub fn gem(&self, tier: GemTier) -> TextureId {
        match tier {
            GemTier::Red => self.gems[0],
            GemTier::Green => self.gems[1],
            GemTier::Blue => self.gems[2],
        }
    }
}

/// Validated content
#[derive(Debug, Clone)]
pub struct Content {
    pub presentation: Presentation,
    weapons: BTreeMap<String, WeaponDef>,
    themes: Vec<ThemeDef>,
}

impl Content {
    pub fn from_json(json: &str, resources: &dyn ResourceProvider) -> Result<Self, ContentError> {
        let file: ContentFile = serde_json::from_str(json).map_err(|source| ContentError::Parse {
            what: "content",
            source,
        })?;

        let presentation = resolve_presentation(&file.presentation, resources)?;

        let mut weapons = BTreeMap::new();
        for spec in &file.weapons {
            let def = resolve_weapon(spec, resources)?;
            weapons.insert(def.id.clone(), def);
        }

        if file.themes.is_empty() {
            return Err(ContentError::NoThemes);
        }
        let themes = file
            .themes
            .iter()
            .map(|spec| resolve_theme(spec, &weapons, resources))
            .collect::<Result<Vec<_>, _>>()?;

        info!(weapons = weapons.len(), themes = themes.len(), "content loaded");
        Ok(Self {
            presentation,
            weapons,
            themes,
        })
    }

    /// Content shipped with the crate.
    pub fn builtin(resources: &dyn ResourceProvider) -> Result<Self, ContentError> {
        Self::from_json(include_str!("../assets/content.json"), resources)
    }

    /// Weapon by id; `None` for an unknown id.
    pub fn weapon(&self, id: &str) -> Option<&WeaponDef> {
        self.weapons.get(id)
    }

    /// Theme for a floor; floors cycle through the theme list.
    pub fn theme_for_floor(&self, floor: u32) -> &ThemeDef {
        &self.themes[floor as usize % self.themes.len()]
    }

    pub fn theme_count(&self) -> usize {
        self.themes.len()
    }
}

fn resolve_presentation(
    spec: &PresentationSpec,
    resources: &dyn ResourceProvider,
) -> Result<Presentation, ContentError> {
    let owner = "presentation";
    let tex = |name: &str| require_texture(resources, owner, name);
    Ok(Presentation {
        player: tex(&spec.player)?,
        gems: [tex(&spec.red_gem)?, tex(&spec.green_gem)?, tex(&spec.blue_gem)?],
        key: tex(&spec.key)?,
        heart: tex(&spec.heart)?,
        shield: tex(&spec.shield)?,
        chest_closed: tex(&spec.chest_closed)?,
        chest_open: tex(&spec.chest_open)?,
        exit: tex(&spec.exit)?,
        hud_font: require_font(resources, owner, &spec.hud_font)?,
        flash_effect: require_effect(resources, owner, &spec.flash_effect)?,
    })
}

fn resolve_weapon(spec: &WeaponSpec, resources: &dyn ResourceProvider) -> Result<WeaponDef, ContentError> {
    let owner = format!("weapon `{}`", spec.id);
    if spec.bullets.is_empty() {
        return Err(ContentError::NoBullets(spec.id.clone()));
    }
    for (field, value) in [("speed", spec.speed), ("range", spec.range)] {
        if value <= 0.0 {
            return Err(ContentError::NotPositive {
                owner: owner.clone(),
                field,
            });
        }
    }
    let bullet_textures = spec
        .bullets
        .iter()
        .map(|name| require_texture(resources, &owner, name))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(WeaponDef {
        id: spec.id.clone(),
        texture: require_texture(resources, &owner, &spec.texture)?,
        bullet_textures,
        fire_sound: require_sound(resources, &owner, &spec.fire_sound)?,
        fire_rate_ms: spec.fire_rate_ms.max(0.0),
        speed: spec.speed,
        range: spec.range,
        damage: spec.damage,
        knockback: spec.knockback,
        ammo: spec.ammo,
    })
}

fn check_range(owner: &str, field: &'static str, range: DropRange) -> Result<(), ContentError> {
    if range.min > range.max {
        return Err(ContentError::InvertedRange {
            owner: owner.to_string(),
            field,
            min: range.min,
            max: range.max,
        });
    }
    Ok(())
}

pub(crate) fn check_drop_table(owner: &str, table: &DropTable) -> Result<(), ContentError> {
    check_range(owner, "red_gems", table.red_gems)?;
    check_range(owner, "green_gems", table.green_gems)?;
    check_range(owner, "blue_gems", table.blue_gems)?;
    check_range(owner, "keys", table.keys)
}

fn resolve_theme(
    spec: &ThemeSpec,
    weapons: &BTreeMap<String, WeaponDef>,
    resources: &dyn ResourceProvider,
) -> Result<ThemeDef, ContentError> {
    let owner = format!("theme `{}`", spec.name);
    check_range(&owner, "clusters", spec.clusters)?;
    check_range(&owner, "cluster_size", spec.cluster_size)?;
    check_range(&owner, "chests", spec.chests)?;
    check_range(&owner, "chest_hearts", spec.chest_hearts)?;
    check_range(&owner, "chest_shields", spec.chest_shields)?;
    check_drop_table(&owner, &spec.chest_drops)?;

    if spec.spawn_table.iter().all(|row| row.weight == 0) {
        return Err(ContentError::EmptySpawnTable(spec.name.clone()));
    }

    // Every referenced enemy type resolves now, not at spawn time
    let mut spawn_table = Vec::with_capacity(spec.spawn_table.len());
    for row in &spec.spawn_table {
        let enemy = enemy_def(&row.enemy).ok_or_else(|| ContentError::UnknownEnemy {
            theme: spec.name.clone(),
            kind: row.enemy.clone(),
        })?;
        let enemy_owner = format!("enemy `{}`", enemy.key);
        check_drop_table(&enemy_owner, &enemy.drops)?;
        if let Some(weapon) = enemy.weapon {
            if !weapons.contains_key(weapon) {
                return Err(ContentError::UnknownWeapon {
                    owner: enemy_owner,
                    id: weapon.to_string(),
                });
            }
        }
        spawn_table.push(SpawnEntry {
            enemy,
            texture: require_texture(resources, &enemy_owner, enemy.texture)?,
            weight: row.weight,
        });
    }

    for id in &spec.chest_weapons {
        if !weapons.contains_key(id) {
            return Err(ContentError::UnknownWeapon {
                owner: owner.clone(),
                id: id.clone(),
            });
        }
    }

    Ok(ThemeDef {
        name: spec.name.clone(),
        wall_texture: require_texture(resources, &owner, &spec.wall_texture)?,
        floor_texture: require_texture(resources, &owner, &spec.floor_texture)?,
        pocket_texture: require_texture(resources, &owner, &spec.pocket_texture)?,
        clusters: spec.clusters,
        cluster_size: spec.cluster_size,
        spawn_table,
        chests: spec.chests,
        chest_drops: spec.chest_drops,
        chest_hearts: spec.chest_hearts,
        chest_shields: spec.chest_shields,
        chest_weapons: spec.chest_weapons.clone(),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::resources::ResourceManifest;

    /// Bare weapon definition for tests that don't go through JSON.
    pub(crate) fn weapon_def(id: &str, fire_rate_ms: f32) -> WeaponDef {
        WeaponDef {
            id: id.to_string(),
            texture: TextureId(0),
            bullet_textures: vec![TextureId(1)],
            fire_sound: SoundId(0),
            fire_rate_ms,
            speed: 12.0,
            range: 8.0,
            damage: 1,
            knockback: 2.5,
            ammo: None,
        }
    }

    fn builtin_json() -> serde_json::Value {
        serde_json::from_str(include_str!("../assets/content.json")).expect("content json")
    }

    fn load(value: &serde_json::Value) -> Result<Content, ContentError> {
        let resources = ResourceManifest::builtin().expect("manifest");
        Content::from_json(&value.to_string(), &resources)
    }

    #[test]
    fn test_builtin_content_validates() {
        let resources = ResourceManifest::builtin().expect("manifest");
        let content = Content::builtin(&resources).expect("builtin content");
        assert!(content.weapon("pistol").is_some());
        assert!(content.weapon("bone_bow").is_some());
        assert!(content.weapon("laser").is_none());
        assert!(content.theme_count() >= 2);
    }

    #[test]
    fn test_floors_cycle_themes() {
        let resources = ResourceManifest::builtin().expect("manifest");
        let content = Content::builtin(&resources).expect("builtin content");
        let count = content.theme_count() as u32;
        assert_eq!(content.theme_for_floor(0).name, content.theme_for_floor(count).name);
    }

    #[test]
    fn test_unknown_enemy_is_fatal() {
        let mut json = builtin_json();
        json["themes"][0]["spawn_table"][0]["enemy"] = "dragon".into();
        assert!(matches!(load(&json), Err(ContentError::UnknownEnemy { kind, .. }) if kind == "dragon"));
    }

    #[test]
    fn test_empty_bullet_list_is_fatal() {
        let mut json = builtin_json();
        json["weapons"][0]["bullets"] = serde_json::json!([]);
        assert!(matches!(load(&json), Err(ContentError::NoBullets(_))));
    }

    #[test]
    fn test_missing_texture_is_fatal() {
        let mut json = builtin_json();
        json["themes"][0]["wall_texture"] = "no_such_wall".into();
        assert!(matches!(load(&json), Err(ContentError::MissingTexture { name, .. }) if name == "no_such_wall"));
    }

    #[test]
    fn test_unknown_chest_weapon_is_fatal() {
        let mut json = builtin_json();
        json["themes"][0]["chest_weapons"] = serde_json::json!(["railgun"]);
        assert!(matches!(load(&json), Err(ContentError::UnknownWeapon { id, .. }) if id == "railgun"));
    }

    #[test]
    fn test_inverted_range_is_fatal() {
        let mut json = builtin_json();
        json["themes"][0]["chests"] = serde_json::json!({"min": 3, "max": 1});
        assert!(matches!(load(&json), Err(ContentError::InvertedRange { field: "chests", .. })));
    }

    #[test]
    fn test_no_themes_is_fatal() {
        let mut json = builtin_json();
        json["themes"] = serde_json::json!([]);
        assert!(matches!(load(&json), Err(ContentError::NoThemes)));
    }

    #[test]
    fn test_weighted_pick_skips_zero_weight() {
        let resources = ResourceManifest::builtin().expect("manifest");
        let content = Content::builtin(&resources).expect("builtin content");
        let mut theme = content.theme_for_floor(0).clone();
        for (i, entry) in theme.spawn_table.iter_mut().enumerate() {
            entry.weight = if i == 0 { 1 } else { 0 };
        }
        let first = theme.spawn_table[0].enemy.key;
        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            assert_eq!(theme.pick_enemy(&mut rng).map(|e| e.enemy.key), Some(first));
        }
    }
}
