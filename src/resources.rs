//! Resource lookup consumed by the simulation.
//!
//! Presentation owns the actual textures, sounds, fonts and shader effects.
//! The core only needs to know whether a named resource exists and a stable
//! handle to hand back in draw items and events.

use std::collections::HashMap;

use serde::Deserialize;

use crate::error::ContentError;

macro_rules! handle_type {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);
    };
}

handle_type!(TextureId);
handle_type!(SoundId);
handle_type!(FontId);
handle_type!(EffectId);

/// Named resource lookup. Every method returns `None` for an unknown name.
pub trait ResourceProvider {
    fn texture(&self, name: &str) -> Option<TextureId>;
    fn sound_effect(&self, name: &str) -> Option<SoundId>;
    fn font(&self, name: &str) -> Option<FontId>;
    fn effect(&self, name: &str) -> Option<EffectId>;
}

/// Resource names as listed in `assets/resources.json`. Handles are the
/// position of the name in its list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ResourceManifest {
    textures: Vec<String>,
    sounds: Vec<String>,
    fonts: Vec<String>,
    effects: Vec<String>,
    #[serde(skip)]
    index: ManifestIndex,
}

#[derive(Debug, Clone, Default)]
struct ManifestIndex {
    textures: HashMap<String, u32>,
    sounds: HashMap<String, u32>,
    fonts: HashMap<String, u32>,
    effects: HashMap<String, u32>,
}

fn index_names(names: &[String]) -> HashMap<String, u32> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| (name.clone(), i as u32))
        .collect()
}

impl ResourceManifest {
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        let manifest: ResourceManifest = serde_json::from_str(json).map_err(|source| ContentError::Parse {
            what: "resource manifest",
            source,
        })?;
        Ok(manifest.indexed())
    }

    /// Manifest shipped with the crate.
    pub fn builtin() -> Result<Self, ContentError> {
        Self::from_json(include_str!("../assets/resources.json"))
    }

    pub fn from_names(textures: &[&str], sounds: &[&str], fonts: &[&str], effects: &[&str]) -> Self {
        let owned = |names: &[&str]| names.iter().map(|n| n.to_string()).collect::<Vec<_>>();
        Self {
            textures: owned(textures),
            sounds: owned(sounds),
            fonts: owned(fonts),
            effects: owned(effects),
            index: ManifestIndex::default(),
        }
        .indexed()
    }

    fn indexed(mut self) -> Self {
        self.index = ManifestIndex {
            textures: index_names(&self.textures),
            sounds: index_names(&self.sounds),
            fonts: index_names(&self.fonts),
            effects: index_names(&self.effects),
        };
        self
    }

    pub fn texture_name(&self, id: TextureId) -> Option<&str> {
        self.textures.get(id.0 as usize).map(String::as_str)
    }
}

impl ResourceProvider for ResourceManifest {
    fn texture(&self, name: &str) -> Option<TextureId> {
        self.index.textures.get(name).copied().map(TextureId)
    }

    fn sound_effect(&self, name: &str) -> Option<SoundId> {
        self.index.sounds.get(name).copied().map(SoundId)
    }

    fn font(&self, name: &str) -> Option<FontId> {
        self.index.fonts.get(name).copied().map(FontId)
    }

    fn effect(&self, name: &str) -> Option<EffectId> {
        self.index.effects.get(name).copied().map(EffectId)
    }
}

/// Load-time helpers: a missing resource is an authoring error.
pub(crate) fn require_texture(
    resources: &dyn ResourceProvider,
    owner: &str,
    name: &str,
) -> Result<TextureId, ContentError> {
    resources.texture(name).ok_or_else(|| ContentError::MissingTexture {
        owner: owner.to_string(),
        name: name.to_string(),
    })
}

pub(crate) fn require_sound(
    resources: &dyn ResourceProvider,
    owner: &str,
    name: &str,
) -> Result<SoundId, ContentError> {
    resources.sound_effect(name).ok_or_else(|| ContentError::MissingSound {
        owner: owner.to_string(),
        name: name.to_string(),
    })
}

pub(crate) fn require_font(
    resources: &dyn ResourceProvider,
    owner: &str,
    name: &str,
) -> Result<FontId, ContentError> {
    resources.font(name).ok_or_else(|| ContentError::MissingFont {
        owner: owner.to_string(),
        name: name.to_string(),
    })
}

pub(crate) fn require_effect(
    resources: &dyn ResourceProvider,
    owner: &str,
    name: &str,
) -> Result<EffectId, ContentError> {
    resources.effect(name).ok_or_else(|| ContentError::MissingEffect {
        owner: owner.to_string(),
        name: name.to_string(),
    })
}
