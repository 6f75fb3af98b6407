//! Error types.
//!
//! Content errors abort loading. Interaction errors come out of collision
//! handlers and are logged and dropped by the physics dispatch. Config errors
//! surface from `SimConfig` parsing.

use thiserror::Error;

/// Authoring problems found while loading or validating content.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("failed to parse {what}: {source}")]
    Parse {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("{owner} references missing texture `{name}`")]
    MissingTexture { owner: String, name: String },

    #[error("{owner} references missing sound effect `{name}`")]
    MissingSound { owner: String, name: String },

    #[error("{owner} references missing font `{name}`")]
    MissingFont { owner: String, name: String },

    #[error("{owner} references missing effect `{name}`")]
    MissingEffect { owner: String, name: String },

    #[error("weapon `{0}` has an empty bullet texture list")]
    NoBullets(String),

    #[error("{owner} references unknown weapon `{id}`")]
    UnknownWeapon { owner: String, id: String },

    #[error("theme `{theme}` spawn table names unknown enemy type `{kind}`")]
    UnknownEnemy { theme: String, kind: String },

    #[error("{owner}: {field} range {min}..={max} is inverted")]
    InvertedRange {
        owner: String,
        field: &'static str,
        min: u32,
        max: u32,
    },

    #[error("{owner}: {field} must be positive")]
    NotPositive { owner: String, field: &'static str },

    #[error("no themes defined")]
    NoThemes,

    #[error("theme `{0}` has an empty spawn table")]
    EmptySpawnTable(String),
}

/// Failure inside a single collision reaction. Never aborts a frame.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InteractionError {
    #[error("entity {0:?} is no longer in the world")]
    MissingEntity(hecs::Entity),

    #[error("entity {entity:?} lacks component {component}")]
    MissingComponent {
        entity: hecs::Entity,
        component: &'static str,
    },

    #[error("projectile {id} of {shooter:?} is not owned by any weapon")]
    UnknownProjectile { shooter: hecs::Entity, id: u64 },

    #[error("interaction rejected: {0}")]
    Rejected(&'static str),
}

impl InteractionError {
    pub(crate) fn component<T>(entity: hecs::Entity) -> Self {
        InteractionError::MissingComponent {
            entity,
            component: std::any::type_name::<T>(),
        }
    }
}

/// Problems reading the simulation configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("environment variable {name}=`{value}` is not a valid {expected}")]
    BadEnv {
        name: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}
