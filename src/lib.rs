//! Top-down cavern shooter simulation.
//!
//! Caverns are grown with a cellular automaton, their walls classified into
//! edge types and backed by physics fixtures. The player, enemies, pickups,
//! chests and projectiles live in an ECS world stepped by a 2D physics engine.
//! Nothing here draws or plays sound: each frame produces a sorted draw list,
//! a HUD snapshot and a queue of game events for presentation to consume.

pub mod autopilot;
pub mod components;
pub mod config;
pub mod constants;
pub mod content;
pub mod dungeon_gen;
pub mod engine;
pub mod error;
pub mod events;
pub mod grid;
pub mod input;
pub mod physics;
pub mod queries;
pub mod resources;
pub mod spawning;
pub mod systems;
pub mod tile;
pub mod weapon;
