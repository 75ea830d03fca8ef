//! Core primitives: entity ids, the entity world, deterministic RNG.

pub mod entity;
pub mod rng;

pub use entity::{Entity, EntityId, EntityWorld};
pub use rng::{GameRng, GameRngState};
