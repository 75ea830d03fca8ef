//! The round scheduler that owns and ticks per-entity collections.

pub mod scheduler;

pub use scheduler::{EffectEngine, EffectStatus};
