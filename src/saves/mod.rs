//! Versioned persistence of per-entity effect state.

pub mod record;
pub mod serializer;

pub use record::{EffectRecord, EntityEffectsRecord, RECORD_VERSION};
pub use serializer::{capture_entity, restore_entity};
