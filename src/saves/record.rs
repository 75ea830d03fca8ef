//! Persisted effect records.
//!
//! The engine owns the generic fields of every record (template key,
//! bundle id, caster, clock, rolled settings, merge contributions)
//! and never asks a behavior for them. The behavior owns exactly one
//! field: its opaque versioned payload. The schema version travels
//! with each record, not globally, so older saves partially upgrade.

use serde::{Deserialize, Serialize};

use crate::core::EntityId;
use crate::effects::behavior::OpaquePayload;
use crate::effects::bundle::BundleId;
use crate::templates::RolledSettings;

/// Schema version written into every record produced by this build.
pub const RECORD_VERSION: u16 = 1;

/// One persisted effect instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectRecord {
    /// Per-record schema version.
    pub record_version: u16,

    /// Template key; resolved against the registry at load.
    pub template_key: String,

    /// Owning bundle, preserved so dispel-by-bundle survives reload.
    pub bundle: BundleId,

    /// Casting entity, reattached by Resume.
    pub caster: EntityId,

    /// Remaining clock at capture time.
    pub rounds_remaining: u32,

    /// Values rolled at the original cast; never re-rolled on load.
    pub settings: RolledSettings,

    /// Rounds merged in from other bundles.
    pub contributions: Vec<(BundleId, u32)>,

    /// Behavior-owned opaque state with its own version tag.
    pub payload: OpaquePayload,
}

/// All persisted instances of one entity, in insertion order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityEffectsRecord {
    /// The entity the instances were attached to.
    pub entity: EntityId,

    /// Instance records in collection insertion order.
    pub records: Vec<EffectRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serialization() {
        let record = EffectRecord {
            record_version: RECORD_VERSION,
            template_key: "water-walking".into(),
            bundle: BundleId(3),
            caster: EntityId(1),
            rounds_remaining: 14,
            settings: RolledSettings {
                duration_rounds: 20,
                ..Default::default()
            },
            contributions: vec![(BundleId(5), 20)],
            payload: OpaquePayload::stateless(),
        };

        let json = serde_json::to_string(&record).unwrap();
        let back: EffectRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }

    #[test]
    fn test_entity_record_serialization() {
        let record = EntityEffectsRecord {
            entity: EntityId(2),
            records: Vec::new(),
        };

        let json = serde_json::to_string(&record).unwrap();
        let back: EntityEffectsRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(record, back);
    }
}
