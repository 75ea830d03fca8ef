//! Capture and restore of per-entity effect state.
//!
//! Capture walks a collection in insertion order, pairing engine-owned
//! generic fields with each behavior's opaque payload. Restore rebuilds
//! instances from the registry's prototypes and replays the Resume
//! transition, never Start, so runtime side effects come back
//! without announcements, re-rolls, or re-charges.
//!
//! A record the current build cannot read (unknown schema version,
//! unregistered template, unrecognized payload version, undecodable
//! payload) drops that one instance with a warning; the rest of the
//! save loads normally.

use super::record::{EffectRecord, EntityEffectsRecord, RECORD_VERSION};
use crate::core::{EntityId, EntityWorld};
use crate::effects::behavior::PersistError;
use crate::effects::instance::EffectInstance;
use crate::engine::EffectEngine;
use crate::templates::TemplateRegistry;

/// Capture every active instance on an entity.
///
/// An entity with no collection captures as an empty record. Behavior
/// payload encoding failures abort the capture; they indicate a bug in
/// the behavior, not a recoverable save condition.
pub fn capture_entity(
    engine: &EffectEngine,
    entity: EntityId,
) -> Result<EntityEffectsRecord, PersistError> {
    let mut records = Vec::new();

    if let Some(col) = engine.collection(entity) {
        for (_, inst) in col.iter() {
            let payload = inst.behavior.capture()?;
            records.push(EffectRecord {
                record_version: RECORD_VERSION,
                template_key: inst.key.clone(),
                bundle: inst.bundle,
                caster: inst.caster,
                rounds_remaining: inst.rounds_remaining,
                settings: inst.settings,
                contributions: inst.contributions().to_vec(),
                payload,
            });
        }
    }

    Ok(EntityEffectsRecord { entity, records })
}

/// Restore an entity's instances and replay Resume on each.
///
/// Returns how many instances came back. Unreadable records are
/// dropped individually with a warning.
pub fn restore_entity(
    engine: &mut EffectEngine,
    world: &mut EntityWorld,
    registry: &TemplateRegistry,
    record: &EntityEffectsRecord,
) -> usize {
    let mut restored = 0;

    for rec in &record.records {
        if rec.record_version != RECORD_VERSION {
            tracing::warn!(
                key = %rec.template_key,
                version = rec.record_version,
                "effect record dropped: unknown schema version"
            );
            continue;
        }
        let Some(template) = registry.get(&rec.template_key) else {
            tracing::warn!(
                key = %rec.template_key,
                "effect record dropped: template not registered"
            );
            continue;
        };

        let mut behavior = template.clone_prototype();
        if let Err(err) = behavior.restore(&rec.payload) {
            tracing::warn!(
                key = %rec.template_key,
                error = %err,
                "effect record dropped: payload not restorable"
            );
            continue;
        }

        let props = template.properties();
        let mut instance = EffectInstance::new(
            rec.template_key.clone(),
            rec.caster,
            rec.settings,
            props.duration_kind,
            props.supports_chance(),
            props.announcement.clone(),
            behavior,
        );
        instance.bundle = rec.bundle;
        instance.rounds_remaining = rec.rounds_remaining;
        instance.set_contributions(rec.contributions.clone());

        let id = engine.insert_restored(record.entity, instance);
        engine.resume_instance(world, record.entity, id);
        restored += 1;
    }

    restored
}
