//! Bundles - the unit a spell, potion, or innate ability actually casts.
//!
//! A bundle is an ordered group of effect instances cast together,
//! sharing one caster and one cast context. The bundle id is what lets
//! a later dispel locate the whole group atomically, even after some
//! members merged into incumbents on the target.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::instance::EffectInstance;
use crate::core::EntityId;

/// Identifier of a cast bundle.
///
/// Allocated by the engine (`EffectEngine::new_bundle_id`) and persisted
/// with saved instances so dispel-by-bundle survives a reload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BundleId(pub u64);

impl BundleId {
    /// Placeholder for an instance not yet pushed into a bundle.
    pub const UNASSIGNED: BundleId = BundleId(0);

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for BundleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Bundle({})", self.0)
    }
}

/// Where a cast came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CastSource {
    Spell,
    Potion,
    Innate,
}

/// Shared context of every instance in a bundle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastContext {
    /// Casting entity.
    pub caster: EntityId,

    /// What produced the cast.
    pub source: CastSource,

    /// Entities the cast resolves against.
    pub targets: SmallVec<[EntityId; 4]>,
}

impl CastContext {
    /// Create a context for a single-target cast.
    #[must_use]
    pub fn single(caster: EntityId, source: CastSource, target: EntityId) -> Self {
        Self {
            caster,
            source,
            targets: SmallVec::from_slice(&[target]),
        }
    }

    /// Create a context for an area cast.
    #[must_use]
    pub fn area(caster: EntityId, source: CastSource, targets: &[EntityId]) -> Self {
        Self {
            caster,
            source,
            targets: SmallVec::from_slice(targets),
        }
    }
}

/// An ordered group of instances cast together.
#[derive(Debug)]
pub struct Bundle {
    /// Bundle identity, shared by every member instance.
    pub id: BundleId,

    /// Shared cast context.
    pub context: CastContext,

    instances: Vec<EffectInstance>,
}

impl Bundle {
    /// Create an empty bundle.
    #[must_use]
    pub fn new(id: BundleId, context: CastContext) -> Self {
        Self {
            id,
            context,
            instances: Vec::new(),
        }
    }

    /// Add an instance, stamping it with this bundle's identity.
    ///
    /// The instance must have been rolled for this bundle's caster;
    /// bundles never mix casters.
    pub fn push(&mut self, mut instance: EffectInstance) {
        debug_assert_eq!(
            instance.caster, self.context.caster,
            "bundle instances must share the bundle's caster"
        );
        instance.bundle = self.id;
        self.instances.push(instance);
    }

    /// Add an instance (builder pattern).
    #[must_use]
    pub fn with(mut self, instance: EffectInstance) -> Self {
        self.push(instance);
        self
    }

    /// Member instances in cast order.
    #[must_use]
    pub fn instances(&self) -> &[EffectInstance] {
        &self.instances
    }

    /// Consume the bundle, yielding members in cast order.
    pub(crate) fn into_instances(self) -> Vec<EffectInstance> {
        self.instances
    }

    /// Number of member instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Check if the bundle has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
