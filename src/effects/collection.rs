//! Per-entity collection of active effect instances.
//!
//! Insertion order is preserved: ticking and UI enumeration walk the
//! collection in the order casts landed, which is what keeps like-kind
//! merge targeting and expiry processing deterministic.
//!
//! The order list is an `im::Vector`, so the scheduler can snapshot it
//! in O(1) before a phase and then mutate the collection freely:
//! removal mid-round never skips or double-processes a neighbor.

use im::Vector;
use rustc_hash::FxHashMap;

use super::instance::{EffectId, EffectInstance};

/// Insertion-ordered set of active instances on one entity.
///
/// Owned exclusively by its entity (via the engine): created on spawn
/// or load, destroyed with the entity.
#[derive(Clone, Debug, Default)]
pub struct ActiveEffects {
    order: Vector<EffectId>,
    instances: FxHashMap<EffectId, EffectInstance>,
}

impl ActiveEffects {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an instance at the end of the insertion order.
    pub fn insert(&mut self, id: EffectId, instance: EffectInstance) {
        debug_assert!(
            !self.instances.contains_key(&id),
            "effect id {id} inserted twice"
        );
        self.order.push_back(id);
        self.instances.insert(id, instance);
    }

    /// Remove an instance, returning it if present.
    pub fn remove(&mut self, id: EffectId) -> Option<EffectInstance> {
        let instance = self.instances.remove(&id)?;
        self.order.retain(|&e| e != id);
        Some(instance)
    }

    /// Get an instance by id.
    #[must_use]
    pub fn get(&self, id: EffectId) -> Option<&EffectInstance> {
        self.instances.get(&id)
    }

    /// Get an instance by id, mutably.
    pub fn get_mut(&mut self, id: EffectId) -> Option<&mut EffectInstance> {
        self.instances.get_mut(&id)
    }

    /// Check whether an instance is still present.
    #[must_use]
    pub fn contains(&self, id: EffectId) -> bool {
        self.instances.contains_key(&id)
    }

    /// Number of active instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Check if the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// O(1) snapshot of the current insertion order.
    ///
    /// Iterating a snapshot while mutating the live collection is the
    /// scheduler's safety pattern; ids removed after the snapshot
    /// simply fail the `get` on their turn.
    #[must_use]
    pub fn snapshot_order(&self) -> Vector<EffectId> {
        self.order.clone()
    }

    /// Iterate instances in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (EffectId, &EffectInstance)> {
        self.order
            .iter()
            .filter_map(move |&id| self.instances.get(&id).map(|inst| (id, inst)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EntityId;
    use crate::effects::behavior::tests_support::NullBehavior;
    use crate::templates::{DurationKind, RolledSettings};

    fn instance(key: &str) -> EffectInstance {
        EffectInstance::new(
            key,
            EntityId(1),
            RolledSettings::default(),
            DurationKind::Instant,
            false,
            None,
            Box::new(NullBehavior::default()),
        )
    }

    #[test]
    fn test_insert_preserves_order() {
        let mut col = ActiveEffects::new();
        col.insert(EffectId(1), instance("a"));
        col.insert(EffectId(2), instance("b"));
        col.insert(EffectId(3), instance("c"));

        let keys: Vec<_> = col.iter().map(|(_, inst)| inst.key.clone()).collect();
        assert_eq!(keys, ["a", "b", "c"]);
    }

    #[test]
    fn test_remove_keeps_remaining_order() {
        let mut col = ActiveEffects::new();
        col.insert(EffectId(1), instance("a"));
        col.insert(EffectId(2), instance("b"));
        col.insert(EffectId(3), instance("c"));

        let removed = col.remove(EffectId(2));
        assert_eq!(removed.unwrap().key, "b");
        assert!(!col.contains(EffectId(2)));

        let keys: Vec<_> = col.iter().map(|(_, inst)| inst.key.clone()).collect();
        assert_eq!(keys, ["a", "c"]);
    }

    #[test]
    fn test_snapshot_survives_mutation() {
        let mut col = ActiveEffects::new();
        col.insert(EffectId(1), instance("a"));
        col.insert(EffectId(2), instance("b"));

        let snapshot = col.snapshot_order();
        col.remove(EffectId(1));

        // Snapshot still names both; live lookups resolve only one.
        assert_eq!(snapshot.len(), 2);
        assert!(col.get(EffectId(1)).is_none());
        assert!(col.get(EffectId(2)).is_some());
    }

    #[test]
    fn test_remove_missing() {
        let mut col = ActiveEffects::new();
        assert!(col.remove(EffectId(9)).is_none());
        assert!(col.is_empty());
    }
}
