//! Incumbent stacking resolution.
//!
//! When a bundle lands on a target, each incoming instance is checked
//! against the target's existing instances in insertion order. The
//! first like-kind incumbent absorbs the cast via `add_state` and the
//! incoming instance is discarded; it never receives Start. If the
//! incumbent declines to stack, or no incumbent matches, the instance
//! inserts fresh and becomes the new representative.
//!
//! First match decides: a rejection does not continue the scan. This
//! keeps merge targeting deterministic.

use super::behavior::MergeOutcome;
use super::collection::ActiveEffects;
use super::instance::{EffectId, EffectInstance};
use crate::templates::DurationKind;

/// What became of an incoming instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StackOutcome {
    /// Inserted fresh under the given id; the caller owes it a Start.
    Inserted(EffectId),
    /// Absorbed by the incumbent with the given id; no Start.
    MergedInto(EffectId),
}

/// Resolve one incoming instance against a target's collection.
///
/// `alloc_id` is consulted only when the instance actually inserts.
/// On merge, the rounds the incumbent actually gained are recorded
/// against the incoming instance's bundle so a later dispel of that
/// bundle can subtract them.
pub fn apply_instance(
    collection: &mut ActiveEffects,
    incoming: EffectInstance,
    alloc_id: impl FnOnce() -> EffectId,
) -> StackOutcome {
    let incumbent = collection
        .iter()
        .find(|(_, existing)| {
            !existing.has_ended()
                && existing.key == incoming.key
                && existing.behavior.is_like_kind(incoming.behavior.as_ref())
        })
        .map(|(id, _)| id);

    if let Some(id) = incumbent {
        let incoming_rounds = match incoming.duration_kind {
            DurationKind::Rounds => incoming.rounds_remaining,
            DurationKind::Indefinite | DurationKind::Instant => 0,
        };

        if let Some(existing) = collection.get_mut(id) {
            let bundle = incoming.bundle;
            let before = existing.rounds_remaining;
            let EffectInstance {
                behavior,
                rounds_remaining,
                ..
            } = &mut *existing;

            let outcome =
                behavior.add_state(rounds_remaining, incoming_rounds, incoming.behavior.as_ref());

            if outcome == MergeOutcome::Stacked {
                let gained = rounds_remaining.saturating_sub(before);
                existing.record_contribution(bundle, gained);
                return StackOutcome::MergedInto(id);
            }
        }
    }

    let id = alloc_id();
    collection.insert(id, incoming);
    StackOutcome::Inserted(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EntityId;
    use crate::effects::behavior::{EffectBehavior, MergeOutcome};
    use crate::effects::bundle::BundleId;
    use crate::templates::{EffectProperties, RolledSettings, Skill};

    #[derive(Clone, Debug)]
    struct Stackable {
        sub_kind: u32,
        policy: MergeOutcome,
    }

    impl EffectBehavior for Stackable {
        fn properties(&self) -> EffectProperties {
            EffectProperties::new("stackable", Skill::Alteration)
        }

        fn boxed_clone(&self) -> Box<dyn EffectBehavior> {
            Box::new(self.clone())
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
            self
        }

        fn is_like_kind(&self, other: &dyn EffectBehavior) -> bool {
            other
                .as_any()
                .downcast_ref::<Self>()
                .is_some_and(|o| o.sub_kind == self.sub_kind)
        }

        fn add_state(
            &mut self,
            own_rounds: &mut u32,
            incoming_rounds: u32,
            _incoming: &dyn EffectBehavior,
        ) -> MergeOutcome {
            if self.policy == MergeOutcome::Stacked {
                *own_rounds = own_rounds.saturating_add(incoming_rounds);
            }
            self.policy
        }
    }

    fn instance(key: &str, rounds: u32, sub_kind: u32, policy: MergeOutcome) -> EffectInstance {
        let mut inst = EffectInstance::new(
            key,
            EntityId(1),
            RolledSettings {
                duration_rounds: rounds,
                ..Default::default()
            },
            crate::templates::DurationKind::Rounds,
            false,
            None,
            Box::new(Stackable { sub_kind, policy }),
        );
        inst.bundle = BundleId(1);
        inst
    }

    #[test]
    fn test_first_cast_inserts() {
        let mut col = ActiveEffects::new();
        let outcome = apply_instance(
            &mut col,
            instance("a", 10, 0, MergeOutcome::Stacked),
            || EffectId(1),
        );

        assert_eq!(outcome, StackOutcome::Inserted(EffectId(1)));
        assert_eq!(col.len(), 1);
    }

    #[test]
    fn test_like_kind_merges_and_extends() {
        let mut col = ActiveEffects::new();
        apply_instance(&mut col, instance("a", 10, 0, MergeOutcome::Stacked), || {
            EffectId(1)
        });

        let mut second = instance("a", 7, 0, MergeOutcome::Stacked);
        second.bundle = BundleId(2);
        let outcome = apply_instance(&mut col, second, || EffectId(2));

        assert_eq!(outcome, StackOutcome::MergedInto(EffectId(1)));
        assert_eq!(col.len(), 1);

        let incumbent = col.get(EffectId(1)).unwrap();
        assert_eq!(incumbent.rounds_remaining, 17);
        assert_eq!(incumbent.contributions(), &[(BundleId(2), 7)]);
    }

    #[test]
    fn test_different_key_inserts() {
        let mut col = ActiveEffects::new();
        apply_instance(&mut col, instance("a", 10, 0, MergeOutcome::Stacked), || {
            EffectId(1)
        });
        let outcome = apply_instance(&mut col, instance("b", 5, 0, MergeOutcome::Stacked), || {
            EffectId(2)
        });

        assert_eq!(outcome, StackOutcome::Inserted(EffectId(2)));
        assert_eq!(col.len(), 2);
    }

    #[test]
    fn test_sub_kind_narrowing_blocks_merge() {
        let mut col = ActiveEffects::new();
        apply_instance(&mut col, instance("a", 10, 0, MergeOutcome::Stacked), || {
            EffectId(1)
        });
        let outcome = apply_instance(&mut col, instance("a", 5, 9, MergeOutcome::Stacked), || {
            EffectId(2)
        });

        assert_eq!(outcome, StackOutcome::Inserted(EffectId(2)));
        assert_eq!(col.get(EffectId(1)).unwrap().rounds_remaining, 10);
    }

    #[test]
    fn test_rejected_merge_inserts_fresh() {
        let mut col = ActiveEffects::new();
        apply_instance(
            &mut col,
            instance("a", 10, 0, MergeOutcome::Rejected),
            || EffectId(1),
        );
        let outcome = apply_instance(
            &mut col,
            instance("a", 5, 0, MergeOutcome::Rejected),
            || EffectId(2),
        );

        assert_eq!(outcome, StackOutcome::Inserted(EffectId(2)));
        assert_eq!(col.len(), 2);
        assert_eq!(col.get(EffectId(1)).unwrap().rounds_remaining, 10);
    }

    #[test]
    fn test_first_match_wins_in_insertion_order() {
        let mut col = ActiveEffects::new();
        apply_instance(&mut col, instance("a", 10, 0, MergeOutcome::Stacked), || {
            EffectId(1)
        });
        apply_instance(&mut col, instance("b", 10, 0, MergeOutcome::Stacked), || {
            EffectId(2)
        });
        // A second "a"-like instance that could match either... only
        // EffectId(1) matches the key; insert a second "a" incumbent
        // first to prove ordering.
        apply_instance(&mut col, instance("a", 4, 9, MergeOutcome::Stacked), || {
            EffectId(3)
        });

        // sub_kind 0 matches the oldest incumbent, not EffectId(3).
        let outcome = apply_instance(&mut col, instance("a", 6, 0, MergeOutcome::Stacked), || {
            EffectId(4)
        });

        assert_eq!(outcome, StackOutcome::MergedInto(EffectId(1)));
        assert_eq!(col.get(EffectId(1)).unwrap().rounds_remaining, 16);
        assert_eq!(col.get(EffectId(3)).unwrap().rounds_remaining, 4);
    }
}
