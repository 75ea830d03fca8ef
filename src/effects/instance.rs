//! Effect instances - one active application of a template.
//!
//! An instance pairs the engine-owned generic state (rolled settings,
//! the rounds-remaining clock, bundle membership, the merge
//! contribution ledger) with the boxed behavior that gives it
//! semantics. The engine mutates the generic state; only the behavior
//! touches its own opaque state.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use super::behavior::EffectBehavior;
use super::bundle::BundleId;
use crate::core::EntityId;
use crate::templates::{DurationKind, RolledSettings};

/// Runtime identifier of an instance within one engine.
///
/// Allocated at insert, never persisted; saved instances get fresh ids
/// on restore.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectId(pub u64);

impl EffectId {
    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for EffectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Effect({})", self.0)
    }
}

/// One active application of an effect template to a target.
#[derive(Clone, Debug)]
pub struct EffectInstance {
    /// Template key (identity of behavior).
    pub key: String,

    /// Owning bundle, assigned when the instance joins one.
    pub bundle: BundleId,

    /// Casting entity (weak handle; the caster may die first).
    pub caster: EntityId,

    /// Values rolled once at cast time.
    pub settings: RolledSettings,

    /// Lifecycle clock. Zero means pending removal.
    pub rounds_remaining: u32,

    /// Clock behavior (round-limited, indefinite, instant).
    pub duration_kind: DurationKind,

    /// Whether apply must roll `settings.chance_percent` first.
    pub chance_gated: bool,

    /// Template announcement fired on Start.
    pub announcement: Option<String>,

    /// Rounds merged in from other bundles, for targeted dispel.
    contributions: SmallVec<[(BundleId, u32); 2]>,

    /// Latch guaranteeing End runs exactly once.
    ended: bool,

    /// The concrete behavior.
    pub behavior: Box<dyn EffectBehavior>,
}

impl EffectInstance {
    /// Create a fresh, unbundled instance.
    ///
    /// Round-limited instances start their clock from the rolled
    /// duration; instant and indefinite instances start at zero.
    #[must_use]
    pub fn new(
        key: impl Into<String>,
        caster: EntityId,
        settings: RolledSettings,
        duration_kind: DurationKind,
        chance_gated: bool,
        announcement: Option<String>,
        behavior: Box<dyn EffectBehavior>,
    ) -> Self {
        let rounds_remaining = match duration_kind {
            DurationKind::Rounds => settings.duration_rounds,
            DurationKind::Indefinite | DurationKind::Instant => 0,
        };
        Self {
            key: key.into(),
            bundle: BundleId::UNASSIGNED,
            caster,
            settings,
            rounds_remaining,
            duration_kind,
            chance_gated,
            announcement,
            contributions: SmallVec::new(),
            ended: false,
            behavior,
        }
    }

    /// Does the per-round decrement apply to this instance?
    #[must_use]
    pub fn is_round_limited(&self) -> bool {
        self.duration_kind == DurationKind::Rounds
    }

    /// Has the clock run out (indefinite instances never expire)?
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.duration_kind != DurationKind::Indefinite && self.rounds_remaining == 0
    }

    /// Latch the End transition. True on the first call only.
    pub fn mark_ended(&mut self) -> bool {
        !std::mem::replace(&mut self.ended, true)
    }

    /// Has End already run?
    #[must_use]
    pub fn has_ended(&self) -> bool {
        self.ended
    }

    /// Record rounds another bundle merged into this incumbent.
    pub fn record_contribution(&mut self, bundle: BundleId, rounds: u32) {
        if rounds == 0 {
            return;
        }
        if let Some(entry) = self.contributions.iter_mut().find(|(b, _)| *b == bundle) {
            entry.1 += rounds;
        } else {
            self.contributions.push((bundle, rounds));
        }
    }

    /// Remove and return a bundle's merged contribution, if any.
    pub fn take_contribution(&mut self, bundle: BundleId) -> Option<u32> {
        let idx = self.contributions.iter().position(|(b, _)| *b == bundle)?;
        Some(self.contributions.remove(idx).1)
    }

    /// Merged contributions by bundle, in merge order.
    #[must_use]
    pub fn contributions(&self) -> &[(BundleId, u32)] {
        &self.contributions
    }

    /// Replace the contribution ledger (save restore).
    pub(crate) fn set_contributions(&mut self, contributions: Vec<(BundleId, u32)>) {
        self.contributions = SmallVec::from_vec(contributions);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::behavior::tests_support::NullBehavior;

    fn instance(duration_kind: DurationKind, rounds: u32) -> EffectInstance {
        EffectInstance::new(
            "test",
            EntityId(1),
            RolledSettings {
                duration_rounds: rounds,
                ..Default::default()
            },
            duration_kind,
            false,
            None,
            Box::new(NullBehavior::default()),
        )
    }

    #[test]
    fn test_clock_from_settings() {
        assert_eq!(instance(DurationKind::Rounds, 12).rounds_remaining, 12);
        assert_eq!(instance(DurationKind::Instant, 12).rounds_remaining, 0);
        assert_eq!(instance(DurationKind::Indefinite, 12).rounds_remaining, 0);
    }

    #[test]
    fn test_expiry() {
        let mut inst = instance(DurationKind::Rounds, 1);
        assert!(!inst.is_expired());
        inst.rounds_remaining = 0;
        assert!(inst.is_expired());

        let indefinite = instance(DurationKind::Indefinite, 0);
        assert!(!indefinite.is_expired());

        let instant = instance(DurationKind::Instant, 0);
        assert!(instant.is_expired());
    }

    #[test]
    fn test_end_latch_fires_once() {
        let mut inst = instance(DurationKind::Rounds, 1);
        assert!(!inst.has_ended());
        assert!(inst.mark_ended());
        assert!(!inst.mark_ended());
        assert!(inst.has_ended());
    }

    #[test]
    fn test_contribution_ledger() {
        let mut inst = instance(DurationKind::Rounds, 10);
        let b1 = BundleId(1);
        let b2 = BundleId(2);

        inst.record_contribution(b1, 5);
        inst.record_contribution(b2, 3);
        inst.record_contribution(b1, 2); // coalesces

        assert_eq!(inst.take_contribution(b1), Some(7));
        assert_eq!(inst.take_contribution(b1), None);
        assert_eq!(inst.take_contribution(b2), Some(3));
    }

    #[test]
    fn test_zero_contribution_ignored() {
        let mut inst = instance(DurationKind::Rounds, 10);
        inst.record_contribution(BundleId(1), 0);
        assert!(inst.contributions().is_empty());
    }
}
