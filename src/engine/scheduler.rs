//! The round scheduler.
//!
//! `EffectEngine` owns the per-entity collections of active instances
//! and drives every lifecycle transition. All mutation of one entity's
//! collection happens inside that entity's apply/tick/dispel call, in a
//! fixed order; across entities, ticks are independent.
//!
//! ## Round order (per entity)
//!
//! 1. `constant_effect` on every live instance, in insertion order
//! 2. `magic_round` on every live instance, in insertion order
//! 3. decrement `rounds_remaining` on round-limited instances
//! 4. End + remove every instance whose clock reached zero
//!
//! Iteration works over an O(1) order snapshot, so removal mid-round
//! never skips or double-processes a neighbor. Commands queued by
//! behaviors (dispels) are drained synchronously after each callback,
//! in the same round, never deferred.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::{EntityId, EntityWorld, GameRng};
use crate::effects::bundle::{Bundle, BundleId};
use crate::effects::collection::ActiveEffects;
use crate::effects::context::{EffectCommand, EffectContext};
use crate::effects::instance::{EffectId, EffectInstance};
use crate::effects::stacking::{apply_instance, StackOutcome};
use crate::events::{Announcement, AnnouncementKind};
use crate::templates::{DurationKind, RolledSettings};

/// Read-only view of one active instance, for status UI.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectStatus {
    pub id: EffectId,
    pub key: String,
    pub bundle: BundleId,
    pub caster: EntityId,
    pub rounds_remaining: u32,
    pub duration_kind: DurationKind,
    pub settings: RolledSettings,
}

enum Transition {
    Start,
    Resume,
    Constant,
    Magic,
    End,
}

/// Owns active effects for all entities and ticks them per round.
pub struct EffectEngine {
    collections: FxHashMap<EntityId, ActiveEffects>,
    announcements: Vec<Announcement>,
    commands: Vec<EffectCommand>,
    round: u64,
    next_effect_id: u64,
    next_bundle_id: u64,
    rng: GameRng,
}

impl EffectEngine {
    /// Create an engine with a deterministic seed for chance checks
    /// and per-round behavior rolls.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            collections: FxHashMap::default(),
            announcements: Vec::new(),
            commands: Vec::new(),
            round: 0,
            next_effect_id: 1,
            next_bundle_id: 1,
            rng: GameRng::new(seed).for_context("effect-engine"),
        }
    }

    /// Current round number.
    #[must_use]
    pub fn round(&self) -> u64 {
        self.round
    }

    /// Advance the round counter. The host's world clock calls this
    /// once per game round, after ticking entities.
    pub fn advance_round(&mut self) {
        self.round += 1;
    }

    /// Allocate a bundle id for a new cast.
    pub fn new_bundle_id(&mut self) -> BundleId {
        let id = BundleId(self.next_bundle_id);
        self.next_bundle_id += 1;
        id
    }

    /// Create an (empty) collection for a freshly spawned entity.
    ///
    /// Optional, since `apply_bundle` creates collections on demand, but
    /// lets hosts mirror entity lifetimes exactly.
    pub fn register_entity(&mut self, entity: EntityId) {
        self.collections.entry(entity).or_default();
    }

    /// Drop an entity's collection along with the entity.
    ///
    /// No End transitions run: the entity is gone, so they would no-op.
    /// Hosts wanting death cleanses call `dispel_all` first.
    pub fn remove_entity(&mut self, entity: EntityId) {
        self.collections.remove(&entity);
    }

    /// Number of active instances on an entity.
    #[must_use]
    pub fn active_count(&self, entity: EntityId) -> usize {
        self.collections.get(&entity).map_or(0, ActiveEffects::len)
    }

    /// Read-only enumeration of an entity's active instances, in
    /// insertion order.
    pub fn active_effects(&self, entity: EntityId) -> impl Iterator<Item = EffectStatus> + '_ {
        self.collections
            .get(&entity)
            .into_iter()
            .flat_map(|col| col.iter())
            .map(|(id, inst)| EffectStatus {
                id,
                key: inst.key.clone(),
                bundle: inst.bundle,
                caster: inst.caster,
                rounds_remaining: inst.rounds_remaining,
                duration_kind: inst.duration_kind,
                settings: inst.settings,
            })
    }

    /// Take all pending announcements for the presentation layer.
    pub fn drain_announcements(&mut self) -> Vec<Announcement> {
        std::mem::take(&mut self.announcements)
    }

    /// The raw collection for one entity (save capture path).
    pub(crate) fn collection(&self, entity: EntityId) -> Option<&ActiveEffects> {
        self.collections.get(&entity)
    }

    /// Apply a cast bundle to a target entity.
    ///
    /// For each instance in cast order: roll the chance gate (a failed
    /// roll discards the instance: a fizzle, not an error), resolve
    /// incumbent stacking, and give surviving fresh inserts their Start
    /// plus the round-zero `constant_effect`. Instant instances do
    /// their work in Start and are pruned before this returns.
    pub fn apply_bundle(
        &mut self,
        world: &mut EntityWorld,
        bundle: Bundle,
        target: EntityId,
    ) -> Vec<StackOutcome> {
        let mut outcomes = Vec::new();

        if world.get(target).is_none() {
            tracing::debug!(entity = target.raw(), "apply_bundle: target gone, cast dropped");
            return outcomes;
        }
        self.collections.entry(target).or_default();

        for instance in bundle.into_instances() {
            if instance.chance_gated && !self.rng.chance(instance.settings.chance_percent) {
                tracing::debug!(key = %instance.key, "cast fizzled its chance roll");
                self.announcements.push(Announcement {
                    round: self.round,
                    caster: instance.caster,
                    target,
                    effect_key: instance.key.clone(),
                    kind: AnnouncementKind::Fizzled,
                    message: format!("The {} effect fizzles.", instance.key),
                });
                continue;
            }

            let candidate = EffectId(self.next_effect_id);
            let outcome = match self.collections.get_mut(&target) {
                Some(col) => apply_instance(col, instance, || candidate),
                None => break,
            };

            if let StackOutcome::Inserted(id) = outcome {
                self.next_effect_id += 1;
                self.start_instance(world, target, id);
            }
            outcomes.push(outcome);
            self.drain_commands(world);
        }

        self.prune_expired(world, target);
        self.drain_commands(world);
        outcomes
    }

    /// Tick one entity for the current round.
    pub fn tick_entity(&mut self, world: &mut EntityWorld, entity: EntityId) {
        let Some(col) = self.collections.get(&entity) else {
            return;
        };
        if world.get(entity).is_none() {
            tracing::debug!(entity = entity.raw(), "tick_entity: entity gone, skipped");
            return;
        }
        let order = col.snapshot_order();

        for &id in &order {
            if self.is_live(entity, id) {
                self.run_transition(world, entity, id, Transition::Constant);
                self.drain_commands(world);
            }
        }

        for &id in &order {
            if self.is_live(entity, id) {
                self.run_transition(world, entity, id, Transition::Magic);
                self.drain_commands(world);
            }
        }

        if let Some(col) = self.collections.get_mut(&entity) {
            for &id in &order {
                if let Some(inst) = col.get_mut(id) {
                    if !inst.has_ended() && inst.is_round_limited() {
                        inst.rounds_remaining = inst.rounds_remaining.saturating_sub(1);
                    }
                }
            }
        }

        self.prune_expired(world, entity);
        self.drain_commands(world);
    }

    /// Tick every tracked entity, then advance the round counter.
    ///
    /// Entities tick in id order for determinism. Cross-entity order
    /// carries no semantics, so hosts may tick individually instead.
    pub fn tick_all(&mut self, world: &mut EntityWorld) {
        let mut entities: Vec<EntityId> = self.collections.keys().copied().collect();
        entities.sort();
        for entity in entities {
            self.tick_entity(world, entity);
        }
        self.advance_round();
    }

    /// Remove one bundle's instances from a target.
    ///
    /// Instances belonging to the bundle End and go; incumbents that
    /// absorbed a merged cast from the bundle lose the merged rounds
    /// (and End if that empties their clock). Same-round, synchronous.
    pub fn dispel_bundle(&mut self, world: &mut EntityWorld, bundle: BundleId, target: EntityId) {
        self.dispel_bundle_inner(world, bundle, target);
        self.drain_commands(world);
    }

    /// Remove every instance on a target, regardless of origin bundle
    /// or caster. Same-round, synchronous.
    pub fn dispel_all(&mut self, world: &mut EntityWorld, target: EntityId) {
        self.dispel_all_inner(world, target);
        self.drain_commands(world);
    }

    fn dispel_bundle_inner(&mut self, world: &mut EntityWorld, bundle: BundleId, target: EntityId) {
        let Some(col) = self.collections.get(&target) else {
            return;
        };
        let order = col.snapshot_order();

        for &id in &order {
            let Some(col) = self.collections.get_mut(&target) else {
                return;
            };
            let Some(inst) = col.get_mut(id) else {
                continue;
            };
            if inst.has_ended() {
                continue;
            }

            if inst.bundle == bundle {
                self.end_instance(world, target, id);
            } else if let Some(merged) = inst.take_contribution(bundle) {
                inst.rounds_remaining = inst.rounds_remaining.saturating_sub(merged);
                if inst.is_expired() {
                    self.end_instance(world, target, id);
                }
            }
        }
    }

    fn dispel_all_inner(&mut self, world: &mut EntityWorld, target: EntityId) {
        let Some(col) = self.collections.get(&target) else {
            return;
        };
        let order = col.snapshot_order();
        for &id in &order {
            if self.is_live(target, id) {
                self.end_instance(world, target, id);
            }
        }
    }

    /// Fire the Start announcement, run Start, then the round-zero
    /// `constant_effect`.
    fn start_instance(&mut self, world: &mut EntityWorld, target: EntityId, id: EffectId) {
        if let Some(inst) = self.collections.get(&target).and_then(|col| col.get(id)) {
            if let Some(message) = &inst.announcement {
                self.announcements.push(Announcement {
                    round: self.round,
                    caster: inst.caster,
                    target,
                    effect_key: inst.key.clone(),
                    kind: AnnouncementKind::Started,
                    message: message.clone(),
                });
            }
        }
        self.run_transition(world, target, id, Transition::Start);
        self.drain_commands(world);
        if self.is_live(target, id) {
            self.run_transition(world, target, id, Transition::Constant);
        }
    }

    /// Replay the Resume transition for a restored instance. No
    /// announcement, no round-zero assertion beyond what Resume does.
    pub(crate) fn resume_instance(&mut self, world: &mut EntityWorld, target: EntityId, id: EffectId) {
        self.run_transition(world, target, id, Transition::Resume);
        self.drain_commands(world);
    }

    /// Insert an already-built instance directly (save restore path).
    pub(crate) fn insert_restored(&mut self, target: EntityId, instance: EffectInstance) -> EffectId {
        let id = EffectId(self.next_effect_id);
        self.next_effect_id += 1;
        if instance.bundle.raw() >= self.next_bundle_id {
            self.next_bundle_id = instance.bundle.raw() + 1;
        }
        self.collections.entry(target).or_default().insert(id, instance);
        id
    }

    /// End + remove an instance, exactly once.
    ///
    /// Shared by expiry and every dispel path. A missing target makes
    /// the End callback a silent no-op, but the instance is still
    /// removed.
    fn end_instance(&mut self, world: &mut EntityWorld, target: EntityId, id: EffectId) {
        let newly_ended = self
            .collections
            .get_mut(&target)
            .and_then(|col| col.get_mut(id))
            .is_some_and(EffectInstance::mark_ended);
        if !newly_ended {
            return;
        }

        self.run_transition(world, target, id, Transition::End);
        if let Some(col) = self.collections.get_mut(&target) {
            col.remove(id);
        }
    }

    /// End every expired, not-yet-ended instance on a target.
    fn prune_expired(&mut self, world: &mut EntityWorld, target: EntityId) {
        let Some(col) = self.collections.get(&target) else {
            return;
        };
        let order = col.snapshot_order();
        for &id in &order {
            let expired = self
                .collections
                .get(&target)
                .and_then(|col| col.get(id))
                .is_some_and(|inst| !inst.has_ended() && inst.is_expired());
            if expired {
                self.end_instance(world, target, id);
            }
        }
    }

    /// Execute queued collection mutations until none remain.
    ///
    /// End callbacks may queue further commands; the loop converges
    /// because every command only ever removes instances.
    fn drain_commands(&mut self, world: &mut EntityWorld) {
        while !self.commands.is_empty() {
            let commands = std::mem::take(&mut self.commands);
            for command in commands {
                match command {
                    EffectCommand::DispelAll { target } => self.dispel_all_inner(world, target),
                    EffectCommand::DispelBundle { target, bundle } => {
                        self.dispel_bundle_inner(world, bundle, target)
                    }
                }
            }
        }
    }

    fn is_live(&self, target: EntityId, id: EffectId) -> bool {
        self.collections
            .get(&target)
            .and_then(|col| col.get(id))
            .is_some_and(|inst| !inst.has_ended())
    }

    /// Run one lifecycle callback with a fully explicit context.
    ///
    /// A missing target no-ops the transition (the entity died
    /// mid-effect); a missing caster is the behavior's business via
    /// `ctx.caster()`.
    fn run_transition(
        &mut self,
        world: &mut EntityWorld,
        target: EntityId,
        id: EffectId,
        transition: Transition,
    ) {
        let round = self.round;
        let Some(col) = self.collections.get_mut(&target) else {
            return;
        };
        let Some(inst) = col.get_mut(id) else {
            return;
        };
        if world.get(target).is_none() {
            tracing::debug!(
                entity = target.raw(),
                key = %inst.key,
                "transition skipped: target no longer exists"
            );
            return;
        }

        let EffectInstance {
            key,
            caster,
            settings,
            behavior,
            ..
        } = inst;
        let mut ctx = EffectContext::new(
            world,
            *caster,
            target,
            round,
            key,
            settings,
            &mut self.announcements,
            &mut self.commands,
            &mut self.rng,
        );
        match transition {
            Transition::Start => behavior.start(&mut ctx),
            Transition::Resume => behavior.resume(&mut ctx),
            Transition::Constant => behavior.constant_effect(&mut ctx),
            Transition::Magic => behavior.magic_round(&mut ctx),
            Transition::End => behavior.end(&mut ctx),
        }
    }
}

impl std::fmt::Debug for EffectEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EffectEngine")
            .field("entities", &self.collections.len())
            .field("round", &self.round)
            .finish()
    }
}
