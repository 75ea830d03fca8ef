//! Transition context - everything a behavior may touch mid-callback.
//!
//! Every lifecycle transition receives an explicit `EffectContext`:
//! the caster and target handles, the current round, the instance's
//! rolled settings, world access, the announcement sink, and a command
//! queue. There is no ambient "current manager" anywhere; a behavior
//! that needs something gets it from the context or not at all.
//!
//! Caster and target are weak handles. `caster()` returning `None`
//! means the caster is gone; caster-dependent behavior skips quietly
//! rather than faulting.

use crate::core::{Entity, EntityId, EntityWorld, GameRng};
use crate::effects::bundle::BundleId;
use crate::events::{Announcement, AnnouncementKind};
use crate::templates::RolledSettings;

/// A collection-level mutation requested by a running behavior.
///
/// Behaviors cannot edit the active-effect collection they live in
/// while the scheduler iterates it; they queue a command instead, and
/// the scheduler drains the queue synchronously after each callback,
/// still within the same round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EffectCommand {
    /// Remove every instance on the target, whatever its origin.
    DispelAll { target: EntityId },
    /// Remove one bundle's instances (and merged contributions) from
    /// the target.
    DispelBundle { target: EntityId, bundle: BundleId },
}

/// Mutable view handed to each lifecycle transition.
pub struct EffectContext<'a> {
    world: &'a mut EntityWorld,
    caster: EntityId,
    target: EntityId,
    round: u64,
    effect_key: &'a str,
    settings: &'a RolledSettings,
    announcements: &'a mut Vec<Announcement>,
    commands: &'a mut Vec<EffectCommand>,
    rng: &'a mut GameRng,
}

impl<'a> EffectContext<'a> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        world: &'a mut EntityWorld,
        caster: EntityId,
        target: EntityId,
        round: u64,
        effect_key: &'a str,
        settings: &'a RolledSettings,
        announcements: &'a mut Vec<Announcement>,
        commands: &'a mut Vec<EffectCommand>,
        rng: &'a mut GameRng,
    ) -> Self {
        Self {
            world,
            caster,
            target,
            round,
            effect_key,
            settings,
            announcements,
            commands,
            rng,
        }
    }

    /// Id of the casting entity (may no longer be alive).
    #[must_use]
    pub fn caster_id(&self) -> EntityId {
        self.caster
    }

    /// Id of the affected entity.
    #[must_use]
    pub fn target_id(&self) -> EntityId {
        self.target
    }

    /// Current round number.
    #[must_use]
    pub fn round(&self) -> u64 {
        self.round
    }

    /// The instance's rolled settings.
    #[must_use]
    pub fn settings(&self) -> &RolledSettings {
        self.settings
    }

    /// Resolve the caster, if still alive.
    #[must_use]
    pub fn caster(&self) -> Option<&Entity> {
        self.world.get(self.caster)
    }

    /// Resolve the target, if still alive.
    #[must_use]
    pub fn target(&self) -> Option<&Entity> {
        self.world.get(self.target)
    }

    /// Resolve the target mutably, if still alive.
    pub fn target_mut(&mut self) -> Option<&mut Entity> {
        self.world.get_mut(self.target)
    }

    /// Full world access, for behaviors that spawn or despawn
    /// companions.
    pub fn world_mut(&mut self) -> &mut EntityWorld {
        self.world
    }

    /// Random draws for per-round variance.
    pub fn rng(&mut self) -> &mut GameRng {
        self.rng
    }

    /// Push a behavior-authored announcement.
    pub fn announce(&mut self, message: impl Into<String>) {
        self.announcements.push(Announcement {
            round: self.round,
            caster: self.caster,
            target: self.target,
            effect_key: self.effect_key.to_string(),
            kind: AnnouncementKind::Custom,
            message: message.into(),
        });
    }

    /// Queue removal of every instance on this context's target.
    pub fn queue_dispel_all(&mut self) {
        self.commands.push(EffectCommand::DispelAll {
            target: self.target,
        });
    }

    /// Queue removal of one bundle from this context's target.
    pub fn queue_dispel_bundle(&mut self, bundle: BundleId) {
        self.commands.push(EffectCommand::DispelBundle {
            target: self.target,
            bundle,
        });
    }
}
