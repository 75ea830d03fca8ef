//! Summon-creature: a companion effect with engine-opaque state.
//!
//! Demonstrates the three contracts simple effects never touch:
//! like-kind narrowing below the template key (a rat summon and a wolf
//! summon share the template but must not merge), opaque persisted
//! state (the companion handle survives a save), and merge semantics
//! that keep exactly one companion alive however often the effect is
//! recast.

use std::any::Any;

use serde::{Deserialize, Serialize};

use crate::core::EntityId;
use crate::effects::behavior::{EffectBehavior, OpaquePayload, PersistError};
use crate::effects::context::EffectContext;
use crate::templates::{
    ClassicKey, CraftingStations, EffectProperties, ElementTypes, ScalarCurve, Skill, TargetTypes,
};

/// Payload schema version for [`SummonCreature`].
const SUMMON_PAYLOAD_VERSION: u16 = 1;

/// What the effect summons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreatureKind {
    Rat,
    Wolf,
    Skeleton,
}

impl CreatureKind {
    /// Display name of the creature.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            CreatureKind::Rat => "rat",
            CreatureKind::Wolf => "wolf",
            CreatureKind::Skeleton => "skeleton",
        }
    }
}

#[derive(Serialize, Deserialize)]
struct SummonPayload {
    creature: CreatureKind,
    companion: Option<EntityId>,
}

/// Summons a companion creature for the rolled duration.
///
/// Merge policy: the default additive extend. A recast of the same
/// creature kind lengthens the companion's stay; Start is not
/// re-invoked, so a second companion never appears. Different creature
/// kinds refuse to be like-kind and coexist as separate instances.
#[derive(Clone, Debug)]
pub struct SummonCreature {
    creature: CreatureKind,
    companion: Option<EntityId>,
}

impl SummonCreature {
    /// Create a summon of the given creature kind.
    #[must_use]
    pub fn new(creature: CreatureKind) -> Self {
        Self {
            creature,
            companion: None,
        }
    }

    /// The creature kind this instance summons.
    #[must_use]
    pub fn creature(&self) -> CreatureKind {
        self.creature
    }

    /// Change the creature kind (host cast configuration; only
    /// meaningful before the instance starts).
    pub fn set_creature(&mut self, creature: CreatureKind) {
        self.creature = creature;
    }

    /// The live companion, if one is out.
    #[must_use]
    pub fn companion(&self) -> Option<EntityId> {
        self.companion
    }
}

impl Default for SummonCreature {
    fn default() -> Self {
        Self::new(CreatureKind::Rat)
    }
}

impl EffectBehavior for SummonCreature {
    fn properties(&self) -> EffectProperties {
        EffectProperties::new("summon-creature", Skill::Mysticism)
            .with_classic_key(ClassicKey::new(22, 0))
            .with_targets(TargetTypes::CASTER)
            .with_elements(ElementTypes::MAGIC)
            .with_stations(CraftingStations::SPELLMAKER)
            .with_duration(ScalarCurve::new(30, 30, 10, 1))
            .with_announcement("Your ally arrives!")
    }

    fn boxed_clone(&self) -> Box<dyn EffectBehavior> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn start(&mut self, ctx: &mut EffectContext<'_>) {
        let level = ctx.caster().map_or(1, |c| c.level);
        let name = format!("Summoned {}", self.creature.name());
        self.companion = Some(ctx.world_mut().spawn(name, level));
    }

    fn resume(&mut self, ctx: &mut EffectContext<'_>) {
        // The companion is world state and is saved with the world; if
        // this save predates its spawn (or the world dropped it), the
        // handle is stale and the effect carries on companion-less.
        if let Some(companion) = self.companion {
            if ctx.world_mut().get(companion).is_none() {
                tracing::debug!(
                    companion = companion.raw(),
                    "summoned companion missing after load"
                );
                self.companion = None;
            }
        }
    }

    fn end(&mut self, ctx: &mut EffectContext<'_>) {
        if let Some(companion) = self.companion.take() {
            ctx.world_mut().despawn(companion);
        }
    }

    fn is_like_kind(&self, other: &dyn EffectBehavior) -> bool {
        other
            .as_any()
            .downcast_ref::<Self>()
            .is_some_and(|o| o.creature == self.creature)
    }

    fn capture(&self) -> Result<OpaquePayload, PersistError> {
        OpaquePayload::encode(
            SUMMON_PAYLOAD_VERSION,
            &SummonPayload {
                creature: self.creature,
                companion: self.companion,
            },
        )
    }

    fn restore(&mut self, payload: &OpaquePayload) -> Result<(), PersistError> {
        let decoded: SummonPayload = payload.decode(SUMMON_PAYLOAD_VERSION)?;
        self.creature = decoded.creature;
        self.companion = decoded.companion;
        Ok(())
    }
}
