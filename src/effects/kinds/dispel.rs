//! Dispel-magic: a chance-only instant that clears the target.

use std::any::Any;

use crate::effects::behavior::EffectBehavior;
use crate::effects::context::EffectContext;
use crate::templates::{
    ClassicKey, CraftingStations, EffectProperties, ElementTypes, Skill, TargetTypes,
};

/// Removes every active instance from the target in the cast round.
///
/// A chance-only template: there is no chance curve, the whole
/// dimension is produced by a custom function of caster level (or a
/// guaranteed 100 for the potion-grade variant). The work happens in
/// Start via the command queue; the dispel cannot edit the collection
/// it was just inserted into, so it queues a dispel-all that the
/// scheduler drains in the same apply. The dispel instance itself is
/// cleared along with everything else.
#[derive(Clone, Debug)]
pub struct DispelMagic {
    guaranteed: bool,
}

impl DispelMagic {
    /// Level-scaled success chance.
    #[must_use]
    pub fn new() -> Self {
        Self { guaranteed: false }
    }

    /// Always succeeds, whatever the caster level.
    #[must_use]
    pub fn guaranteed() -> Self {
        Self { guaranteed: true }
    }
}

impl Default for DispelMagic {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectBehavior for DispelMagic {
    fn properties(&self) -> EffectProperties {
        let chance: fn(u32) -> u32 = |level| 30 + level * 5;
        let props = EffectProperties::new("dispel-magic", Skill::Mysticism)
            .with_classic_key(ClassicKey::new(6, 0))
            .with_targets(TargetTypes::CASTER | TargetTypes::OTHER | TargetTypes::AREA)
            .with_elements(ElementTypes::MAGIC)
            .with_stations(CraftingStations::SPELLMAKER)
            .with_announcement("The magic unravels.");
        if self.guaranteed {
            props.with_custom_chance(|_level| 100)
        } else {
            props.with_custom_chance(chance)
        }
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
        ctx.queue_dispel_all();
    }
}
