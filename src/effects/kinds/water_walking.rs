//! Water-walking: a continuously re-asserted movement effect.

use std::any::Any;

use crate::effects::behavior::EffectBehavior;
use crate::effects::context::EffectContext;
use crate::templates::{
    ClassicKey, CraftingStations, EffectProperties, ElementTypes, PotionRecipe, ScalarCurve, Skill,
    TargetTypes,
};

/// Entity flag asserted while the effect is active.
pub const WATER_WALKING_FLAG: &str = "water-walking";

/// Lets the target walk on water for the rolled duration.
///
/// The flag is re-asserted every round rather than applied once, so
/// anything else that clears it (a river crossing script, a dispel of
/// an unrelated overlapping effect) is corrected on the next tick.
#[derive(Clone, Debug, Default)]
pub struct WaterWalking;

impl EffectBehavior for WaterWalking {
    fn properties(&self) -> EffectProperties {
        EffectProperties::new("water-walking", Skill::Alteration)
            .with_classic_key(ClassicKey::new(28, 0))
            .with_targets(TargetTypes::CASTER | TargetTypes::OTHER)
            .with_elements(ElementTypes::MAGIC)
            .with_stations(CraftingStations::SPELLMAKER | CraftingStations::POTIONMAKER)
            .with_duration(ScalarCurve::new(20, 10, 5, 2))
            .with_announcement("You walk on water!")
            .with_recipe(PotionRecipe::new(
                vec!["pure-water".into(), "ichor".into()],
                35,
                1,
                12,
            ))
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
        if let Some(target) = ctx.target_mut() {
            target.set_flag(WATER_WALKING_FLAG, true);
        }
    }

    fn resume(&mut self, ctx: &mut EffectContext<'_>) {
        if let Some(target) = ctx.target_mut() {
            target.set_flag(WATER_WALKING_FLAG, true);
        }
    }

    fn constant_effect(&mut self, ctx: &mut EffectContext<'_>) {
        if let Some(target) = ctx.target_mut() {
            if !target.has_flag(WATER_WALKING_FLAG) {
                target.set_flag(WATER_WALKING_FLAG, true);
            }
        }
    }

    fn end(&mut self, ctx: &mut EffectContext<'_>) {
        if let Some(target) = ctx.target_mut() {
            target.set_flag(WATER_WALKING_FLAG, false);
        }
    }
}
