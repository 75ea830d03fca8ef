//! Regeneration: per-round healing driven by rolled magnitude.

use std::any::Any;

use crate::effects::behavior::EffectBehavior;
use crate::effects::context::EffectContext;
use crate::templates::{
    ClassicKey, CraftingStations, EffectProperties, ElementTypes, MagnitudeCurve, PotionRecipe,
    ScalarCurve, Skill, TargetTypes,
};

/// Heals the target by the rolled magnitude each round.
///
/// A one-shot-per-round behavior: the work happens in `magic_round`,
/// not `constant_effect`, so it lands exactly once per round however
/// often the continuous phase re-asserts state.
#[derive(Clone, Debug, Default)]
pub struct Regeneration;

impl EffectBehavior for Regeneration {
    fn properties(&self) -> EffectProperties {
        EffectProperties::new("regeneration", Skill::Restoration)
            .with_classic_key(ClassicKey::new(16, 0))
            .with_targets(TargetTypes::CASTER | TargetTypes::OTHER)
            .with_elements(ElementTypes::MAGIC)
            .with_stations(CraftingStations::SPELLMAKER | CraftingStations::POTIONMAKER)
            .with_duration(ScalarCurve::new(10, 10, 2, 1))
            .with_magnitude(MagnitudeCurve::new(1, 3, 1, 2, 1, 4))
            .with_announcement("A warm glow settles over you.")
            .with_recipe(PotionRecipe::new(
                vec!["troll-blood".into(), "red-flowers".into()],
                80,
                3,
                4,
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

    fn magic_round(&mut self, ctx: &mut EffectContext<'_>) {
        let magnitude = i64::from(ctx.settings().magnitude);
        if let Some(target) = ctx.target_mut() {
            target.modify_state("hp", magnitude);
        }
    }
}
