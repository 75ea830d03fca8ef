//! Settings and cost model properties.
//!
//! The central contract: dimensions a template does not support roll
//! to exactly zero, and supported dimensions stay inside
//! `[base, base + plus + per_level * floor(level / levels_per_increment)]`.

use proptest::prelude::*;

use aura::core::GameRng;
use aura::templates::{
    compute_cost, roll_settings, CastSlider, CostSchedule, DimensionCosts, EffectProperties,
    MagnitudeCurve, ScalarCurve, Skill,
};

fn level_bonus(per_level: u32, lpi: u32, level: u32) -> u32 {
    if lpi == 0 {
        0
    } else {
        per_level * (level / lpi)
    }
}

proptest! {
    #[test]
    fn duration_rolls_stay_in_bounds(
        base in 0u32..60,
        plus in 0u32..40,
        per_level in 0u32..8,
        lpi in 0u32..6,
        level in 1u32..30,
        boost in 0u32..80,
        seed in any::<u64>(),
    ) {
        let props = EffectProperties::new("prop", Skill::Alteration)
            .with_duration(ScalarCurve::new(base, plus, per_level, lpi));
        let mut rng = GameRng::new(seed);

        let settings = roll_settings(
            &props,
            level,
            CastSlider { duration: boost, ..Default::default() },
            &mut rng,
        );

        let hi = base + plus + level_bonus(per_level, lpi, level);
        prop_assert!(settings.duration_rounds >= base);
        prop_assert!(settings.duration_rounds <= hi);

        // Unsupported dimensions are exactly zero.
        prop_assert_eq!(settings.chance_percent, 0);
        prop_assert_eq!(settings.magnitude, 0);
    }

    #[test]
    fn magnitude_rolls_stay_in_bounds(
        base_min in 0u32..20,
        spread in 0u32..20,
        plus_min in 0u32..10,
        plus_spread in 0u32..20,
        per_level in 0u32..8,
        lpi in 0u32..6,
        level in 1u32..30,
        boost in 0u32..80,
        seed in any::<u64>(),
    ) {
        let curve = MagnitudeCurve::new(
            base_min,
            base_min + spread,
            plus_min,
            plus_min + plus_spread,
            per_level,
            lpi,
        );
        let props = EffectProperties::new("prop", Skill::Destruction).with_magnitude(curve);
        let mut rng = GameRng::new(seed);

        let settings = roll_settings(
            &props,
            level,
            CastSlider { magnitude: boost, ..Default::default() },
            &mut rng,
        );

        prop_assert!(settings.magnitude >= base_min);
        prop_assert!(settings.magnitude <= curve.max_value(level));
        prop_assert_eq!(settings.duration_rounds, 0);
        prop_assert_eq!(settings.chance_percent, 0);
    }

    #[test]
    fn chance_never_exceeds_100(
        base in 0u32..200,
        plus in 0u32..100,
        level in 1u32..30,
        boost in 0u32..200,
        seed in any::<u64>(),
    ) {
        let props = EffectProperties::new("prop", Skill::Mysticism)
            .with_chance(ScalarCurve::new(base, plus, 1, 1));
        let mut rng = GameRng::new(seed);

        let settings = roll_settings(
            &props,
            level,
            CastSlider { chance: boost, ..Default::default() },
            &mut rng,
        );

        prop_assert!(settings.chance_percent <= 100);
    }

    #[test]
    fn cost_ignores_unsupported_dimensions(
        duration in 1u32..50,
        stray_magnitude in 1u32..500,
        seed in any::<u64>(),
    ) {
        let props = EffectProperties::new("prop", Skill::Alteration)
            .with_duration(ScalarCurve::flat(duration))
            .with_costs(DimensionCosts {
                duration: Some(CostSchedule::new(0, 3)),
                chance: None,
                magnitude: Some(CostSchedule::new(1000, 1000)),
            });
        let mut rng = GameRng::new(seed);

        let mut settings = roll_settings(&props, 1, CastSlider::default(), &mut rng);
        settings.magnitude = stray_magnitude;

        let cost = compute_cost(&props, &settings);
        prop_assert_eq!(cost.spell_points, (duration * 3).max(5));
    }
}

#[test]
fn identical_draws_give_identical_settings() {
    let props = EffectProperties::new("prop", Skill::Destruction)
        .with_duration(ScalarCurve::new(8, 6, 1, 2))
        .with_magnitude(MagnitudeCurve::new(2, 9, 1, 5, 1, 3));

    let mut rng1 = GameRng::new(1234);
    let mut rng2 = GameRng::new(1234);

    for level in 1..20 {
        let a = roll_settings(&props, level, CastSlider::uniform(3), &mut rng1);
        let b = roll_settings(&props, level, CastSlider::uniform(3), &mut rng2);
        assert_eq!(a, b);
    }
}

#[test]
fn custom_chance_bypasses_generic_formula() {
    // A chance-only template whose custom function is the whole model.
    let props = EffectProperties::new("prop", Skill::Mysticism)
        .with_custom_chance(|level| 25 * level);
    let mut rng = GameRng::new(1);

    for (level, expected) in [(1, 25), (2, 50), (4, 100), (10, 100)] {
        let settings = roll_settings(&props, level, CastSlider::default(), &mut rng);
        assert_eq!(settings.chance_percent, expected);
    }
}
