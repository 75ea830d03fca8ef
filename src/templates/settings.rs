//! Rolled settings and the cost model.
//!
//! Pure functions: given a template, a caster level, and the caster's
//! slider choices, `roll_settings` produces the concrete values one
//! cast will live with, and `compute_cost` prices them. Dimensions a
//! template does not support are forced to zero and never contribute
//! to cost, merging, or per-round behavior.

use serde::{Deserialize, Serialize};

use super::definition::{ChanceStrategy, CostStrategy, EffectProperties};
use crate::core::GameRng;

/// Minimum spell-point price of any cast.
const MIN_SPELL_POINTS: u32 = 5;

/// Gold charged per spell point under the standard cost formula.
const GOLD_PER_SPELL_POINT: u32 = 10;

/// Caster-chosen boost per dimension, each clamped to the template's
/// plus span at roll time. `Default` is a no-boost cast.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastSlider {
    pub duration: u32,
    pub chance: u32,
    pub magnitude: u32,
}

impl CastSlider {
    /// Boost every dimension by the same amount.
    #[must_use]
    pub const fn uniform(boost: u32) -> Self {
        Self {
            duration: boost,
            chance: boost,
            magnitude: boost,
        }
    }
}

/// Concrete values rolled once at cast time.
///
/// Unsupported dimensions are exactly zero.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolledSettings {
    /// Rounds the instance will live (0 for instant/indefinite kinds).
    pub duration_rounds: u32,

    /// Success chance in percent, 0..=100.
    pub chance_percent: u32,

    /// Effect strength, interpreted by the concrete behavior.
    pub magnitude: u32,

    /// Targets hit by the cast.
    pub target_count: u32,
}

/// Price of one cast.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastCost {
    pub spell_points: u32,
    pub gold: u32,
}

impl CastCost {
    /// Create a new cost.
    #[must_use]
    pub const fn new(spell_points: u32, gold: u32) -> Self {
        Self { spell_points, gold }
    }
}

/// Roll a template's supported dimensions for one cast.
///
/// Deterministic given identical random draws. A chance template with
/// a custom strategy delegates entirely to that function; the curve is
/// not consulted.
#[must_use]
pub fn roll_settings(
    props: &EffectProperties,
    caster_level: u32,
    slider: CastSlider,
    rng: &mut GameRng,
) -> RolledSettings {
    let duration_rounds = if props.supports_duration() {
        props
            .duration
            .map_or(0, |curve| curve.roll(slider.duration, caster_level))
    } else {
        0
    };

    let chance_percent = if props.supports_chance() {
        let raw = match &props.chance_strategy {
            ChanceStrategy::Curve => props
                .chance
                .map_or(0, |curve| curve.roll(slider.chance, caster_level)),
            ChanceStrategy::Custom(f) => f(caster_level),
        };
        raw.min(100)
    } else {
        0
    };

    let magnitude = if props.supports_magnitude() {
        props
            .magnitude
            .map_or(0, |curve| curve.roll(slider.magnitude, caster_level, rng))
    } else {
        0
    };

    RolledSettings {
        duration_rounds,
        chance_percent,
        magnitude,
        target_count: props.target_count,
    }
}

/// Price a cast from its rolled settings.
///
/// Under the standard strategy each supported dimension contributes
/// `rolled * cost_per_point` spell points and its gold offset; the
/// total is floored at [`MIN_SPELL_POINTS`]. Unsupported dimensions
/// contribute nothing even if their settings field is somehow nonzero.
#[must_use]
pub fn compute_cost(props: &EffectProperties, settings: &RolledSettings) -> CastCost {
    if let CostStrategy::Custom(f) = &props.cost_strategy {
        return f(settings);
    }

    let mut points = 0u32;
    let mut gold = 0u32;

    if props.supports_duration() {
        if let Some(schedule) = props.costs.duration {
            points += settings.duration_rounds * schedule.cost_per_point;
            gold += schedule.offset_gold;
        }
    }
    if props.supports_chance() {
        if let Some(schedule) = props.costs.chance {
            points += settings.chance_percent * schedule.cost_per_point;
            gold += schedule.offset_gold;
        }
    }
    if props.supports_magnitude() {
        if let Some(schedule) = props.costs.magnitude {
            points += settings.magnitude * schedule.cost_per_point;
            gold += schedule.offset_gold;
        }
    }

    let spell_points = points.max(MIN_SPELL_POINTS);
    CastCost::new(spell_points, gold + spell_points * GOLD_PER_SPELL_POINT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::curve::{CostSchedule, MagnitudeCurve, ScalarCurve};
    use crate::templates::definition::{DimensionCosts, Skill};

    fn duration_only() -> EffectProperties {
        EffectProperties::new("test-duration", Skill::Alteration)
            .with_duration(ScalarCurve::new(10, 5, 2, 3))
    }

    #[test]
    fn test_unsupported_dimensions_are_zero() {
        let props = duration_only();
        let mut rng = GameRng::new(1);

        let settings = roll_settings(&props, 9, CastSlider::uniform(99), &mut rng);

        assert_eq!(settings.chance_percent, 0);
        assert_eq!(settings.magnitude, 0);
        assert!(settings.duration_rounds > 0);
    }

    #[test]
    fn test_duration_roll_bounds() {
        let props = duration_only();
        let mut rng = GameRng::new(1);

        // base 10 + clamped boost 5 + per_level 2 * floor(9/3)
        let settings = roll_settings(&props, 9, CastSlider::uniform(99), &mut rng);
        assert_eq!(settings.duration_rounds, 21);

        let settings = roll_settings(&props, 1, CastSlider::default(), &mut rng);
        assert_eq!(settings.duration_rounds, 10);
    }

    #[test]
    fn test_custom_chance_overrides_curve() {
        let props = EffectProperties::new("dispel", Skill::Mysticism)
            .with_custom_chance(|level| 40 + level * 2);
        let mut rng = GameRng::new(1);

        let settings = roll_settings(&props, 10, CastSlider::default(), &mut rng);
        assert_eq!(settings.chance_percent, 60);
    }

    #[test]
    fn test_chance_clamped_to_100() {
        let props =
            EffectProperties::new("dispel", Skill::Mysticism).with_custom_chance(|_| 4000);
        let mut rng = GameRng::new(1);

        let settings = roll_settings(&props, 1, CastSlider::default(), &mut rng);
        assert_eq!(settings.chance_percent, 100);
    }

    #[test]
    fn test_magnitude_rolls_within_curve() {
        let props = EffectProperties::new("zap", Skill::Destruction)
            .with_magnitude(MagnitudeCurve::new(2, 6, 1, 4, 1, 1));
        let mut rng = GameRng::new(5);

        for _ in 0..50 {
            let settings = roll_settings(&props, 3, CastSlider::uniform(99), &mut rng);
            assert!(settings.magnitude >= 2);
            assert!(settings.magnitude <= 6 + 4 + 3);
        }
    }

    #[test]
    fn test_standard_cost() {
        let props = duration_only().with_costs(DimensionCosts {
            duration: Some(CostSchedule::new(25, 2)),
            chance: None,
            magnitude: None,
        });
        let mut rng = GameRng::new(1);
        let settings = roll_settings(&props, 1, CastSlider::default(), &mut rng);

        let cost = compute_cost(&props, &settings);
        assert_eq!(cost.spell_points, 20); // 10 rounds * 2
        assert_eq!(cost.gold, 25 + 20 * 10);
    }

    #[test]
    fn test_minimum_spell_points() {
        let props = EffectProperties::new("cheap", Skill::Illusion)
            .with_duration(ScalarCurve::flat(1));
        let settings = RolledSettings {
            duration_rounds: 1,
            ..Default::default()
        };

        let cost = compute_cost(&props, &settings);
        assert_eq!(cost.spell_points, MIN_SPELL_POINTS);
    }

    #[test]
    fn test_unsupported_dimension_excluded_from_cost() {
        let props = duration_only();
        // Forge settings with a nonzero magnitude the template never rolled.
        let settings = RolledSettings {
            duration_rounds: 10,
            magnitude: 500,
            ..Default::default()
        };

        let cost = compute_cost(&props, &settings);
        assert_eq!(cost.spell_points, 10);
    }

    #[test]
    fn test_custom_cost_strategy() {
        let props = EffectProperties::new("flat-fee", Skill::Thaumaturgy)
            .with_duration(ScalarCurve::flat(30))
            .with_custom_cost(|_| CastCost::new(42, 7));

        let settings = RolledSettings {
            duration_rounds: 30,
            ..Default::default()
        };
        assert_eq!(compute_cost(&props, &settings), CastCost::new(42, 7));
    }

    #[test]
    fn test_settings_serialization() {
        let settings = RolledSettings {
            duration_rounds: 12,
            chance_percent: 55,
            magnitude: 9,
            target_count: 1,
        };

        let json = serde_json::to_string(&settings).unwrap();
        let back: RolledSettings = serde_json::from_str(&json).unwrap();
        assert_eq!(settings, back);
    }
}
