//! Cost curves - per-dimension roll and pricing parameters.
//!
//! A template describes each dimension it supports (duration, chance,
//! magnitude) with a curve: a fixed base, a caster-purchasable "plus"
//! span, and a per-level bonus granted every `levels_per_increment`
//! caster levels. The same parameters drive both the cast-time roll and
//! the cost model, so a stronger roll is always a costlier cast.

use serde::{Deserialize, Serialize};

use crate::core::GameRng;

/// Curve for a scalar dimension (duration or chance).
///
/// Rolled value: `clamp(base + boost, base, base + plus)
/// + per_level * floor(level / levels_per_increment)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalarCurve {
    /// Guaranteed floor of the roll.
    pub base: u32,

    /// Span above `base` the caster can buy into.
    pub plus: u32,

    /// Bonus granted per level increment.
    pub per_level: u32,

    /// Caster levels per increment. 0 disables level scaling.
    pub levels_per_increment: u32,
}

impl ScalarCurve {
    /// Create a new curve.
    #[must_use]
    pub const fn new(base: u32, plus: u32, per_level: u32, levels_per_increment: u32) -> Self {
        Self {
            base,
            plus,
            per_level,
            levels_per_increment,
        }
    }

    /// A curve with no plus span and no level scaling.
    #[must_use]
    pub const fn flat(base: u32) -> Self {
        Self::new(base, 0, 0, 0)
    }

    /// Level-scaling bonus at the given caster level.
    #[must_use]
    pub fn level_bonus(&self, caster_level: u32) -> u32 {
        if self.levels_per_increment == 0 {
            return 0;
        }
        self.per_level * (caster_level / self.levels_per_increment)
    }

    /// Roll the curve for a caster of the given level.
    ///
    /// `boost` is the caster-chosen slider amount, clamped to the plus
    /// span; rolls never leave `[base, max_value(level)]`.
    #[must_use]
    pub fn roll(&self, boost: u32, caster_level: u32) -> u32 {
        self.base + boost.min(self.plus) + self.level_bonus(caster_level)
    }

    /// Largest value the curve can roll at the given level.
    #[must_use]
    pub fn max_value(&self, caster_level: u32) -> u32 {
        self.base + self.plus + self.level_bonus(caster_level)
    }
}

/// Curve for the magnitude dimension.
///
/// Magnitude has random spread: the base contribution is drawn from
/// `base_min..=base_max` and the purchased contribution from
/// `plus_min..=plus_max`, capped by the caster's slider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MagnitudeCurve {
    pub base_min: u32,
    pub base_max: u32,
    pub plus_min: u32,
    pub plus_max: u32,

    /// Bonus granted per level increment.
    pub per_level: u32,

    /// Caster levels per increment. 0 disables level scaling.
    pub levels_per_increment: u32,
}

impl MagnitudeCurve {
    /// Create a new magnitude curve.
    #[must_use]
    pub const fn new(
        base_min: u32,
        base_max: u32,
        plus_min: u32,
        plus_max: u32,
        per_level: u32,
        levels_per_increment: u32,
    ) -> Self {
        Self {
            base_min,
            base_max,
            plus_min,
            plus_max,
            per_level,
            levels_per_increment,
        }
    }

    /// A fixed magnitude with no spread, no plus span, no scaling.
    #[must_use]
    pub const fn fixed(value: u32) -> Self {
        Self::new(value, value, 0, 0, 0, 0)
    }

    /// Level-scaling bonus at the given caster level.
    #[must_use]
    pub fn level_bonus(&self, caster_level: u32) -> u32 {
        if self.levels_per_increment == 0 {
            return 0;
        }
        self.per_level * (caster_level / self.levels_per_increment)
    }

    /// Roll the curve for a caster of the given level.
    #[must_use]
    pub fn roll(&self, boost: u32, caster_level: u32, rng: &mut GameRng) -> u32 {
        let base = rng.roll(self.base_min..=self.base_max);
        let plus = rng.roll(self.plus_min..=self.plus_max).min(boost);
        base + plus + self.level_bonus(caster_level)
    }

    /// Largest value the curve can roll at the given level.
    #[must_use]
    pub fn max_value(&self, caster_level: u32) -> u32 {
        self.base_max + self.plus_max + self.level_bonus(caster_level)
    }
}

/// Pricing factors for one supported dimension.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostSchedule {
    /// Flat gold surcharge for carrying the dimension at all.
    pub offset_gold: u32,

    /// Spell points charged per rolled point of the dimension.
    pub cost_per_point: u32,
}

impl CostSchedule {
    /// Create a new schedule.
    #[must_use]
    pub const fn new(offset_gold: u32, cost_per_point: u32) -> Self {
        Self {
            offset_gold,
            cost_per_point,
        }
    }
}

impl Default for CostSchedule {
    fn default() -> Self {
        Self::new(0, 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_roll_clamps_boost() {
        let curve = ScalarCurve::new(10, 5, 0, 0);

        assert_eq!(curve.roll(0, 1), 10);
        assert_eq!(curve.roll(3, 1), 13);
        assert_eq!(curve.roll(99, 1), 15); // boost clamped to plus span
    }

    #[test]
    fn test_scalar_level_bonus() {
        let curve = ScalarCurve::new(10, 0, 2, 3);

        assert_eq!(curve.level_bonus(1), 0);
        assert_eq!(curve.level_bonus(3), 2);
        assert_eq!(curve.level_bonus(7), 4);
        assert_eq!(curve.roll(0, 9), 16);
    }

    #[test]
    fn test_scalar_zero_levels_per_increment() {
        let curve = ScalarCurve::new(10, 0, 5, 0);
        assert_eq!(curve.level_bonus(100), 0);
        assert_eq!(curve.roll(0, 100), 10);
    }

    #[test]
    fn test_scalar_flat() {
        let curve = ScalarCurve::flat(20);
        assert_eq!(curve.roll(50, 30), 20);
        assert_eq!(curve.max_value(30), 20);
    }

    #[test]
    fn test_magnitude_roll_within_bounds() {
        let curve = MagnitudeCurve::new(5, 10, 2, 8, 1, 2);
        let mut rng = GameRng::new(42);

        for level in [1, 4, 10] {
            for _ in 0..100 {
                let v = curve.roll(8, level, &mut rng);
                assert!(v >= curve.base_min);
                assert!(v <= curve.max_value(level));
            }
        }
    }

    #[test]
    fn test_magnitude_boost_caps_plus() {
        let curve = MagnitudeCurve::new(5, 5, 4, 4, 0, 0);
        let mut rng = GameRng::new(42);

        assert_eq!(curve.roll(0, 1, &mut rng), 5);
        assert_eq!(curve.roll(2, 1, &mut rng), 7);
        assert_eq!(curve.roll(100, 1, &mut rng), 9);
    }

    #[test]
    fn test_magnitude_fixed() {
        let curve = MagnitudeCurve::fixed(12);
        let mut rng = GameRng::new(42);
        assert_eq!(curve.roll(100, 50, &mut rng), 12);
    }

    #[test]
    fn test_curve_serialization() {
        let curve = ScalarCurve::new(10, 5, 2, 3);
        let json = serde_json::to_string(&curve).unwrap();
        let back: ScalarCurve = serde_json::from_str(&json).unwrap();
        assert_eq!(curve, back);
    }
}
