//! Effect templates - static effect data.
//!
//! An `EffectTemplate` holds the immutable description of one effect
//! kind: what dimensions it rolls, who it may target, what it costs,
//! and the behavior prototype cloned for each cast. Instance-specific
//! data (rounds remaining, rolled settings) lives in `EffectInstance`.
//!
//! Templates are registered once at startup and never mutated while
//! instances referencing them are live.

use std::sync::Arc;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use super::curve::{CostSchedule, MagnitudeCurve, ScalarCurve};
use super::settings::{CastCost, RolledSettings};
use crate::effects::behavior::EffectBehavior;

bitflags! {
    /// Dimensions an effect can roll at cast time.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Capabilities: u8 {
        const DURATION  = 1 << 0;
        const CHANCE    = 1 << 1;
        const MAGNITUDE = 1 << 2;
    }
}

bitflags! {
    /// Who a cast of this effect may target.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TargetTypes: u8 {
        const CASTER = 1 << 0;
        const OTHER  = 1 << 1;
        const AREA   = 1 << 2;
    }
}

bitflags! {
    /// Damage/element channels the effect is allowed to carry.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ElementTypes: u8 {
        const FIRE   = 1 << 0;
        const FROST  = 1 << 1;
        const SHOCK  = 1 << 2;
        const POISON = 1 << 3;
        const MAGIC  = 1 << 4;
    }
}

bitflags! {
    /// Crafting stations that may bind this effect into an item.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CraftingStations: u8 {
        const SPELLMAKER  = 1 << 0;
        const POTIONMAKER = 1 << 1;
        const ITEMMAKER   = 1 << 2;
    }
}

/// Legacy numeric key pair for classic-era content.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClassicKey {
    pub group: u8,
    pub subgroup: u8,
}

impl ClassicKey {
    /// Create a new classic key.
    #[must_use]
    pub const fn new(group: u8, subgroup: u8) -> Self {
        Self { group, subgroup }
    }
}

impl std::fmt::Display for ClassicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Classic({}, {})", self.group, self.subgroup)
    }
}

/// Magic skill an effect is associated with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Skill {
    Alteration,
    Destruction,
    Illusion,
    Mysticism,
    Restoration,
    Thaumaturgy,
}

/// How an instance's clock behaves.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DurationKind {
    /// Counts down one round at a time, expires at zero.
    Rounds,
    /// Never decremented; lives until explicitly dispelled.
    Indefinite,
    /// Does its work in Start and is pruned in the same apply.
    Instant,
}

/// A potion recipe bound to an effect template.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PotionRecipe {
    /// Ingredient category keys.
    pub ingredients: Vec<String>,

    /// Base market price in gold.
    pub price: u32,

    /// Rarity tier (higher is rarer).
    pub rarity: u8,

    /// Bottle texture reference for the presentation layer.
    pub texture: u32,
}

impl PotionRecipe {
    /// Create a new recipe.
    pub fn new(ingredients: Vec<String>, price: u32, rarity: u8, texture: u32) -> Self {
        Self {
            ingredients,
            price,
            rarity,
            texture,
        }
    }
}

/// How the chance dimension is produced at cast time.
///
/// Resolved once at template registration; the cast path dispatches
/// through the strategy without knowing which variant it holds.
#[derive(Clone)]
pub enum ChanceStrategy {
    /// Roll the template's chance curve.
    Curve,
    /// Delegate entirely to a custom function of caster level.
    Custom(Arc<dyn Fn(u32) -> u32 + Send + Sync>),
}

impl std::fmt::Debug for ChanceStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChanceStrategy::Curve => write!(f, "Curve"),
            ChanceStrategy::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// How the cast cost is computed from rolled settings.
#[derive(Clone)]
pub enum CostStrategy {
    /// Sum supported dimensions through their cost schedules.
    Standard,
    /// Delegate entirely to a custom function of the rolled settings.
    Custom(Arc<dyn Fn(&RolledSettings) -> CastCost + Send + Sync>),
}

impl std::fmt::Debug for CostStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CostStrategy::Standard => write!(f, "Standard"),
            CostStrategy::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Per-dimension pricing, present only for supported dimensions.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionCosts {
    pub duration: Option<CostSchedule>,
    pub chance: Option<CostSchedule>,
    pub magnitude: Option<CostSchedule>,
}

/// Static description of one effect kind.
///
/// Built by each behavior's `properties()` and validated at
/// registration. The builder keeps capabilities in sync with the
/// curves: adding a duration curve grants the DURATION capability.
///
/// ## Example
///
/// ```
/// use aura::templates::{EffectProperties, ScalarCurve, Skill, TargetTypes};
///
/// let props = EffectProperties::new("water-walking", Skill::Alteration)
///     .with_targets(TargetTypes::CASTER | TargetTypes::OTHER)
///     .with_duration(ScalarCurve::flat(20))
///     .with_announcement("You walk on water!");
///
/// assert!(props.supports_duration());
/// assert!(!props.supports_magnitude());
/// ```
#[derive(Clone, Debug)]
pub struct EffectProperties {
    /// Globally unique key ("water-walking").
    pub key: String,

    /// Optional legacy numeric key pair.
    pub classic_key: Option<ClassicKey>,

    /// Dimensions rolled at cast time.
    pub capabilities: Capabilities,

    /// Allowed target set.
    pub targets: TargetTypes,

    /// Allowed element channels.
    pub elements: ElementTypes,

    /// Stations that may craft with this effect.
    pub stations: CraftingStations,

    /// Associated magic skill.
    pub skill: Skill,

    /// Clock behavior of instances.
    pub duration_kind: DurationKind,

    /// Duration curve, required iff DURATION is supported.
    pub duration: Option<ScalarCurve>,

    /// Chance curve, required iff CHANCE is supported with the
    /// `Curve` strategy.
    pub chance: Option<ScalarCurve>,

    /// Magnitude curve, required iff MAGNITUDE is supported.
    pub magnitude: Option<MagnitudeCurve>,

    /// Per-dimension pricing.
    pub costs: DimensionCosts,

    /// Chance production strategy.
    pub chance_strategy: ChanceStrategy,

    /// Cost computation strategy.
    pub cost_strategy: CostStrategy,

    /// Targets hit by one cast (area effects roll against several).
    pub target_count: u32,

    /// One-shot announcement fired on Start, never on Resume.
    pub announcement: Option<String>,

    /// Potion recipes producing this effect.
    pub recipes: Vec<PotionRecipe>,
}

impl EffectProperties {
    /// Create properties for an instant, targetable effect with no
    /// rolled dimensions. Builder methods add the rest.
    pub fn new(key: impl Into<String>, skill: Skill) -> Self {
        Self {
            key: key.into(),
            classic_key: None,
            capabilities: Capabilities::empty(),
            targets: TargetTypes::OTHER,
            elements: ElementTypes::MAGIC,
            stations: CraftingStations::SPELLMAKER,
            skill,
            duration_kind: DurationKind::Instant,
            duration: None,
            chance: None,
            magnitude: None,
            costs: DimensionCosts::default(),
            chance_strategy: ChanceStrategy::Curve,
            cost_strategy: CostStrategy::Standard,
            target_count: 1,
            announcement: None,
            recipes: Vec::new(),
        }
    }

    /// Set the classic compatibility key (builder pattern).
    #[must_use]
    pub fn with_classic_key(mut self, key: ClassicKey) -> Self {
        self.classic_key = Some(key);
        self
    }

    /// Set the allowed target set (builder pattern).
    #[must_use]
    pub fn with_targets(mut self, targets: TargetTypes) -> Self {
        self.targets = targets;
        self
    }

    /// Set the allowed elements (builder pattern).
    #[must_use]
    pub fn with_elements(mut self, elements: ElementTypes) -> Self {
        self.elements = elements;
        self
    }

    /// Set the allowed crafting stations (builder pattern).
    #[must_use]
    pub fn with_stations(mut self, stations: CraftingStations) -> Self {
        self.stations = stations;
        self
    }

    /// Add a duration curve, granting DURATION and making instances
    /// round-limited (builder pattern).
    #[must_use]
    pub fn with_duration(mut self, curve: ScalarCurve) -> Self {
        self.capabilities |= Capabilities::DURATION;
        self.duration_kind = DurationKind::Rounds;
        self.duration = Some(curve);
        self.costs.duration.get_or_insert_with(CostSchedule::default);
        self
    }

    /// Mark instances as living until dispelled (builder pattern).
    ///
    /// Mutually exclusive with `with_duration`; validated at
    /// registration.
    #[must_use]
    pub fn indefinite(mut self) -> Self {
        self.duration_kind = DurationKind::Indefinite;
        self
    }

    /// Add a chance curve, granting CHANCE (builder pattern).
    #[must_use]
    pub fn with_chance(mut self, curve: ScalarCurve) -> Self {
        self.capabilities |= Capabilities::CHANCE;
        self.chance = Some(curve);
        self.costs.chance.get_or_insert_with(CostSchedule::default);
        self
    }

    /// Use a custom chance function, granting CHANCE (builder pattern).
    #[must_use]
    pub fn with_custom_chance(
        mut self,
        chance: impl Fn(u32) -> u32 + Send + Sync + 'static,
    ) -> Self {
        self.capabilities |= Capabilities::CHANCE;
        self.chance_strategy = ChanceStrategy::Custom(Arc::new(chance));
        self.costs.chance.get_or_insert_with(CostSchedule::default);
        self
    }

    /// Add a magnitude curve, granting MAGNITUDE (builder pattern).
    #[must_use]
    pub fn with_magnitude(mut self, curve: MagnitudeCurve) -> Self {
        self.capabilities |= Capabilities::MAGNITUDE;
        self.magnitude = Some(curve);
        self.costs.magnitude.get_or_insert_with(CostSchedule::default);
        self
    }

    /// Override a dimension's cost schedule (builder pattern).
    #[must_use]
    pub fn with_costs(mut self, costs: DimensionCosts) -> Self {
        self.costs = costs;
        self
    }

    /// Use a custom cost function (builder pattern).
    #[must_use]
    pub fn with_custom_cost(
        mut self,
        cost: impl Fn(&RolledSettings) -> CastCost + Send + Sync + 'static,
    ) -> Self {
        self.cost_strategy = CostStrategy::Custom(Arc::new(cost));
        self
    }

    /// Set targets hit per cast (builder pattern).
    #[must_use]
    pub fn with_target_count(mut self, count: u32) -> Self {
        self.target_count = count;
        self
    }

    /// Set the Start announcement (builder pattern).
    #[must_use]
    pub fn with_announcement(mut self, text: impl Into<String>) -> Self {
        self.announcement = Some(text.into());
        self
    }

    /// Add a potion recipe (builder pattern).
    #[must_use]
    pub fn with_recipe(mut self, recipe: PotionRecipe) -> Self {
        self.recipes.push(recipe);
        self
    }

    /// Does the template roll a duration?
    #[must_use]
    pub fn supports_duration(&self) -> bool {
        self.capabilities.contains(Capabilities::DURATION)
    }

    /// Does the template roll a chance?
    #[must_use]
    pub fn supports_chance(&self) -> bool {
        self.capabilities.contains(Capabilities::CHANCE)
    }

    /// Does the template roll a magnitude?
    #[must_use]
    pub fn supports_magnitude(&self) -> bool {
        self.capabilities.contains(Capabilities::MAGNITUDE)
    }
}

/// A registered template: validated properties plus the behavior
/// prototype cloned for each fresh instance.
#[derive(Debug)]
pub struct EffectTemplate {
    properties: EffectProperties,
    prototype: Box<dyn EffectBehavior>,
}

impl EffectTemplate {
    pub(crate) fn new(properties: EffectProperties, prototype: Box<dyn EffectBehavior>) -> Self {
        Self {
            properties,
            prototype,
        }
    }

    /// The template's unique key.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.properties.key
    }

    /// The validated properties.
    #[must_use]
    pub fn properties(&self) -> &EffectProperties {
        &self.properties
    }

    /// Clone the behavior prototype for a fresh instance.
    #[must_use]
    pub fn clone_prototype(&self) -> Box<dyn EffectBehavior> {
        self.prototype.boxed_clone()
    }
}
