//! Effect templates: static definitions, cost curves, the settings and
//! cost model, and the registry that validates and instantiates them.

pub mod curve;
pub mod definition;
pub mod registry;
pub mod settings;

pub use curve::{CostSchedule, MagnitudeCurve, ScalarCurve};
pub use definition::{
    Capabilities, ChanceStrategy, ClassicKey, CostStrategy, CraftingStations, DimensionCosts,
    DurationKind, EffectProperties, EffectTemplate, ElementTypes, PotionRecipe, Skill, TargetTypes,
};
pub use registry::{RegistryError, TemplateRegistry};
pub use settings::{compute_cost, roll_settings, CastCost, CastSlider, RolledSettings};
