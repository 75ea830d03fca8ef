//! # aura
//!
//! A general-purpose entity-effect engine for round-based RPGs.
//!
//! ## Design Principles
//!
//! 1. **Effect-Agnostic**: No hardcoded effect kinds. The engine hosts
//!    arbitrary behaviors through one capability interface and never
//!    inspects concrete types.
//!
//! 2. **Explicit Context**: Every lifecycle transition receives the
//!    caster handle, target handle, round number, and world access as
//!    arguments. There are no global managers.
//!
//! 3. **Weak References**: Casters and targets are ids re-resolved at
//!    every transition. A dead entity makes a transition no-op; it
//!    never crashes a round tick.
//!
//! ## Architecture
//!
//! - **Incumbent Stacking**: recasting a like-kind effect merges into
//!   the existing instance (extending its clock by default) instead of
//!   duplicating it; Start fires once per surviving representative.
//!
//! - **Round Scheduling**: per entity and per round, continuous
//!   effects re-assert, one-shot round behaviors fire, clocks count
//!   down, and expired instances End exactly once, all over an O(1)
//!   order snapshot so mid-round removal is safe.
//!
//! - **Versioned Persistence**: the engine captures generic instance
//!   fields itself; each behavior round-trips its own opaque payload
//!   under its own version tag. Unreadable records drop one instance
//!   with a warning, never the save.
//!
//! ## Modules
//!
//! - `core`: Entity ids, the entity world, deterministic RNG
//! - `templates`: Effect definitions, cost curves, settings/cost model, registry
//! - `effects`: Behavior interface, instances, bundles, stacking, built-in kinds
//! - `engine`: The round scheduler
//! - `events`: Announcements for the presentation layer
//! - `saves`: Capture/restore of per-entity effect state

pub mod core;
pub mod effects;
pub mod engine;
pub mod events;
pub mod saves;
pub mod templates;

// Re-export commonly used types
pub use crate::core::{Entity, EntityId, EntityWorld, GameRng, GameRngState};

pub use crate::templates::{
    CastCost, CastSlider, Capabilities, ClassicKey, CraftingStations, DurationKind,
    EffectProperties, EffectTemplate, ElementTypes, MagnitudeCurve, PotionRecipe, RegistryError,
    RolledSettings, ScalarCurve, Skill, TargetTypes, TemplateRegistry,
};

pub use crate::effects::{
    ActiveEffects, Bundle, BundleId, CastContext, CastSource, EffectBehavior, EffectCommand,
    EffectContext, EffectId, EffectInstance, MergeOutcome, OpaquePayload, PersistError,
    StackOutcome,
};

pub use crate::engine::{EffectEngine, EffectStatus};

pub use crate::events::{Announcement, AnnouncementKind};

pub use crate::saves::{
    capture_entity, restore_entity, EffectRecord, EntityEffectsRecord, RECORD_VERSION,
};
