//! Built-in effect kinds.
//!
//! A host game registers dozens of behaviors; these four are the
//! crate's reference implementations, chosen to exercise every engine
//! contract: continuous re-assertion (water-walking), per-round work
//! driven by magnitude (regeneration), opaque persisted state plus
//! like-kind narrowing (summon-creature), and a chance-only instant
//! that mutates the collection through the command queue
//! (dispel-magic).

pub mod dispel;
pub mod regeneration;
pub mod summon;
pub mod water_walking;

pub use dispel::DispelMagic;
pub use regeneration::Regeneration;
pub use summon::{CreatureKind, SummonCreature};
pub use water_walking::{WaterWalking, WATER_WALKING_FLAG};
