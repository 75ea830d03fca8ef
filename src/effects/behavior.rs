//! The effect capability interface.
//!
//! Every effect kind implements `EffectBehavior`. The engine hosts
//! dozens of kinds through this one trait and never inspects concrete
//! types itself; the `as_any` hook exists so *behaviors* can narrow
//! their own like-kind checks (a summon comparing creature kinds), not
//! so callers can type-switch.
//!
//! ## Lifecycle
//!
//! `start` fires exactly once when a fresh, non-merged instance becomes
//! active. `resume` replaces `start` for instances rebuilt from a save:
//! it re-establishes runtime side effects without re-rolling settings
//! or re-charging cost. `constant_effect` re-asserts continuous state
//! every round (idempotent); `magic_round` fires once per round after
//! it. `end` runs exactly once, on expiry or dispel, and must undo
//! durable side effects, tolerating a start that never fully ran.
//!
//! All transitions default to no-ops so stateless kinds implement only
//! what they need.

use std::any::Any;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::context::EffectContext;
use crate::templates::EffectProperties;

/// Payload version used by the default capture of stateless behaviors.
pub const STATELESS_PAYLOAD_VERSION: u16 = 0;

/// Engine-opaque persisted behavior state.
///
/// The engine stores and round-trips these bytes without interpreting
/// them; only the owning behavior can decode its own payload, and only
/// for versions it recognizes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpaquePayload {
    /// Behavior-declared schema version.
    pub version: u16,

    /// Behavior-encoded bytes (typically bincode).
    pub bytes: Vec<u8>,
}

impl OpaquePayload {
    /// Empty payload for behaviors with no runtime state.
    #[must_use]
    pub fn stateless() -> Self {
        Self {
            version: STATELESS_PAYLOAD_VERSION,
            bytes: Vec::new(),
        }
    }

    /// Encode a serde value under a version tag.
    pub fn encode<T: Serialize>(version: u16, value: &T) -> Result<Self, PersistError> {
        Ok(Self {
            version,
            bytes: bincode::serialize(value)?,
        })
    }

    /// Decode the payload, rejecting unknown versions.
    pub fn decode<T: for<'de> Deserialize<'de>>(
        &self,
        expected_version: u16,
    ) -> Result<T, PersistError> {
        if self.version != expected_version {
            return Err(PersistError::PayloadVersionMismatch {
                expected: expected_version,
                found: self.version,
            });
        }
        Ok(bincode::deserialize(&self.bytes)?)
    }
}

/// Persistence failures for one instance.
///
/// Never fatal: the serializer drops the single affected instance with
/// a warning and keeps going.
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("payload version {found} not recognized (expected {expected})")]
    PayloadVersionMismatch { expected: u16, found: u16 },

    #[error("record schema version {0} not recognized")]
    UnknownRecordVersion(u16),

    #[error("template '{0}' not registered")]
    UnknownTemplate(String),

    #[error("payload codec failure: {0}")]
    Codec(#[from] bincode::Error),
}

/// Outcome of folding an incoming like-kind cast into an incumbent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MergeOutcome {
    /// The incumbent absorbed the incoming cast.
    Stacked,
    /// The incumbent declined; the incoming instance inserts fresh.
    Rejected,
}

/// Polymorphic per-effect behavior.
pub trait EffectBehavior: Send + Sync {
    /// Static template description, consumed at registration.
    fn properties(&self) -> EffectProperties;

    /// Clone into a fresh boxed behavior (prototype instantiation).
    fn boxed_clone(&self) -> Box<dyn EffectBehavior>;

    /// Downcast hook for like-kind narrowing between two behaviors of
    /// the same template.
    fn as_any(&self) -> &dyn Any;

    /// Mutable downcast hook, for hosts that configure a freshly
    /// instantiated behavior (e.g. choosing a summoned creature kind).
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// One-time activation side effects. Fresh instances only.
    fn start(&mut self, _ctx: &mut EffectContext<'_>) {}

    /// Load-time substitute for `start`: re-establish runtime side
    /// effects without re-rolling or re-charging.
    fn resume(&mut self, _ctx: &mut EffectContext<'_>) {}

    /// Re-assert continuous state. Called every round, including round
    /// zero at apply; must be idempotent.
    fn constant_effect(&mut self, _ctx: &mut EffectContext<'_>) {}

    /// One-shot-per-round behavior, after `constant_effect`.
    fn magic_round(&mut self, _ctx: &mut EffectContext<'_>) {}

    /// Undo durable side effects. Exactly once, expiry or dispel; must
    /// no-op gracefully if `start`/`resume` never ran fully.
    fn end(&mut self, _ctx: &mut EffectContext<'_>) {}

    /// Symmetric like-kind predicate, consulted only for instances of
    /// the same template key. Defaults to "same key is enough".
    fn is_like_kind(&self, _other: &dyn EffectBehavior) -> bool {
        true
    }

    /// Fold an incoming like-kind cast into this incumbent.
    ///
    /// The default (and near-universal) policy extends the incumbent:
    /// incoming rounds add onto the remaining clock. Overrides must
    /// document their policy (take-longest, refuse-to-stack).
    fn add_state(
        &mut self,
        own_rounds: &mut u32,
        incoming_rounds: u32,
        _incoming: &dyn EffectBehavior,
    ) -> MergeOutcome {
        *own_rounds = own_rounds.saturating_add(incoming_rounds);
        MergeOutcome::Stacked
    }

    /// Capture opaque runtime state for persistence.
    fn capture(&self) -> Result<OpaquePayload, PersistError> {
        Ok(OpaquePayload::stateless())
    }

    /// Restore opaque runtime state from persistence. Must reject
    /// unrecognized versions rather than guess.
    fn restore(&mut self, payload: &OpaquePayload) -> Result<(), PersistError> {
        if payload.version != STATELESS_PAYLOAD_VERSION {
            return Err(PersistError::PayloadVersionMismatch {
                expected: STATELESS_PAYLOAD_VERSION,
                found: payload.version,
            });
        }
        Ok(())
    }
}

impl Clone for Box<dyn EffectBehavior> {
    fn clone(&self) -> Self {
        self.boxed_clone()
    }
}

impl std::fmt::Debug for dyn EffectBehavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EffectBehavior({})", self.properties().key)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_encode_decode() {
        #[derive(Serialize, Deserialize, PartialEq, Debug)]
        struct State {
            charges: u32,
            active: bool,
        }

        let state = State {
            charges: 3,
            active: true,
        };
        let payload = OpaquePayload::encode(2, &state).unwrap();
        assert_eq!(payload.version, 2);

        let back: State = payload.decode(2).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn test_payload_version_mismatch() {
        let payload = OpaquePayload::encode(1, &7u32).unwrap();
        let err = payload.decode::<u32>(2).unwrap_err();
        assert!(matches!(
            err,
            PersistError::PayloadVersionMismatch {
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn test_stateless_payload_round_trip() {
        let payload = OpaquePayload::stateless();
        assert_eq!(payload.version, STATELESS_PAYLOAD_VERSION);
        assert!(payload.bytes.is_empty());
    }
}
