//! Announcement events for the presentation layer.
//!
//! The engine fires an announcement at most once per Start (never on
//! Resume, never on merge), so load-time reconstruction stays silent.
//! Behaviors may also push their own announcements mid-transition
//! (e.g. "Your ally arrives!"). The host drains the queue each frame
//! and renders however it likes; the engine never interprets these.

use serde::{Deserialize, Serialize};

use crate::core::EntityId;

/// What kind of moment an announcement marks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnnouncementKind {
    /// A fresh instance survived stacking and received Start.
    Started,
    /// A chance-gated instance failed its roll and was discarded.
    Fizzled,
    /// A behavior-authored message.
    Custom,
}

/// A one-shot presentation event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    /// Round the event fired on.
    pub round: u64,

    /// Casting entity.
    pub caster: EntityId,

    /// Affected entity.
    pub target: EntityId,

    /// Key of the effect template involved.
    pub effect_key: String,

    /// What happened.
    pub kind: AnnouncementKind,

    /// Display text ("You walk on water!").
    pub message: String,
}
