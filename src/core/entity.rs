//! Entity identification and the entity world.
//!
//! Every creature the effect engine can touch (player, monster, summoned
//! companion) has a unique `EntityId`. Effects never hold a reference to
//! an entity; they hold the id and re-resolve it through `EntityWorld` at
//! every lifecycle transition. A missing entity is an expected condition
//! (the caster died, the companion was despawned), never a fault.
//!
//! ## State Values (i64 only)
//!
//! Entity state uses `FxHashMap<String, i64>`:
//! - Booleans: use 0/1 (see `has_flag` / `set_flag`)
//! - Entity references: use `EntityId.0` as i64
//! - Enums: use discriminant values
//!
//! Effects assert flags (e.g. `"water-walking"`) and adjust stats
//! (e.g. `"hp"`) through this bag; the engine itself never interprets
//! the keys.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Unique identifier for any entity the engine can target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Create a new entity ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// A live entity.
///
/// Carries only what the effect engine needs: the caster level used when
/// rolling settings, and the mutable state bag effects act on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Unique id, stable for the entity's lifetime.
    pub id: EntityId,

    /// Display name (for announcements/debugging).
    pub name: String,

    /// Level, read when rolling cast settings.
    pub level: u32,

    /// Mutable entity state (flags, stats).
    #[serde(default)]
    state: FxHashMap<String, i64>,
}

impl Entity {
    /// Get a state value with a default.
    #[must_use]
    pub fn get_state(&self, key: &str, default: i64) -> i64 {
        self.state.get(key).copied().unwrap_or(default)
    }

    /// Set a state value.
    pub fn set_state(&mut self, key: impl Into<String>, value: i64) {
        self.state.insert(key.into(), value);
    }

    /// Modify a state value by delta.
    pub fn modify_state(&mut self, key: &str, delta: i64) {
        let current = self.get_state(key, 0);
        self.state.insert(key.to_string(), current + delta);
    }

    /// Check if a state flag is set (non-zero).
    #[must_use]
    pub fn has_flag(&self, key: &str) -> bool {
        self.get_state(key, 0) != 0
    }

    /// Set a boolean flag (1 for true, 0 for false).
    pub fn set_flag(&mut self, key: impl Into<String>, value: bool) {
        self.set_state(key, if value { 1 } else { 0 });
    }
}

/// Owns all live entities and allocates their ids.
///
/// The world is a handle table: lookups are liveness checks. Despawned
/// ids are never reused, so a stale `EntityId` held by an old effect
/// resolves to `None` rather than to some newer entity.
///
/// ## Usage
///
/// ```
/// use aura::core::EntityWorld;
///
/// let mut world = EntityWorld::new();
/// let hero = world.spawn("Hero", 5);
///
/// assert!(world.is_alive(hero));
/// world.despawn(hero);
/// assert!(world.get(hero).is_none());
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EntityWorld {
    entities: FxHashMap<EntityId, Entity>,
    next_id: u32,
}

impl EntityWorld {
    /// Create an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawn a new entity, returning its id.
    pub fn spawn(&mut self, name: impl Into<String>, level: u32) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.insert(
            id,
            Entity {
                id,
                name: name.into(),
                level,
                state: FxHashMap::default(),
            },
        );
        id
    }

    /// Remove an entity, returning it if it was alive.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        self.entities.remove(&id)
    }

    /// Resolve an id to a live entity.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Resolve an id to a live entity, mutably.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(&id)
    }

    /// Check whether an id refers to a live entity.
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if the world is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterate over live entities in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_and_lookup() {
        let mut world = EntityWorld::new();

        let a = world.spawn("Rat", 1);
        let b = world.spawn("Wolf", 3);

        assert_ne!(a, b);
        assert_eq!(world.get(a).unwrap().name, "Rat");
        assert_eq!(world.get(b).unwrap().level, 3);
        assert_eq!(world.len(), 2);
    }

    #[test]
    fn test_despawn() {
        let mut world = EntityWorld::new();
        let id = world.spawn("Rat", 1);

        let removed = world.despawn(id);
        assert!(removed.is_some());
        assert!(!world.is_alive(id));
        assert!(world.despawn(id).is_none());
    }

    #[test]
    fn test_ids_not_reused() {
        let mut world = EntityWorld::new();
        let a = world.spawn("Rat", 1);
        world.despawn(a);

        let b = world.spawn("Wolf", 1);
        assert_ne!(a, b);
        assert!(world.get(a).is_none());
    }

    #[test]
    fn test_entity_state() {
        let mut world = EntityWorld::new();
        let id = world.spawn("Hero", 4);
        let hero = world.get_mut(id).unwrap();

        assert_eq!(hero.get_state("hp", 0), 0);
        hero.set_state("hp", 30);
        hero.modify_state("hp", -12);
        assert_eq!(hero.get_state("hp", 0), 18);
    }

    #[test]
    fn test_entity_flags() {
        let mut world = EntityWorld::new();
        let id = world.spawn("Hero", 4);
        let hero = world.get_mut(id).unwrap();

        assert!(!hero.has_flag("water-walking"));
        hero.set_flag("water-walking", true);
        assert!(hero.has_flag("water-walking"));
        hero.set_flag("water-walking", false);
        assert!(!hero.has_flag("water-walking"));
    }

    #[test]
    fn test_serialization() {
        let mut world = EntityWorld::new();
        let id = world.spawn("Hero", 4);
        world.get_mut(id).unwrap().set_flag("poisoned", true);

        let json = serde_json::to_string(&world).unwrap();
        let restored: EntityWorld = serde_json::from_str(&json).unwrap();

        assert!(restored.get(id).unwrap().has_flag("poisoned"));
        assert_eq!(restored.len(), world.len());
    }
}
