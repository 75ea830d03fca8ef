//! Template registry for effect lookup and instantiation.
//!
//! Behaviors are registered once at startup: the registry reads each
//! prototype's properties, validates them, and rejects inconsistent
//! templates outright; a template that survives registration can be
//! cast without further configuration checks. Lookup is by string key
//! or by the legacy classic key pair.

use rustc_hash::FxHashMap;
use thiserror::Error;

use super::definition::{
    Capabilities, ChanceStrategy, ClassicKey, DurationKind, EffectProperties, EffectTemplate,
};
use super::settings::{compute_cost, roll_settings, CastCost, CastSlider, RolledSettings};
use crate::core::{EntityId, GameRng};
use crate::effects::behavior::EffectBehavior;
use crate::effects::instance::EffectInstance;

/// Configuration failures detected at registration, plus unknown-key
/// lookups at cast time. A rejected template is unusable; nothing else
/// is affected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("template key '{key}' already registered")]
    DuplicateKey { key: String },

    #[error("classic key {classic} of '{key}' already registered")]
    DuplicateClassicKey { key: String, classic: ClassicKey },

    #[error("template '{key}' supports {dimension} but supplies no curve for it")]
    MissingCurve { key: String, dimension: &'static str },

    #[error("template '{key}' supplies a {dimension} source it does not support")]
    UnexpectedCurve { key: String, dimension: &'static str },

    #[error("template '{key}' declares chance support but neither a curve nor a custom function")]
    MissingChanceSource { key: String },

    #[error("template '{key}' duration kind conflicts with its capabilities")]
    InvalidDurationKind { key: String },

    #[error("template '{key}' is not registered")]
    UnknownTemplate { key: String },
}

/// Registry of effect templates.
///
/// Read-only from the engine's perspective once casting begins:
/// registration happens at startup, before any instance exists.
///
/// ## Example
///
/// ```
/// use aura::core::{EntityId, GameRng};
/// use aura::effects::kinds::WaterWalking;
/// use aura::templates::{CastSlider, TemplateRegistry};
///
/// let mut registry = TemplateRegistry::new();
/// registry.register(Box::new(WaterWalking)).unwrap();
///
/// let mut rng = GameRng::new(42);
/// let instance = registry
///     .instantiate_fresh("water-walking", EntityId(0), 1, CastSlider::default(), &mut rng)
///     .unwrap();
/// assert_eq!(instance.settings.duration_rounds, 20);
/// ```
#[derive(Debug, Default)]
pub struct TemplateRegistry {
    templates: FxHashMap<String, EffectTemplate>,
    classic: FxHashMap<ClassicKey, String>,
}

impl TemplateRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a behavior prototype under its own properties.
    ///
    /// Validation rejects the registration (the registry is left
    /// untouched) if the properties are internally inconsistent.
    pub fn register(&mut self, prototype: Box<dyn EffectBehavior>) -> Result<(), RegistryError> {
        let props = prototype.properties();
        Self::validate(&props)?;

        if self.templates.contains_key(&props.key) {
            return Err(RegistryError::DuplicateKey {
                key: props.key.clone(),
            });
        }
        if let Some(classic) = props.classic_key {
            if self.classic.contains_key(&classic) {
                return Err(RegistryError::DuplicateClassicKey {
                    key: props.key.clone(),
                    classic,
                });
            }
            self.classic.insert(classic, props.key.clone());
        }

        let key = props.key.clone();
        self.templates
            .insert(key, EffectTemplate::new(props, prototype));
        Ok(())
    }

    fn validate(props: &EffectProperties) -> Result<(), RegistryError> {
        let key = || props.key.clone();

        // Each capability needs its roll source; each roll source needs
        // its capability.
        if props.capabilities.contains(Capabilities::DURATION) {
            if props.duration.is_none() {
                return Err(RegistryError::MissingCurve {
                    key: key(),
                    dimension: "duration",
                });
            }
        } else if props.duration.is_some() {
            return Err(RegistryError::UnexpectedCurve {
                key: key(),
                dimension: "duration",
            });
        }

        if props.capabilities.contains(Capabilities::MAGNITUDE) {
            if props.magnitude.is_none() {
                return Err(RegistryError::MissingCurve {
                    key: key(),
                    dimension: "magnitude",
                });
            }
        } else if props.magnitude.is_some() {
            return Err(RegistryError::UnexpectedCurve {
                key: key(),
                dimension: "magnitude",
            });
        }

        if props.capabilities.contains(Capabilities::CHANCE) {
            let has_source = props.chance.is_some()
                || matches!(props.chance_strategy, ChanceStrategy::Custom(_));
            if !has_source {
                return Err(RegistryError::MissingChanceSource { key: key() });
            }
        } else if props.chance.is_some()
            || matches!(props.chance_strategy, ChanceStrategy::Custom(_))
        {
            return Err(RegistryError::UnexpectedCurve {
                key: key(),
                dimension: "chance",
            });
        }

        // The clock kind must agree with duration support.
        let supports_duration = props.capabilities.contains(Capabilities::DURATION);
        let kind_ok = match props.duration_kind {
            DurationKind::Rounds => supports_duration,
            DurationKind::Indefinite | DurationKind::Instant => !supports_duration,
        };
        if !kind_ok {
            return Err(RegistryError::InvalidDurationKind { key: key() });
        }

        Ok(())
    }

    /// Look up a template by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&EffectTemplate> {
        self.templates.get(key)
    }

    /// Look up a template by its classic compatibility key.
    #[must_use]
    pub fn get_by_classic(&self, classic: ClassicKey) -> Option<&EffectTemplate> {
        self.classic.get(&classic).and_then(|k| self.templates.get(k))
    }

    /// Check if a key is registered.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.templates.contains_key(key)
    }

    /// Number of registered templates.
    #[must_use]
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Iterate over registered templates in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &EffectTemplate> {
        self.templates.values()
    }

    /// Roll a fresh instance of a template for one cast.
    ///
    /// Rolls settings from the template's curves against the caster
    /// level and slider, and clones the behavior prototype. The
    /// returned instance joins a bundle via `Bundle::push`.
    pub fn instantiate_fresh(
        &self,
        key: &str,
        caster: EntityId,
        caster_level: u32,
        slider: CastSlider,
        rng: &mut GameRng,
    ) -> Result<EffectInstance, RegistryError> {
        let template = self.get(key).ok_or_else(|| RegistryError::UnknownTemplate {
            key: key.to_string(),
        })?;
        let props = template.properties();
        let settings = roll_settings(props, caster_level, slider, rng);

        Ok(EffectInstance::new(
            key,
            caster,
            settings,
            props.duration_kind,
            props.supports_chance(),
            props.announcement.clone(),
            template.clone_prototype(),
        ))
    }

    /// Price a cast of a template from already-rolled settings.
    pub fn cost_of(&self, key: &str, settings: &RolledSettings) -> Result<CastCost, RegistryError> {
        let template = self.get(key).ok_or_else(|| RegistryError::UnknownTemplate {
            key: key.to_string(),
        })?;
        Ok(compute_cost(template.properties(), settings))
    }
}
