//! Generation settings and registries
//!
//! `FixtureSettings` holds plain, serializable knobs. `GenerateOptions`
//! combines them with the operator registries (property generators,
//! container generators, candidate resolvers, introspectors, validator)
//! that a `FixtureMonkeyBuilder` assembles.
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

use crate::introspector::{default_introspectors, ArbitraryIntrospector};
use crate::property::container::{
    EntryContainerPropertyGenerator, MapContainerPropertyGenerator,
    SequenceContainerPropertyGenerator, SingleValueContainerPropertyGenerator,
};
use crate::property::cache::DEFAULT_PROPERTY_CACHE_SIZE;
use crate::property::matcher::find_operator;
use crate::property::{
    ArbitraryContainerInfo, CandidateConcretePropertyResolver, CompositePropertyGenerator,
    ConstructorPropertyGenerator, ContainerPropertyGenerator,
    DefaultCandidateConcretePropertyResolver, FieldPropertyGenerator, LazyPropertyGenerator,
    Property, PropertyGenerator, TypeMatcher,
};
use crate::tree::{DefaultNullInjectGenerator, NullInjectGenerator};
use crate::types::Type;
use crate::validator::{ArbitraryValidator, NoopValidator};
use crate::{Error, Result, StrictMode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Bound used when only one side of a size range is given
pub const DEFAULT_ELEMENT_MAX_SIZE: usize = 3;

/// Plain generation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureSettings {
    /// Seed of the master random generator; entropy when absent
    pub seed: Option<u64>,
    /// Null probability of ordinary properties
    pub default_null_inject: f64,
    /// Null probability of properties annotated `Nullable`
    pub nullable_null_inject: f64,
    pub default_min_size: usize,
    pub default_max_size: usize,
    /// Tries budget for filters and uniqueness
    pub max_tries: usize,
    /// Containers deeper than this are generated empty
    pub max_depth: usize,
    pub strict_mode: StrictMode,
    /// Reject values the validator reports as invalid
    pub valid_only: bool,
    pub property_cache_size: usize,
    pub string_max_length: usize,
    /// Inclusive bounds for generated integers, clamped to each type's range
    pub int_range: Option<(i64, i64)>,
}

impl Default for FixtureSettings {
    fn default() -> Self {
        Self {
            seed: None,
            default_null_inject: 0.0,
            nullable_null_inject: 0.2,
            default_min_size: 0,
            default_max_size: DEFAULT_ELEMENT_MAX_SIZE,
            max_tries: 1000,
            max_depth: 8,
            strict_mode: StrictMode::default(),
            valid_only: true,
            property_cache_size: DEFAULT_PROPERTY_CACHE_SIZE,
            string_max_length: 16,
            int_range: None,
        }
    }
}

impl FixtureSettings {
    /// Parse settings from JSON, filling absent keys with defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: FixtureSettings = serde_json::from_str(json).map_err(|e| Error::Configuration {
            message: format!("Invalid fixture settings: {}", e),
            source: Some(anyhow::Error::new(e)),
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check that the settings are consistent
    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Error::Configuration { message, source: None };

        for (name, rate) in [
            ("default_null_inject", self.default_null_inject),
            ("nullable_null_inject", self.nullable_null_inject),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(invalid(format!("{} must be within [0, 1], got {}", name, rate)));
            }
        }
        if self.default_min_size > self.default_max_size {
            return Err(invalid(format!(
                "default_min_size {} is greater than default_max_size {}",
                self.default_min_size, self.default_max_size
            )));
        }
        if self.max_tries == 0 {
            return Err(invalid("max_tries must be at least 1".to_string()));
        }
        if self.property_cache_size == 0 {
            return Err(invalid("property_cache_size must be at least 1".to_string()));
        }
        if let Some((low, high)) = self.int_range {
            if low > high {
                return Err(invalid(format!("int_range lower bound {} exceeds upper bound {}", low, high)));
            }
        }
        Ok(())
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_default_null_inject(mut self, rate: f64) -> Self {
        self.default_null_inject = rate;
        self
    }

    pub fn with_nullable_null_inject(mut self, rate: f64) -> Self {
        self.nullable_null_inject = rate;
        self
    }

    /// Set the default container size bounds
    pub fn with_default_size(mut self, min: usize, max: usize) -> Self {
        self.default_min_size = min;
        self.default_max_size = max;
        self
    }

    pub fn with_max_tries(mut self, max_tries: usize) -> Self {
        self.max_tries = max_tries;
        self
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_strict_mode(mut self, strict_mode: StrictMode) -> Self {
        self.strict_mode = strict_mode;
        self
    }

    pub fn with_valid_only(mut self, valid_only: bool) -> Self {
        self.valid_only = valid_only;
        self
    }

    pub fn with_property_cache_size(mut self, size: usize) -> Self {
        self.property_cache_size = size;
        self
    }

    pub fn with_string_max_length(mut self, length: usize) -> Self {
        self.string_max_length = length;
        self
    }

    pub fn with_int_range(mut self, low: i64, high: i64) -> Self {
        self.int_range = Some((low, high));
        self
    }
}

/// Settings plus operator registries
///
/// Registries are searched front to back; the first matcher accepting a type
/// wins, so user registrations are inserted ahead of the defaults.
pub struct GenerateOptions {
    pub settings: FixtureSettings,
    pub property_generators: Vec<(TypeMatcher, Arc<dyn PropertyGenerator>)>,
    pub container_generators: Vec<(TypeMatcher, Arc<dyn ContainerPropertyGenerator>)>,
    pub candidate_resolvers: Vec<(TypeMatcher, Arc<dyn CandidateConcretePropertyResolver>)>,
    pub null_inject_generator: Arc<dyn NullInjectGenerator>,
    pub introspectors: Vec<Arc<dyn ArbitraryIntrospector>>,
    pub validator: Arc<dyn ArbitraryValidator>,
    default_property_generator: Arc<LazyPropertyGenerator>,
}

impl GenerateOptions {
    pub fn new(settings: FixtureSettings) -> Self {
        let composite = CompositePropertyGenerator::new(vec![
            Arc::new(ConstructorPropertyGenerator),
            Arc::new(FieldPropertyGenerator::new()),
        ]);
        let default_property_generator = Arc::new(LazyPropertyGenerator::new(
            Arc::new(composite),
            settings.property_cache_size.max(1),
        ));
        let null_inject_generator = Arc::new(DefaultNullInjectGenerator::new(
            settings.default_null_inject,
            settings.nullable_null_inject,
        ));

        Self {
            settings,
            property_generators: Vec::new(),
            container_generators: default_container_generators(),
            candidate_resolvers: Vec::new(),
            null_inject_generator,
            introspectors: default_introspectors(),
            validator: Arc::new(NoopValidator),
            default_property_generator,
        }
    }

    /// Concrete candidates of an abstract property; empty for concrete ones
    pub fn candidate_properties(&self, property: &Property) -> Vec<Property> {
        match find_operator(&self.candidate_resolvers, &property.ty) {
            Some(resolver) => resolver.resolve(property),
            None if property.ty.is_abstract() => DefaultCandidateConcretePropertyResolver.resolve(property),
            None => Vec::new(),
        }
    }

    pub fn property_generator_for(&self, ty: &Type) -> Arc<dyn PropertyGenerator> {
        match find_operator(&self.property_generators, ty) {
            Some(generator) => Arc::clone(generator),
            None => self.default_property_generator.clone(),
        }
    }

    pub fn container_generator(&self, ty: &Type) -> Option<Arc<dyn ContainerPropertyGenerator>> {
        find_operator(&self.container_generators, ty).cloned()
    }

    pub fn default_container_info(&self) -> ArbitraryContainerInfo {
        ArbitraryContainerInfo::new(self.settings.default_min_size, self.settings.default_max_size, false)
    }

    /// Drop memoized child properties
    pub fn clear_caches(&self) {
        self.default_property_generator.clear();
    }

    pub fn cached_property_count(&self) -> usize {
        self.default_property_generator.cached_len()
    }
}

impl fmt::Debug for GenerateOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerateOptions")
            .field("settings", &self.settings)
            .field("property_generators", &self.property_generators.len())
            .field("container_generators", &self.container_generators.len())
            .field("candidate_resolvers", &self.candidate_resolvers.len())
            .field("introspectors", &self.introspectors.len())
            .finish_non_exhaustive()
    }
}

fn default_container_generators() -> Vec<(TypeMatcher, Arc<dyn ContainerPropertyGenerator>)> {
    vec![
        (
            TypeMatcher::predicate(|ty| {
                matches!(ty, Type::List(_) | Type::Set(_) | Type::Array(_) | Type::Stream(_))
            }),
            Arc::new(SequenceContainerPropertyGenerator),
        ),
        (
            TypeMatcher::predicate(|ty| matches!(ty, Type::Map(_, _))),
            Arc::new(MapContainerPropertyGenerator),
        ),
        (
            TypeMatcher::predicate(|ty| matches!(ty, Type::Entry(_, _))),
            Arc::new(EntryContainerPropertyGenerator),
        ),
        (
            TypeMatcher::predicate(|ty| matches!(ty, Type::Optional(_) | Type::Supplier(_))),
            Arc::new(SingleValueContainerPropertyGenerator),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{InterfaceDef, StructDef};

    #[test]
    fn test_settings_defaults() {
        let settings = FixtureSettings::default();
        assert_eq!(settings.default_max_size, DEFAULT_ELEMENT_MAX_SIZE);
        assert_eq!(settings.max_tries, 1000);
        assert!(settings.valid_only);
        assert_eq!(settings.strict_mode, StrictMode::Lenient);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_from_json_fills_defaults() {
        let settings = FixtureSettings::from_json_str(r#"{"seed": 7, "default_max_size": 5}"#).unwrap();
        assert_eq!(settings.seed, Some(7));
        assert_eq!(settings.default_max_size, 5);
        assert_eq!(settings.max_tries, 1000);
    }

    #[test]
    fn test_settings_validation_errors() {
        let cases = [
            r#"{"default_null_inject": 1.5}"#,
            r#"{"default_min_size": 4, "default_max_size": 2}"#,
            r#"{"max_tries": 0}"#,
            r#"{"int_range": [5, 1]}"#,
            r#"{"seed": "abc"}"#,
        ];
        for json in cases {
            assert!(
                matches!(FixtureSettings::from_json_str(json), Err(Error::Configuration { .. })),
                "{json}"
            );
        }
    }

    #[test]
    fn test_container_generator_lookup() {
        let options = GenerateOptions::new(FixtureSettings::default());
        assert!(options.container_generator(&Type::list(Type::I32)).is_some());
        assert!(options.container_generator(&Type::map(Type::String, Type::I32)).is_some());
        assert!(options.container_generator(&Type::optional(Type::I32)).is_some());
        assert!(options.container_generator(&Type::String).is_none());
    }

    #[test]
    fn test_candidate_properties_only_for_abstract_types() {
        let options = GenerateOptions::new(FixtureSettings::default());
        let plain = Type::of_struct(StructDef::new("Plain").field("a", Type::I32));
        assert!(options.candidate_properties(&Property::root(plain.clone())).is_empty());

        let shape = Type::of_interface(InterfaceDef::new("Shape").implementation(plain));
        assert_eq!(options.candidate_properties(&Property::root(shape)).len(), 1);
    }

    #[test]
    fn test_default_property_generator_is_cached() {
        let options = GenerateOptions::new(FixtureSettings::default());
        let ty = Type::of_struct(StructDef::new("Cached").field("a", Type::I32));
        let generator = options.property_generator_for(&ty);
        assert_eq!(generator.generate_child_properties(&Property::root(ty.clone())).len(), 1);
        assert_eq!(options.cached_property_count(), 1);
        options.clear_caches();
        assert_eq!(options.cached_property_count(), 0);
    }
}
