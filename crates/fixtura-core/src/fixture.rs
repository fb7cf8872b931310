//! Fixture entry point
//!
//! `FixtureMonkey` owns the generation options and a seeded master random
//! generator. Every builder it hands out gets its own generator seeded from
//! the master, so a fixed `seed` reproduces a whole test run.
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

use crate::builder::ArbitraryBuilder;
use crate::introspector::ArbitraryIntrospector;
use crate::options::{FixtureSettings, GenerateOptions};
use crate::property::{
    CandidateConcretePropertyResolver, ConcreteTypeCandidateConcretePropertyResolver,
    ContainerPropertyGenerator, Property, PropertyGenerator, TypeMatcher,
};
use crate::tree::NullInjectGenerator;
use crate::types::{Describe, Type, Value};
use crate::validator::ArbitraryValidator;
use crate::{Result, StrictMode};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

/// Hands out builders sharing one set of options
pub struct FixtureMonkey {
    options: Arc<GenerateOptions>,
    rng: Mutex<StdRng>,
}

impl FixtureMonkey {
    /// Fixture with default settings
    pub fn new() -> Self {
        Self::from_options(GenerateOptions::new(FixtureSettings::default()))
    }

    pub fn builder() -> FixtureMonkeyBuilder {
        FixtureMonkeyBuilder::new()
    }

    fn from_options(options: GenerateOptions) -> Self {
        let rng = match options.settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            options: Arc::new(options),
            rng: Mutex::new(rng),
        }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    fn next_rng(&self) -> StdRng {
        let mut master = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        StdRng::seed_from_u64(master.gen())
    }

    /// Builder for an arbitrary type description
    pub fn give_me_builder(&self, ty: Type) -> ArbitraryBuilder {
        ArbitraryBuilder::new(Arc::clone(&self.options), Property::root(ty), self.next_rng())
    }

    pub fn give_me_builder_of<T: Describe>(&self) -> ArbitraryBuilder {
        self.give_me_builder(T::describe())
    }

    /// Builder whose root is fixed to `value`
    ///
    /// The value is decomposed into the tree, so further calls can still
    /// override parts of it.
    pub fn give_me_builder_from<T: Serialize + Describe>(&self, value: &T) -> Result<ArbitraryBuilder> {
        let ty = T::describe();
        let value = Value::from_json(&serde_json::to_value(value)?, &ty)?;
        Ok(self.give_me_builder(ty).set_root(value))
    }

    pub fn give_me_one<T: Describe + DeserializeOwned>(&self) -> Result<T> {
        self.give_me_builder_of::<T>().sample_as()
    }

    /// `size` values of `T` from one builder
    pub fn give_me<T: Describe + DeserializeOwned>(&self, size: usize) -> Result<Vec<T>> {
        let mut builder = self.give_me_builder_of::<T>();
        (0..size).map(|_| builder.sample_as()).collect()
    }

    /// Drop memoized child properties
    pub fn clear_caches(&self) {
        self.options.clear_caches();
    }
}

impl Default for FixtureMonkey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FixtureMonkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixtureMonkey")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Assembles settings and registries into a `FixtureMonkey`
///
/// Registrations are consulted before the built-in defaults, in the order
/// they were added.
#[derive(Default)]
pub struct FixtureMonkeyBuilder {
    settings: FixtureSettings,
    introspectors: Vec<Arc<dyn ArbitraryIntrospector>>,
    container_generators: Vec<(TypeMatcher, Arc<dyn ContainerPropertyGenerator>)>,
    candidate_resolvers: Vec<(TypeMatcher, Arc<dyn CandidateConcretePropertyResolver>)>,
    property_generators: Vec<(TypeMatcher, Arc<dyn PropertyGenerator>)>,
    validator: Option<Arc<dyn ArbitraryValidator>>,
    null_inject_generator: Option<Arc<dyn NullInjectGenerator>>,
}

impl FixtureMonkeyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all plain settings at once
    pub fn settings(mut self, settings: FixtureSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.settings = self.settings.with_seed(seed);
        self
    }

    pub fn default_null_inject(mut self, rate: f64) -> Self {
        self.settings = self.settings.with_default_null_inject(rate);
        self
    }

    pub fn nullable_null_inject(mut self, rate: f64) -> Self {
        self.settings = self.settings.with_nullable_null_inject(rate);
        self
    }

    pub fn default_size(mut self, min: usize, max: usize) -> Self {
        self.settings = self.settings.with_default_size(min, max);
        self
    }

    pub fn max_tries(mut self, max_tries: usize) -> Self {
        self.settings = self.settings.with_max_tries(max_tries);
        self
    }

    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.settings = self.settings.with_max_depth(max_depth);
        self
    }

    pub fn strict_mode(mut self, strict_mode: StrictMode) -> Self {
        self.settings = self.settings.with_strict_mode(strict_mode);
        self
    }

    pub fn valid_only(mut self, valid_only: bool) -> Self {
        self.settings = self.settings.with_valid_only(valid_only);
        self
    }

    pub fn int_range(mut self, low: i64, high: i64) -> Self {
        self.settings = self.settings.with_int_range(low, high);
        self
    }

    pub fn string_max_length(mut self, length: usize) -> Self {
        self.settings = self.settings.with_string_max_length(length);
        self
    }

    pub fn push_introspector(mut self, introspector: Arc<dyn ArbitraryIntrospector>) -> Self {
        self.introspectors.push(introspector);
        self
    }

    pub fn push_container_property_generator(
        mut self,
        matcher: TypeMatcher,
        generator: Arc<dyn ContainerPropertyGenerator>,
    ) -> Self {
        self.container_generators.push((matcher, generator));
        self
    }

    pub fn push_candidate_resolver(
        mut self,
        matcher: TypeMatcher,
        resolver: Arc<dyn CandidateConcretePropertyResolver>,
    ) -> Self {
        self.candidate_resolvers.push((matcher, resolver));
        self
    }

    /// Generate `implementations` wherever the interface named `interface` appears
    pub fn interface_implements(self, interface: &str, implementations: Vec<Type>) -> Self {
        self.push_candidate_resolver(
            TypeMatcher::named(interface),
            Arc::new(ConcreteTypeCandidateConcretePropertyResolver::new(implementations)),
        )
    }

    pub fn push_property_generator(mut self, matcher: TypeMatcher, generator: Arc<dyn PropertyGenerator>) -> Self {
        self.property_generators.push((matcher, generator));
        self
    }

    pub fn validator(mut self, validator: Arc<dyn ArbitraryValidator>) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn null_inject_generator(mut self, generator: Arc<dyn NullInjectGenerator>) -> Self {
        self.null_inject_generator = Some(generator);
        self
    }

    /// Validate the settings and assemble the fixture
    pub fn build(self) -> Result<FixtureMonkey> {
        self.settings.validate()?;
        let mut options = GenerateOptions::new(self.settings);

        options.introspectors = self
            .introspectors
            .into_iter()
            .chain(options.introspectors)
            .collect();
        options.container_generators = self
            .container_generators
            .into_iter()
            .chain(options.container_generators)
            .collect();
        options.candidate_resolvers = self.candidate_resolvers;
        options.property_generators = self.property_generators;
        if let Some(validator) = self.validator {
            options.validator = validator;
        }
        if let Some(generator) = self.null_inject_generator {
            options.null_inject_generator = generator;
        }

        debug!(
            seed = ?options.settings.seed,
            introspectors = options.introspectors.len(),
            candidate_resolvers = options.candidate_resolvers.len(),
            "fixture built"
        );
        Ok(FixtureMonkey::from_options(options))
    }
}
