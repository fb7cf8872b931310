//! Fixtura Core - arbitrary object graphs for property-based tests
//!
//! This crate builds a tree describing the structure of a target type,
//! lets a fluent builder fix, resize, null or filter parts of that tree,
//! and turns the result into a generator that yields fresh values on
//! every sample.
//!
//! # Main Components
//!
//! - **Type Model**: `Type`, `Value` and the `Describe` trait
//! - **Traversal**: property generators, candidate resolution and the arena tree
//! - **Node Resolution**: path expressions such as `items[0].id` or `tags[*]{value}`
//! - **Manipulation**: value decomposition, sizes, nullity, map entries and filters
//! - **Combinable Arbitraries**: lazy generators with retry, mapping and uniqueness
//! - **Builder**: `ArbitraryBuilder` and the `FixtureMonkey` entry point
//!
//! # Example
//!
//! ```no_run
//! use fixtura_core::{FixtureMonkey, Result, StructDef, Type};
//!
//! fn example() -> Result<()> {
//!     let item = Type::of_struct(StructDef::new("Item").field("id", Type::String));
//!     let fixture = FixtureMonkey::builder().seed(42).build()?;
//!     let value = fixture
//!         .give_me_builder(Type::list(item))
//!         .size("$", 2, 2)
//!         .set("[0].id", "first")
//!         .sample()?;
//!     assert_eq!(value.element_count(), Some(2));
//!     Ok(())
//! }
//! ```
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

pub mod arbitrary;
pub mod builder;
pub mod error;
pub mod fixture;
pub mod generator;
pub mod introspector;
pub mod manipulator;
pub mod options;
pub mod property;
pub mod resolver;
pub mod supports;
pub mod tree;
pub mod types;
pub mod validator;

// Re-export main types for convenience
pub use error::{Error, Result, StrictMode};
pub use types::{
    // Type model
    Annotation, ConstructorDef, Describe, EnumDef, FieldDef, InterfaceDef, StructDef, Type,

    // Values
    Value,
};

pub use arbitrary::{BoxedArbitrary, CombinableArbitrary, CombinableArbitraryExt, PostCondition, UniqueScope};
pub use builder::{ArbitraryBuilder, ArbitraryBuilderContext, BuiltArbitrary};
pub use fixture::{FixtureMonkey, FixtureMonkeyBuilder};
pub use introspector::ArbitraryIntrospector;
pub use options::{FixtureSettings, GenerateOptions, DEFAULT_ELEMENT_MAX_SIZE};
pub use property::{Property, TypeMatcher};
pub use resolver::NodeResolver;
pub use supports::ArbitrarySupports;
pub use validator::{ArbitraryValidator, ConstraintViolation, FieldConstraintValidator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
