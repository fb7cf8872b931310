//! ArbitraryBuilder for describing and sampling generated values
//!
//! A builder pairs a root property with an `ArbitraryBuilderContext`: the
//! manipulators, size constraints and filters recorded by its fluent calls.
//! Derivations (`copy`, `map`, `zip_with`, `set_builder`) deep-copy the
//! context, so changing one builder never affects another.
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

mod build;
mod core;
mod derived;
mod types;

pub use self::build::BuiltArbitrary;
pub use self::core::ArbitraryBuilder;
pub use self::types::ArbitraryBuilderContext;
