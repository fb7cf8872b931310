//! Deferred value suppliers
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

use super::{CombinableArbitrary, GenerationContext};
use crate::types::Value;
use crate::Result;

pub type Supplier = Box<dyn FnMut(&mut GenerationContext<'_>) -> Result<Value> + Send>;

/// Memoizes a supplier until cleared
pub struct LazyArbitrary {
    supplier: Supplier,
    cached: Option<Value>,
}

impl LazyArbitrary {
    pub fn new<F>(supplier: F) -> Self
    where
        F: FnMut(&mut GenerationContext<'_>) -> Result<Value> + Send + 'static,
    {
        Self {
            supplier: Box::new(supplier),
            cached: None,
        }
    }

    /// The memoized value, computing it on first use
    pub fn get_value(&mut self, ctx: &mut GenerationContext<'_>) -> Result<Value> {
        if let Some(value) = &self.cached {
            return Ok(value.clone());
        }
        let value = (self.supplier)(ctx)?;
        self.cached = Some(value.clone());
        Ok(value)
    }

    pub fn is_cached(&self) -> bool {
        self.cached.is_some()
    }

    pub fn clear(&mut self) {
        self.cached = None;
    }
}

/// Combinable view of a `LazyArbitrary` that regenerates on every draw
pub struct LazyCombinableArbitrary {
    lazy: LazyArbitrary,
}

impl LazyCombinableArbitrary {
    pub fn new<F>(supplier: F) -> Self
    where
        F: FnMut(&mut GenerationContext<'_>) -> Result<Value> + Send + 'static,
    {
        Self {
            lazy: LazyArbitrary::new(supplier),
        }
    }
}

impl CombinableArbitrary for LazyCombinableArbitrary {
    fn combined(&mut self, ctx: &mut GenerationContext<'_>) -> Result<Value> {
        let value = self.lazy.get_value(ctx);
        self.lazy.clear();
        value
    }

    fn clear(&mut self) {
        self.lazy.clear();
    }

    fn fixed(&self) -> bool {
        false
    }
}
