//! Struct introspection
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

use super::{ArbitraryGeneratorContext, ArbitraryIntrospector};
use crate::arbitrary::{BoxedArbitrary, CombinableArbitraryExt, ObjectCombinableArbitrary};
use crate::types::{Type, Value};
use crate::Result;
use indexmap::IndexMap;

/// Structs, combined from their named children in declaration order
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectIntrospector;

impl ArbitraryIntrospector for ObjectIntrospector {
    fn introspect(&self, ctx: &mut ArbitraryGeneratorContext<'_>) -> Result<Option<BoxedArbitrary>> {
        let Type::Struct(def, _) = ctx.resolved_type() else {
            return Ok(None);
        };
        let type_name = def.name.clone();

        let mut children = IndexMap::new();
        for child in ctx.take_children() {
            match child.name {
                Some(name) => {
                    children.insert(name, child.arbitrary);
                }
                None => log::warn!("unnamed child of {} at {} is ignored", type_name, ctx.path()),
            }
        }

        let arbitrary = ObjectCombinableArbitrary::new(
            children,
            Box::new(move |fields| {
                Ok(Value::Object {
                    type_name: type_name.clone(),
                    fields,
                })
            }),
        );
        Ok(Some(arbitrary.boxed()))
    }
}
