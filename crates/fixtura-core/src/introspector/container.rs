//! Container introspection
//!
//! Sequences become lists, sets additionally keep their elements distinct,
//! maps are assembled from `[key, value]` entries with distinct keys, and
//! optional or supplier wrappers unwrap their single element.
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

use super::{ArbitraryGeneratorContext, ArbitraryIntrospector};
use crate::arbitrary::{BoxedArbitrary, CombinableArbitraryExt, ContainerCombinableArbitrary};
use crate::types::{Type, Value};
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, Default)]
pub struct ContainerIntrospector;

impl ArbitraryIntrospector for ContainerIntrospector {
    fn introspect(&self, ctx: &mut ArbitraryGeneratorContext<'_>) -> Result<Option<BoxedArbitrary>> {
        let ty = ctx.resolved_type().clone();
        if !matches!(
            ty,
            Type::List(_)
                | Type::Set(_)
                | Type::Array(_)
                | Type::Stream(_)
                | Type::Map(_, _)
                | Type::Entry(_, _)
                | Type::Optional(_)
                | Type::Supplier(_)
        ) {
            return Ok(None);
        }

        let path = ctx.path();
        let elements: Vec<BoxedArbitrary> = ctx
            .take_children()
            .into_iter()
            .map(|child| child.arbitrary)
            .collect();

        let arbitrary = match ty {
            Type::Set(_) => ContainerCombinableArbitrary::new(elements, Box::new(|values| Ok(Value::List(values))))
                .distinct_by(Value::fingerprint),
            Type::Map(_, _) => {
                ContainerCombinableArbitrary::new(elements, Box::new(move |entries| into_map(entries, &path)))
                    .distinct_by(entry_key)
            }
            Type::Entry(_, _) => ContainerCombinableArbitrary::new(
                elements,
                Box::new(move |slots| {
                    if slots.len() == 2 {
                        Ok(Value::List(slots))
                    } else {
                        Err(Error::type_mismatch(path.as_str(), "entry of 2 slots", slots.len()))
                    }
                }),
            ),
            Type::Optional(_) | Type::Supplier(_) => ContainerCombinableArbitrary::new(
                elements,
                Box::new(|values| Ok(values.into_iter().next().unwrap_or(Value::Null))),
            ),
            _ => ContainerCombinableArbitrary::new(elements, Box::new(|values| Ok(Value::List(values)))),
        };
        Ok(Some(arbitrary.boxed()))
    }
}

/// Fingerprint of the key of a `[key, value]` entry
fn entry_key(entry: &Value) -> String {
    match entry {
        Value::List(pair) if !pair.is_empty() => pair[0].fingerprint(),
        other => other.fingerprint(),
    }
}

fn into_map(entries: Vec<Value>, path: &str) -> Result<Value> {
    entries
        .into_iter()
        .map(|entry| match entry {
            Value::List(mut pair) if pair.len() == 2 => {
                let value = pair.pop().unwrap_or(Value::Null);
                let key = pair.pop().unwrap_or(Value::Null);
                Ok((key, value))
            }
            Value::Null => Err(Error::type_mismatch(path, "map entry", "null")),
            other => Err(Error::type_mismatch(path, "map entry", other.type_label())),
        })
        .collect::<Result<Vec<_>>>()
        .map(Value::Map)
}
