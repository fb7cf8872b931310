//! Object and container assembly
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

use super::{BoxedArbitrary, CombinableArbitrary, GenerationContext};
use crate::types::Value;
use crate::{Error, Result};
use indexmap::IndexMap;
use std::collections::HashSet;

pub type ObjectCombinator = Box<dyn Fn(IndexMap<String, Value>) -> Result<Value> + Send>;
pub type ContainerCombinator = Box<dyn Fn(Vec<Value>) -> Result<Value> + Send>;

/// Key under which two elements count as duplicates
pub type DistinctKey = fn(&Value) -> String;

/// Combines named child values into one object
pub struct ObjectCombinableArbitrary {
    children: IndexMap<String, BoxedArbitrary>,
    combinator: ObjectCombinator,
}

impl ObjectCombinableArbitrary {
    pub fn new(children: IndexMap<String, BoxedArbitrary>, combinator: ObjectCombinator) -> Self {
        Self { children, combinator }
    }

    fn child_values(&mut self, ctx: &mut GenerationContext<'_>) -> Result<IndexMap<String, Value>> {
        let mut values = IndexMap::with_capacity(self.children.len());
        for (name, child) in &mut self.children {
            values.insert(name.clone(), child.combined(ctx)?);
        }
        Ok(values)
    }
}

impl CombinableArbitrary for ObjectCombinableArbitrary {
    fn combined(&mut self, ctx: &mut GenerationContext<'_>) -> Result<Value> {
        let values = self.child_values(ctx)?;
        (self.combinator)(values)
    }

    fn raw_value(&mut self, ctx: &mut GenerationContext<'_>) -> Result<Value> {
        let values = self.child_values(ctx)?;
        Ok(Value::Map(
            values.into_iter().map(|(name, value)| (Value::Str(name), value)).collect(),
        ))
    }

    fn clear(&mut self) {
        self.children.values_mut().for_each(|child| child.clear());
    }

    fn fixed(&self) -> bool {
        self.children.values().all(|child| child.fixed())
    }
}

/// Combines element values into a container
///
/// With a distinct key, an element colliding with an earlier one is
/// regenerated; the container fails once an element runs out of tries.
pub struct ContainerCombinableArbitrary {
    elements: Vec<BoxedArbitrary>,
    combinator: ContainerCombinator,
    distinct_key: Option<DistinctKey>,
}

impl ContainerCombinableArbitrary {
    pub fn new(elements: Vec<BoxedArbitrary>, combinator: ContainerCombinator) -> Self {
        Self {
            elements,
            combinator,
            distinct_key: None,
        }
    }

    pub fn distinct_by(mut self, key: DistinctKey) -> Self {
        self.distinct_key = Some(key);
        self
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    fn element_values(&mut self, ctx: &mut GenerationContext<'_>) -> Result<Vec<Value>> {
        let mut values = Vec::with_capacity(self.elements.len());
        let mut seen = HashSet::new();
        let distinct_key = self.distinct_key;

        for (index, element) in self.elements.iter_mut().enumerate() {
            let Some(key_of) = distinct_key else {
                values.push(element.combined(ctx)?);
                continue;
            };

            let mut tries = 0;
            loop {
                let value = element.combined(ctx)?;
                if seen.insert(key_of(&value)) {
                    values.push(value);
                    break;
                }
                tries += 1;
                if element.fixed() || tries >= ctx.max_tries {
                    return Err(Error::FilterRejected {
                        description: format!("element {} duplicates an earlier element", index),
                    });
                }
                element.clear();
            }
        }
        Ok(values)
    }
}

impl CombinableArbitrary for ContainerCombinableArbitrary {
    fn combined(&mut self, ctx: &mut GenerationContext<'_>) -> Result<Value> {
        let values = self.element_values(ctx)?;
        (self.combinator)(values)
    }

    fn raw_value(&mut self, ctx: &mut GenerationContext<'_>) -> Result<Value> {
        Ok(Value::List(self.element_values(ctx)?))
    }

    fn clear(&mut self) {
        self.elements.iter_mut().for_each(|element| element.clear());
    }

    fn fixed(&self) -> bool {
        self.elements.iter().all(|element| element.fixed())
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::{with_context, Counter};
    use super::super::{CombinableArbitraryExt, FixedCombinableArbitrary};
    use super::*;

    #[test]
    fn test_object_combines_in_field_order() {
        with_context(|ctx| {
            let mut children: IndexMap<String, BoxedArbitrary> = IndexMap::new();
            children.insert("b".into(), FixedCombinableArbitrary::new(Value::Int(2)).boxed());
            children.insert("a".into(), FixedCombinableArbitrary::new(Value::Int(1)).boxed());
            let mut object = ObjectCombinableArbitrary::new(
                children,
                Box::new(|fields| Ok(Value::Object { type_name: "T".into(), fields })),
            );
            assert!(object.fixed());
            let value = object.combined(ctx).unwrap();
            let names: Vec<_> = match &value {
                Value::Object { fields, .. } => fields.keys().cloned().collect(),
                other => panic!("unexpected {other:?}"),
            };
            assert_eq!(names, vec!["b", "a"]);
        });
    }

    #[test]
    fn test_distinct_elements_regenerate() {
        with_context(|ctx| {
            // the counter starts on the fixed element's value
            let elements = vec![
                FixedCombinableArbitrary::new(Value::Int(1)).boxed(),
                Counter { next: 1 }.boxed(),
            ];
            let mut set = ContainerCombinableArbitrary::new(elements, Box::new(|v| Ok(Value::List(v))))
                .distinct_by(Value::fingerprint);
            assert_eq!(set.combined(ctx).unwrap(), Value::List(vec![Value::Int(1), Value::Int(2)]));
        });
    }

    #[test]
    fn test_fixed_duplicates_fail() {
        with_context(|ctx| {
            let elements = vec![
                FixedCombinableArbitrary::new(Value::Int(1)).boxed(),
                FixedCombinableArbitrary::new(Value::Int(1)).boxed(),
            ];
            let mut set = ContainerCombinableArbitrary::new(elements, Box::new(|v| Ok(Value::List(v))))
                .distinct_by(Value::fingerprint);
            assert!(matches!(set.combined(ctx), Err(Error::FilterRejected { .. })));
        });
    }
}
