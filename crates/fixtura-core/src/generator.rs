//! Tree to arbitrary
//!
//! Walks a manipulated tree bottom-up. A node with an attached generator uses
//! it and ignores its subtree; any other node is handed, with its children's
//! arbitraries, to the first introspector that accepts it. The result is then
//! wrapped with the node's post-conditions and null injection.
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

use crate::arbitrary::{
    BoxedArbitrary, CombinableArbitraryExt, FilteredCombinableArbitrary, FixedCombinableArbitrary,
    NullInjectCombinableArbitrary,
};
use crate::introspector::{ArbitraryGeneratorContext, ChildArbitrary};
use crate::options::GenerateOptions;
use crate::tree::{ArbitraryTree, NodeArbitrary, NodeId};
use crate::{Error, Result};

/// Builds the combinable arbitrary of a tree
pub struct ArbitraryGenerator<'a> {
    options: &'a GenerateOptions,
}

impl<'a> ArbitraryGenerator<'a> {
    pub fn new(options: &'a GenerateOptions) -> Self {
        Self { options }
    }

    /// Arbitrary for the whole tree
    ///
    /// Attached generators are moved out of the tree, which is single use.
    pub fn generate(&self, tree: &mut ArbitraryTree) -> Result<BoxedArbitrary> {
        let root = tree.root();
        self.generate_node(tree, root)
    }

    fn generate_node(&self, tree: &mut ArbitraryTree, id: NodeId) -> Result<BoxedArbitrary> {
        let attached = tree.node_mut(id).arbitrary.take();
        let base = match attached {
            Some(NodeArbitrary::Fixed(value)) => FixedCombinableArbitrary::new(value).boxed(),
            Some(NodeArbitrary::Combinable(arbitrary)) => arbitrary,
            None => {
                let child_ids = tree.children(id).to_vec();
                let mut children = Vec::with_capacity(child_ids.len());
                for child in child_ids {
                    let name = tree.node(child).property.name().map(str::to_string);
                    let arbitrary = self.generate_node(tree, child)?;
                    children.push(ChildArbitrary { name, arbitrary });
                }
                self.introspect(tree, id, children)?
            }
        };

        let node = tree.node_mut(id);
        let post_conditions = std::mem::take(&mut node.post_conditions);
        let null_inject = node.null_inject();

        let filtered = if post_conditions.is_empty() {
            base
        } else {
            FilteredCombinableArbitrary::new(base, post_conditions)
                .with_max_tries(self.options.settings.max_tries)
                .boxed()
        };
        Ok(if null_inject > 0.0 {
            NullInjectCombinableArbitrary::new(filtered, null_inject).boxed()
        } else {
            filtered
        })
    }

    fn introspect(&self, tree: &ArbitraryTree, id: NodeId, children: Vec<ChildArbitrary>) -> Result<BoxedArbitrary> {
        let mut ctx = ArbitraryGeneratorContext::new(tree, id, children, &self.options.settings);
        for introspector in &self.options.introspectors {
            if let Some(arbitrary) = introspector.introspect(&mut ctx)? {
                return Ok(arbitrary);
            }
        }
        Err(Error::NoIntrospector {
            type_name: ctx.resolved_type().to_string(),
            path: ctx.path(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arbitrary::{CombinableArbitrary, GenerationContext, PostCondition, UniqueScope};
    use crate::options::FixtureSettings;
    use crate::property::Property;
    use crate::tree::{ArbitraryTraverser, TraverseContext};
    use crate::types::{StructDef, Type, Value};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    fn build(options: &Arc<GenerateOptions>, ty: Type, rng: &mut StdRng) -> ArbitraryTree {
        ArbitraryTraverser::new(Arc::clone(options)).traverse(&Property::root(ty), &TraverseContext::default(), rng)
    }

    fn sample(arbitrary: &mut BoxedArbitrary, rng: &mut StdRng) -> Result<Value> {
        let mut scope = UniqueScope::new();
        arbitrary.combined(&mut GenerationContext::new(rng, &mut scope, 100))
    }

    fn person() -> Type {
        Type::of_struct(
            StructDef::new("Person")
                .field("name", Type::String)
                .field("age", Type::U8)
                .field("nicknames", Type::list(Type::String)),
        )
    }

    #[test]
    fn test_generates_struct_matching_type() {
        let options = Arc::new(GenerateOptions::new(FixtureSettings::default()));
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..10 {
            let mut tree = build(&options, person(), &mut rng);
            let mut arbitrary = ArbitraryGenerator::new(&options).generate(&mut tree).unwrap();
            let value = sample(&mut arbitrary, &mut rng).unwrap();
            assert!(value.is_assignable_to(&person()), "{value}");
            assert_eq!(value.type_name(), Some("Person"));
        }
    }

    #[test]
    fn test_attached_fixed_value_short_circuits() {
        let options = Arc::new(GenerateOptions::new(FixtureSettings::default()));
        let mut rng = StdRng::seed_from_u64(2);
        let mut tree = build(&options, person(), &mut rng);
        let name = tree.children(tree.root())[0];
        tree.node_mut(name).arbitrary = Some(NodeArbitrary::Fixed(Value::from("Ada")));

        let mut arbitrary = ArbitraryGenerator::new(&options).generate(&mut tree).unwrap();
        let value = sample(&mut arbitrary, &mut rng).unwrap();
        assert_eq!(value.field("name"), Some(&Value::from("Ada")));
    }

    #[test]
    fn test_post_conditions_and_null_inject_wrap_node() {
        let options = Arc::new(GenerateOptions::new(FixtureSettings::default()));
        let mut rng = StdRng::seed_from_u64(3);
        let mut tree = build(&options, person(), &mut rng);
        let age = tree.children(tree.root())[1];
        tree.node_mut(age)
            .post_conditions
            .push(PostCondition::new("adult", |v| v.as_i64().map(|a| a >= 18).unwrap_or(false)));
        let nicknames = tree.children(tree.root())[2];
        tree.node_mut(nicknames).set_null_inject(1.0);

        let mut arbitrary = ArbitraryGenerator::new(&options).generate(&mut tree).unwrap();
        let value = sample(&mut arbitrary, &mut rng).unwrap();
        assert!(value.field("age").and_then(Value::as_i64).unwrap() >= 18);
        assert_eq!(value.field("nicknames"), Some(&Value::Null));
    }

    #[test]
    fn test_unresolvable_type_has_no_introspector() {
        let options = Arc::new(GenerateOptions::new(FixtureSettings::default()));
        let mut rng = StdRng::seed_from_u64(4);
        let mut tree = build(&options, Type::param("T"), &mut rng);
        match ArbitraryGenerator::new(&options).generate(&mut tree) {
            Err(Error::NoIntrospector { path, .. }) => assert_eq!(path, "$"),
            Err(other) => panic!("unexpected {other:?}"),
            Ok(_) => panic!("expected an error"),
        }
    }
}
