//! Arbitrary tree traversal
//!
//! The traverser expands a root property into a complete tree in one pass.
//! Abstract properties are resolved to one of their concrete candidates,
//! containers are sized from the most recently registered size constraint
//! whose resolver matches the node's full path, and everything else is
//! expanded through the registered property generators.
//!
//! Copyright (c) 2025 Fixtura Team
//! Licensed under the Apache-2.0 license

use super::{ArbitraryNode, ArbitraryTree, NodeId, PathStep};
use crate::options::GenerateOptions;
use crate::property::{
    choose_variant, ArbitraryContainerInfo, ArbitraryProperty, ObjectProperty, Property,
    TypeDefinition,
};
use crate::resolver::NodeResolver;
use rand::rngs::StdRng;
use std::sync::Arc;
use tracing::debug;

/// Size bounds registered for the containers a resolver matches
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerSizeConstraint {
    pub resolver: NodeResolver,
    pub info: ArbitraryContainerInfo,
}

impl ContainerSizeConstraint {
    pub fn new(resolver: NodeResolver, info: ArbitraryContainerInfo) -> Self {
        Self { resolver, info }
    }
}

/// Per-traversal inputs collected by a builder
#[derive(Debug, Clone, Default)]
pub struct TraverseContext {
    pub size_constraints: Vec<ContainerSizeConstraint>,
}

impl TraverseContext {
    pub fn new(size_constraints: Vec<ContainerSizeConstraint>) -> Self {
        Self { size_constraints }
    }

    /// Bounds from the most recent constraint matching the whole path
    pub fn container_info_for(&self, path: &[PathStep]) -> Option<ArbitraryContainerInfo> {
        self.size_constraints
            .iter()
            .rev()
            .find(|constraint| constraint.resolver.matches_path(path))
            .map(|constraint| constraint.info)
    }
}

/// Per-node overrides used when a subtree is traversed again
#[derive(Debug, Clone, Default)]
struct NodeOverride {
    concrete: Option<Property>,
    container_info: Option<ArbitraryContainerInfo>,
}

/// Builds arbitrary trees from properties
#[derive(Clone)]
pub struct ArbitraryTraverser {
    options: Arc<GenerateOptions>,
}

impl ArbitraryTraverser {
    pub fn new(options: Arc<GenerateOptions>) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    pub fn traverse(&self, root: &Property, context: &TraverseContext, rng: &mut StdRng) -> ArbitraryTree {
        debug!(root_type = %root.ty, constraints = context.size_constraints.len(), "traversing arbitrary tree");
        let mut tree = ArbitraryTree::default();
        let mut path = Vec::new();
        let root_id = self.traverse_node(
            &mut tree,
            root.clone(),
            None,
            &mut path,
            context,
            rng,
            NodeOverride::default(),
        );
        tree.set_root(root_id);
        tree
    }

    /// Rebuild the subtree at `id` in place
    ///
    /// The node keeps its chosen concrete type unless `concrete` forces
    /// another one; `container_info` replaces the node's own size bounds.
    pub fn traverse_subtree(
        &self,
        tree: &mut ArbitraryTree,
        id: NodeId,
        context: &TraverseContext,
        concrete: Option<Property>,
        container_info: Option<ArbitraryContainerInfo>,
        rng: &mut StdRng,
    ) {
        let node = tree.node(id);
        let property = node.property.clone();
        let parent = node.parent;
        let mut path = node.path.clone();
        path.pop();
        let overrides = NodeOverride {
            concrete: concrete.or_else(|| Some(node.resolved_property().clone())),
            container_info,
        };
        debug!(path = %tree.path_of(id), "re-traversing subtree");

        let fresh = self.traverse_node(tree, property, parent, &mut path, context, rng, overrides);
        tree.graft(id, fresh);
    }

    /// Append one element to the container at `id`
    ///
    /// The container property is generated again with a transient size of
    /// one and the produced element is placed after the existing ones.
    pub fn append_element(
        &self,
        tree: &mut ArbitraryTree,
        id: NodeId,
        context: &TraverseContext,
        rng: &mut StdRng,
    ) -> Option<NodeId> {
        let node = tree.node(id);
        let resolved = node.resolved_property().clone();
        let generator = self.options.container_generator(&resolved.ty)?;
        let sequence = node.children.len();
        let mut path = node.path.clone();

        let transient = generator.generate(&resolved, &ArbitraryContainerInfo::exact(1, false), rng);
        let element = transient
            .element_properties
            .into_iter()
            .next()?
            .resequenced(sequence);

        let child = self.traverse_node(
            tree,
            element.clone(),
            Some(id),
            &mut path,
            context,
            rng,
            NodeOverride::default(),
        );

        let node = tree.node_mut(id);
        node.children.push(child);
        node.arbitrary_property.object_property.child_properties.push(element.clone());
        if let Some(container) = node.arbitrary_property.container_property.as_mut() {
            container.element_properties.push(element);
            let size = container.element_properties.len();
            let info = container.container_info;
            container.container_info =
                ArbitraryContainerInfo::new(info.min_size.min(size), info.max_size.max(size), true);
        }
        Some(child)
    }

    #[allow(clippy::too_many_arguments)]
    fn traverse_node(
        &self,
        tree: &mut ArbitraryTree,
        property: Property,
        parent: Option<NodeId>,
        path: &mut Vec<PathStep>,
        context: &TraverseContext,
        rng: &mut StdRng,
        overrides: NodeOverride,
    ) -> NodeId {
        let candidates = self.options.candidate_properties(&property);
        let definition = match overrides.concrete {
            Some(concrete) => self.definition_of(concrete),
            None => {
                let definitions: Vec<TypeDefinition> = candidates
                    .iter()
                    .cloned()
                    .map(|candidate| self.definition_of(candidate))
                    .collect();
                choose_variant(&definitions, rng)
                    .cloned()
                    .unwrap_or_else(|| self.definition_of(property.clone()))
            }
        };
        let resolved = definition.resolved_property.clone();

        path.push(PathStep::of(&property));
        let depth = path.len() - 1;
        let below_depth = depth >= self.options.settings.max_depth;

        let (child_properties, container_property) =
            match self.options.container_generator(&resolved.ty) {
                Some(generator) => {
                    let mut info = overrides
                        .container_info
                        .or_else(|| context.container_info_for(path))
                        .unwrap_or_else(|| self.options.default_container_info());
                    if below_depth && !info.manipulated {
                        info = ArbitraryContainerInfo::exact(0, false);
                    }
                    let container = generator.generate(&resolved, &info, rng);
                    (container.element_properties.clone(), Some(container))
                }
                None if below_depth => (Vec::new(), None),
                None => (definition.child_properties(), None),
            };

        let null_inject = self.options.null_inject_generator.generate(&property);
        let arbitrary_property = ArbitraryProperty::new(
            ObjectProperty {
                property: property.clone(),
                resolved_property: resolved,
                child_properties: child_properties.clone(),
            },
            container_property,
        )
        .with_null_inject(null_inject);

        let id = tree.push(ArbitraryNode {
            property,
            arbitrary_property,
            candidates,
            children: Vec::new(),
            parent,
            path: path.clone(),
            arbitrary: None,
            post_conditions: Vec::new(),
        });

        let children = child_properties
            .into_iter()
            .map(|child| {
                self.traverse_node(tree, child, Some(id), path, context, rng, NodeOverride::default())
            })
            .collect();
        tree.node_mut(id).children = children;

        path.pop();
        id
    }

    fn definition_of(&self, resolved: Property) -> TypeDefinition {
        let generator = self.options.property_generator_for(&resolved.ty);
        TypeDefinition::new(resolved, generator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{ConcreteTypeCandidateConcretePropertyResolver, TypeMatcher};
    use crate::options::FixtureSettings;
    use crate::tree::MapPart;
    use crate::types::{InterfaceDef, StructDef, Type};
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn traverser() -> ArbitraryTraverser {
        ArbitraryTraverser::new(Arc::new(GenerateOptions::new(FixtureSettings::default())))
    }

    fn order() -> Type {
        let item = Type::of_struct(StructDef::new("Item").field("id", Type::String));
        Type::of_struct(
            StructDef::new("Order")
                .field("id", Type::String)
                .field("items", Type::list(item))
                .field("tags", Type::map(Type::String, Type::I32)),
        )
    }

    fn size(expression: &str, min: usize, max: usize) -> ContainerSizeConstraint {
        ContainerSizeConstraint::new(
            NodeResolver::parse(expression).unwrap(),
            ArbitraryContainerInfo::new(min, max, true),
        )
    }

    #[test]
    fn test_traverse_builds_full_tree() {
        let context = TraverseContext::new(vec![size("items", 2, 2), size("tags", 1, 1)]);
        let mut rng = StdRng::seed_from_u64(1);
        let tree = traverser().traverse(&Property::root(order()), &context, &mut rng);

        let root = tree.root();
        assert_eq!(tree.children(root).len(), 3);
        let items = tree.children(root)[1];
        assert_eq!(tree.path_of(items), "$.items");
        assert_eq!(tree.children(items).len(), 2);
        let first_id = tree.children(tree.children(items)[0])[0];
        assert_eq!(tree.path_of(first_id), "$.items[0].id");

        let tags = tree.children(root)[2];
        let entry = tree.children(tags)[0];
        let slots = tree.children(entry);
        assert_eq!(tree.node(slots[0]).step(), Some(&PathStep::MapPart(MapPart::Key)));
        assert_eq!(tree.node(slots[1]).step(), Some(&PathStep::MapPart(MapPart::Value)));
        assert_eq!(tree.node(slots[1]).parent, Some(entry));
    }

    #[test]
    fn test_size_constraints_match_full_path_only() {
        let nested = Type::of_struct(
            StructDef::new("Outer")
                .field("values", Type::list(Type::I32))
                .field(
                    "inner",
                    Type::of_struct(StructDef::new("Inner").field("values", Type::list(Type::I32))),
                ),
        );
        let context = TraverseContext::new(vec![size("values", 4, 4)]);
        let mut rng = StdRng::seed_from_u64(5);
        let tree = traverser().traverse(&Property::root(nested), &context, &mut rng);
        let root = tree.root();
        let outer_values = tree.children(root)[0];
        let inner_values = tree.children(tree.children(root)[1])[0];
        assert_eq!(tree.children(outer_values).len(), 4);
        assert!(!tree.node(inner_values).container_info().unwrap().manipulated);
    }

    #[test]
    fn test_latest_constraint_wins() {
        let context = TraverseContext::new(vec![size("items", 1, 1), size("items", 3, 3)]);
        let mut rng = StdRng::seed_from_u64(2);
        let tree = traverser().traverse(&Property::root(order()), &context, &mut rng);
        assert_eq!(tree.children(tree.children(tree.root())[1]).len(), 3);
    }

    #[test]
    fn test_traverse_subtree_preserves_identity() {
        let mut rng = StdRng::seed_from_u64(3);
        let traverser = traverser();
        let context = TraverseContext::default();
        let mut tree = traverser.traverse(&Property::root(order()), &context, &mut rng);
        let items = tree.children(tree.root())[1];

        traverser.traverse_subtree(
            &mut tree,
            items,
            &context,
            None,
            Some(ArbitraryContainerInfo::exact(5, true)),
            &mut rng,
        );
        assert_eq!(tree.children(tree.root())[1], items);
        assert_eq!(tree.children(items).len(), 5);
        assert_eq!(tree.node(items).parent, Some(tree.root()));
        for child in tree.children(items) {
            assert_eq!(tree.node(*child).parent, Some(items));
        }
    }

    #[test]
    fn test_append_element_sequences_after_existing() {
        let mut rng = StdRng::seed_from_u64(4);
        let traverser = traverser();
        let context = TraverseContext::new(vec![size("tags", 2, 2)]);
        let mut tree = traverser.traverse(&Property::root(order()), &context, &mut rng);
        let tags = tree.children(tree.root())[2];

        let appended = traverser.append_element(&mut tree, tags, &context, &mut rng).unwrap();
        assert_eq!(tree.children(tags).len(), 3);
        assert_eq!(tree.path_of(appended), "$.tags[2]");
        let key = tree.children(appended)[0];
        assert_eq!(tree.node(key).property.sequence(), Some(2));
    }

    #[test]
    fn test_max_depth_empties_deep_containers() {
        let nested = Type::list(Type::list(Type::list(Type::String)));
        let settings = FixtureSettings::default()
            .with_max_depth(2)
            .with_default_size(1, 1);
        let traverser = ArbitraryTraverser::new(Arc::new(GenerateOptions::new(settings)));
        let mut rng = StdRng::seed_from_u64(9);
        let tree = traverser.traverse(&Property::root(nested), &TraverseContext::default(), &mut rng);

        let first = tree.children(tree.root())[0];
        let second = tree.children(first)[0];
        assert_eq!(tree.path_of(second), "$[0][0]");
        assert!(tree.children(second).is_empty());
        assert!(tree.live_nodes().iter().all(|id| tree.node(*id).path.len() <= 3));
    }

    #[test]
    fn test_abstract_property_varies_concrete_type() {
        let circle = Type::of_struct(StructDef::new("Circle").field("radius", Type::F64));
        let square = Type::of_struct(StructDef::new("Square").field("side", Type::F64));
        let shape = Type::of_interface(
            InterfaceDef::new("Shape")
                .implementation(circle)
                .implementation(square),
        );
        let traverser = traverser();
        let mut rng = StdRng::seed_from_u64(10);
        let seen: HashSet<String> = (0..40)
            .map(|_| {
                let tree = traverser.traverse(&Property::root(shape.clone()), &TraverseContext::default(), &mut rng);
                let root = tree.node(tree.root());
                assert_eq!(root.candidates.len(), 2);
                root.resolved_type().raw_name()
            })
            .collect();
        assert_eq!(seen.len(), 2);
    }

    #[test]
    fn test_registered_candidate_resolver_takes_precedence() {
        let shape = Type::of_interface(InterfaceDef::new("Shape"));
        let mut options = GenerateOptions::new(FixtureSettings::default());
        options.candidate_resolvers.push((
            TypeMatcher::named("Shape"),
            Arc::new(ConcreteTypeCandidateConcretePropertyResolver::new(vec![Type::String])),
        ));
        let traverser = ArbitraryTraverser::new(Arc::new(options));
        let mut rng = StdRng::seed_from_u64(0);
        let tree = traverser.traverse(&Property::root(shape), &TraverseContext::default(), &mut rng);
        assert_eq!(tree.node(tree.root()).resolved_type(), &Type::String);
    }
}
