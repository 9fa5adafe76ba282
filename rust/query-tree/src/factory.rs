use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::args::Args;
use crate::context::ParserContext;
use crate::errors::NodeError;
use crate::node::{clone_typed, downcast_node, Node, NodeCloner, NodeTag, Variant};
use crate::nodes::{ColumnReference, CreateIndex, IndexColumn, IndexColumnList, TableName};
use crate::position::Span;

type Allocator = fn() -> Box<dyn Node>;

fn allocate_variant<T: Variant>() -> Box<dyn Node> {
    Box::new(T::default())
}

/// Allocates and copies nodes by variant tag.
///
/// The mapping from tags to node types is fixed once the factory is built,
/// so a single factory can be shared by any number of concurrent parses.
#[derive(Debug, Clone)]
pub struct NodeFactory {
    allocators: HashMap<NodeTag, Allocator>,
}

#[derive(Debug, Default)]
pub struct NodeFactoryBuilder {
    allocators: HashMap<NodeTag, Allocator>,
}

/// Cloner that allocates copies through a factory and attaches them to the
/// target context.
struct Copier<'a> {
    factory: &'a NodeFactory,
    context: &'a Arc<ParserContext>,
}

impl NodeFactoryBuilder {
    pub fn register<T: Variant>(mut self) -> Self {
        if self
            .allocators
            .insert(T::TAG, allocate_variant::<T>)
            .is_some()
        {
            debug!("allocator for {} registered twice", T::TAG);
        }
        self
    }

    pub fn build(self) -> NodeFactory {
        NodeFactory {
            allocators: self.allocators,
        }
    }
}

impl NodeFactory {
    pub fn builder() -> NodeFactoryBuilder {
        NodeFactoryBuilder::default()
    }

    /// Factory for all node variants of this crate.
    pub fn standard() -> NodeFactory {
        NodeFactory::builder()
            .register::<TableName>()
            .register::<ColumnReference>()
            .register::<IndexColumn>()
            .register::<IndexColumnList>()
            .register::<CreateIndex>()
            .build()
    }

    pub fn tags(&self) -> Vec<NodeTag> {
        let mut tags: Vec<_> = self.allocators.keys().copied().collect();
        tags.sort();
        tags
    }

    /// Allocates an empty node of the given variant.
    pub fn allocate(&self, tag: NodeTag) -> Result<Box<dyn Node>, NodeError> {
        let allocator = self
            .allocators
            .get(&tag)
            .ok_or(NodeError::UnknownVariant { tag })?;
        trace!("allocate {tag}");
        Ok(allocator())
    }

    /// Runs both construction phases for a recognized grammar rule.
    pub fn build(
        &self,
        tag: NodeTag,
        args: impl Into<Args>,
        context: &Arc<ParserContext>,
        span: Span,
    ) -> Result<Box<dyn Node>, NodeError> {
        let mut node = self.allocate(tag)?;
        node.base_mut().attach(context);
        node.base_mut().set_span(span);
        if let Err(e) = node.initialize(args.into()) {
            debug!("cannot build {tag} at {span}: {e}");
            return Err(e);
        }
        Ok(node)
    }

    pub fn build_typed<T: Variant>(
        &self,
        args: impl Into<Args>,
        context: &Arc<ParserContext>,
        span: Span,
    ) -> Result<Box<T>, NodeError> {
        downcast_node(self.build(T::TAG, args, context, span)?)
    }

    /// Deep-copies `node` into a new tree attached to `context`.
    pub fn copy_node(
        &self,
        node: &dyn Node,
        context: &Arc<ParserContext>,
    ) -> Result<Box<dyn Node>, NodeError> {
        Copier {
            factory: self,
            context,
        }
        .clone_node(node)
    }

    pub fn copy_tree<T: Variant>(
        &self,
        node: &T,
        context: &Arc<ParserContext>,
    ) -> Result<Box<T>, NodeError> {
        let copier = Copier {
            factory: self,
            context,
        };
        clone_typed(&copier, node)
    }
}

impl NodeCloner for Copier<'_> {
    fn clone_node(&self, node: &dyn Node) -> Result<Box<dyn Node>, NodeError> {
        let tag = node.tag();
        let mut copy = self.factory.allocate(tag)?;
        if copy.tag() != tag {
            return Err(NodeError::VariantMismatch {
                expected: tag,
                found: copy.tag(),
            });
        }
        copy.base_mut().attach(self.context);
        copy.copy_from(node, self)?;
        trace!("copied {tag} into context {}", self.context.id());
        Ok(copy)
    }
}
