//! The node contract shared by every query tree construct.
//!
//! A node goes through two phases: it is allocated empty by the
//! [`NodeFactory`](crate::NodeFactory) and then filled by exactly one
//! initializer call. Every concrete construct is a [`Variant`]: a shell
//! holding the [`NodeBase`] bookkeeping and a [`Slot`] with the
//! construct-specific fields. The [`Node`] trait, implemented for all
//! variants at once, is what parsers, rewrite passes and tooling see.

use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};

use crate::args::{ArgReader, Args};
use crate::context::ParserContext;
use crate::dump::TreeWriter;
use crate::errors::{Diagnostic, NodeError};
use crate::position::{Pos, Span};

pub use query_tree_derive::{NodeFields, Variant};

const UNINITIALIZED: &str = "<uninitialized>";

/// Identifies a node variant.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    strum::Display,
    strum::EnumString,
    strum::IntoStaticStr,
    strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NodeTag {
    TableName,
    ColumnReference,
    IndexColumn,
    IndexColumnList,
    CreateIndex,
}

/// Bookkeeping common to all nodes: where the construct came from and
/// which parse produced it.
#[derive(Debug, Default)]
pub struct NodeBase {
    span: Option<Span>,
    context: Weak<ParserContext>,
}

/// Fields of a node, empty until the node is initialized.
#[derive(Debug, PartialEq)]
pub struct Slot<F>(Option<F>);

pub trait SlotOf {
    type Fields;
}

/// Labeled reference to an owned child node.
#[derive(Debug, Clone, Copy)]
pub struct Child<'a> {
    pub label: &'static str,
    /// Position within a list field.
    pub index: Option<usize>,
    pub node: &'a dyn Node,
}

/// Receives the fields of a node in declaration order.
pub trait FieldSink {
    fn value(&mut self, label: Option<&str>, value: &dyn fmt::Display);
    fn child(&mut self, label: &str, child: Option<&dyn Node>);
    fn list(&mut self, label: &str, children: &[&dyn Node]);
}

/// Produces deep copies of child nodes while a tree is copied.
///
/// Handed into [`Node::copy_from`] so that a variant can clone its children
/// without knowing how other variants are allocated.
pub trait NodeCloner {
    fn clone_node(&self, node: &dyn Node) -> Result<Box<dyn Node>, NodeError>;
}

/// Construct-specific data of a variant. Usually derived.
pub trait NodeFields: fmt::Debug + Send + Sync + Sized + 'static {
    fn copy_fields(&self, cloner: &dyn NodeCloner) -> Result<Self, NodeError>;
    fn write_fields(&self, sink: &mut dyn FieldSink);
    fn children(&self) -> Vec<Child<'_>>;
}

/// Decodes the erased arguments of a grammar action into the fields of a
/// variant.
pub trait Initializer: NodeFields {
    fn decode(args: &mut ArgReader) -> Result<Self, NodeError>;
}

/// Structural part of a concrete node type. Usually derived.
pub trait Variant: fmt::Debug + Default + Send + Sync + 'static {
    const TAG: NodeTag;
    type Fields: Initializer;

    fn node_base(&self) -> &NodeBase;
    fn node_base_mut(&mut self) -> &mut NodeBase;
    fn slot(&self) -> &Slot<Self::Fields>;
    fn slot_mut(&mut self) -> &mut Slot<Self::Fields>;
}

/// A query tree node.
pub trait Node: Any + fmt::Debug + Send + Sync + 'static {
    fn tag(&self) -> NodeTag;
    fn base(&self) -> &NodeBase;
    fn base_mut(&mut self) -> &mut NodeBase;
    fn is_initialized(&self) -> bool;

    /// Fills a freshly allocated node from the arguments of a grammar
    /// action. On error the node stays uninitialized.
    fn initialize(&mut self, args: Args) -> Result<(), NodeError>;

    /// Replaces the content of this node with a deep copy of `source`,
    /// which must be the same variant. Children are cloned through
    /// `cloner`.
    fn copy_from(&mut self, source: &dyn Node, cloner: &dyn NodeCloner) -> Result<(), NodeError>;

    /// Feeds variant fields, then the base summary, into `sink`.
    fn write_to(&self, sink: &mut dyn FieldSink);
    fn children(&self) -> Vec<Child<'_>>;

    fn render(&self) -> String;
    fn tree_dump(&self) -> String;

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl NodeBase {
    pub fn span(&self) -> Option<Span> {
        self.span
    }

    pub fn set_span(&mut self, span: Span) {
        self.span = Some(span);
    }

    pub fn context(&self) -> Option<Arc<ParserContext>> {
        self.context.upgrade()
    }

    pub fn is_attached(&self) -> bool {
        self.context.strong_count() > 0
    }

    pub fn attach(&mut self, context: &Arc<ParserContext>) {
        self.context = Arc::downgrade(context);
    }

    /// Line and column of the start of this node.
    pub fn position(&self) -> Option<Pos> {
        let span = self.span?;
        self.context()?.position(span.start)
    }

    /// Diagnostic pointing at this node.
    pub fn diagnostic<S: ToString>(&self, message: S) -> Diagnostic {
        self.locate(Diagnostic::new(message))
    }

    /// Points `diagnostic` at this node unless it already has a span.
    pub fn locate(&self, diagnostic: Diagnostic) -> Diagnostic {
        match self.span {
            Some(span) => diagnostic.default_span_to(span),
            None => diagnostic,
        }
    }

    fn copy_linkage(&mut self, other: &NodeBase) {
        self.span = other.span;
        if !self.is_attached() {
            self.context = other.context.clone();
        }
    }

    fn write_summary(&self, sink: &mut dyn FieldSink) {
        if let Some(span) = &self.span {
            sink.value(Some("span"), span);
        }
    }
}

impl<F> Default for Slot<F> {
    fn default() -> Self {
        Slot(None)
    }
}

impl<F> Slot<F> {
    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }

    pub fn get(&self, tag: NodeTag) -> Result<&F, NodeError> {
        self.0.as_ref().ok_or(NodeError::UninitializedAccess { tag })
    }

    pub fn get_mut(&mut self, tag: NodeTag) -> Result<&mut F, NodeError> {
        self.0.as_mut().ok_or(NodeError::UninitializedAccess { tag })
    }

    /// Stores the fields of a node being initialized.
    pub fn fill(&mut self, tag: NodeTag, fields: F) -> Result<(), NodeError> {
        if self.0.is_some() {
            return Err(NodeError::AlreadyInitialized { tag });
        }
        self.0 = Some(fields);
        Ok(())
    }

    fn replace(&mut self, fields: F) {
        self.0 = Some(fields);
    }
}

impl<F> SlotOf for Slot<F> {
    type Fields = F;
}

impl<T: Variant> Node for T {
    fn tag(&self) -> NodeTag {
        T::TAG
    }

    fn base(&self) -> &NodeBase {
        self.node_base()
    }

    fn base_mut(&mut self) -> &mut NodeBase {
        self.node_base_mut()
    }

    fn is_initialized(&self) -> bool {
        self.slot().is_set()
    }

    fn initialize(&mut self, args: Args) -> Result<(), NodeError> {
        if self.slot().is_set() {
            return Err(NodeError::AlreadyInitialized { tag: T::TAG });
        }
        let mut reader = ArgReader::new(T::TAG, args);
        let fields = T::Fields::decode(&mut reader)?;
        reader.finish()?;
        self.slot_mut().fill(T::TAG, fields)
    }

    fn copy_from(&mut self, source: &dyn Node, cloner: &dyn NodeCloner) -> Result<(), NodeError> {
        let Some(source) = source.downcast_ref::<T>() else {
            return Err(NodeError::VariantMismatch {
                expected: T::TAG,
                found: source.tag(),
            });
        };
        let fields = source.slot().get(T::TAG)?.copy_fields(cloner)?;
        self.node_base_mut().copy_linkage(source.node_base());
        self.slot_mut().replace(fields);
        Ok(())
    }

    fn write_to(&self, sink: &mut dyn FieldSink) {
        match self.slot().get(T::TAG) {
            Ok(fields) => fields.write_fields(sink),
            Err(_) => sink.value(None, &UNINITIALIZED),
        }
        self.node_base().write_summary(sink);
    }

    fn children(&self) -> Vec<Child<'_>> {
        self.slot()
            .get(T::TAG)
            .map(NodeFields::children)
            .unwrap_or_default()
    }

    fn render(&self) -> String {
        TreeWriter::render(self)
    }

    fn tree_dump(&self) -> String {
        TreeWriter::dump(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

impl dyn Node {
    pub fn is<T: Node>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: Node>(&self) -> Option<&T> {
        self.as_any().downcast_ref()
    }

    pub fn downcast_mut<T: Node>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut()
    }
}

/// Recovers the concrete type of a boxed node.
pub fn downcast_node<T: Variant>(node: Box<dyn Node>) -> Result<Box<T>, NodeError> {
    let found = node.tag();
    node.into_any()
        .downcast::<T>()
        .map_err(|_| NodeError::VariantMismatch {
            expected: T::TAG,
            found,
        })
}

/// Deep-copies `node` through `cloner`, keeping its concrete type.
pub fn clone_typed<T: Variant>(cloner: &dyn NodeCloner, node: &T) -> Result<Box<T>, NodeError> {
    downcast_node(cloner.clone_node(node)?)
}

/// A field holding plain data, copied by value.
pub trait ValueField: Sized {
    fn copy_value(&self) -> Self;
    fn write_value(&self, label: Option<&str>, sink: &mut dyn FieldSink);
}

macro_rules! value_field {
    ($($ty:ty),*) => {
        $(
            impl ValueField for $ty {
                fn copy_value(&self) -> Self {
                    self.clone()
                }

                fn write_value(&self, label: Option<&str>, sink: &mut dyn FieldSink) {
                    sink.value(label, self);
                }
            }
        )*
    };
}

value_field!(String, bool, i64);

impl<V: ValueField> ValueField for Option<V> {
    fn copy_value(&self) -> Self {
        self.as_ref().map(ValueField::copy_value)
    }

    fn write_value(&self, label: Option<&str>, sink: &mut dyn FieldSink) {
        match self {
            Some(value) => value.write_value(label, sink),
            None => sink.value(label, &"null"),
        }
    }
}

/// A field holding owned child nodes.
pub trait ChildField: Sized {
    fn copy_child(&self, cloner: &dyn NodeCloner) -> Result<Self, NodeError>;
    fn write_child(&self, label: &str, sink: &mut dyn FieldSink);
    fn collect<'a>(&'a self, label: &'static str, out: &mut Vec<Child<'a>>);
}

impl<T: Variant> ChildField for Box<T> {
    fn copy_child(&self, cloner: &dyn NodeCloner) -> Result<Self, NodeError> {
        clone_typed(cloner, &**self)
    }

    fn write_child(&self, label: &str, sink: &mut dyn FieldSink) {
        sink.child(label, Some(&**self as &dyn Node));
    }

    fn collect<'a>(&'a self, label: &'static str, out: &mut Vec<Child<'a>>) {
        out.push(Child {
            label,
            index: None,
            node: &**self,
        });
    }
}

impl<T: Variant> ChildField for Option<Box<T>> {
    fn copy_child(&self, cloner: &dyn NodeCloner) -> Result<Self, NodeError> {
        self.as_ref()
            .map(|child| child.copy_child(cloner))
            .transpose()
    }

    fn write_child(&self, label: &str, sink: &mut dyn FieldSink) {
        sink.child(label, self.as_deref().map(|child| child as &dyn Node));
    }

    fn collect<'a>(&'a self, label: &'static str, out: &mut Vec<Child<'a>>) {
        if let Some(child) = self {
            child.collect(label, out);
        }
    }
}

impl<T: Variant> ChildField for Vec<Box<T>> {
    fn copy_child(&self, cloner: &dyn NodeCloner) -> Result<Self, NodeError> {
        self.iter().map(|child| child.copy_child(cloner)).collect()
    }

    fn write_child(&self, label: &str, sink: &mut dyn FieldSink) {
        let children: Vec<&dyn Node> = self.iter().map(|child| &**child as &dyn Node).collect();
        sink.list(label, &children);
    }

    fn collect<'a>(&'a self, label: &'static str, out: &mut Vec<Child<'a>>) {
        for (index, child) in self.iter().enumerate() {
            out.push(Child {
                label,
                index: Some(index),
                node: &**child,
            });
        }
    }
}
