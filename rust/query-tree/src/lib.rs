//! Typed, copyable and printable syntax tree for SQL statements.
//!
//! A table-driven parser builds the tree bottom-up: for every recognized
//! rule it asks the [`NodeFactory`] for an empty node of the right variant
//! and initializes it from the rule's captured values, passed as erased
//! [`Args`]. Later passes copy subtrees with [`NodeFactory::copy_node`] and
//! inspect them with [`Node::render`], [`Node::tree_dump`] and [`walk`].

extern crate self as query_tree;

pub mod args;
pub mod context;
pub mod dump;
pub mod errors;
pub mod factory;
pub mod node;
pub mod nodes;
pub mod position;
pub mod visit;

pub use args::{Arg, ArgKind, ArgReader, Args};
pub use context::ParserContext;
pub use errors::{Diagnostic, NodeError};
pub use factory::{NodeFactory, NodeFactoryBuilder};
pub use node::{Child, Node, NodeBase, NodeCloner, NodeTag, Variant};
pub use position::{Pos, Span};
pub use visit::{walk, Visitor, Walk};
