//! Type-erased initializer arguments.
//!
//! Grammar actions are generated from the parsing tables and cannot be typed
//! per rule, so they hand the captured values of a rule to the node as an
//! ordered list of [`Arg`]s. Each variant decodes that list with an
//! [`ArgReader`], which checks every conversion.

use std::fmt;
use std::iter::Peekable;
use std::vec;

use crate::errors::NodeError;
use crate::node::{downcast_node, Node, NodeTag, Variant};

#[derive(Debug)]
pub enum Arg {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    Node(Box<dyn Node>),
    List(Vec<Arg>),
}

/// Runtime type of an [`Arg`], as reported in errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgKind {
    Null,
    Bool,
    Int,
    Str,
    Node(NodeTag),
    List,
    /// The argument list ended before this position.
    Missing,
}

#[derive(Debug, Default)]
pub struct Args(Vec<Arg>);

/// Builds [`Args`] from values convertible into [`Arg`].
///
/// ```
/// use query_tree::{args, Arg};
///
/// let args = args!["age", true];
/// assert_eq!(args.len(), 2);
/// let args = args![Arg::Null, "orders"];
/// assert_eq!(args.len(), 2);
/// ```
#[macro_export]
macro_rules! args {
    ($($arg:expr),* $(,)?) => {{
        let items: ::std::vec::Vec<$crate::Arg> = ::std::vec![$($crate::Arg::from($arg)),*];
        $crate::Args::from(items)
    }};
}

impl Arg {
    pub fn node<T: Node>(node: T) -> Arg {
        Arg::Node(Box::new(node))
    }

    pub fn kind(&self) -> ArgKind {
        match self {
            Arg::Null => ArgKind::Null,
            Arg::Bool(_) => ArgKind::Bool,
            Arg::Int(_) => ArgKind::Int,
            Arg::Str(_) => ArgKind::Str,
            Arg::Node(node) => ArgKind::Node(node.tag()),
            Arg::List(_) => ArgKind::List,
        }
    }
}

impl From<bool> for Arg {
    fn from(value: bool) -> Arg {
        Arg::Bool(value)
    }
}

impl From<i64> for Arg {
    fn from(value: i64) -> Arg {
        Arg::Int(value)
    }
}

impl From<String> for Arg {
    fn from(value: String) -> Arg {
        Arg::Str(value)
    }
}

impl From<&str> for Arg {
    fn from(value: &str) -> Arg {
        Arg::Str(value.to_string())
    }
}

impl From<Box<dyn Node>> for Arg {
    fn from(value: Box<dyn Node>) -> Arg {
        Arg::Node(value)
    }
}

impl From<Vec<Arg>> for Arg {
    fn from(value: Vec<Arg>) -> Arg {
        Arg::List(value)
    }
}

impl<T: Into<Arg>> From<Option<T>> for Arg {
    fn from(value: Option<T>) -> Arg {
        value.map_or(Arg::Null, Into::into)
    }
}

impl fmt::Display for ArgKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgKind::Null => f.write_str("null"),
            ArgKind::Bool => f.write_str("boolean"),
            ArgKind::Int => f.write_str("integer"),
            ArgKind::Str => f.write_str("string"),
            ArgKind::Node(tag) => write!(f, "{tag} node"),
            ArgKind::List => f.write_str("list"),
            ArgKind::Missing => f.write_str("nothing"),
        }
    }
}

impl Args {
    pub fn new() -> Args {
        Args(Vec::new())
    }

    pub fn with(mut self, arg: impl Into<Arg>) -> Args {
        self.0.push(arg.into());
        self
    }

    pub fn push(&mut self, arg: impl Into<Arg>) {
        self.0.push(arg.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Arg>> for Args {
    fn from(value: Vec<Arg>) -> Args {
        Args(value)
    }
}

impl<const N: usize> From<[Arg; N]> for Args {
    fn from(value: [Arg; N]) -> Args {
        Args(Vec::from(value))
    }
}

/// Cursor over the arguments of one initializer call.
pub struct ArgReader {
    tag: NodeTag,
    args: Peekable<vec::IntoIter<Arg>>,
    position: usize,
}

impl ArgReader {
    pub(crate) fn new(tag: NodeTag, args: Args) -> ArgReader {
        ArgReader {
            tag,
            args: args.0.into_iter().peekable(),
            position: 0,
        }
    }

    /// Variant being initialized.
    pub fn tag(&self) -> NodeTag {
        self.tag
    }

    pub fn peek(&mut self) -> Option<ArgKind> {
        self.args.peek().map(Arg::kind)
    }

    pub fn remaining(&self) -> usize {
        self.args.len()
    }

    pub fn string(&mut self) -> Result<String, NodeError> {
        match self.next_arg() {
            (_, Some(Arg::Str(value))) => Ok(value),
            (position, other) => Err(self.invalid(position, "string", &other)),
        }
    }

    /// A string, or `None` for a `Null` or absent argument.
    pub fn opt_string(&mut self) -> Result<Option<String>, NodeError> {
        if self.skip_null() {
            return Ok(None);
        }
        self.string().map(Some)
    }

    pub fn boolean(&mut self) -> Result<bool, NodeError> {
        match self.next_arg() {
            (_, Some(Arg::Bool(value))) => Ok(value),
            (position, other) => Err(self.invalid(position, "boolean", &other)),
        }
    }

    /// A boolean, or `None` for a `Null` or absent argument.
    pub fn opt_boolean(&mut self) -> Result<Option<bool>, NodeError> {
        if self.skip_null() {
            return Ok(None);
        }
        self.boolean().map(Some)
    }

    /// An initialized node of variant `T`.
    pub fn node<T: Variant>(&mut self) -> Result<Box<T>, NodeError> {
        let (position, arg) = self.next_arg();
        self.typed_node(position, None, arg)
    }

    /// A node of variant `T`, or `None` for a `Null` or absent argument.
    pub fn opt_node<T: Variant>(&mut self) -> Result<Option<Box<T>>, NodeError> {
        if self.skip_null() {
            return Ok(None);
        }
        self.node().map(Some)
    }

    /// All remaining arguments, each a node of variant `T`.
    pub fn nodes<T: Variant>(&mut self) -> Result<Vec<Box<T>>, NodeError> {
        let mut nodes = Vec::with_capacity(self.remaining());
        while self.args.peek().is_some() {
            nodes.push(self.node()?);
        }
        Ok(nodes)
    }

    /// A list argument whose items are all nodes of variant `T`.
    pub fn node_list<T: Variant>(&mut self) -> Result<Vec<Box<T>>, NodeError> {
        match self.next_arg() {
            (position, Some(Arg::List(items))) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| self.typed_node(position, Some(index), Some(item)))
                .collect(),
            (position, other) => Err(self.invalid(position, "list", &other)),
        }
    }

    /// Fails if any argument was left unread.
    pub fn finish(self) -> Result<(), NodeError> {
        match self.remaining() {
            0 => Ok(()),
            extra => Err(NodeError::ArgumentCount {
                tag: self.tag,
                expected: self.position,
                found: self.position + extra,
            }),
        }
    }

    fn next_arg(&mut self) -> (usize, Option<Arg>) {
        let position = self.position;
        let arg = self.args.next();
        if arg.is_some() {
            self.position += 1;
        }
        (position, arg)
    }

    /// Consumes a `Null` argument. Returns true for `Null` or the end of the
    /// list.
    fn skip_null(&mut self) -> bool {
        match self.args.peek() {
            None => true,
            Some(Arg::Null) => {
                self.next_arg();
                true
            }
            Some(_) => false,
        }
    }

    /// `item` is the index of `arg` within a list argument.
    fn typed_node<T: Variant>(
        &self,
        position: usize,
        item: Option<usize>,
        arg: Option<Arg>,
    ) -> Result<Box<T>, NodeError> {
        let expected = match item {
            Some(index) => format!("{} node at item {index}", T::TAG),
            None => format!("{} node", T::TAG),
        };
        match arg {
            Some(Arg::Node(node)) => {
                if !node.is::<T>() {
                    return Err(NodeError::InvalidArgumentType {
                        tag: self.tag,
                        position,
                        expected,
                        found: ArgKind::Node(node.tag()),
                    });
                }
                if !node.is_initialized() {
                    return Err(NodeError::UninitializedAccess { tag: node.tag() });
                }
                downcast_node(node)
            }
            other => Err(self.invalid(position, expected, &other)),
        }
    }

    fn invalid(&self, position: usize, expected: impl Into<String>, found: &Option<Arg>) -> NodeError {
        NodeError::InvalidArgumentType {
            tag: self.tag,
            position,
            expected: expected.into(),
            found: found.as_ref().map_or(ArgKind::Missing, Arg::kind),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Arg, ArgKind, ArgReader, Args};
    use crate::errors::NodeError;
    use crate::node::NodeTag;
    use crate::nodes::TableName;

    fn reader(args: Args) -> ArgReader {
        ArgReader::new(NodeTag::IndexColumn, args)
    }

    #[test]
    fn reads_in_order() {
        let mut r = reader(args!["id", false, 7i64]);
        assert_eq!(r.peek(), Some(ArgKind::Str));
        assert_eq!(r.string().unwrap(), "id");
        assert!(!r.boolean().unwrap());
        assert_eq!(r.remaining(), 1);
        assert_eq!(r.peek(), Some(ArgKind::Int));
    }

    #[test]
    fn wrong_type() {
        let mut r = reader(args![true]);
        let err = r.string().unwrap_err();
        assert_eq!(
            err,
            NodeError::InvalidArgumentType {
                tag: NodeTag::IndexColumn,
                position: 0,
                expected: "string".into(),
                found: ArgKind::Bool,
            }
        );
        assert_eq!(
            err.to_string(),
            "IndexColumn initializer: argument 0 must be string, got boolean"
        );
    }

    #[test]
    fn missing_required() {
        let mut r = reader(Args::new());
        let err = r.boolean().unwrap_err();
        assert!(matches!(
            err,
            NodeError::InvalidArgumentType { found: ArgKind::Missing, .. }
        ));
    }

    #[test]
    fn optional_values() {
        let mut r = reader(args![Arg::Null, Option::<bool>::None]);
        assert_eq!(r.opt_string().unwrap(), None);
        assert_eq!(r.opt_boolean().unwrap(), None);
        assert_eq!(r.opt_boolean().unwrap(), None);
        r.finish().unwrap();
    }

    #[test]
    fn node_of_wrong_variant() {
        let mut table = TableName::default();
        table.init(None, "orders").unwrap();
        let mut r = reader(args![Arg::node(table)]);
        let err = r.node::<crate::nodes::IndexColumn>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "IndexColumn initializer: argument 0 must be IndexColumn node, got TableName node"
        );
    }

    #[test]
    fn node_must_be_initialized() {
        let mut r = reader(args![Arg::node(TableName::default())]);
        assert_eq!(
            r.node::<TableName>().unwrap_err(),
            NodeError::UninitializedAccess { tag: NodeTag::TableName }
        );
    }

    #[test]
    fn list_of_nodes() {
        let mut table = TableName::default();
        table.init(None, "orders").unwrap();
        let mut r = reader(args![vec![Arg::node(table), Arg::from("id")]]);
        assert_eq!(
            r.node_list::<TableName>().unwrap_err().to_string(),
            "IndexColumn initializer: argument 0 must be TableName node at item 1, got string"
        );

        let mut r = reader(args![Vec::<Arg>::new()]);
        assert!(r.node_list::<TableName>().unwrap().is_empty());
        r.finish().unwrap();
    }

    #[test]
    fn leftovers() {
        let mut r = reader(args!["a", "b", "c"]);
        r.string().unwrap();
        assert_eq!(
            r.finish().unwrap_err(),
            NodeError::ArgumentCount {
                tag: NodeTag::IndexColumn,
                expected: 1,
                found: 3,
            }
        );
    }
}
