use std::fmt;

use crate::args::ArgKind;
use crate::node::NodeTag;
use crate::position::Span;

/// Misuse of the node protocol.
///
/// These errors mean that a grammar action and the node variant it builds
/// disagree. They are never caused by the statement being parsed and must
/// be reported as internal errors, not as [`Diagnostic`]s.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    #[error("{tag} initializer: argument {position} must be {expected}, got {found}")]
    InvalidArgumentType {
        tag: NodeTag,
        position: usize,
        expected: String,
        found: ArgKind,
    },
    #[error("{tag} initializer takes {expected} arguments, got {found}")]
    ArgumentCount {
        tag: NodeTag,
        expected: usize,
        found: usize,
    },
    #[error("expected a {expected} node, got {found}")]
    VariantMismatch { expected: NodeTag, found: NodeTag },
    #[error("{tag} node used before initialization")]
    UninitializedAccess { tag: NodeTag },
    #[error("{tag} node is already initialized")]
    AlreadyInitialized { tag: NodeTag },
    #[error("no allocator registered for {tag}")]
    UnknownVariant { tag: NodeTag },
}

/// Problem in the statement, reported to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub span: Span,
    pub hint: Option<String>,
}

impl Diagnostic {
    pub fn new<S: ToString>(message: S) -> Self {
        Diagnostic {
            message: message.to_string(),
            span: Span::default(),
            hint: None,
        }
    }

    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn with_hint<S: ToString>(mut self, hint: S) -> Self {
        self.hint = Some(hint.to_string());
        self
    }

    pub fn default_span_to(mut self, span: Span) -> Self {
        if self.span == Span::default() {
            self.span = span;
        }
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, " (hint: {hint})")?;
        }
        Ok(())
    }
}
