use crate::node::Node;

/// What a [`Visitor`] wants after seeing a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Walk {
    Continue,
    SkipChildren,
    Stop,
}

pub trait Visitor {
    /// Called for every node before its children. `depth` is zero for the
    /// node the walk started from.
    fn visit(&mut self, node: &dyn Node, depth: usize) -> Walk;
}

impl<F: FnMut(&dyn Node, usize) -> Walk> Visitor for F {
    fn visit(&mut self, node: &dyn Node, depth: usize) -> Walk {
        self(node, depth)
    }
}

/// Visits `node` and its owned children depth-first, parents before
/// children, children in field order.
///
/// Returns [`Walk::Stop`] if the visitor stopped the walk.
pub fn walk(node: &dyn Node, visitor: &mut dyn Visitor) -> Walk {
    walk_at(node, 0, visitor)
}

fn walk_at(node: &dyn Node, depth: usize, visitor: &mut dyn Visitor) -> Walk {
    match visitor.visit(node, depth) {
        Walk::Stop => return Walk::Stop,
        Walk::SkipChildren => return Walk::Continue,
        Walk::Continue => {}
    }
    for child in node.children() {
        if walk_at(child.node, depth + 1, visitor) == Walk::Stop {
            return Walk::Stop;
        }
    }
    Walk::Continue
}
