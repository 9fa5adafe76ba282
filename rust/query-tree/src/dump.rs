use std::fmt::{self, Write};

use crate::node::{FieldSink, Node};

const INDENT: &str = "    ";

/// Renders nodes as indented `label: value` lines.
///
/// Children are nested one level under their label, absent children print
/// as `label: null`, empty lists as `label: []`. With headers enabled each
/// node is introduced by the name of its variant.
pub struct TreeWriter {
    out: String,
    depth: usize,
    headers: bool,
}

impl TreeWriter {
    pub fn render(node: &dyn Node) -> String {
        TreeWriter::new(false).finish(node)
    }

    pub fn dump(node: &dyn Node) -> String {
        TreeWriter::new(true).finish(node)
    }

    fn new(headers: bool) -> TreeWriter {
        TreeWriter {
            out: String::new(),
            depth: 0,
            headers,
        }
    }

    fn finish(mut self, node: &dyn Node) -> String {
        self.node(node);
        self.out
    }

    fn node(&mut self, node: &dyn Node) {
        if self.headers {
            self.line(format_args!("{}", node.tag()));
            self.nested(|w| node.write_to(w));
        } else {
            node.write_to(self);
        }
    }

    fn nested(&mut self, f: impl FnOnce(&mut TreeWriter)) {
        self.depth += 1;
        f(self);
        self.depth -= 1;
    }

    fn line(&mut self, args: fmt::Arguments<'_>) {
        for _ in 0..self.depth {
            self.out.push_str(INDENT);
        }
        // writing into a String cannot fail
        let _ = self.out.write_fmt(args);
        self.out.push('\n');
    }
}

impl FieldSink for TreeWriter {
    fn value(&mut self, label: Option<&str>, value: &dyn fmt::Display) {
        match label {
            Some(label) => self.line(format_args!("{label}: {value}")),
            None => self.line(format_args!("{value}")),
        }
    }

    fn child(&mut self, label: &str, child: Option<&dyn Node>) {
        match child {
            Some(child) => {
                self.line(format_args!("{label}:"));
                self.nested(|w| w.node(child));
            }
            None => self.line(format_args!("{label}: null")),
        }
    }

    fn list(&mut self, label: &str, children: &[&dyn Node]) {
        if children.is_empty() {
            self.line(format_args!("{label}: []"));
            return;
        }
        self.line(format_args!("{label}:"));
        self.nested(|w| {
            for (index, child) in children.iter().enumerate() {
                w.line(format_args!("[{index}]:"));
                w.nested(|w| w.node(*child));
            }
        });
    }
}
