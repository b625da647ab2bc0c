//! Builder-pattern printer for syntax trees.

use std::fmt::Write;

use super::{Node, Tree};

pub struct TreePrinter<'t> {
    tree: &'t Tree,
    trivia: bool,
    spans: bool,
}

impl<'t> TreePrinter<'t> {
    pub fn new(tree: &'t Tree) -> Self {
        Self {
            tree,
            trivia: false,
            spans: false,
        }
    }

    pub fn with_trivia(mut self, value: bool) -> Self {
        self.trivia = value;
        self
    }

    pub fn with_spans(mut self, value: bool) -> Self {
        self.spans = value;
        self
    }

    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.format(&mut out).expect("String write never fails");
        out
    }

    pub fn format(&self, w: &mut impl Write) -> std::fmt::Result {
        self.format_node(&self.tree.root(), 0, w)
    }

    fn format_node(&self, node: &Node<'_>, indent: usize, w: &mut impl Write) -> std::fmt::Result {
        let prefix = "  ".repeat(indent);
        let span = self.span_str(node);

        if node.is_missing() && node.is_token() {
            return writeln!(w, "{prefix}MISSING {}{span}", node.kind_name());
        }
        if node.is_token() {
            return if node.is_named() || node.is_extra() {
                writeln!(w, "{prefix}{}{span} {:?}", node.kind_name(), node.text())
            } else {
                writeln!(w, "{prefix}{:?}{span}", node.text())
            };
        }

        writeln!(w, "{prefix}{}{span}", node.kind_name())?;
        for child in node.children() {
            if child.is_extra() && !self.trivia {
                continue;
            }
            self.format_node(&child, indent + 1, w)?;
        }
        Ok(())
    }

    fn span_str(&self, node: &Node<'_>) -> String {
        if !self.spans {
            return String::new();
        }
        let range = node.byte_range();
        format!(" [{}..{}]", range.start, range.end)
    }
}

/// S-expression over named nodes, tree-sitter style.
pub(crate) fn sexp(node: &Node<'_>, out: &mut String) {
    if node.is_missing() && node.is_token() {
        out.push_str("(MISSING ");
        if node.is_named() {
            out.push_str(node.kind_name());
        } else {
            out.push_str(&format!("{:?}", node.kind_name()));
        }
        out.push(')');
        return;
    }

    out.push('(');
    out.push_str(node.kind_name());
    for child in node.children() {
        if child.is_named() || (child.is_missing() && child.is_token()) {
            out.push(' ');
            sexp(&child, out);
        }
    }
    out.push(')');
}
