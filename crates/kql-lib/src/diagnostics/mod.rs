//! Syntax errors as user-facing diagnostics.
//!
//! The parser never reports errors out of band: recovery leaves `ERROR` nodes
//! in the tree. [`Diagnostics::from_tree`] turns the outermost ones into
//! messages, and [`DiagnosticsPrinter`] renders them against the source.

mod message;
mod printer;


use rowan::NodeOrToken;

use crate::lexer::text_range;
use crate::tree::{Node, Tree};

pub use message::{DiagnosticKind, DiagnosticMessage};
pub use printer::DiagnosticsPrinter;

/// Longest excerpt of skipped input quoted in a message.
const MAX_DETAIL: usize = 32;

#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    messages: Vec<DiagnosticMessage>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    /// One diagnostic per outermost error node, in document order.
    pub fn from_tree(tree: &Tree) -> Self {
        let mut diagnostics = Self::new();
        for error in tree.errors() {
            if inside_error(&error) {
                continue;
            }
            let range = text_range(error.byte_range());
            let message = if error.is_missing() {
                let name = error.child(0).map(|token| token.kind_name());
                DiagnosticMessage::new(DiagnosticKind::MissingToken, range, name)
            } else if let Some(text) = first_token_text(&error) {
                DiagnosticMessage::new(DiagnosticKind::UnexpectedToken, range, Some(&text))
            } else {
                DiagnosticMessage::new(DiagnosticKind::UnexpectedEnd, range, None)
            };
            diagnostics.messages.push(message);
        }
        diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DiagnosticMessage> {
        self.messages.iter()
    }

    pub fn printer(&self) -> DiagnosticsPrinter<'_, '_> {
        DiagnosticsPrinter::new(self)
    }
}

fn inside_error(node: &Node<'_>) -> bool {
    std::iter::successors(node.parent(), |parent| parent.parent()).any(|n| n.is_error())
}

/// Text of the first non-empty, non-trivia token under `node`, cut to one
/// line of at most [`MAX_DETAIL`] bytes.
fn first_token_text(node: &Node<'_>) -> Option<String> {
    let NodeOrToken::Node(syntax) = node.syntax() else {
        return None;
    };
    let token = syntax
        .descendants_with_tokens()
        .filter_map(NodeOrToken::into_token)
        .find(|token| !token.kind().is_trivia() && !token.text().is_empty())?;

    let line = token.text().lines().next().unwrap_or_default();
    let mut end = line.len().min(MAX_DETAIL);
    while !line.is_char_boundary(end) {
        end -= 1;
    }
    Some(line[..end].to_owned())
}
