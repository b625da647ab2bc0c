use std::fmt;
use std::ops::Range;

use rowan::NodeOrToken;

use super::kind::{Kind, SyntaxElement};
use crate::language::Language;

/// A node or token of a [`crate::Tree`].
///
/// Tokens are nodes without children, so callers walk one uniform type.
#[derive(Clone)]
pub struct Node<'t> {
    element: SyntaxElement,
    language: &'t Language,
}

impl<'t> Node<'t> {
    pub(crate) fn new(element: SyntaxElement, language: &'t Language) -> Self {
        Self { element, language }
    }

    pub fn kind(&self) -> Kind {
        match &self.element {
            NodeOrToken::Node(node) => node.kind(),
            NodeOrToken::Token(token) => token.kind(),
        }
    }

    pub fn kind_name(&self) -> &'t str {
        self.language.kind_name(self.kind())
    }

    pub fn byte_range(&self) -> Range<usize> {
        let range = self.element.text_range();
        range.start().into()..range.end().into()
    }

    pub fn start(&self) -> usize {
        self.element.text_range().start().into()
    }

    pub fn end(&self) -> usize {
        self.element.text_range().end().into()
    }

    pub fn is_token(&self) -> bool {
        self.element.as_token().is_some()
    }

    /// Named symbols and error nodes. Literal tokens, trivia and skipped
    /// lexemes are anonymous.
    pub fn is_named(&self) -> bool {
        self.language.is_named(self.kind())
    }

    pub fn is_error(&self) -> bool {
        self.kind().is_error()
    }

    /// A token the parser inserted during recovery, or the error node that
    /// holds only such a token.
    pub fn is_missing(&self) -> bool {
        match &self.element {
            NodeOrToken::Token(token) => {
                token.text().is_empty() && token.kind().symbol().is_some()
            }
            NodeOrToken::Node(node) => {
                node.kind().is_error()
                    && node.text_range().is_empty()
                    && node.children_with_tokens().count() == 1
                    && node
                        .first_token()
                        .is_some_and(|t| t.text().is_empty() && t.kind().symbol().is_some())
            }
        }
    }

    /// Trivia: whitespace, newlines and comments.
    pub fn is_extra(&self) -> bool {
        self.kind().is_trivia()
    }

    /// Whether this node is or contains an error node.
    pub fn has_error(&self) -> bool {
        match &self.element {
            NodeOrToken::Token(_) => false,
            NodeOrToken::Node(node) => {
                node.kind().is_error() || node.descendants().any(|n| n.kind().is_error())
            }
        }
    }

    pub fn text(&self) -> String {
        match &self.element {
            NodeOrToken::Node(node) => node.text().to_string(),
            NodeOrToken::Token(token) => token.text().to_owned(),
        }
    }

    pub fn parent(&self) -> Option<Node<'t>> {
        self.element
            .parent()
            .map(|parent| Node::new(NodeOrToken::Node(parent), self.language))
    }

    /// All children, including tokens and trivia.
    pub fn children(&self) -> impl Iterator<Item = Node<'t>> + use<'t> {
        let language = self.language;
        self.element
            .as_node()
            .cloned()
            .into_iter()
            .flat_map(|node| node.children_with_tokens())
            .map(move |child| Node::new(child, language))
    }

    pub fn named_children(&self) -> impl Iterator<Item = Node<'t>> + use<'t> {
        self.children().filter(Node::is_named)
    }

    pub fn child_count(&self) -> usize {
        self.children().count()
    }

    pub fn child(&self, index: usize) -> Option<Node<'t>> {
        self.children().nth(index)
    }

    pub fn named_child(&self, index: usize) -> Option<Node<'t>> {
        self.named_children().nth(index)
    }

    pub fn syntax(&self) -> &SyntaxElement {
        &self.element
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let range = self.byte_range();
        write!(f, "{}@{}..{}", self.kind_name(), range.start, range.end)
    }
}
