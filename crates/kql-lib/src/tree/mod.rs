//! Persistent syntax trees.
//!
//! A [`Tree`] owns a rowan green tree, the text it was parsed from, and the
//! reuse records an incremental reparse needs. Green nodes are immutable and
//! reference counted: editing never touches an existing tree, and reparsing
//! shares unchanged subtrees with the old one.

mod dump;
mod kind;
mod node;


use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use kql_core::StateId;
use kql_core::SymbolId;
use rowan::GreenNode;

use crate::diagnostics::Diagnostics;
use crate::language::Language;
use crate::lexer::LexMode;

pub use dump::TreePrinter;
pub use kind::{Kind, KqlLang, SyntaxElement, SyntaxNode, SyntaxToken};
pub use node::Node;

pub(crate) use kind::{
    Element, element_kind, first_leaf, green_children, green_node, green_token,
};

/// A reduced, error-free subtree together with the parse context it was
/// built in. Pushing `elements` in state `start_state` with the lexer in
/// `start_mode` reproduces what a fresh parse would build there, as long as
/// the text in `range` plus `lookahead` bytes after it is unchanged.
#[derive(Debug, Clone)]
pub(crate) struct Fragment {
    pub symbol: SymbolId,
    pub range: Range<usize>,
    /// Bytes past `range.end` the lexer examined before the reduction.
    pub lookahead: usize,
    pub start_state: StateId,
    pub start_mode: LexMode,
    pub end_mode: LexMode,
    pub elements: Arc<[Element]>,
}

impl Fragment {
    pub fn len(&self) -> usize {
        self.range.end - self.range.start
    }

    /// Last byte whose change can affect this fragment.
    pub fn examined_end(&self) -> usize {
        self.range.end + self.lookahead
    }
}

/// How much of a reparse came from the previous tree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReuseStats {
    pub fragments: usize,
    pub bytes: usize,
}

/// Result of a parse. Always covers the whole input.
#[derive(Clone)]
pub struct Tree {
    green: GreenNode,
    text: Arc<str>,
    language: Language,
    fragments: Arc<[Fragment]>,
    reuse: ReuseStats,
}

impl Tree {
    pub(crate) fn new(
        green: GreenNode,
        text: Arc<str>,
        language: Language,
        fragments: Vec<Fragment>,
        reuse: ReuseStats,
    ) -> Self {
        debug_assert_eq!(usize::from(green.text_len()), text.len());
        Self {
            green,
            text,
            language,
            fragments: fragments.into(),
            reuse,
        }
    }

    pub fn root(&self) -> Node<'_> {
        let root = SyntaxNode::new_root(self.green.clone());
        Node::new(rowan::NodeOrToken::Node(root), &self.language)
    }

    pub fn green(&self) -> &GreenNode {
        &self.green
    }

    pub fn has_error(&self) -> bool {
        self.root().has_error()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub(crate) fn fragments(&self) -> &[Fragment] {
        &self.fragments
    }

    /// Reuse statistics when this tree came from [`crate::Parser::reparse`].
    pub fn reuse(&self) -> ReuseStats {
        self.reuse
    }

    /// Node-for-node equality, ignoring identity and reuse bookkeeping.
    pub fn structurally_eq(&self, other: &Tree) -> bool {
        self.green == other.green
    }

    /// Error nodes in document order, outermost first.
    pub fn errors(&self) -> Vec<Node<'_>> {
        let root = SyntaxNode::new_root(self.green.clone());
        root.descendants()
            .filter(|node| node.kind().is_error())
            .map(|node| Node::new(rowan::NodeOrToken::Node(node), &self.language))
            .collect()
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics::from_tree(self)
    }

    /// Named nodes as an S-expression: `(source_file (identifier) (number_literal))`.
    pub fn to_sexp(&self) -> String {
        let mut out = String::new();
        dump::sexp(&self.root(), &mut out);
        out
    }

    pub fn printer(&self) -> TreePrinter<'_> {
        TreePrinter::new(self)
    }

    /// Every non-trivia node and token, one per line.
    pub fn dump(&self) -> String {
        self.printer().dump()
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tree")
            .field("language", &self.language.name())
            .field("len", &self.text.len())
            .field("has_error", &self.has_error())
            .finish()
    }
}
