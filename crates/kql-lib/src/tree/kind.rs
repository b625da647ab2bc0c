//! Tree kinds and the rowan glue.
//!
//! A green tree stores kinds as raw `u16`s, so [`Kind`] packs grammar symbols,
//! extra lexemes and error nodes into one space:
//!
//! | raw              | kind                      |
//! |------------------|---------------------------|
//! | `0..0x4000`      | `Symbol(SymbolId(raw))`   |
//! | `0x4000..0x7FFF` | `Lexeme(TokenKind)`       |
//! | `0x7FFF`         | `Error`                   |

use kql_core::SymbolId;
use rowan::{GreenNode, GreenToken, NodeOrToken};

use crate::lexer::TokenKind;

/// Kind of a tree element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    /// A grammar symbol: a shifted terminal or a reduced nonterminal.
    Symbol(SymbolId),
    /// A lexeme the grammar never sees: trivia, or input skipped by recovery.
    Lexeme(TokenKind),
    /// Recovery wrapper around skipped, missing or abandoned input.
    Error,
}

impl Kind {
    pub(crate) const LEXEME_BASE: u16 = 0x4000;
    const ERROR_RAW: u16 = 0x7FFF;

    pub fn to_raw(self) -> u16 {
        match self {
            Kind::Symbol(id) => id.0,
            Kind::Lexeme(kind) => Self::LEXEME_BASE + kind as u16,
            Kind::Error => Self::ERROR_RAW,
        }
    }

    pub fn from_raw(raw: u16) -> Self {
        match raw {
            Self::ERROR_RAW => Kind::Error,
            raw if raw >= Self::LEXEME_BASE => {
                Kind::Lexeme(TokenKind::from_raw(raw - Self::LEXEME_BASE))
            }
            raw => Kind::Symbol(SymbolId(raw)),
        }
    }

    #[inline]
    pub fn is_error(self) -> bool {
        self == Kind::Error
    }

    #[inline]
    pub fn symbol(self) -> Option<SymbolId> {
        match self {
            Kind::Symbol(id) => Some(id),
            _ => None,
        }
    }

    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(self, Kind::Lexeme(kind) if kind.is_trivia())
    }
}

impl From<Kind> for rowan::SyntaxKind {
    fn from(kind: Kind) -> Self {
        rowan::SyntaxKind(kind.to_raw())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KqlLang {}

impl rowan::Language for KqlLang {
    type Kind = Kind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        Kind::from_raw(raw.0)
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

/// Type aliases for Rowan types parameterized by our language.
pub type SyntaxNode = rowan::SyntaxNode<KqlLang>;
pub type SyntaxToken = rowan::SyntaxToken<KqlLang>;
pub type SyntaxElement = rowan::NodeOrToken<SyntaxNode, SyntaxToken>;

/// Owned green element, the unit the parser stack works in.
pub(crate) type Element = NodeOrToken<GreenNode, GreenToken>;

pub(crate) fn green_node(kind: Kind, children: Vec<Element>) -> Element {
    NodeOrToken::Node(GreenNode::new(kind.into(), children))
}

pub(crate) fn green_token(kind: Kind, text: &str) -> Element {
    NodeOrToken::Token(GreenToken::new(kind.into(), text))
}

pub(crate) fn element_kind(element: &Element) -> Kind {
    let raw = match element {
        NodeOrToken::Node(node) => node.kind(),
        NodeOrToken::Token(token) => token.kind(),
    };
    Kind::from_raw(raw.0)
}

/// First non-trivia token under `elements`, as `(kind, length)`.
pub(crate) fn first_leaf(elements: &[Element]) -> Option<(Kind, usize)> {
    fn walk(node: &rowan::GreenNodeData) -> Option<(Kind, usize)> {
        node.children().find_map(|child| match child {
            NodeOrToken::Node(node) => walk(node),
            NodeOrToken::Token(token) => {
                let kind = Kind::from_raw(token.kind().0);
                (!kind.is_trivia()).then(|| (kind, usize::from(token.text_len())))
            }
        })
    }

    elements.iter().find_map(|element| match element {
        NodeOrToken::Node(node) => walk(node),
        NodeOrToken::Token(token) => {
            let kind = Kind::from_raw(token.kind().0);
            (!kind.is_trivia()).then(|| (kind, usize::from(token.text_len())))
        }
    })
}

/// Owned copies of a green node's children.
pub(crate) fn green_children(node: &rowan::GreenNodeData) -> Vec<Element> {
    node.children()
        .map(|child| match child {
            NodeOrToken::Node(node) => NodeOrToken::Node(node.to_owned()),
            NodeOrToken::Token(token) => NodeOrToken::Token(token.to_owned()),
        })
        .collect()
}
