//! The compiled parse table.
//!
//! A [`GrammarTable`] is read-only after construction. It is produced by
//! [`crate::compile`] or loaded from its binary form with
//! [`GrammarTable::load`], which validates the whole structure so that
//! lookups at parse time can index without checks.

mod format;
mod load;

#[cfg(test)]
mod format_tests;
#[cfg(test)]
mod load_tests;

use serde::{Deserialize, Serialize};

use crate::ids::{ProductionId, StateId, SymbolId};

pub use format::{HEADER_SIZE, Header, MAGIC, VERSION};
pub use load::TableDefect;

/// Parser action for a (state, terminal) pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    Error,
    Shift(StateId),
    Reduce(ProductionId),
    Accept,
}

impl Action {
    #[inline]
    pub fn is_error(self) -> bool {
        matches!(self, Action::Error)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Assoc {
    #[default]
    None,
    Left,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SymbolKind {
    Terminal,
    NonTerminal,
}

/// How a symbol shows up in a syntax tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Visibility {
    /// Named node or token (`where_clause`, `identifier`).
    Named,
    /// Literal token (`"|"`, `"where"`).
    Anonymous,
    /// Never materialized: children are spliced into the parent.
    Hidden,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub visibility: Visibility,
}

impl Symbol {
    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.kind == SymbolKind::Terminal
    }

    #[inline]
    pub fn is_hidden(&self) -> bool {
        self.visibility == Visibility::Hidden
    }

    #[inline]
    pub fn is_named(&self) -> bool {
        self.visibility == Visibility::Named
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Production {
    pub lhs: SymbolId,
    pub rhs: Vec<SymbolId>,
    pub precedence: i32,
    pub assoc: Assoc,
}

/// LALR(1) parse table.
///
/// Terminals are `0..terminal_count` with `SymbolId::END` first; nonterminals follow.
/// `actions` is dense, row-major over terminals; `gotos` is dense, row-major over
/// nonterminals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarTable {
    pub(crate) name: String,
    pub(crate) symbols: Vec<Symbol>,
    pub(crate) terminal_count: u16,
    pub(crate) start_symbol: SymbolId,
    pub(crate) word: Option<SymbolId>,
    /// Sorted.
    pub(crate) keywords: Vec<SymbolId>,
    /// Sorted.
    pub(crate) externals: Vec<SymbolId>,
    pub(crate) productions: Vec<Production>,
    pub(crate) state_count: u32,
    pub(crate) actions: Vec<Action>,
    pub(crate) gotos: Vec<Option<StateId>>,
}

impl GrammarTable {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state_count(&self) -> usize {
        self.state_count as usize
    }

    pub fn terminal_count(&self) -> usize {
        self.terminal_count as usize
    }

    pub fn nonterminal_count(&self) -> usize {
        self.symbols.len() - self.terminal_count as usize
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    /// Start symbol of the user grammar (the tree root kind).
    pub fn start_symbol(&self) -> SymbolId {
        self.start_symbol
    }

    pub fn word(&self) -> Option<SymbolId> {
        self.word
    }

    pub fn keywords(&self) -> &[SymbolId] {
        &self.keywords
    }

    pub fn externals(&self) -> &[SymbolId] {
        &self.externals
    }

    #[inline]
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    pub fn symbol_by_name(&self, name: &str) -> Option<SymbolId> {
        self.symbols
            .iter()
            .position(|s| s.name == name)
            .map(|i| SymbolId(i as u16))
    }

    #[inline]
    pub fn is_terminal(&self, id: SymbolId) -> bool {
        id.0 < self.terminal_count
    }

    #[inline]
    pub fn is_keyword(&self, id: SymbolId) -> bool {
        self.keywords.binary_search(&id).is_ok()
    }

    #[inline]
    pub fn is_external(&self, id: SymbolId) -> bool {
        self.externals.binary_search(&id).is_ok()
    }

    #[inline]
    pub fn production(&self, id: ProductionId) -> &Production {
        &self.productions[id.index()]
    }

    /// Action for `terminal` in `state`.
    #[inline]
    pub fn action(&self, state: StateId, terminal: SymbolId) -> Action {
        debug_assert!(self.is_terminal(terminal));
        self.actions[state.index() * self.terminal_count as usize + terminal.index()]
    }

    /// Successor of `state` after reducing to `nonterminal`.
    #[inline]
    pub fn goto(&self, state: StateId, nonterminal: SymbolId) -> Option<StateId> {
        debug_assert!(!self.is_terminal(nonterminal));
        let column = nonterminal.index() - self.terminal_count as usize;
        self.gotos[state.index() * self.nonterminal_count() + column]
    }

    /// Terminals with a non-error action in `state`, in id order.
    pub fn valid_terminals(&self, state: StateId) -> impl Iterator<Item = SymbolId> + '_ {
        let width = self.terminal_count as usize;
        let row = &self.actions[state.index() * width..(state.index() + 1) * width];
        row.iter()
            .enumerate()
            .filter(|(_, action)| !action.is_error())
            .map(|(i, _)| SymbolId(i as u16))
    }
}
