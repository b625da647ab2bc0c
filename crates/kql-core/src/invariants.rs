//! Invariant checks excluded from coverage reports.

#![cfg_attr(coverage_nightly, coverage(off))]

use crate::build::lower::Lowered;
use crate::ids::SymbolId;

impl Lowered {
    #[inline]
    pub(crate) fn ensure_nonterminal(&self, id: SymbolId) {
        assert!(
            !self.is_terminal(id) && id.index() < self.symbols.len(),
            "symbol {id} is not a nonterminal (lowering assigns nonterminals after terminals)"
        );
    }

    #[inline]
    pub(crate) fn ensure_terminal(&self, id: SymbolId) {
        assert!(
            self.is_terminal(id),
            "symbol {id} is not a terminal (lookahead sets only hold terminals)"
        );
    }
}
