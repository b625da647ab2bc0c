//! Grammar → [`GrammarTable`] compilation.
//!
//! Pipeline: [`lower`] flattens rule trees into productions, [`lalr`] builds the
//! LALR(1) automaton by merging LR(1) states with equal cores, and [`resolve`]
//! turns the item sets into a deterministic action table using precedence and
//! associativity.

mod lalr;
pub(crate) mod lower;
mod resolve;
mod sets;

#[cfg(test)]
mod lower_tests;

use std::fmt;

use crate::Grammar;
use crate::ids::{ProductionId, StateId, SymbolId};
use crate::table::GrammarTable;

/// Upper bound on alternatives a single rule may expand to.
pub const MAX_ALTERNATIVES: usize = 512;

/// A compiled table plus the conflicts the builder had to settle by default.
#[derive(Debug, Clone)]
pub struct Compiled {
    pub table: GrammarTable,
    pub conflicts: Vec<Conflict>,
}

impl Compiled {
    /// Conflicts not listed in the grammar's `conflicts`.
    pub fn undeclared_conflicts(&self) -> impl Iterator<Item = &Conflict> {
        self.conflicts.iter().filter(|c| !c.declared)
    }
}

/// A (state, lookahead) cell with more than one candidate action that
/// precedence could not decide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub state: StateId,
    pub lookahead: SymbolId,
    pub kind: ConflictKind,
    /// One of the involved rules appears in a `conflicts` group.
    pub declared: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// Resolved as shift.
    ShiftReduce { reduce: ProductionId },
    /// Resolved in favor of `kept`.
    ReduceReduce {
        kept: ProductionId,
        dropped: ProductionId,
    },
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConflictKind::ShiftReduce { reduce } => write!(f, "shift/reduce with {reduce}"),
            ConflictKind::ReduceReduce { kept, dropped } => {
                write!(f, "reduce/reduce between {kept} and {dropped}")
            }
        }
    }
}

/// Grammar shapes the builder rejects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("grammar has no rules")]
    EmptyGrammar,
    #[error("rule `{0}` matches nothing (empty choice)")]
    EmptyRule(String),
    #[error("word token `{0}` must be a terminal, not a rule")]
    InvalidWord(String),
    #[error("grammar needs {0} symbols, more than the table format allows")]
    TooManySymbols(usize),
    #[error("rule `{0}` expands to more than {MAX_ALTERNATIVES} alternatives")]
    TooManyAlternatives(String),
}

/// Compile a grammar to an LALR(1) table.
///
/// Output is a pure function of the grammar: equal grammars give byte-identical
/// tables.
pub fn compile(grammar: &Grammar) -> Result<Compiled, CompileError> {
    let lowered = lower::lower(grammar)?;
    let automaton = lalr::build(&lowered);
    let (actions, conflicts) = resolve::resolve(&lowered, &automaton, grammar);

    for conflict in conflicts.iter().filter(|c| !c.declared) {
        tracing::warn!(
            grammar = %grammar.name,
            state = %conflict.state,
            lookahead = %lowered.symbols[conflict.lookahead.index()].name,
            "unresolved {}",
            conflict.kind,
        );
    }

    let gotos = automaton.goto_table(lowered.terminal_count as usize, lowered.symbols.len());

    let table = GrammarTable {
        name: grammar.name.clone(),
        symbols: lowered.symbols,
        terminal_count: lowered.terminal_count,
        start_symbol: lowered.start_symbol,
        word: lowered.word,
        keywords: lowered.keywords,
        externals: lowered.externals,
        productions: lowered.productions,
        state_count: automaton.states.len() as u32,
        actions,
        gotos,
    };

    tracing::debug!(
        grammar = %table.name,
        states = table.state_count,
        symbols = table.symbols.len(),
        terminals = table.terminal_count,
        productions = table.productions.len(),
        conflicts = conflicts.len(),
        "compiled grammar table"
    );

    Ok(Compiled { table, conflicts })
}
