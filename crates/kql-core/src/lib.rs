#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Grammar tables for the kql parser.
//!
//! Three layers:
//! - **Grammar model** ([`grammar`]): rule trees as written by a grammar author,
//!   loadable from tree-sitter style `grammar.json`
//! - **Builder** ([`build`]): lowers rules to productions and computes an LALR(1)
//!   automaton, resolving conflicts with precedence and associativity
//! - **Table** ([`table`]): the immutable, serializable automaton consumed at
//!   parse time, with a versioned and checksummed binary format

pub mod build;
pub mod grammar;
pub mod table;

mod error;
mod ids;
mod invariants;

pub use build::{CompileError, Compiled, Conflict, ConflictKind, compile};
pub use error::GrammarError;
pub use grammar::{Grammar, Rule};
pub use ids::{ProductionId, StateId, SymbolId};
pub use table::{
    Action, Assoc, GrammarTable, Production, Symbol, SymbolKind, TableDefect, Visibility,
};
