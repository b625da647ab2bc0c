//! Incremental, table-driven parser for the Kusto Query Language.
//!
//! # Example
//!
//! ```
//! use kql_lib::{Edit, Language, Parser};
//!
//! let parser = Parser::new(Language::kql());
//! let tree = parser.parse("StormEvents | where State == 'TEXAS' | take 10");
//! assert!(!tree.has_error());
//!
//! let edited = tree.edit(&Edit::replace(44..46, "20")).unwrap();
//! let reparsed = parser.reparse(&edited, edited.text());
//! assert!(reparsed.structurally_eq(&parser.parse(edited.text())));
//! ```

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod ast;
pub mod diagnostics;
pub mod edit;
pub mod language;
pub mod lexer;
pub mod parser;
pub mod tree;

pub use diagnostics::{Diagnostics, DiagnosticsPrinter};
pub use edit::{Edit, EditError, EditedTree};
pub use language::Language;
pub use lexer::{LexMode, Lexer, Token, TokenKind, lex, token_text};
pub use parser::{ExternalScanner, Interrupted, ParseSession, Parser, ParserConfig, Step};
pub use tree::{Kind, Node, ReuseStats, Tree};

pub use kql_core::{GrammarError, GrammarTable, SymbolId};
