//! Table-driven LR parsing with error recovery and incremental reuse.
//!
//! # Architecture
//!
//! A [`Parser`] pairs a [`Language`] with a [`ParserConfig`]. Each parse runs in
//! a [`ParseSession`] that owns the stack, pulls tokens from the lexer on demand
//! and advances one action per [`ParseSession::step`]. The session never fails:
//! syntax errors become `ERROR` nodes (see `recovery`), and the finished
//! [`Tree`] always spans the whole input.
//!
//! Trivia never reaches the automaton. It is buffered and attached in front of
//! the next shifted token, then hoisted out of nodes whose content starts with it.
//!
//! # Incremental reparsing
//!
//! Every error-free reduction is recorded as a fragment. After an edit the
//! surviving fragments are offered back at shift time: one whose start state,
//! lexer mode and first token match the live parse is pushed whole instead of
//! re-parsing its content.

mod invariants;
mod recovery;
mod reuse;
mod session;
mod stack;
mod tokens;

#[cfg(test)]
mod parser_tests;

use std::fmt;
use std::sync::Arc;

use kql_core::SymbolId;
use tracing::warn;

use crate::edit::EditedTree;
use crate::language::Language;
use crate::tree::Tree;

pub use session::{ParseSession, Step};

/// Default number of tokens recovery may insert, skip or pop past.
pub const DEFAULT_RECOVERY_WINDOW: usize = 3;

/// Bytes past a token's end the lexer may examine to classify it.
pub const LEXER_LOOKAHEAD: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    pub recovery_window: usize,
    /// Maximum number of parse actions before [`ParseSession::run_until`]
    /// gives up. `None` means unlimited.
    pub step_limit: Option<u32>,
    /// Offer fragments of the old tree to [`Parser::reparse`].
    pub reuse: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            recovery_window: DEFAULT_RECOVERY_WINDOW,
            step_limit: None,
            reuse: true,
        }
    }
}

impl ParserConfig {
    /// Clamped to at least 1.
    pub fn with_recovery_window(mut self, window: usize) -> Self {
        self.recovery_window = window.max(1);
        self
    }

    pub fn with_step_limit(mut self, limit: Option<u32>) -> Self {
        self.step_limit = limit;
        self
    }

    pub fn with_reuse(mut self, value: bool) -> Self {
        self.reuse = value;
        self
    }
}

/// Scanner for terminals the lexer cannot produce.
///
/// Consulted before the lexer whenever one of the grammar's external terminals
/// is valid in the current state. An implementation must only look at bytes
/// within [`LEXER_LOOKAHEAD`] of `offset` or of the token end it reports, or
/// incremental reparsing may reuse subtrees that depended on other bytes.
pub trait ExternalScanner: Send + Sync {
    /// Returns the recognized terminal (one of `valid`) and its end offset.
    fn scan(&self, text: &str, offset: usize, valid: &[SymbolId]) -> Option<(SymbolId, usize)>;
}

/// Why [`ParseSession::run_until`] stopped without a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Interrupted {
    #[error("parse cancelled")]
    Cancelled,
    #[error("parse step limit exhausted")]
    StepLimit,
}

#[derive(Clone)]
pub struct Parser {
    language: Language,
    config: ParserConfig,
    external: Option<Arc<dyn ExternalScanner>>,
}

impl Parser {
    pub fn new(language: Language) -> Self {
        Self {
            language,
            config: ParserConfig::default(),
            external: None,
        }
    }

    pub fn with_config(mut self, config: ParserConfig) -> Self {
        self.config = config.with_recovery_window(config.recovery_window);
        self
    }

    pub fn with_external_scanner(mut self, scanner: impl ExternalScanner + 'static) -> Self {
        self.external = Some(Arc::new(scanner));
        self
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse `text` to completion. Never fails; `step_limit` does not apply.
    pub fn parse(&self, text: &str) -> Tree {
        self.session(text).run()
    }

    /// Start a step-wise parse of `text`.
    pub fn session(&self, text: &str) -> ParseSession<'_> {
        ParseSession::new(self, Arc::from(text), Vec::new())
    }

    /// Parse `text`, reusing fragments of the tree `edited` was derived from.
    ///
    /// `text` must be the edited text. Anything else gets a full parse.
    pub fn reparse(&self, edited: &EditedTree, text: &str) -> Tree {
        self.reparse_session(edited, text).run()
    }

    pub fn reparse_session(&self, edited: &EditedTree, text: &str) -> ParseSession<'_> {
        if edited.text() != text {
            warn!(
                expected = edited.text().len(),
                actual = text.len(),
                "reparse text does not match the edit, parsing from scratch"
            );
            return self.session(text);
        }
        if !edited.language().ptr_eq(&self.language) {
            warn!("reparse with a different language, parsing from scratch");
            return self.session(text);
        }

        let fragments = if self.config.reuse {
            edited.fragments().to_vec()
        } else {
            Vec::new()
        };
        ParseSession::new(self, edited.shared_text(), fragments)
    }

    pub(crate) fn external(&self) -> Option<&dyn ExternalScanner> {
        self.external.as_deref()
    }
}

impl fmt::Debug for Parser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parser")
            .field("language", &self.language)
            .field("config", &self.config)
            .field("external", &self.external.is_some())
            .finish()
    }
}
