//! A grammar table bound to the lexer.
//!
//! Terminals are linked to [`TokenKind`]s by name: `"|"` to `Pipe`,
//! `identifier` to `Identifier`, and so on. Keywords the grammar never
//! mentions lex as their own kind but parse as the word token.

pub mod kql;

#[cfg(test)]
mod language_tests;

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use kql_core::{GrammarError, GrammarTable, SymbolId, TableDefect, compile};

use crate::lexer::TokenKind;
use crate::tree::Kind;

/// Symbol ids must stay below the lexeme range of [`Kind`]'s raw encoding.
pub(crate) const MAX_SYMBOLS: usize = Kind::LEXEME_BASE as usize;

/// Parse-time view of a [`GrammarTable`]. Cheap to clone and shareable
/// across threads.
#[derive(Clone)]
pub struct Language {
    inner: Arc<LanguageInner>,
}

struct LanguageInner {
    table: GrammarTable,
    /// Indexed by `TokenKind as usize`.
    terminals: Vec<Option<SymbolId>>,
}

static KQL: LazyLock<Language> = LazyLock::new(|| {
    let compiled = compile(&kql::grammar()).expect("built-in KQL grammar compiles");
    Language::new(compiled.table).expect("built-in KQL grammar links against the lexer")
});

impl Language {
    /// Link `table` against the lexer.
    ///
    /// Fails with [`TableDefect::UnknownTerminal`] when the table names a
    /// terminal that is neither a lexer token nor an external.
    pub fn new(table: GrammarTable) -> Result<Self, GrammarError> {
        if table.symbols().len() > MAX_SYMBOLS {
            return Err(TableDefect::OutOfRange {
                what: "symbol count",
                index: table.symbols().len() as u64,
                limit: MAX_SYMBOLS as u64,
            }
            .into());
        }

        let by_name: HashMap<&str, SymbolId> = (1..table.terminal_count())
            .map(|i| SymbolId(i as u16))
            .map(|id| (table.symbol(id).name.as_str(), id))
            .collect();

        let terminals: Vec<Option<SymbolId>> = TokenKind::all()
            .map(|kind| match kind {
                TokenKind::Eof => Some(SymbolId::END),
                _ => by_name.get(kind.name()).copied().or_else(|| {
                    (kind.is_keyword() && is_identifier_like(kind.name()))
                        .then(|| table.word())
                        .flatten()
                }),
            })
            .collect();

        let linked: Vec<bool> = {
            let mut linked = vec![false; table.terminal_count()];
            linked[SymbolId::END.index()] = true;
            for id in terminals.iter().flatten() {
                linked[id.index()] = true;
            }
            for id in table.externals() {
                linked[id.index()] = true;
            }
            linked
        };
        if let Some(missing) = linked.iter().position(|ok| !ok) {
            let name = table.symbol(SymbolId(missing as u16)).name.clone();
            return Err(TableDefect::UnknownTerminal(name).into());
        }

        Ok(Self {
            inner: Arc::new(LanguageInner { table, terminals }),
        })
    }

    /// Load and link a serialized table.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, GrammarError> {
        Self::new(GrammarTable::load(bytes)?)
    }

    /// The built-in KQL language, compiled on first use.
    pub fn kql() -> Self {
        KQL.clone()
    }

    pub fn table(&self) -> &GrammarTable {
        &self.inner.table
    }

    pub fn name(&self) -> &str {
        self.inner.table.name()
    }

    /// Terminal a lexed token feeds to the parser, if any.
    #[inline]
    pub fn terminal(&self, kind: TokenKind) -> Option<SymbolId> {
        self.inner.terminals[kind as usize]
    }

    pub fn word(&self) -> Option<SymbolId> {
        self.inner.table.word()
    }

    pub fn start_symbol(&self) -> SymbolId {
        self.inner.table.start_symbol()
    }

    /// Display name of a tree kind.
    pub fn kind_name(&self, kind: Kind) -> &str {
        match kind {
            Kind::Symbol(id) => &self.inner.table.symbol(id).name,
            Kind::Lexeme(token) => token.name(),
            Kind::Error => "ERROR",
        }
    }

    /// Whether `kind` shows up in named-only views like [`crate::Tree::to_sexp`].
    pub fn is_named(&self, kind: Kind) -> bool {
        match kind {
            Kind::Symbol(id) => self.inner.table.symbol(id).is_named(),
            Kind::Lexeme(_) => false,
            Kind::Error => true,
        }
    }

    pub fn ptr_eq(&self, other: &Language) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Language")
            .field("name", &self.name())
            .field("states", &self.table().state_count())
            .field("symbols", &self.table().symbols().len())
            .finish()
    }
}

fn is_identifier_like(text: &str) -> bool {
    let mut chars = text.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
