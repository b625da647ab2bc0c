//! Loading and structural validation of serialized tables.

use std::path::Path;

use super::format::{HEADER_SIZE, Header, VERSION};
use super::{Action, GrammarTable, SymbolKind};
use crate::GrammarError;
use crate::ids::SymbolId;

/// Why a serialized table was rejected.
#[derive(Debug, thiserror::Error)]
pub enum TableDefect {
    #[error("file too small: {0} bytes (minimum {HEADER_SIZE})")]
    FileTooSmall(usize),
    #[error("invalid magic: expected KQLT")]
    InvalidMagic,
    #[error("unsupported version: {0} (expected {VERSION})")]
    UnsupportedVersion(u32),
    #[error("size mismatch: header says {header} payload bytes, got {actual}")]
    SizeMismatch { header: u32, actual: usize },
    #[error("checksum mismatch: header says {header:#010x}, payload hashes to {actual:#010x}")]
    ChecksumMismatch { header: u32, actual: u32 },
    #[error("payload decode error: {0}")]
    Decode(#[from] postcard::Error),
    #[error("header {field} is {header}, payload has {actual}")]
    CountMismatch {
        field: &'static str,
        header: u64,
        actual: u64,
    },
    #[error("{what} has {actual} entries, expected {expected}")]
    Shape {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("{what} {index} out of range (limit {limit})")]
    OutOfRange {
        what: &'static str,
        index: u64,
        limit: u64,
    },
    #[error("symbol {0} has the wrong kind for its position")]
    SymbolKind(SymbolId),
    #[error("{what} must be strictly sorted")]
    Unsorted { what: &'static str },
    #[error("table has no accept action")]
    NoAccept,
    #[error("terminal `{0}` is not produced by the lexer or an external scanner")]
    UnknownTerminal(String),
}

impl GrammarTable {
    /// Load a table from its serialized form.
    ///
    /// Checks header size, magic, version, payload size and checksum before
    /// decoding, then validates every index in the decoded table.
    pub fn load(bytes: &[u8]) -> Result<Self, GrammarError> {
        if bytes.len() < HEADER_SIZE {
            return Err(TableDefect::FileTooSmall(bytes.len()).into());
        }

        let header = Header::from_bytes(&bytes[..HEADER_SIZE]);

        if !header.validate_magic() {
            return Err(TableDefect::InvalidMagic.into());
        }
        if !header.validate_version() {
            return Err(TableDefect::UnsupportedVersion(header.version).into());
        }

        let payload = &bytes[HEADER_SIZE..];
        if header.payload_size as usize != payload.len() {
            return Err(TableDefect::SizeMismatch {
                header: header.payload_size,
                actual: payload.len(),
            }
            .into());
        }

        let actual = crc32fast::hash(payload);
        if actual != header.checksum {
            return Err(TableDefect::ChecksumMismatch {
                header: header.checksum,
                actual,
            }
            .into());
        }

        let table: GrammarTable = postcard::from_bytes(payload).map_err(TableDefect::Decode)?;
        table.check_header(&header)?;
        table.validate()?;
        Ok(table)
    }

    /// Load a table from a file path.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, GrammarError> {
        let bytes = std::fs::read(path)?;
        Self::load(&bytes)
    }

    /// Serialize to header + payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        let payload = postcard::to_allocvec(self).expect("serialization should not fail");

        let header = Header {
            checksum: crc32fast::hash(&payload),
            payload_size: payload.len() as u32,
            state_count: self.state_count,
            symbol_count: self.symbols.len() as u16,
            terminal_count: self.terminal_count,
            production_count: self.productions.len() as u32,
            ..Default::default()
        };

        let mut bytes = Vec::with_capacity(HEADER_SIZE + payload.len());
        bytes.extend_from_slice(&header.to_bytes());
        bytes.extend_from_slice(&payload);
        bytes
    }

    fn check_header(&self, header: &Header) -> Result<(), TableDefect> {
        let counts: [(&'static str, u64, u64); 4] = [
            (
                "state_count",
                header.state_count as u64,
                self.state_count as u64,
            ),
            (
                "symbol_count",
                header.symbol_count as u64,
                self.symbols.len() as u64,
            ),
            (
                "terminal_count",
                header.terminal_count as u64,
                self.terminal_count as u64,
            ),
            (
                "production_count",
                header.production_count as u64,
                self.productions.len() as u64,
            ),
        ];
        for (field, header, actual) in counts {
            if header != actual {
                return Err(TableDefect::CountMismatch {
                    field,
                    header,
                    actual,
                });
            }
        }
        Ok(())
    }

    /// Structural validation. After this succeeds, every lookup used by the
    /// parser indexes in bounds.
    pub(crate) fn validate(&self) -> Result<(), TableDefect> {
        let symbol_count = self.symbols.len();
        let terminal_count = self.terminal_count as usize;

        if symbol_count > u16::MAX as usize {
            return Err(out_of_range("symbol count", symbol_count, u16::MAX as usize));
        }
        if terminal_count == 0 || terminal_count > symbol_count {
            return Err(out_of_range("terminal count", terminal_count, symbol_count));
        }
        if self.state_count == 0 {
            return Err(TableDefect::Shape {
                what: "state list",
                expected: 1,
                actual: 0,
            });
        }

        for (i, symbol) in self.symbols.iter().enumerate() {
            let expected = if i < terminal_count {
                SymbolKind::Terminal
            } else {
                SymbolKind::NonTerminal
            };
            if symbol.kind != expected {
                return Err(TableDefect::SymbolKind(SymbolId(i as u16)));
            }
        }

        self.check_nonterminal(self.start_symbol, "start symbol")?;
        if let Some(word) = self.word {
            self.check_terminal(word, "word token")?;
        }
        self.check_terminal_list(&self.keywords, "keyword list")?;
        self.check_terminal_list(&self.externals, "external list")?;

        for production in &self.productions {
            self.check_nonterminal(production.lhs, "production lhs")?;
            for &symbol in &production.rhs {
                if symbol.index() >= symbol_count {
                    return Err(out_of_range("production rhs symbol", symbol.index(), symbol_count));
                }
            }
        }

        let state_count = self.state_count as usize;
        let expected_actions = state_count.checked_mul(terminal_count);
        if expected_actions != Some(self.actions.len()) {
            return Err(TableDefect::Shape {
                what: "action table",
                expected: expected_actions.unwrap_or(usize::MAX),
                actual: self.actions.len(),
            });
        }
        let expected_gotos = state_count.checked_mul(symbol_count - terminal_count);
        if expected_gotos != Some(self.gotos.len()) {
            return Err(TableDefect::Shape {
                what: "goto table",
                expected: expected_gotos.unwrap_or(usize::MAX),
                actual: self.gotos.len(),
            });
        }

        let mut has_accept = false;
        for action in &self.actions {
            match *action {
                Action::Shift(target) if target.index() >= state_count => {
                    return Err(out_of_range("shift target", target.index(), state_count));
                }
                Action::Reduce(production) if production.index() >= self.productions.len() => {
                    return Err(out_of_range(
                        "reduced production",
                        production.index(),
                        self.productions.len(),
                    ));
                }
                Action::Accept => has_accept = true,
                _ => {}
            }
        }
        if !has_accept {
            return Err(TableDefect::NoAccept);
        }

        for target in self.gotos.iter().flatten() {
            if target.index() >= state_count {
                return Err(out_of_range("goto target", target.index(), state_count));
            }
        }

        Ok(())
    }

    fn check_terminal(&self, id: SymbolId, what: &'static str) -> Result<(), TableDefect> {
        if id.0 >= self.terminal_count {
            return Err(out_of_range(what, id.index(), self.terminal_count as usize));
        }
        Ok(())
    }

    fn check_nonterminal(&self, id: SymbolId, what: &'static str) -> Result<(), TableDefect> {
        if id.index() >= self.symbols.len() {
            return Err(out_of_range(what, id.index(), self.symbols.len()));
        }
        if id.0 < self.terminal_count {
            return Err(TableDefect::SymbolKind(id));
        }
        Ok(())
    }

    fn check_terminal_list(&self, ids: &[SymbolId], what: &'static str) -> Result<(), TableDefect> {
        for &id in ids {
            self.check_terminal(id, what)?;
        }
        if ids.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(TableDefect::Unsorted { what });
        }
        Ok(())
    }
}

fn out_of_range(what: &'static str, index: usize, limit: usize) -> TableDefect {
    TableDefect::OutOfRange {
        what,
        index: index as u64,
        limit: limit as u64,
    }
}
