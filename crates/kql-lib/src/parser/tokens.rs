//! Lookahead management: lexing on demand, external tokens, trivia buffering.

use kql_core::{Action, StateId, SymbolId};
use tracing::trace;

use super::session::ParseSession;
use crate::language::Language;
use crate::lexer::{LexMode, RawToken, TokenKind, scan};
use crate::tree::{Kind, green_token};

/// Where a lookahead token came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum TokenSource {
    Lexer(TokenKind),
    External,
}

/// The next non-trivia token, lexed but not consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct Lookahead {
    pub source: TokenSource,
    /// `None` for lexemes no terminal accepts.
    pub terminal: Option<SymbolId>,
    pub start: usize,
    pub end: usize,
    pub start_mode: LexMode,
    pub end_mode: LexMode,
}

impl Lookahead {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_end(&self) -> bool {
        self.terminal == Some(SymbolId::END)
    }

    /// Kind of the green token this lookahead becomes when consumed as `terminal`.
    pub fn kind(&self, terminal: Option<SymbolId>) -> Kind {
        match (terminal, self.source) {
            (Some(terminal), _) => Kind::Symbol(terminal),
            (None, TokenSource::Lexer(kind)) => Kind::Lexeme(kind),
            (None, TokenSource::External) => Kind::Error,
        }
    }
}

/// Action for `terminal` in `state`, demoting a keyword to the word token
/// when only the word fits. Returns the terminal actually acted on.
pub(super) fn resolve(
    language: &Language,
    state: StateId,
    terminal: Option<SymbolId>,
) -> (Option<SymbolId>, Action) {
    let Some(terminal) = terminal else {
        return (None, Action::Error);
    };
    let table = language.table();
    let action = table.action(state, terminal);
    if action.is_error()
        && table.is_keyword(terminal)
        && let Some(word) = language.word()
    {
        let demoted = table.action(state, word);
        if !demoted.is_error() {
            return (Some(word), demoted);
        }
    }
    (Some(terminal), action)
}

/// Furthest byte the lexer looked at to produce `token`.
///
/// An unterminated `/*` lexes as `/` after scanning to the end of input.
pub(super) fn examined_end(text: &str, token: &RawToken) -> usize {
    let opens_comment = match token.kind {
        TokenKind::Slash => text[token.range.start..].starts_with("/*"),
        TokenKind::Garbage => text[token.range.end..].starts_with("/*"),
        _ => false,
    };
    if opens_comment {
        text.len()
    } else {
        token.range.end
    }
}

impl ParseSession<'_> {
    /// The current lookahead, lexing it first if needed. Trivia in front of it
    /// is moved to the pending buffer.
    pub(super) fn fill_lookahead(&mut self) -> Lookahead {
        if let Some(la) = self.lookahead {
            return la;
        }

        loop {
            if let Some(la) = self.scan_external() {
                self.lookahead = Some(la);
                return la;
            }

            let raw = scan(&self.text, self.offset, self.mode);
            self.examined_end = self.examined_end.max(examined_end(&self.text, &raw));

            if raw.kind.is_trivia() {
                let text = &self.text[raw.range.clone()];
                self.pending.push(green_token(Kind::Lexeme(raw.kind), text));
                self.offset = raw.range.end;
                self.mode = raw.mode;
                continue;
            }

            let la = Lookahead {
                source: TokenSource::Lexer(raw.kind),
                terminal: self.language.terminal(raw.kind),
                start: raw.range.start,
                end: raw.range.end,
                start_mode: self.mode,
                end_mode: raw.mode,
            };
            self.lookahead = Some(la);
            return la;
        }
    }

    /// Consume the lookahead, moving the cursor past it.
    pub(super) fn consume_lookahead(&mut self) {
        if let Some(la) = self.lookahead.take() {
            self.offset = la.end;
            self.mode = la.end_mode;
        }
    }

    fn scan_external(&mut self) -> Option<Lookahead> {
        let parser = self.parser;
        let scanner = parser.external()?;
        let table = self.language.table();
        if table.externals().is_empty() || self.offset >= self.text.len() {
            return None;
        }

        let state = self.top_state();
        let valid: Vec<SymbolId> = table
            .externals()
            .iter()
            .copied()
            .filter(|&terminal| !table.action(state, terminal).is_error())
            .collect();
        if valid.is_empty() {
            return None;
        }

        let (terminal, end) = scanner.scan(&self.text, self.offset, &valid)?;
        if !valid.contains(&terminal)
            || end <= self.offset
            || end > self.text.len()
            || !self.text.is_char_boundary(end)
        {
            trace!(offset = self.offset, end, "external scanner result rejected");
            return None;
        }

        self.examined_end = self.examined_end.max(end);
        Some(Lookahead {
            source: TokenSource::External,
            terminal: Some(terminal),
            start: self.offset,
            end,
            start_mode: self.mode,
            end_mode: self.mode,
        })
    }

    /// Terminals of `la` and up to `count - 1` tokens after it, lexed without
    /// the external scanner and without moving the cursor. Stops after `END`.
    pub(super) fn upcoming(&mut self, la: Lookahead, count: usize) -> Vec<Option<SymbolId>> {
        let mut out = vec![la.terminal];
        if la.is_end() {
            return out;
        }

        let (mut offset, mut mode) = (la.end, la.end_mode);
        while out.len() < count {
            let raw = scan(&self.text, offset, mode);
            self.examined_end = self.examined_end.max(examined_end(&self.text, &raw));
            offset = raw.range.end;
            mode = raw.mode;
            if raw.kind.is_trivia() {
                continue;
            }
            out.push(self.language.terminal(raw.kind));
            if raw.kind == TokenKind::Eof {
                break;
            }
        }
        out
    }

    pub(super) fn top_state(&self) -> StateId {
        self.stack.last().map_or(StateId::START, |entry| entry.state)
    }
}
