//! Mode-aware, restartable lexer.
//!
//! Every call to [`Lexer::next_token`] is a pure function of
//! `(text, offset, mode)`: it recognizes exactly one token starting at `offset`
//! and reports the mode to continue in. Restarting from any recorded
//! `(offset, mode)` pair reproduces the same token sequence, which is what
//! incremental reparsing relies on.
//!
//! ## Error handling
//!
//! Unrecognized input never fails the lex. Consecutive error characters are
//! coalesced into a single `Garbage` (`ERROR`) token.

mod kinds;


use std::ops::Range;

use line_index::{LineCol, LineIndex};
use logos::Logos;
use rowan::{TextRange, TextSize};

pub use kinds::TokenKind;

use kinds::{DoubleQuoted, SingleQuoted};

/// Lexical mode threaded between calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LexMode {
    #[default]
    Normal,
    /// Inside `"..."`.
    DoubleQuoted,
    /// Inside `'...'`.
    SingleQuoted,
}

/// A token with byte range and zero-based line/column span (columns count UTF-8 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub range: TextRange,
    pub start: LineCol,
    pub end: LineCol,
}

/// Result of one lexer step: the token and the mode to continue in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lexed {
    pub token: Token,
    pub mode: LexMode,
}

/// Token without position info, as the parser consumes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawToken {
    pub kind: TokenKind,
    pub range: Range<usize>,
    pub mode: LexMode,
}

pub struct Lexer<'s> {
    text: &'s str,
    index: LineIndex,
}

impl<'s> Lexer<'s> {
    pub fn new(text: &'s str) -> Self {
        Self {
            text,
            index: LineIndex::new(text),
        }
    }

    pub fn text(&self) -> &'s str {
        self.text
    }

    /// Recognize one token at `offset` in `mode`.
    ///
    /// At or past the end of input this is a zero-width `Eof` token.
    pub fn next_token(&self, offset: usize, mode: LexMode) -> Lexed {
        let raw = scan(self.text, offset, mode);
        let range = text_range(raw.range);
        Lexed {
            token: Token {
                kind: raw.kind,
                range,
                start: self.index.line_col(range.start()),
                end: self.index.line_col(range.end()),
            },
            mode: raw.mode,
        }
    }

    pub fn line_col(&self, offset: usize) -> LineCol {
        let offset = offset.min(self.text.len());
        self.index.line_col(TextSize::from(offset as u32))
    }

    /// Tokens from the start of input up to (not including) `Eof`.
    pub fn tokens(&self, mode: LexMode) -> Tokens<'_, 's> {
        Tokens {
            lexer: self,
            offset: 0,
            mode,
        }
    }
}

/// Iterator over the tokens of a [`Lexer`].
pub struct Tokens<'l, 's> {
    lexer: &'l Lexer<'s>,
    offset: usize,
    mode: LexMode,
}

impl Tokens<'_, '_> {
    /// Position and mode the next token will be lexed from.
    pub fn checkpoint(&self) -> (usize, LexMode) {
        (self.offset, self.mode)
    }
}

impl Iterator for Tokens<'_, '_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let lexed = self.lexer.next_token(self.offset, self.mode);
        if lexed.token.kind == TokenKind::Eof {
            return None;
        }
        self.offset = usize::from(lexed.token.range.end());
        self.mode = lexed.mode;
        Some(lexed.token)
    }
}

/// Tokenize all of `text`, starting in normal mode. `Eof` is not included.
pub fn lex(text: &str) -> Vec<Token> {
    Lexer::new(text).tokens(LexMode::Normal).collect()
}

/// Source slice covered by `token`.
#[inline]
pub fn token_text<'s>(source: &'s str, token: &Token) -> &'s str {
    &source[token.range]
}

pub(crate) fn scan(text: &str, offset: usize, mode: LexMode) -> RawToken {
    if offset >= text.len() {
        return RawToken {
            kind: TokenKind::Eof,
            range: text.len()..text.len(),
            mode,
        };
    }

    let Some(rest) = text.get(offset..) else {
        // Not on a char boundary: swallow up to the next one.
        let end = (offset..=text.len())
            .find(|&i| text.is_char_boundary(i))
            .unwrap_or(text.len());
        return RawToken {
            kind: TokenKind::Garbage,
            range: offset..end,
            mode,
        };
    };

    let (kind, range) = match mode {
        LexMode::Normal => scan_with::<TokenKind>(rest, |kind| kind),
        LexMode::DoubleQuoted => scan_with::<DoubleQuoted>(rest, |token| match token {
            DoubleQuoted::Quote => TokenKind::DoubleQuote,
            DoubleQuoted::Escape => TokenKind::EscapeSequence,
            DoubleQuoted::Content => TokenKind::StringContent,
        }),
        LexMode::SingleQuoted => scan_with::<SingleQuoted>(rest, |token| match token {
            SingleQuoted::Quote => TokenKind::SingleQuote,
            SingleQuoted::Escape => TokenKind::EscapeSequence,
            SingleQuoted::Content => TokenKind::StringContent,
        }),
    };

    RawToken {
        kind,
        range: offset + range.start..offset + range.end,
        mode: next_mode(mode, kind),
    }
}

/// Lex one token from the start of `rest`, coalescing a leading error run.
fn scan_with<'s, T>(rest: &'s str, map: impl Fn(T) -> TokenKind) -> (TokenKind, Range<usize>)
where
    T: Logos<'s, Source = str>,
    T::Extras: Default,
{
    let mut lexer = T::lexer(rest);
    let mut error_end: Option<usize> = None;

    while let Some(result) = lexer.next() {
        match result {
            Ok(token) if error_end.is_none() => return (map(token), lexer.span()),
            Ok(_) => break,
            Err(_) => error_end = Some(lexer.span().end),
        }
    }

    (TokenKind::Garbage, 0..error_end.unwrap_or(rest.len()))
}

fn next_mode(mode: LexMode, kind: TokenKind) -> LexMode {
    match (mode, kind) {
        (LexMode::Normal, TokenKind::DoubleQuote) => LexMode::DoubleQuoted,
        (LexMode::Normal, TokenKind::SingleQuote) => LexMode::SingleQuoted,
        (LexMode::DoubleQuoted, TokenKind::DoubleQuote) => LexMode::Normal,
        (LexMode::SingleQuoted, TokenKind::SingleQuote) => LexMode::Normal,
        (mode, _) => mode,
    }
}

pub(crate) fn text_range(range: Range<usize>) -> TextRange {
    TextRange::new((range.start as u32).into(), (range.end as u32).into())
}
