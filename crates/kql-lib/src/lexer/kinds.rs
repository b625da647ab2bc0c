//! Token kinds, one logos enum per lexical mode.
//!
//! `TokenKind` is the normal-mode lexer and the shared kind space: string-mode
//! lexers map their tokens into it. Kinds without logos attributes are produced
//! only by the string modes or by the driver (`Garbage`, `Eof`).

use logos::Logos;

/// All token kinds. `#[repr(u16)]` with the `__LAST` sentinel enables `from_raw`.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum TokenKind {
    #[token("|")]
    Pipe = 0,

    #[token(";")]
    Semicolon,

    #[token(",")]
    Comma,

    #[token("=")]
    Equals,

    #[token("==")]
    EqEq,

    #[token("!=")]
    NotEq,

    #[token("<")]
    Lt,

    #[token("<=")]
    LtEq,

    #[token(">")]
    Gt,

    #[token(">=")]
    GtEq,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("%")]
    Percent,

    #[token("(")]
    ParenOpen,

    #[token(")")]
    ParenClose,

    #[token("[")]
    BracketOpen,

    #[token("]")]
    BracketClose,

    #[token(":")]
    Colon,

    /// `::` cast. Longest match beats `Colon`.
    #[token("::")]
    DoubleColon,

    #[token(".")]
    Dot,

    /// Range separator in `between (a .. b)`.
    #[token("..")]
    DotDot,

    /// Join condition prefix `$left.`
    #[token("$left.")]
    LeftPrefix,

    /// Join condition prefix `$right.`
    #[token("$right.")]
    RightPrefix,

    /// Opens or closes a double-quoted string.
    #[token("\"")]
    DoubleQuote,

    /// Opens or closes a single-quoted string.
    #[token("'")]
    SingleQuote,

    // Keywords. Defined before `Identifier` so they win on equal length.
    #[token("let")]
    KwLet,
    #[token("where")]
    KwWhere,
    #[token("project")]
    KwProject,
    #[token("extend")]
    KwExtend,
    #[token("summarize")]
    KwSummarize,
    #[token("by")]
    KwBy,
    #[token("join")]
    KwJoin,
    #[token("kind")]
    KwKind,
    #[token("on")]
    KwOn,
    #[token("inner")]
    KwInner,
    #[token("outer")]
    KwOuter,
    #[token("leftouter")]
    KwLeftouter,
    #[token("rightouter")]
    KwRightouter,
    #[token("fullouter")]
    KwFullouter,
    #[token("leftanti")]
    KwLeftanti,
    #[token("rightanti")]
    KwRightanti,
    #[token("leftsemi")]
    KwLeftsemi,
    #[token("rightsemi")]
    KwRightsemi,
    #[token("union")]
    KwUnion,
    #[token("isfuzzy")]
    KwIsfuzzy,
    #[token("mv-expand")]
    KwMvDashExpand,
    #[token("mvexpand")]
    KwMvexpand,
    #[token("to")]
    KwTo,
    #[token("typeof")]
    KwTypeof,
    #[token("limit")]
    KwLimit,
    #[token("take")]
    KwTake,
    #[token("top")]
    KwTop,
    #[token("asc")]
    KwAsc,
    #[token("desc")]
    KwDesc,
    #[token("search")]
    KwSearch,
    #[token("in")]
    KwIn,
    #[token("sort")]
    KwSort,
    #[token("order")]
    KwOrder,
    #[token("distinct")]
    KwDistinct,
    #[token("count")]
    KwCount,
    #[token("iff")]
    KwIff,
    #[token("case")]
    KwCase,
    #[token("and")]
    KwAnd,
    #[token("or")]
    KwOr,
    #[token("contains")]
    KwContains,
    #[token("has")]
    KwHas,
    #[token("startswith")]
    KwStartswith,
    #[token("endswith")]
    KwEndswith,
    #[token("matches")]
    KwMatches,
    #[token("between")]
    KwBetween,
    #[token("dynamic")]
    KwDynamic,
    #[token("parse")]
    KwParse,
    #[token("with")]
    KwWith,
    #[token("flags")]
    KwFlags,
    #[token("simple")]
    KwSimple,
    #[token("regex")]
    KwRegex,
    #[token("relaxed")]
    KwRelaxed,
    #[token("true")]
    KwTrue,
    #[token("false")]
    KwFalse,
    #[token("null")]
    KwNull,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Identifier,

    #[regex(r"[0-9]+(?:\.[0-9]+)?")]
    NumberLiteral,

    /// Number with a duration suffix: `5m`, `1.5h`, `30tick`.
    #[regex(r"[0-9]+(?:\.[0-9]+)?(?:d|h|m|s|ms|microsecond|tick)")]
    TimespanLiteral,

    #[regex(r"[ \t\r\x0C]+")]
    Whitespace,

    #[token("\n")]
    #[token("\r\n")]
    Newline,

    #[regex(r"//[^\r\n]*", allow_greedy = true)]
    LineComment,

    #[regex(r"/\*[^*]*\*+(?:[^/*][^*]*\*+)*/")]
    BlockComment,

    /// Text between quotes (string modes only).
    StringContent,
    /// Backslash escape inside a string (string modes only).
    EscapeSequence,
    /// Coalesced unrecognized input.
    Garbage,
    /// End of input, zero-width.
    Eof,

    // Must be last - used for bounds checking in `from_raw`
    #[doc(hidden)]
    __LAST,
}

use TokenKind::*;

impl TokenKind {
    /// Every kind, in discriminant order.
    pub fn all() -> impl Iterator<Item = TokenKind> {
        (0..__LAST as u16).map(Self::from_raw)
    }

    pub(crate) fn from_raw(raw: u16) -> Self {
        assert!(raw < __LAST as u16, "token kind {raw} out of range");
        // SAFETY: bounds checked above, and TokenKind is repr(u16) with contiguous discriminants
        unsafe { std::mem::transmute::<u16, TokenKind>(raw) }
    }

    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(self, Whitespace | Newline | LineComment | BlockComment)
    }

    #[inline]
    pub fn is_error(self) -> bool {
        self == Garbage
    }

    #[inline]
    pub fn is_keyword(self) -> bool {
        (KwLet as u16..=KwNull as u16).contains(&(self as u16))
    }

    /// Grammar terminal name for this kind.
    ///
    /// Punctuation and keywords are named by their text; everything else by
    /// the name the grammar uses for it.
    pub fn name(self) -> &'static str {
        match self {
            Pipe => "|",
            Semicolon => ";",
            Comma => ",",
            Equals => "=",
            EqEq => "==",
            NotEq => "!=",
            Lt => "<",
            LtEq => "<=",
            Gt => ">",
            GtEq => ">=",
            Plus => "+",
            Minus => "-",
            Star => "*",
            Slash => "/",
            Percent => "%",
            ParenOpen => "(",
            ParenClose => ")",
            BracketOpen => "[",
            BracketClose => "]",
            Colon => ":",
            DoubleColon => "::",
            Dot => ".",
            DotDot => "..",
            LeftPrefix => "$left.",
            RightPrefix => "$right.",
            DoubleQuote => "\"",
            SingleQuote => "'",
            KwLet => "let",
            KwWhere => "where",
            KwProject => "project",
            KwExtend => "extend",
            KwSummarize => "summarize",
            KwBy => "by",
            KwJoin => "join",
            KwKind => "kind",
            KwOn => "on",
            KwInner => "inner",
            KwOuter => "outer",
            KwLeftouter => "leftouter",
            KwRightouter => "rightouter",
            KwFullouter => "fullouter",
            KwLeftanti => "leftanti",
            KwRightanti => "rightanti",
            KwLeftsemi => "leftsemi",
            KwRightsemi => "rightsemi",
            KwUnion => "union",
            KwIsfuzzy => "isfuzzy",
            KwMvDashExpand => "mv-expand",
            KwMvexpand => "mvexpand",
            KwTo => "to",
            KwTypeof => "typeof",
            KwLimit => "limit",
            KwTake => "take",
            KwTop => "top",
            KwAsc => "asc",
            KwDesc => "desc",
            KwSearch => "search",
            KwIn => "in",
            KwSort => "sort",
            KwOrder => "order",
            KwDistinct => "distinct",
            KwCount => "count",
            KwIff => "iff",
            KwCase => "case",
            KwAnd => "and",
            KwOr => "or",
            KwContains => "contains",
            KwHas => "has",
            KwStartswith => "startswith",
            KwEndswith => "endswith",
            KwMatches => "matches",
            KwBetween => "between",
            KwDynamic => "dynamic",
            KwParse => "parse",
            KwWith => "with",
            KwFlags => "flags",
            KwSimple => "simple",
            KwRegex => "regex",
            KwRelaxed => "relaxed",
            KwTrue => "true",
            KwFalse => "false",
            KwNull => "null",
            Identifier => "identifier",
            NumberLiteral => "number_literal",
            TimespanLiteral => "timespan_literal",
            Whitespace => "whitespace",
            Newline => "newline",
            LineComment => "line_comment",
            BlockComment => "block_comment",
            StringContent => "string_content",
            EscapeSequence => "escape_sequence",
            Garbage => "ERROR",
            Eof => "end",
            __LAST => "__LAST",
        }
    }
}

/// Inside `"..."`.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum DoubleQuoted {
    #[token("\"")]
    Quote,

    #[regex(r"\\.")]
    Escape,

    #[regex(r#"[^"\\]+"#, allow_greedy = true)]
    Content,
}

/// Inside `'...'`.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum SingleQuoted {
    #[token("'")]
    Quote,

    #[regex(r"\\.")]
    Escape,

    #[regex(r"[^'\\]+", allow_greedy = true)]
    Content,
}
