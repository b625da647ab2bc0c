use kql_core::grammar::dsl::*;
use kql_core::{Grammar, GrammarError, SymbolId, TableDefect, compile};

use super::Language;
use crate::lexer::TokenKind;
use crate::parser::{ExternalScanner, Parser};
use crate::tree::Kind;

fn link(grammar: &Grammar) -> Result<Language, GrammarError> {
    Language::new(compile(grammar).unwrap().table)
}

#[test]
fn unknown_terminal_is_rejected() {
    let grammar = Grammar::new("bad").rule("start", seq([sym("mystery"), lit(";")]));

    let err = link(&grammar).unwrap_err();

    assert!(
        matches!(&err, GrammarError::MalformedTable(TableDefect::UnknownTerminal(name)) if name == "mystery"),
        "{err}"
    );
}

#[test]
fn unmentioned_keywords_read_as_word() {
    let grammar = Grammar::new("words")
        .word("identifier")
        .rule("start", repeat(sym("identifier")));
    let language = link(&grammar).unwrap();

    assert_eq!(language.terminal(TokenKind::KwWhere), language.word());
    assert_eq!(language.terminal(TokenKind::Pipe), None);

    let tree = Parser::new(language).parse("where take x");
    assert!(!tree.has_error());
    insta::assert_snapshot!(tree.to_sexp(), @"(start (identifier) (identifier) (identifier))");
}

#[test]
fn kind_names() {
    let language = Language::kql();

    assert_eq!(language.kind_name(Kind::Error), "ERROR");
    assert_eq!(language.kind_name(Kind::Lexeme(TokenKind::Whitespace)), "whitespace");
    assert_eq!(language.kind_name(Kind::Symbol(SymbolId::END)), "end");
    assert!(language.is_named(Kind::Error));
    assert!(!language.is_named(Kind::Lexeme(TokenKind::Garbage)));

    let pipe = language.terminal(TokenKind::Pipe).unwrap();
    assert!(!language.is_named(Kind::Symbol(pipe)));
    let identifier = language.word().unwrap();
    assert!(language.is_named(Kind::Symbol(identifier)));
}

/// `<<...>>` blocks, recognized outside the lexer.
struct RawBlocks;

impl ExternalScanner for RawBlocks {
    fn scan(&self, text: &str, offset: usize, valid: &[SymbolId]) -> Option<(SymbolId, usize)> {
        let rest = text[offset..].strip_prefix("<<")?;
        let close = rest.find(">>")?;
        Some((valid[0], offset + 2 + close + 2))
    }
}

fn raw_block_language() -> Language {
    let grammar = Grammar::new("raw")
        .word("identifier")
        .external("raw_block")
        .rule(
            "source_file",
            repeat(choice([sym("raw_block"), sym("identifier")])),
        );
    link(&grammar).unwrap()
}

#[test]
fn external_terminals_link_without_lexer_token() {
    let language = raw_block_language();
    let raw_block = language.table().symbol_by_name("raw_block").unwrap();

    assert!(language.table().is_external(raw_block));
}

#[test]
fn external_scanner_produces_tokens() {
    let parser = Parser::new(raw_block_language()).with_external_scanner(RawBlocks);

    let tree = parser.parse("a <<x | y>> b");

    assert!(!tree.has_error());
    insta::assert_snapshot!(tree.to_sexp(), @"(source_file (identifier) (raw_block) (identifier))");
    let block = tree.root().named_child(1).unwrap();
    assert_eq!(block.text(), "<<x | y>>");
}

#[test]
fn without_scanner_external_input_is_an_error() {
    let parser = Parser::new(raw_block_language());

    let tree = parser.parse("a <<x>> b");

    assert!(tree.has_error());
    assert_eq!(tree.root().text(), "a <<x>> b");
}
