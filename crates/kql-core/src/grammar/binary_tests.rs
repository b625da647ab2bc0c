use super::dsl::*;
use super::*;
use crate::GrammarError;

fn sample() -> Grammar {
    Grammar::new("test")
        .rule("program", repeat(sym("statement")))
        .rule("statement", seq([lit("let"), sym("identifier"), lit(";")]))
        .conflict(&["statement"])
        .word("identifier")
}

#[test]
fn binary_preserves_definition() {
    let grammar = sample();
    let decoded = Grammar::from_binary(&grammar.to_binary()).unwrap();

    assert_eq!(decoded, grammar);
    assert_eq!(decoded.rules[0].0, "program");
}

#[test]
fn truncated_binary_is_an_error() {
    let bytes = sample().to_binary();
    let err = Grammar::from_binary(&bytes[..bytes.len() / 2]).unwrap_err();
    assert!(matches!(err, GrammarError::Binary(_)));
}
