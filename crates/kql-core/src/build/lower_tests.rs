use super::CompileError;
use super::lower::*;
use crate::grammar::Grammar;
use crate::grammar::dsl::*;
use crate::table::{Assoc, Visibility};

fn names(lowered: &Lowered) -> Vec<&str> {
    lowered.symbols.iter().map(|s| s.name.as_str()).collect()
}

#[test]
fn terminals_come_first_and_end_is_zero() {
    let grammar = Grammar::new("test")
        .rule("program", repeat(sym("statement")))
        .rule("statement", seq([lit("let"), sym("identifier"), lit(";")]))
        .word("identifier");

    let lowered = lower(&grammar).unwrap();

    assert_eq!(
        names(&lowered),
        [
            "end",
            "identifier",
            "let",
            ";",
            "program",
            "statement",
            "program_repeat1",
            "__start"
        ]
    );
    assert_eq!(lowered.terminal_count, 4);
    assert_eq!(lowered.start_symbol.0, 4);
    assert_eq!(lowered.productions[0].lhs.0, 7);
    assert_eq!(lowered.word.map(|w| w.0), Some(1));
    assert_eq!(lowered.keywords.iter().map(|k| k.0).collect::<Vec<_>>(), [2]);
}

#[test]
fn augmented_production_is_first() {
    let grammar = Grammar::new("test").rule("root", lit("x"));
    let lowered = lower(&grammar).unwrap();

    let first = &lowered.productions[0];
    assert_eq!(lowered.symbols[first.lhs.index()].name, "__start");
    assert_eq!(first.rhs, [lowered.start_symbol]);
    assert_eq!(lowered.productions.len(), 2);
}

#[test]
fn repeat_becomes_left_recursive_aux_rule() {
    let grammar = Grammar::new("test").rule("list", repeat1(lit("x")));
    let lowered = lower(&grammar).unwrap();

    let aux = lowered
        .symbols
        .iter()
        .position(|s| s.name == "list_repeat1")
        .unwrap();
    assert_eq!(lowered.symbols[aux].visibility, Visibility::Hidden);

    let rhs: Vec<Vec<u16>> = lowered
        .productions
        .iter()
        .filter(|p| p.lhs.index() == aux)
        .map(|p| p.rhs.iter().map(|s| s.0).collect())
        .collect();
    let x = 1;
    assert_eq!(rhs, [vec![aux as u16, x], vec![x]]);
}

#[test]
fn underscore_rules_are_hidden() {
    let grammar = Grammar::new("test")
        .rule("root", sym("_value"))
        .rule("_value", choice([lit("a"), lit("b")]));
    let lowered = lower(&grammar).unwrap();

    let value = lowered.symbols.iter().find(|s| s.name == "_value").unwrap();
    let root = lowered.symbols.iter().find(|s| s.name == "root").unwrap();
    assert_eq!(value.visibility, Visibility::Hidden);
    assert_eq!(root.visibility, Visibility::Named);
}

#[test]
fn innermost_precedence_wins() {
    let grammar = Grammar::new("test").rule(
        "expr",
        choice([
            prec_left(1, seq([sym("expr"), lit("+"), sym("expr")])),
            prec(2, prec_right(3, seq([sym("expr"), lit("^"), sym("expr")]))),
            sym("number"),
        ]),
    );
    let lowered = lower(&grammar).unwrap();

    let precs: Vec<(i32, Assoc)> = lowered.productions[1..]
        .iter()
        .map(|p| (p.precedence, p.assoc))
        .collect();
    assert_eq!(
        precs,
        [(1, Assoc::Left), (3, Assoc::Right), (0, Assoc::None)]
    );
}

#[test]
fn optional_expands_to_alternatives() {
    let grammar = Grammar::new("test").rule(
        "take",
        seq([lit("take"), optional(lit("all")), sym("number")]),
    );
    let lowered = lower(&grammar).unwrap();

    assert_eq!(lowered.productions.len(), 3);
    assert_eq!(lowered.productions[1].rhs.len(), 3);
    assert_eq!(lowered.productions[2].rhs.len(), 2);
}

#[test]
fn duplicate_alternatives_are_merged() {
    let grammar = Grammar::new("test").rule("root", choice([lit("x"), lit("x")]));
    let lowered = lower(&grammar).unwrap();
    assert_eq!(lowered.productions.len(), 2);
}

#[test]
fn keywords_need_a_word_token() {
    let grammar = Grammar::new("test").rule("root", seq([lit("where"), lit("|")]));
    assert!(lower(&grammar).unwrap().keywords.is_empty());

    let grammar = grammar.word("identifier");
    let lowered = lower(&grammar).unwrap();
    let keywords: Vec<&str> = lowered
        .keywords
        .iter()
        .map(|k| lowered.symbols[k.index()].name.as_str())
        .collect();
    assert_eq!(keywords, ["where"]);
}

#[test]
fn externals_are_terminals() {
    let grammar = Grammar::new("test")
        .rule("root", sym("raw_block"))
        .external("raw_block");
    let lowered = lower(&grammar).unwrap();

    assert_eq!(lowered.externals.len(), 1);
    assert!(lowered.is_terminal(lowered.externals[0]));
}

#[test]
fn empty_grammar_is_rejected() {
    let err = lower(&Grammar::new("test")).unwrap_err();
    assert_eq!(err, CompileError::EmptyGrammar);
}

#[test]
fn empty_choice_is_rejected() {
    let grammar = Grammar::new("test").rule("root", choice([]));
    let err = lower(&grammar).unwrap_err();
    assert_eq!(err, CompileError::EmptyRule("root".into()));
}

#[test]
fn repeat_of_nothing_is_rejected() {
    let grammar = Grammar::new("test").rule("root", repeat(blank()));
    let err = lower(&grammar).unwrap_err();
    assert_eq!(err, CompileError::EmptyRule("root".into()));
}

#[test]
fn word_must_not_be_a_rule() {
    let grammar = Grammar::new("test")
        .rule("root", sym("identifier"))
        .rule("identifier", lit("x"))
        .word("identifier");
    let err = lower(&grammar).unwrap_err();
    assert_eq!(err, CompileError::InvalidWord("identifier".into()));
}

#[test]
fn alternative_blowup_is_bounded() {
    let grammar = Grammar::new("test").rule(
        "root",
        seq((0..10).map(|i| optional(lit(&format!("t{i}"))))),
    );
    let err = lower(&grammar).unwrap_err();
    assert_eq!(err, CompileError::TooManyAlternatives("root".into()));
}
