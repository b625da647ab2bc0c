use indoc::indoc;

use super::{Interrupted, Parser, ParserConfig, Step};
use crate::{Language, Tree};

fn parse(text: &str) -> Tree {
    Parser::new(Language::kql()).parse(text)
}

#[test]
fn search_term() {
    let tree = parse("a:1");

    assert!(!tree.has_error());
    insta::assert_snapshot!(tree.to_sexp(), @"(source_file (identifier) (number_literal))");
}

#[test]
fn empty_input() {
    let tree = parse("");

    assert!(!tree.has_error());
    assert_eq!(tree.root().byte_range(), 0..0);
    insta::assert_snapshot!(tree.to_sexp(), @"(source_file)");
}

#[test]
fn trivia_only() {
    let tree = parse("  // nothing here\n");

    assert!(!tree.has_error());
    assert_eq!(tree.root().text(), "  // nothing here\n");
    insta::assert_snapshot!(tree.to_sexp(), @"(source_file)");
}

#[test]
fn where_comparison() {
    let tree = parse("T | where x > 1");

    insta::assert_snapshot!(tree.to_sexp(), @"(source_file (query_statement (table_name (identifier)) (pipe_expression (where_clause (comparison_expression (identifier) (number_literal))))))");
}

#[test]
fn logical_binds_looser_than_comparison() {
    let tree = parse("T | where a > 1 and b < 2");

    insta::assert_snapshot!(tree.to_sexp(), @"(source_file (query_statement (table_name (identifier)) (pipe_expression (where_clause (binary_expression (comparison_expression (identifier) (number_literal)) (comparison_expression (identifier) (number_literal)))))))");
}

#[test]
fn multiplication_binds_tighter_than_addition() {
    let tree = parse("T | extend y = a + b * c");

    insta::assert_snapshot!(tree.to_sexp(), @"(source_file (query_statement (table_name (identifier)) (pipe_expression (extend_clause (column_list (column_assignment (identifier) (arithmetic_expression (identifier) (arithmetic_expression (identifier) (identifier)))))))))");
}

#[test]
fn unary_minus_binds_tighter_than_multiplication() {
    let tree = parse("T | extend y = -a * b");

    insta::assert_snapshot!(tree.to_sexp(), @"(source_file (query_statement (table_name (identifier)) (pipe_expression (extend_clause (column_list (column_assignment (identifier) (arithmetic_expression (unary_expression (identifier)) (identifier)))))))))");
}

#[test]
fn let_then_query() {
    let tree = parse("let n = 1; T | take 10");

    insta::assert_snapshot!(tree.to_sexp(), @"(source_file (let_statement (identifier) (number_literal)) (query_statement (table_name (identifier)) (pipe_expression (take_clause (number_literal)))))");
}

#[test]
fn summarize_with_keyword_as_function_name() {
    let tree = parse("T | summarize count() by State");

    assert!(!tree.has_error());
    insta::assert_snapshot!(tree.to_sexp(), @"(source_file (query_statement (table_name (identifier)) (pipe_expression (summarize_clause (aggregation_list (aggregation_expression (function_call (identifier)))) (expression_list (identifier))))))");
}

#[test]
fn keyword_demoted_to_identifier() {
    let tree = parse("where:1");

    assert!(!tree.has_error());
    insta::assert_snapshot!(tree.to_sexp(), @"(source_file (identifier) (number_literal))");
}

#[test]
fn join_with_kind() {
    let tree = parse("T | join kind=inner (U) on Id");

    insta::assert_snapshot!(tree.to_sexp(), @"(source_file (query_statement (table_name (identifier)) (pipe_expression (join_clause (join_kind) (table_name (identifier)) (join_conditions (join_condition (identifier)))))))");
}

#[test]
fn string_operator() {
    let tree = parse(r#"T | where name contains "abc""#);

    insta::assert_snapshot!(tree.to_sexp(), @"(source_file (query_statement (table_name (identifier)) (pipe_expression (where_clause (string_expression (identifier) (string_literal (string_content)))))))");
}

#[test]
fn multi_stage_pipeline() {
    let input = indoc! {"
        StormEvents
        | where State == 'TEXAS'
        | take 10
    "};

    let tree = parse(input);

    assert!(!tree.has_error());
    assert_eq!(tree.root().text(), input);
    insta::assert_snapshot!(tree.dump(), @r#"
    source_file
      query_statement
        table_name
          identifier "StormEvents"
        pipe_expression
          "|"
          where_clause
            "where"
            comparison_expression
              identifier "State"
              "=="
              string_literal
                "'"
                string_content "TEXAS"
                "'"
        pipe_expression
          "|"
          take_clause
            "take"
            number_literal "10"
    "#);
}

#[test]
fn trivia_is_hoisted_in_front_of_nodes() {
    let tree = parse("T | take  1");

    insta::assert_snapshot!(tree.printer().with_trivia(true).with_spans(true).dump(), @r#"
    source_file [0..11]
      query_statement [0..11]
        table_name [0..1]
          identifier [0..1] "T"
        whitespace [1..2] " "
        pipe_expression [2..11]
          "|" [2..3]
          whitespace [3..4] " "
          take_clause [4..11]
            "take" [4..8]
            whitespace [8..10] "  "
            number_literal [10..11] "1"
    "#);
}

#[test]
fn trailing_trivia_attaches_to_root() {
    let tree = parse("a:1  ");

    let root = tree.root();
    let last = root.children().last().unwrap();
    assert!(last.is_extra());
    assert_eq!(last.text(), "  ");
    assert_eq!(root.byte_range(), 0..5);
}

#[test]
fn session_steps_to_completion() {
    let parser = Parser::new(Language::kql());
    let mut session = parser.session("T | take 1");

    let mut steps = 0;
    let tree = loop {
        steps += 1;
        if let Step::Done(tree) = session.step() {
            break tree;
        }
    };

    assert!(session.is_done());
    assert_eq!(session.steps(), steps);
    assert!(tree.structurally_eq(&parser.parse("T | take 1")));

    // Done is sticky and does not count as a step.
    let Step::Done(again) = session.step() else {
        panic!("finished session resumed");
    };
    assert!(again.structurally_eq(&tree));
    assert_eq!(session.steps(), steps);
}

#[test]
fn cancellation_between_steps() {
    let parser = Parser::new(Language::kql());
    let mut session = parser.session("T | where a > 1");

    assert_eq!(session.run_until(|| true).unwrap_err(), Interrupted::Cancelled);
    assert_eq!(session.steps(), 0);

    let tree = session.run_until(|| false).unwrap();
    assert!(!tree.has_error());
}

#[test]
fn step_limit_interrupts() {
    let config = ParserConfig::default().with_step_limit(Some(2));
    let parser = Parser::new(Language::kql()).with_config(config);
    let mut session = parser.session("T | where a > 1");

    assert_eq!(session.run_until(|| false).unwrap_err(), Interrupted::StepLimit);
    assert_eq!(session.steps(), 2);
    assert!(!session.is_done());
}

#[test]
fn parse_ignores_step_limit() {
    let config = ParserConfig::default().with_step_limit(Some(1));
    let parser = Parser::new(Language::kql()).with_config(config);

    let tree = parser.parse("T | where a > 1");

    assert!(!tree.has_error());
}

#[test]
fn recovery_window_is_clamped() {
    let config = ParserConfig::default().with_recovery_window(0);
    assert_eq!(config.recovery_window, 1);
}

#[test]
fn fragments_are_recorded_for_clean_subtrees() {
    let tree = parse("T | take 1");

    assert!(!tree.fragments().is_empty());
    let starts: Vec<usize> = tree.fragments().iter().map(|f| f.range.start).collect();
    let mut sorted = starts.clone();
    sorted.sort();
    assert_eq!(starts, sorted);
    assert!(tree.fragments().iter().all(|f| !f.range.is_empty()));
}

#[test]
fn reuse_disabled_records_nothing() {
    let parser = Parser::new(Language::kql()).with_config(ParserConfig::default().with_reuse(false));

    let tree = parser.parse("T | take 1");

    assert!(tree.fragments().is_empty());
}
