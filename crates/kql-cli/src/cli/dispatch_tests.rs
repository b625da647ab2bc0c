//! Argument parsing and params extraction.

use std::path::PathBuf;

use super::*;
use crate::cli::commands::{check_command, edit_command, parse_command, table_command};

#[test]
fn parse_extracts_source_and_flags() {
    let m = parse_command()
        .try_get_matches_from(["parse", "query.kql", "--raw", "--spans"])
        .unwrap();
    let params = ParseParams::from_matches(&m);

    assert_eq!(params.source.source_path, Some(PathBuf::from("query.kql")));
    assert_eq!(params.source.source_text, None);
    assert!(params.raw);
    assert!(params.spans);
    assert_eq!(params.parser.recovery_window, 3);
    assert_eq!(params.parser.step_limit, None);
    assert_eq!(params.parser.table, None);
}

#[test]
fn parse_accepts_parser_flags() {
    let m = parse_command()
        .try_get_matches_from([
            "parse",
            "-s",
            "T | take 1",
            "--recovery-window",
            "5",
            "--step-limit",
            "100",
            "--table",
            "kql.table",
        ])
        .unwrap();
    let params = ParseParams::from_matches(&m);

    assert_eq!(params.source.source_text.as_deref(), Some("T | take 1"));
    assert_eq!(params.parser.recovery_window, 5);
    assert_eq!(params.parser.step_limit, Some(100));
    assert_eq!(params.parser.table, Some(PathBuf::from("kql.table")));
}

#[test]
fn source_path_and_text_conflict() {
    let result = parse_command().try_get_matches_from(["parse", "query.kql", "-s", "T"]);

    assert!(result.is_err());
}

#[test]
fn step_limit_must_be_a_number() {
    let result = parse_command().try_get_matches_from(["parse", "-s", "T", "--step-limit", "lots"]);

    assert!(result.is_err());
}

#[test]
fn check_color() {
    let m = check_command()
        .try_get_matches_from(["check", "query.kql", "--color", "never"])
        .unwrap();
    let params = CheckParams::from_matches(&m);
    assert_eq!(params.color, ColorChoice::Never);

    let m = check_command().try_get_matches_from(["check", "query.kql"]).unwrap();
    assert_eq!(CheckParams::from_matches(&m).color, ColorChoice::Auto);

    let bad = check_command().try_get_matches_from(["check", "query.kql", "--color", "sometimes"]);
    assert!(bad.is_err());
}

#[test]
fn edit_requires_offset() {
    let result = edit_command().try_get_matches_from(["edit", "-s", "a:1"]);

    assert!(result.is_err());
}

#[test]
fn edit_range_from_offset_and_length() {
    let m = edit_command()
        .try_get_matches_from([
            "edit", "-s", "a:1", "--at", "2", "--delete", "1", "--insert", "42", "--no-reuse",
        ])
        .unwrap();
    let args: crate::commands::edit::EditArgs = EditParams::from_matches(&m).into();

    assert_eq!((args.start, args.end), (2, 3));
    assert_eq!(args.insert, "42");
    assert!(!args.reuse);
    assert!(!args.verify);
}

#[test]
fn edit_defaults_to_pure_insertion() {
    let m = edit_command()
        .try_get_matches_from(["edit", "-s", "a:1", "--at", "3"])
        .unwrap();
    let params = EditParams::from_matches(&m);

    assert_eq!(params.delete, 0);
    assert_eq!(params.insert, "");
    assert!(!params.no_reuse);
}

#[test]
fn table_subcommands() {
    let m = table_command()
        .try_get_matches_from(["table", "emit", "grammar.json", "-o", "out.table"])
        .unwrap();
    let (name, sub) = m.subcommand().unwrap();
    assert_eq!(name, "emit");
    let params = TableEmitParams::from_matches(sub);
    assert_eq!(params.grammar_path, Some(PathBuf::from("grammar.json")));
    assert_eq!(params.output, Some(PathBuf::from("out.table")));

    let m = table_command()
        .try_get_matches_from(["table", "inspect", "out.table", "--symbols"])
        .unwrap();
    let (name, sub) = m.subcommand().unwrap();
    assert_eq!(name, "inspect");
    let params = TableInspectParams::from_matches(sub);
    assert_eq!(params.table_path, Some(PathBuf::from("out.table")));
    assert!(params.symbols);
}

#[test]
fn table_emit_requires_output() {
    let result = table_command().try_get_matches_from(["table", "emit"]);

    assert!(result.is_err());
}

#[test]
fn cli_is_well_formed() {
    build_cli().debug_assert();
}
