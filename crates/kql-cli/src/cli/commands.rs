//! Command builders for the CLI.
//!
//! Every command that parses accepts the same parser flags
//! (`--table`, `--recovery-window`, `--step-limit`).

use clap::Command;

use super::args::*;

fn with_source_args(cmd: Command) -> Command {
    cmd.arg(source_path_arg()).arg(source_text_arg())
}

fn with_parser_args(cmd: Command) -> Command {
    cmd.arg(table_arg())
        .arg(recovery_window_arg())
        .arg(step_limit_arg())
}

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("kql")
        .about("Incremental parser for the Kusto Query Language")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(parse_command())
        .subcommand(check_command())
        .subcommand(tokens_command())
        .subcommand(edit_command())
        .subcommand(table_command())
}

/// Print the syntax tree of a query.
pub fn parse_command() -> Command {
    let cmd = Command::new("parse")
        .about("Print the syntax tree of a query")
        .override_usage(
            "\
  kql parse <SOURCE>
  kql parse -s <TEXT>",
        )
        .after_help(
            r#"EXAMPLES:
  kql parse query.kql                  # tree of named and anonymous nodes
  kql parse query.kql --raw --spans    # include trivia and byte spans
  kql parse -s 'T | take 10'           # inline query
  cat query.kql | kql parse -          # stdin"#,
        )
        .arg(raw_arg())
        .arg(spans_arg());

    with_parser_args(with_source_args(cmd))
}

/// Report syntax errors.
pub fn check_command() -> Command {
    let cmd = Command::new("check")
        .about("Report syntax errors")
        .override_usage(
            "\
  kql check <SOURCE>
  kql check -s <TEXT>",
        )
        .after_help(
            r#"EXAMPLES:
  kql check query.kql                  # silent when the query is valid
  kql check -s 'T | where' --color never"#,
        )
        .arg(color_arg());

    with_parser_args(with_source_args(cmd))
}

/// Print the lexer's token stream.
pub fn tokens_command() -> Command {
    let cmd = Command::new("tokens")
        .about("Print the token stream")
        .override_usage(
            "\
  kql tokens <SOURCE>
  kql tokens -s <TEXT>",
        )
        .arg(raw_arg());

    with_source_args(cmd)
}

/// Apply one edit and reparse incrementally.
pub fn edit_command() -> Command {
    let cmd = Command::new("edit")
        .about("Apply an edit and reparse incrementally")
        .override_usage(
            "\
  kql edit <SOURCE> --at <OFFSET> [--delete <LEN>] [--insert <TEXT>]
  kql edit -s <TEXT> --at <OFFSET> [--delete <LEN>] [--insert <TEXT>]",
        )
        .after_help(
            r#"EXAMPLES:
  kql edit -s 'a:1' --at 3 --insert 2                 # a:12
  kql edit query.kql --at 10 --delete 4 --verify      # check against a fresh parse"#,
        )
        .arg(edit_at_arg())
        .arg(edit_delete_arg())
        .arg(edit_insert_arg())
        .arg(raw_arg())
        .arg(spans_arg())
        .arg(no_reuse_arg())
        .arg(verify_arg());

    with_parser_args(with_source_args(cmd))
}

/// Build and inspect grammar tables.
pub fn table_command() -> Command {
    Command::new("table")
        .about("Build and inspect grammar tables")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(table_emit_command())
        .subcommand(table_inspect_command())
}

pub fn table_emit_command() -> Command {
    Command::new("emit")
        .about("Compile a grammar into a table file")
        .after_help(
            r#"EXAMPLES:
  kql table emit -o kql.table                 # built-in KQL grammar
  kql table emit grammar.json -o out.table    # tree-sitter style grammar.json"#,
        )
        .arg(grammar_path_arg())
        .arg(output_file_arg())
}

pub fn table_inspect_command() -> Command {
    Command::new("inspect")
        .about("Load a table file and summarize it")
        .arg(table_path_arg())
        .arg(symbols_arg())
}
