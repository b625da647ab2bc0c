//! Shared argument builders for CLI commands.
//!
//! Each function returns a `clap::Arg` so the same definition can be composed
//! into several commands.

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// Query file to parse (positional, "-" for stdin).
pub fn source_path_arg() -> Arg {
    Arg::new("source_path")
        .value_name("SOURCE")
        .value_parser(value_parser!(PathBuf))
        .help("KQL file to parse (\"-\" for stdin)")
}

/// Inline query text (-s/--source).
pub fn source_text_arg() -> Arg {
    Arg::new("source_text")
        .short('s')
        .long("source")
        .value_name("TEXT")
        .conflicts_with("source_path")
        .help("Inline KQL text")
}

/// Serialized grammar table to parse with (--table).
pub fn table_arg() -> Arg {
    Arg::new("table")
        .long("table")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Grammar table to parse with (default: built-in KQL)")
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .help("Colorize output")
}

/// Include trivia (--raw).
pub fn raw_arg() -> Arg {
    Arg::new("raw")
        .long("raw")
        .action(ArgAction::SetTrue)
        .help("Include trivia (whitespace, comments)")
}

/// Show byte spans (--spans).
pub fn spans_arg() -> Arg {
    Arg::new("spans")
        .long("spans")
        .action(ArgAction::SetTrue)
        .help("Show byte spans")
}

/// Recovery window (--recovery-window).
pub fn recovery_window_arg() -> Arg {
    Arg::new("recovery_window")
        .long("recovery-window")
        .value_name("N")
        .default_value("3")
        .value_parser(value_parser!(usize))
        .help("Tokens recovery may insert, skip or pop past")
}

/// Parse step limit (--step-limit).
pub fn step_limit_arg() -> Arg {
    Arg::new("step_limit")
        .long("step-limit")
        .value_name("N")
        .value_parser(value_parser!(u32))
        .help("Abort after N parse actions")
}

/// Disable subtree reuse (--no-reuse).
pub fn no_reuse_arg() -> Arg {
    Arg::new("no_reuse")
        .long("no-reuse")
        .action(ArgAction::SetTrue)
        .help("Reparse from scratch instead of reusing subtrees")
}

/// Grammar JSON (positional).
pub fn grammar_path_arg() -> Arg {
    Arg::new("grammar_path")
        .value_name("GRAMMAR")
        .value_parser(value_parser!(PathBuf))
        .help("grammar.json to compile (default: built-in KQL)")
}

/// Grammar table artifact (positional, required).
pub fn table_path_arg() -> Arg {
    Arg::new("table_path")
        .value_name("TABLE")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Grammar table to inspect")
}

/// Write output to file (-o/--output).
pub fn output_file_arg() -> Arg {
    Arg::new("output")
        .short('o')
        .long("output")
        .value_name("FILE")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Write the table to FILE")
}

/// List symbols (--symbols).
pub fn symbols_arg() -> Arg {
    Arg::new("symbols")
        .long("symbols")
        .action(ArgAction::SetTrue)
        .help("List every symbol")
}

/// Start of the edited range (--at).
pub fn edit_at_arg() -> Arg {
    Arg::new("at")
        .long("at")
        .value_name("OFFSET")
        .required(true)
        .value_parser(value_parser!(usize))
        .help("Byte offset where the edit starts")
}

/// Bytes removed by the edit (--delete).
pub fn edit_delete_arg() -> Arg {
    Arg::new("delete")
        .long("delete")
        .value_name("LEN")
        .default_value("0")
        .value_parser(value_parser!(usize))
        .help("Number of bytes to remove")
}

/// Text inserted by the edit (--insert).
pub fn edit_insert_arg() -> Arg {
    Arg::new("insert")
        .long("insert")
        .value_name("TEXT")
        .help("Text to insert")
}

/// Compare with a fresh parse (--verify).
pub fn verify_arg() -> Arg {
    Arg::new("verify")
        .long("verify")
        .action(ArgAction::SetTrue)
        .help("Fail unless the reparse matches a fresh parse")
}
