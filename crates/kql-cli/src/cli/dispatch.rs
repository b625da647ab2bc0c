//! Dispatch logic: extract params from `ArgMatches` and convert them to
//! command args.

use std::path::PathBuf;

use clap::ArgMatches;

use super::ColorChoice;
use crate::commands::check::CheckArgs;
use crate::commands::common::{ParserArgs, SourceArgs};
use crate::commands::edit::EditArgs;
use crate::commands::parse::ParseArgs;
use crate::commands::table::{TableEmitArgs, TableInspectArgs};
use crate::commands::tokens::TokensArgs;

pub struct SourceParams {
    pub source_path: Option<PathBuf>,
    pub source_text: Option<String>,
}

impl SourceParams {
    fn from_matches(m: &ArgMatches) -> Self {
        Self {
            source_path: m.get_one::<PathBuf>("source_path").cloned(),
            source_text: m.get_one::<String>("source_text").cloned(),
        }
    }
}

impl From<SourceParams> for SourceArgs {
    fn from(p: SourceParams) -> Self {
        Self {
            path: p.source_path,
            text: p.source_text,
        }
    }
}

pub struct ParserParams {
    pub table: Option<PathBuf>,
    pub recovery_window: usize,
    pub step_limit: Option<u32>,
}

impl ParserParams {
    fn from_matches(m: &ArgMatches) -> Self {
        Self {
            table: m.get_one::<PathBuf>("table").cloned(),
            recovery_window: m.get_one::<usize>("recovery_window").copied().unwrap_or(3),
            step_limit: m.get_one::<u32>("step_limit").copied(),
        }
    }
}

impl From<ParserParams> for ParserArgs {
    fn from(p: ParserParams) -> Self {
        Self {
            table: p.table,
            recovery_window: p.recovery_window,
            step_limit: p.step_limit,
        }
    }
}

pub struct ParseParams {
    pub source: SourceParams,
    pub parser: ParserParams,
    pub raw: bool,
    pub spans: bool,
}

impl ParseParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            source: SourceParams::from_matches(m),
            parser: ParserParams::from_matches(m),
            raw: m.get_flag("raw"),
            spans: m.get_flag("spans"),
        }
    }
}

impl From<ParseParams> for ParseArgs {
    fn from(p: ParseParams) -> Self {
        Self {
            source: p.source.into(),
            parser: p.parser.into(),
            raw: p.raw,
            spans: p.spans,
        }
    }
}

pub struct CheckParams {
    pub source: SourceParams,
    pub parser: ParserParams,
    pub color: ColorChoice,
}

impl CheckParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            source: SourceParams::from_matches(m),
            parser: ParserParams::from_matches(m),
            color: parse_color(m),
        }
    }
}

impl From<CheckParams> for CheckArgs {
    fn from(p: CheckParams) -> Self {
        Self {
            source: p.source.into(),
            parser: p.parser.into(),
            color: p.color.should_colorize(),
        }
    }
}

pub struct TokensParams {
    pub source: SourceParams,
    pub raw: bool,
}

impl TokensParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            source: SourceParams::from_matches(m),
            raw: m.get_flag("raw"),
        }
    }
}

impl From<TokensParams> for TokensArgs {
    fn from(p: TokensParams) -> Self {
        Self {
            source: p.source.into(),
            raw: p.raw,
        }
    }
}

pub struct EditParams {
    pub source: SourceParams,
    pub parser: ParserParams,
    pub at: usize,
    pub delete: usize,
    pub insert: String,
    pub raw: bool,
    pub spans: bool,
    pub no_reuse: bool,
    pub verify: bool,
}

impl EditParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            source: SourceParams::from_matches(m),
            parser: ParserParams::from_matches(m),
            at: m.get_one::<usize>("at").copied().unwrap_or(0),
            delete: m.get_one::<usize>("delete").copied().unwrap_or(0),
            insert: m.get_one::<String>("insert").cloned().unwrap_or_default(),
            raw: m.get_flag("raw"),
            spans: m.get_flag("spans"),
            no_reuse: m.get_flag("no_reuse"),
            verify: m.get_flag("verify"),
        }
    }
}

impl From<EditParams> for EditArgs {
    fn from(p: EditParams) -> Self {
        Self {
            source: p.source.into(),
            parser: p.parser.into(),
            start: p.at,
            end: p.at.saturating_add(p.delete),
            insert: p.insert,
            raw: p.raw,
            spans: p.spans,
            reuse: !p.no_reuse,
            verify: p.verify,
        }
    }
}

pub struct TableEmitParams {
    pub grammar_path: Option<PathBuf>,
    pub output: Option<PathBuf>,
}

impl TableEmitParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            grammar_path: m.get_one::<PathBuf>("grammar_path").cloned(),
            output: m.get_one::<PathBuf>("output").cloned(),
        }
    }
}

impl From<TableEmitParams> for TableEmitArgs {
    fn from(p: TableEmitParams) -> Self {
        Self {
            grammar_path: p.grammar_path,
            output: p.output.unwrap_or_else(|| PathBuf::from("kql.table")),
        }
    }
}

pub struct TableInspectParams {
    pub table_path: Option<PathBuf>,
    pub symbols: bool,
}

impl TableInspectParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            table_path: m.get_one::<PathBuf>("table_path").cloned(),
            symbols: m.get_flag("symbols"),
        }
    }
}

impl From<TableInspectParams> for TableInspectArgs {
    fn from(p: TableInspectParams) -> Self {
        Self {
            table_path: p.table_path.unwrap_or_default(),
            symbols: p.symbols,
        }
    }
}

fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}
