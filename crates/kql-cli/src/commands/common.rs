//! Source loading and parser setup shared by the commands.

use std::fmt::Display;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use kql_lib::{Language, Parser, ParserConfig, Tree};

pub struct SourceArgs {
    pub path: Option<PathBuf>,
    pub text: Option<String>,
}

pub struct ParserArgs {
    pub table: Option<PathBuf>,
    pub recovery_window: usize,
    pub step_limit: Option<u32>,
}

/// Query text and the name to show in diagnostics.
pub struct Source {
    pub name: String,
    pub text: String,
}

pub fn load_source(args: &SourceArgs) -> Result<Source, String> {
    if let Some(text) = &args.text {
        return Ok(Source {
            name: "<inline>".to_owned(),
            text: text.clone(),
        });
    }

    match &args.path {
        Some(path) if path.as_os_str() == "-" => {
            let mut text = String::new();
            io::stdin()
                .read_to_string(&mut text)
                .map_err(|e| format!("failed to read stdin: {}", e))?;
            Ok(Source {
                name: "<stdin>".to_owned(),
                text,
            })
        }
        Some(path) => Ok(Source {
            name: path.display().to_string(),
            text: read_file(path)?,
        }),
        None => Err("source is required: use a positional argument or -s/--source".to_owned()),
    }
}

pub fn read_file(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("failed to read '{}': {}", path.display(), e))
}

pub fn load_language(table: Option<&Path>) -> Result<Language, String> {
    let Some(path) = table else {
        return Ok(Language::kql());
    };
    let bytes =
        fs::read(path).map_err(|e| format!("failed to read '{}': {}", path.display(), e))?;
    Language::from_bytes(&bytes).map_err(|e| format!("'{}': {}", path.display(), e))
}

pub fn parser_config(args: &ParserArgs) -> ParserConfig {
    ParserConfig::default()
        .with_recovery_window(args.recovery_window)
        .with_step_limit(args.step_limit)
}

pub fn build_parser(args: &ParserArgs, reuse: bool) -> Result<Parser, String> {
    let language = load_language(args.table.as_deref())?;
    Ok(Parser::new(language).with_config(parser_config(args).with_reuse(reuse)))
}

/// Parse honoring the configured step limit.
pub fn parse(parser: &Parser, text: &str) -> Result<Tree, String> {
    parser
        .session(text)
        .run_until(|| false)
        .map_err(|e| e.to_string())
}

pub fn fail(message: impl Display) -> ! {
    eprintln!("error: {}", message);
    std::process::exit(1);
}
