use std::fmt::Write;

use kql_lib::{LexMode, Lexer, token_text};

use super::common::{SourceArgs, fail, load_source};

pub struct TokensArgs {
    pub source: SourceArgs,
    pub raw: bool,
}

pub fn run(args: TokensArgs) {
    let source = load_source(&args.source).unwrap_or_else(|msg| fail(msg));
    print!("{}", format_tokens(&source.text, args.raw));
}

/// One token per line: `line:col kind "text"`, positions one-based.
pub fn format_tokens(text: &str, raw: bool) -> String {
    let lexer = Lexer::new(text);
    let mut out = String::new();
    for token in lexer.tokens(LexMode::Normal) {
        if token.kind.is_trivia() && !raw {
            continue;
        }
        writeln!(
            out,
            "{}:{} {:?} {:?}",
            token.start.line + 1,
            token.start.col + 1,
            token.kind,
            token_text(text, &token)
        )
        .expect("String write never fails");
    }
    out
}
