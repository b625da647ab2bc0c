//! `kql table emit` and `kql table inspect`.

use std::fmt::Write;
use std::fs;
use std::path::PathBuf;

use kql_core::{Grammar, GrammarTable, SymbolId, Visibility, compile};
use kql_lib::Language;
use kql_lib::language::kql;

use super::common::{fail, read_file};

pub struct TableEmitArgs {
    pub grammar_path: Option<PathBuf>,
    pub output: PathBuf,
}

pub struct TableInspectArgs {
    pub table_path: PathBuf,
    pub symbols: bool,
}

pub fn emit(args: TableEmitArgs) {
    let grammar = match &args.grammar_path {
        Some(path) => {
            let json = read_file(path).unwrap_or_else(|msg| fail(msg));
            Grammar::from_json(&json)
                .unwrap_or_else(|e| fail(format!("'{}': {}", path.display(), e)))
        }
        None => kql::grammar(),
    };

    let compiled = compile(&grammar).unwrap_or_else(|e| fail(e));
    for conflict in compiled.undeclared_conflicts() {
        let lookahead = &compiled.table.symbol(conflict.lookahead).name;
        eprintln!(
            "warning: {} in state {} on `{}`",
            conflict.kind, conflict.state, lookahead
        );
    }

    let bytes = compiled.table.to_bytes();
    fs::write(&args.output, &bytes)
        .unwrap_or_else(|e| fail(format!("failed to write '{}': {}", args.output.display(), e)));
    eprintln!(
        "wrote {} ({} bytes, {} states)",
        args.output.display(),
        bytes.len(),
        compiled.table.state_count()
    );
}

pub fn inspect(args: TableInspectArgs) {
    let bytes = fs::read(&args.table_path).unwrap_or_else(|e| {
        fail(format!(
            "failed to read '{}': {}",
            args.table_path.display(),
            e
        ))
    });
    let table = GrammarTable::load(&bytes)
        .unwrap_or_else(|e| fail(format!("'{}': {}", args.table_path.display(), e)));

    let link = Language::new(table.clone()).err().map(|e| e.to_string());
    print!("{}", summarize(&table, link.as_deref()));
    if args.symbols {
        print!("{}", list_symbols(&table));
    }
}

/// `link_error` is why the table does not bind to the lexer, if it doesn't.
pub fn summarize(table: &GrammarTable, link_error: Option<&str>) -> String {
    let name_of = |id: SymbolId| table.symbol(id).name.clone();
    let mut out = String::new();
    let mut line = |label: &str, value: String| {
        writeln!(out, "{label:<12} {value}").expect("String write never fails");
    };

    line("name", table.name().to_owned());
    line("states", table.state_count().to_string());
    line(
        "symbols",
        format!(
            "{} ({} terminals, {} nonterminals)",
            table.symbols().len(),
            table.terminal_count(),
            table.nonterminal_count()
        ),
    );
    line("productions", table.productions().len().to_string());
    line("start", name_of(table.start_symbol()));
    line("word", table.word().map_or_else(|| "-".to_owned(), name_of));
    line("keywords", table.keywords().len().to_string());
    line(
        "externals",
        if table.externals().is_empty() {
            "-".to_owned()
        } else {
            table
                .externals()
                .iter()
                .map(|&id| name_of(id))
                .collect::<Vec<_>>()
                .join(", ")
        },
    );
    line(
        "lexer",
        match link_error {
            None => "linked".to_owned(),
            Some(reason) => format!("not linked: {reason}"),
        },
    );
    out
}

pub fn list_symbols(table: &GrammarTable) -> String {
    let mut out = String::new();
    for (index, symbol) in table.symbols().iter().enumerate() {
        let id = SymbolId(index as u16);
        let mut tags = vec![if symbol.is_terminal() {
            "terminal"
        } else {
            "nonterminal"
        }];
        match symbol.visibility {
            Visibility::Named => {}
            Visibility::Anonymous => tags.push("anonymous"),
            Visibility::Hidden => tags.push("hidden"),
        }
        if table.is_keyword(id) {
            tags.push("keyword");
        }
        if table.is_external(id) {
            tags.push("external");
        }
        writeln!(out, "{:>4} {} [{}]", index, symbol.name, tags.join(", "))
            .expect("String write never fails");
    }
    out
}
