use kql_lib::{Edit, Tree};
use tracing::debug;

use super::common::{ParserArgs, SourceArgs, build_parser, fail, load_source, parse};

pub struct EditArgs {
    pub source: SourceArgs,
    pub parser: ParserArgs,
    pub start: usize,
    pub end: usize,
    pub insert: String,
    pub raw: bool,
    pub spans: bool,
    pub reuse: bool,
    pub verify: bool,
}

pub fn run(args: EditArgs) {
    let source = load_source(&args.source).unwrap_or_else(|msg| fail(msg));
    let parser = build_parser(&args.parser, args.reuse).unwrap_or_else(|msg| fail(msg));
    let tree = parse(&parser, &source.text).unwrap_or_else(|msg| fail(msg));

    let edit = Edit::replace(args.start..args.end, args.insert);
    let edited = tree.edit(&edit).unwrap_or_else(|e| fail(e));
    let reparsed = parser
        .reparse_session(&edited, edited.text())
        .run_until(|| false)
        .unwrap_or_else(|e| fail(e));
    debug!(start = edit.start, old_end = edit.old_end, new_end = edit.new_end, "reparsed");

    print!(
        "{}",
        reparsed
            .printer()
            .with_trivia(args.raw)
            .with_spans(args.spans)
            .dump()
    );
    eprintln!("{}", reuse_summary(&reparsed));

    if args.verify {
        let fresh = parse(&parser, edited.text()).unwrap_or_else(|msg| fail(msg));
        if !reparsed.structurally_eq(&fresh) {
            fail("incremental reparse differs from a fresh parse");
        }
    }
}

pub fn reuse_summary(tree: &Tree) -> String {
    let reuse = tree.reuse();
    format!(
        "reused {} subtree{} covering {} of {} bytes",
        reuse.fragments,
        if reuse.fragments == 1 { "" } else { "s" },
        reuse.bytes,
        tree.len()
    )
}
