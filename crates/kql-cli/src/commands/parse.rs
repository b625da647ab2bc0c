use super::common::{ParserArgs, SourceArgs, build_parser, fail, load_source, parse};

pub struct ParseArgs {
    pub source: SourceArgs,
    pub parser: ParserArgs,
    pub raw: bool,
    pub spans: bool,
}

pub fn run(args: ParseArgs) {
    let source = load_source(&args.source).unwrap_or_else(|msg| fail(msg));
    let parser = build_parser(&args.parser, true).unwrap_or_else(|msg| fail(msg));
    let tree = parse(&parser, &source.text).unwrap_or_else(|msg| fail(msg));

    print!(
        "{}",
        tree.printer()
            .with_trivia(args.raw)
            .with_spans(args.spans)
            .dump()
    );
}
