use super::common::{ParserArgs, SourceArgs, build_parser, fail, load_source, parse};

pub struct CheckArgs {
    pub source: SourceArgs,
    pub parser: ParserArgs,
    pub color: bool,
}

pub fn run(args: CheckArgs) {
    let source = load_source(&args.source).unwrap_or_else(|msg| fail(msg));
    let parser = build_parser(&args.parser, true).unwrap_or_else(|msg| fail(msg));
    let tree = parse(&parser, &source.text).unwrap_or_else(|msg| fail(msg));

    let diagnostics = tree.diagnostics();
    if !diagnostics.is_empty() {
        eprint!(
            "{}",
            diagnostics
                .printer()
                .source(&source.text)
                .path(&source.name)
                .colored(args.color)
                .render()
        );
        std::process::exit(1);
    }

    // Silent on success
}
