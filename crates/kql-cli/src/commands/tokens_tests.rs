use super::tokens::format_tokens;

#[test]
fn skips_trivia_by_default() {
    insta::assert_snapshot!(format_tokens("T | take 10", false), @r#"
    1:1 Identifier "T"
    1:3 Pipe "|"
    1:5 KwTake "take"
    1:10 NumberLiteral "10"
    "#);
}

#[test]
fn raw_includes_trivia_and_lines() {
    insta::assert_snapshot!(format_tokens("T\n| take", true), @r#"
    1:1 Identifier "T"
    1:2 Newline "\n"
    2:1 Pipe "|"
    2:2 Whitespace " "
    2:3 KwTake "take"
    "#);
}

#[test]
fn empty_source() {
    assert_eq!(format_tokens("", true), "");
}
