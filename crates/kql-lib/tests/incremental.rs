//! Reparsing after edits matches parsing the edited text from scratch.

use indoc::indoc;
use kql_lib::{Edit, Language, Parser, ParserConfig};

fn parser() -> Parser {
    Parser::new(Language::kql())
}

#[test]
fn append_digit_to_search_value() {
    let parser = parser();
    let tree = parser.parse("a:1");

    let edited = tree.edit(&Edit::insert(3, "2")).unwrap();
    let reparsed = parser.reparse(&edited, edited.text());

    assert_eq!(reparsed.text(), "a:12");
    assert!(reparsed.structurally_eq(&parser.parse("a:12")));
    insta::assert_snapshot!(reparsed.to_sexp(), @"(source_file (identifier) (number_literal))");
}

#[test]
fn far_edit_reuses_prefix() {
    let parser = parser();
    let text = indoc! {"
        StormEvents
        | where State == 'TEXAS'
        | extend Damage = DamageProperty + DamageCrops
        | project State, Damage, EventType
        | take 10
    "};
    let tree = parser.parse(text);
    let at = text.rfind("10").unwrap();

    let edited = tree.edit(&Edit::replace(at..at + 2, "25")).unwrap();
    let reparsed = parser.reparse(&edited, edited.text());

    assert!(reparsed.structurally_eq(&parser.parse(edited.text())));
    assert!(reparsed.reuse().fragments > 0);
    assert!(reparsed.reuse().bytes > 0);
}

#[test]
fn fresh_parse_reports_no_reuse() {
    let tree = parser().parse("T | take 1");

    assert_eq!(tree.reuse().fragments, 0);
    assert_eq!(tree.reuse().bytes, 0);
}

#[test]
fn reuse_can_be_disabled() {
    let parser = parser().with_config(ParserConfig::default().with_reuse(false));
    let text = "T\n| take 1\n| take 2\n| take 3\n| take 4\n";
    let tree = parser.parse(text);

    let edited = tree.edit(&Edit::replace(36..37, "5")).unwrap();
    let reparsed = parser.reparse(&edited, edited.text());

    assert_eq!(reparsed.reuse().fragments, 0);
    assert!(reparsed.structurally_eq(&parser.parse(edited.text())));
}

#[test]
fn edit_that_introduces_an_error() {
    let parser = parser();
    let tree = parser.parse("T | where a > 1 | take 5");

    let edited = tree.edit(&Edit::delete(14..15)).unwrap();
    let reparsed = parser.reparse(&edited, edited.text());

    assert!(reparsed.has_error());
    assert_eq!(reparsed.text(), "T | where a >  | take 5");
    assert!(reparsed.structurally_eq(&parser.parse(edited.text())));
}

#[test]
fn edit_that_repairs_an_error() {
    let parser = parser();
    let tree = parser.parse("T | where a >  | take 5");

    let edited = tree.edit(&Edit::insert(14, "1")).unwrap();
    let reparsed = parser.reparse(&edited, edited.text());

    assert!(!reparsed.has_error());
    assert!(reparsed.structurally_eq(&parser.parse(edited.text())));
}

#[test]
fn edit_inside_string_changes_lexer_mode() {
    let parser = parser();
    let tree = parser.parse("T | where s == 'ab' | take 1");

    let edited = tree.edit(&Edit::delete(15..16)).unwrap();
    let reparsed = parser.reparse(&edited, edited.text());

    assert!(reparsed.structurally_eq(&parser.parse(edited.text())));
}

#[test]
fn chained_edits_then_reparse() {
    let parser = parser();
    let tree = parser.parse("T | take 1 | take 2 | take 3");

    let edited = tree
        .edit(&Edit::replace(27..28, "30"))
        .and_then(|edited| edited.edit(&Edit::insert(0, "let x = 1;\n")))
        .unwrap();
    let reparsed = parser.reparse(&edited, edited.text());

    assert_eq!(reparsed.text(), "let x = 1;\nT | take 1 | take 2 | take 30");
    assert!(reparsed.structurally_eq(&parser.parse(edited.text())));
}

#[test]
fn mismatched_text_falls_back_to_full_parse() {
    let parser = parser();
    let tree = parser.parse("a:1");
    let edited = tree.edit(&Edit::insert(3, "2")).unwrap();

    let reparsed = parser.reparse(&edited, "b:7");

    assert_eq!(reparsed.text(), "b:7");
    assert_eq!(reparsed.reuse().fragments, 0);
}

#[test]
fn trees_are_shared_between_threads() {
    let parser = parser();
    let tree = parser.parse("T | where a > 1 | take 5");

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let parser = &parser;
                let tree = &tree;
                scope.spawn(move || {
                    let digit = char::from(b'2' + i as u8).to_string();
                    let edited = tree.edit(&Edit::replace(14..15, digit)).unwrap();
                    let reparsed = parser.reparse(&edited, edited.text());
                    reparsed.structurally_eq(&parser.parse(edited.text()))
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    });
    assert_eq!(tree.text(), "T | where a > 1 | take 5");
}

#[test]
fn empty_edit_after_recovered_string_keeps_the_tree() {
    let parser = parser().with_config(ParserConfig::default().with_recovery_window(2));
    let text = "m\"/\"1v\\/aaaaaaaaaaaaaaaaaa";
    let tree = parser.parse(text);

    let edited = tree.edit(&Edit::insert(text.len(), "")).unwrap();
    let reparsed = parser.reparse(&edited, edited.text());

    assert!(tree.has_error());
    assert!(
        reparsed.structurally_eq(&tree),
        "reparsed: {}\nfresh: {}",
        reparsed.to_sexp(),
        tree.to_sexp()
    );
}

#[test]
fn edit_in_front_of_recovered_input() {
    let parser = parser();
    let tree = parser.parse("''\\am(\"\\\"a");

    let edited = tree.edit(&Edit::replace(0..2, "m|")).unwrap();
    let reparsed = parser.reparse(&edited, edited.text());
    let fresh = parser.parse(edited.text());

    assert_eq!(edited.text(), "m|\\am(\"\\\"a");
    assert!(
        reparsed.structurally_eq(&fresh),
        "reparsed: {}\nfresh: {}",
        reparsed.to_sexp(),
        fresh.to_sexp()
    );
}
