//! Loading a serialized grammar table and parsing with it.

use kql_lib::{GrammarError, Language, Parser};

#[test]
fn serialized_table_parses_like_builtin() {
    let bytes = Language::kql().table().to_bytes();
    let language = Language::from_bytes(&bytes).unwrap();

    let loaded = Parser::new(language).parse("StormEvents | where State == 'TEXAS' | take 10");
    let builtin = Parser::new(Language::kql()).parse("StormEvents | where State == 'TEXAS' | take 10");

    assert!(!loaded.has_error());
    assert_eq!(loaded.to_sexp(), builtin.to_sexp());
}

#[test]
fn truncated_table_is_rejected() {
    let bytes = Language::kql().table().to_bytes();

    let err = Language::from_bytes(&bytes[..bytes.len() / 2]).unwrap_err();

    assert!(matches!(err, GrammarError::MalformedTable(_)), "{err}");
}

#[test]
fn corrupted_table_is_rejected() {
    let mut bytes = Language::kql().table().to_bytes();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;

    assert!(Language::from_bytes(&bytes).is_err());
}
