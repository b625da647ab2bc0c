use super::*;
use crate::grammar::dsl::*;
use crate::{Grammar, GrammarError, compile};

fn table() -> GrammarTable {
    let grammar = Grammar::new("test")
        .rule("program", repeat(sym("statement")))
        .rule(
            "statement",
            seq([lit("let"), sym("identifier"), lit("="), sym("number"), lit(";")]),
        )
        .word("identifier");
    compile(&grammar).unwrap().table
}

fn defect(result: Result<GrammarTable, GrammarError>) -> TableDefect {
    match result {
        Err(GrammarError::MalformedTable(defect)) => defect,
        other => panic!("expected MalformedTable, got {other:?}"),
    }
}

#[test]
fn load_roundtrip() {
    let table = table();
    let loaded = GrammarTable::load(&table.to_bytes()).unwrap();
    assert_eq!(loaded, table);
}

#[test]
fn header_counts_match_table() {
    let table = table();
    let bytes = table.to_bytes();
    let header = Header::from_bytes(&bytes);

    assert_eq!(header.state_count as usize, table.state_count());
    assert_eq!(header.symbol_count as usize, table.symbols().len());
    assert_eq!(header.terminal_count as usize, table.terminal_count());
    assert_eq!(header.production_count as usize, table.productions().len());
    assert_eq!(header.payload_size as usize, bytes.len() - HEADER_SIZE);
}

#[test]
fn too_small() {
    let err = defect(GrammarTable::load(&[0u8; 16]));
    assert!(matches!(err, TableDefect::FileTooSmall(16)));

    let err = defect(GrammarTable::load(&[]));
    assert!(matches!(err, TableDefect::FileTooSmall(0)));
}

#[test]
fn invalid_magic() {
    let mut bytes = table().to_bytes();
    bytes[0..4].copy_from_slice(b"BAD!");

    let err = defect(GrammarTable::load(&bytes));
    assert!(matches!(err, TableDefect::InvalidMagic));
}

#[test]
fn version_mismatch() {
    let mut bytes = table().to_bytes();
    bytes[4..8].copy_from_slice(&(VERSION + 1).to_le_bytes());

    let err = defect(GrammarTable::load(&bytes));
    assert!(matches!(err, TableDefect::UnsupportedVersion(v) if v == VERSION + 1));
}

#[test]
fn truncated_payload() {
    let bytes = table().to_bytes();
    for cut in [1, bytes.len() / 2, bytes.len() - HEADER_SIZE] {
        let err = defect(GrammarTable::load(&bytes[..bytes.len() - cut]));
        assert!(
            matches!(err, TableDefect::SizeMismatch { .. }),
            "cut {cut}: {err:?}"
        );
    }
}

#[test]
fn trailing_bytes() {
    let mut bytes = table().to_bytes();
    bytes.push(0);

    let err = defect(GrammarTable::load(&bytes));
    assert!(matches!(err, TableDefect::SizeMismatch { .. }));
}

#[test]
fn corrupted_payload_fails_checksum() {
    let mut bytes = table().to_bytes();
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;

    let err = defect(GrammarTable::load(&bytes));
    assert!(matches!(err, TableDefect::ChecksumMismatch { .. }));
}

#[test]
fn undecodable_payload() {
    let payload = [0xFFu8; 8];
    let header = Header {
        checksum: crc32fast::hash(&payload),
        payload_size: payload.len() as u32,
        ..Default::default()
    };
    let mut bytes = header.to_bytes().to_vec();
    bytes.extend_from_slice(&payload);

    let err = defect(GrammarTable::load(&bytes));
    assert!(matches!(err, TableDefect::Decode(_)));
}

#[test]
fn header_count_mismatch() {
    let mut bytes = table().to_bytes();
    bytes[16..20].copy_from_slice(&9999u32.to_le_bytes());

    let err = defect(GrammarTable::load(&bytes));
    assert!(matches!(
        err,
        TableDefect::CountMismatch {
            field: "state_count",
            ..
        }
    ));
}

#[test]
fn shift_target_out_of_range() {
    let mut table = table();
    let state_count = table.state_count;
    table.actions[0] = Action::Shift(StateId(state_count));

    let err = defect(GrammarTable::load(&table.to_bytes()));
    assert!(matches!(
        err,
        TableDefect::OutOfRange {
            what: "shift target",
            ..
        }
    ));
}

#[test]
fn reduce_of_unknown_production() {
    let mut table = table();
    let count = table.productions.len() as u32;
    table.actions[1] = Action::Reduce(ProductionId(count));

    let err = defect(GrammarTable::load(&table.to_bytes()));
    assert!(matches!(
        err,
        TableDefect::OutOfRange {
            what: "reduced production",
            ..
        }
    ));
}

#[test]
fn goto_target_out_of_range() {
    let mut table = table();
    table.gotos[0] = Some(StateId(u32::MAX));

    let err = defect(GrammarTable::load(&table.to_bytes()));
    assert!(matches!(
        err,
        TableDefect::OutOfRange {
            what: "goto target",
            ..
        }
    ));
}

#[test]
fn action_table_shape() {
    let mut table = table();
    table.actions.pop();

    let err = defect(GrammarTable::load(&table.to_bytes()));
    assert!(matches!(
        err,
        TableDefect::Shape {
            what: "action table",
            ..
        }
    ));
}

#[test]
fn production_lhs_must_be_nonterminal() {
    let mut table = table();
    table.productions[1].lhs = SymbolId(1);

    let err = defect(GrammarTable::load(&table.to_bytes()));
    assert!(matches!(err, TableDefect::SymbolKind(SymbolId(1))));
}

#[test]
fn rhs_symbol_out_of_range() {
    let mut table = table();
    let count = table.symbols.len() as u16;
    table.productions[1].rhs.push(SymbolId(count));

    let err = defect(GrammarTable::load(&table.to_bytes()));
    assert!(matches!(
        err,
        TableDefect::OutOfRange {
            what: "production rhs symbol",
            ..
        }
    ));
}

#[test]
fn keywords_must_be_sorted_terminals() {
    let mut table = table();
    table.keywords = vec![SymbolId(3), SymbolId(2)];
    let err = defect(GrammarTable::load(&table.to_bytes()));
    assert!(matches!(err, TableDefect::Unsorted { what: "keyword list" }));

    let mut table = self::table();
    table.keywords = vec![table.start_symbol];
    let err = defect(GrammarTable::load(&table.to_bytes()));
    assert!(matches!(
        err,
        TableDefect::OutOfRange {
            what: "keyword list",
            ..
        }
    ));
}

#[test]
fn missing_accept() {
    let mut table = table();
    for action in &mut table.actions {
        if *action == Action::Accept {
            *action = Action::Error;
        }
    }

    let err = defect(GrammarTable::load(&table.to_bytes()));
    assert!(matches!(err, TableDefect::NoAccept));
}

#[test]
fn from_path_reports_io_errors() {
    let err = GrammarTable::from_path("/nonexistent/kql.table").unwrap_err();
    assert!(matches!(err, GrammarError::Io(_)));
}

#[test]
fn defect_messages() {
    let err = GrammarError::from(TableDefect::UnsupportedVersion(7));
    assert_eq!(
        err.to_string(),
        "malformed grammar table: unsupported version: 7 (expected 1)"
    );
}
