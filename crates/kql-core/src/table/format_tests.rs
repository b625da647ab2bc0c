use super::*;

#[test]
fn header_default() {
    let h = Header::default();
    assert!(h.validate_magic());
    assert!(h.validate_version());
    assert_eq!(h.payload_size, 0);
}

#[test]
fn header_roundtrip() {
    let h = Header {
        magic: MAGIC,
        version: VERSION,
        checksum: 0xDEADBEEF,
        payload_size: 4096,
        state_count: 812,
        symbol_count: 240,
        terminal_count: 131,
        production_count: 517,
        _reserved: 0,
    };

    let bytes = h.to_bytes();
    assert_eq!(bytes.len(), HEADER_SIZE);
    assert_eq!(&bytes[0..4], b"KQLT");

    let decoded = Header::from_bytes(&bytes);
    assert_eq!(decoded, h);
}

#[test]
fn header_is_little_endian() {
    let h = Header {
        state_count: 0x0102_0304,
        terminal_count: 0x0506,
        ..Default::default()
    };

    let bytes = h.to_bytes();
    assert_eq!(&bytes[16..20], &[0x04, 0x03, 0x02, 0x01]);
    assert_eq!(&bytes[22..24], &[0x06, 0x05]);
}

#[test]
fn wrong_magic_and_version_are_detected() {
    let mut h = Header::default();
    h.magic = *b"TSLG";
    assert!(!h.validate_magic());

    let mut h = Header::default();
    h.version = VERSION + 1;
    assert!(!h.validate_version());
}
