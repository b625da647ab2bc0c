//! Grammar table file header (32 bytes).
//!
//! ```text
//! 0   magic            b"KQLT"
//! 4   version          u32
//! 8   checksum         u32  CRC32 of the payload
//! 12  payload_size     u32
//! 16  state_count      u32
//! 20  symbol_count     u16
//! 22  terminal_count   u16
//! 24  production_count u32
//! 28  reserved         u32
//! 32  payload          postcard-encoded table body
//! ```
//!
//! All integers are little-endian.

/// Magic bytes identifying a kql grammar table.
pub const MAGIC: [u8; 4] = *b"KQLT";

/// Current table format version.
pub const VERSION: u32 = 1;

pub const HEADER_SIZE: usize = 32;

/// Fixed-size header preceding the table payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Header {
    /// Magic bytes: b"KQLT"
    pub magic: [u8; 4],
    /// Format version (currently 1)
    pub version: u32,
    /// CRC32 checksum of everything after the header
    pub checksum: u32,
    /// Payload size in bytes
    pub payload_size: u32,

    pub state_count: u32,
    pub symbol_count: u16,
    pub terminal_count: u16,
    pub production_count: u32,
    pub(crate) _reserved: u32,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            checksum: 0,
            payload_size: 0,
            state_count: 0,
            symbol_count: 0,
            terminal_count: 0,
            production_count: 0,
            _reserved: 0,
        }
    }
}

impl Header {
    /// Decode header from the first 32 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert!(bytes.len() >= HEADER_SIZE, "header too short");

        Self {
            magic: [bytes[0], bytes[1], bytes[2], bytes[3]],
            version: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            checksum: u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
            payload_size: u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]),
            state_count: u32::from_le_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]),
            symbol_count: u16::from_le_bytes([bytes[20], bytes[21]]),
            terminal_count: u16::from_le_bytes([bytes[22], bytes[23]]),
            production_count: u32::from_le_bytes([bytes[24], bytes[25], bytes[26], bytes[27]]),
            _reserved: u32::from_le_bytes([bytes[28], bytes[29], bytes[30], bytes[31]]),
        }
    }

    /// Encode header to 32 bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4..8].copy_from_slice(&self.version.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.checksum.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.payload_size.to_le_bytes());
        bytes[16..20].copy_from_slice(&self.state_count.to_le_bytes());
        bytes[20..22].copy_from_slice(&self.symbol_count.to_le_bytes());
        bytes[22..24].copy_from_slice(&self.terminal_count.to_le_bytes());
        bytes[24..28].copy_from_slice(&self.production_count.to_le_bytes());
        bytes[28..32].copy_from_slice(&self._reserved.to_le_bytes());
        bytes
    }

    pub fn validate_magic(&self) -> bool {
        self.magic == MAGIC
    }

    pub fn validate_version(&self) -> bool {
        self.version == VERSION
    }
}
