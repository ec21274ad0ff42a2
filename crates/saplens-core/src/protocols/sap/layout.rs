pub const FLAGS_OFFSET: usize = 0;
pub const AUTH_LEN_OFFSET: usize = 1;
pub const MSG_ID_HASH_RANGE: std::ops::Range<usize> = 2..4;
pub const ADDR_OFFSET: usize = 4;

pub const IPV4_ADDR_LEN: usize = 4;
pub const IPV6_ADDR_LEN: usize = 16;

/// 3-bit version field, bits 7-5. The original dissector applies the same
/// mask to the auth subheader flags byte, and that layout is kept.
pub const VERSION_MASK: u8 = 0xE0;
pub const VERSION_SHIFT: u8 = 5;

pub const BIT_ADDRESS_TYPE: u8 = 0x10;
pub const BIT_RESERVED: u8 = 0x08;
pub const BIT_MESSAGE_TYPE: u8 = 0x04;
pub const BIT_ENCRYPTED: u8 = 0x02;
pub const BIT_COMPRESSED: u8 = 0x01;

/// The auth length field counts 32-bit words.
pub const AUTH_WORD_LEN: usize = 4;
pub const AUTH_BIT_PADDING: u8 = 0x10;
pub const AUTH_TYPE_MASK: u8 = 0x0F;
pub const AUTH_TYPE_PGP: u8 = 0;
pub const AUTH_TYPE_CMS: u8 = 1;

/// First bytes of an SDP payload; matched case-insensitively.
pub const SDP_MARKER: &[u8; 2] = b"v=";

pub const MIN_LEN: usize = ADDR_OFFSET + IPV4_ADDR_LEN;
