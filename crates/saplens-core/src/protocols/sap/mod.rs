//! SAP (RFC 2974) message decoding.
//!
//! The parser walks the fixed header (flags byte, auth length, message-ID
//! hash, originating source), the optional authentication subheader and the
//! optional payload-type token, reporting the offset where the residual SDP
//! payload begins. Encrypted or compressed payloads stop decoding right
//! after the header.
//!
//! Errors distinguish a short fixed header from a short or inconsistent
//! authentication block. Byte offsets and bitmasks live in `layout`, safe
//! byte access in `reader`.

pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;

pub use error::SapError;
pub use parser::{
    AddressFamily, AuthSubheader, AuthType, MessageKind, PayloadStatus, SapMessage, decode_sap,
};
