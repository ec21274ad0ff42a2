use std::net::IpAddr;

use super::error::SapError;
use super::layout;
use super::reader::SapReader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Announcement,
    Deletion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadStatus {
    Plain,
    Encrypted,
    Compressed,
    EncryptedAndCompressed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthType {
    Pgp,
    Cms,
    Unknown(u8),
}

/// Optional authentication block following the fixed SAP header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSubheader {
    pub version: u8,
    pub padded: bool,
    pub auth_type: AuthType,
    /// Total block length in bytes (`auth length field * 4`).
    pub data_len: u32,
    /// Trailing pad byte count; 0 unless `padded`.
    pub pad_len: u8,
    /// Authentication payload length, excluding the flags byte and pad.
    pub body_len: u32,
}

/// Decoded SAP message. A pure value: built once per buffer, no identity
/// across calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SapMessage {
    /// 3-bit version field: 0 is SAPv0, anything else SAPv1 or later.
    pub version: u8,
    pub address_family: AddressFamily,
    pub message_kind: MessageKind,
    pub encrypted: bool,
    pub compressed: bool,
    /// Reserved bit; the protocol requires 0 but decoding never rejects it.
    pub reserved_bit: bool,
    pub message_id_hash: u16,
    pub originating_source: IpAddr,
    pub authentication: Option<AuthSubheader>,
    /// MIME-style content specifier, present only when the payload does not
    /// open with an SDP version line.
    pub payload_type: Option<String>,
    /// Where the residual payload for the SDP decoder begins. When the
    /// payload is encrypted or compressed this points just past the
    /// fixed/auth header and nothing beyond it is decoded.
    pub payload_offset: usize,
    pub payload_status: PayloadStatus,
}

pub fn decode_sap(payload: &[u8]) -> Result<SapMessage, SapError> {
    let reader = SapReader::new(payload);
    reader.require_len(layout::MIN_LEN)?;

    let flags = reader.read_u8(layout::FLAGS_OFFSET)?;
    let version = (flags & layout::VERSION_MASK) >> layout::VERSION_SHIFT;
    let address_family = if flags & layout::BIT_ADDRESS_TYPE != 0 {
        AddressFamily::Ipv6
    } else {
        AddressFamily::Ipv4
    };
    let reserved_bit = flags & layout::BIT_RESERVED != 0;
    let message_kind = if flags & layout::BIT_MESSAGE_TYPE != 0 {
        MessageKind::Deletion
    } else {
        MessageKind::Announcement
    };
    let encrypted = flags & layout::BIT_ENCRYPTED != 0;
    let compressed = flags & layout::BIT_COMPRESSED != 0;

    let auth_len_field = reader.read_u8(layout::AUTH_LEN_OFFSET)?;
    let message_id_hash = reader.read_u16_be(layout::MSG_ID_HASH_RANGE)?;

    let (originating_source, addr_len) = match address_family {
        AddressFamily::Ipv4 => (
            IpAddr::V4(reader.read_ipv4(layout::ADDR_OFFSET)?),
            layout::IPV4_ADDR_LEN,
        ),
        AddressFamily::Ipv6 => (
            IpAddr::V6(reader.read_ipv6(layout::ADDR_OFFSET)?),
            layout::IPV6_ADDR_LEN,
        ),
    };
    let mut offset = layout::ADDR_OFFSET + addr_len;

    let authentication = if auth_len_field > 0 {
        let data_len = auth_len_field as usize * layout::AUTH_WORD_LEN;
        let end = offset + data_len;
        if payload.len() < end {
            return Err(SapError::TruncatedAuthHeader {
                needed: end,
                actual: payload.len(),
            });
        }

        let auth_flags = reader.read_u8(offset)?;
        let auth_version = (auth_flags & layout::VERSION_MASK) >> layout::VERSION_SHIFT;
        let padded = auth_flags & layout::AUTH_BIT_PADDING != 0;
        let auth_type = match auth_flags & layout::AUTH_TYPE_MASK {
            layout::AUTH_TYPE_PGP => AuthType::Pgp,
            layout::AUTH_TYPE_CMS => AuthType::Cms,
            other => AuthType::Unknown(other),
        };

        // Pad count lives in the last byte of the block.
        let pad_len = if padded { reader.read_u8(end - 1)? } else { 0 };
        let data_len = data_len as u32;
        let body_len = data_len
            .checked_sub(pad_len as u32 + 1)
            .ok_or(SapError::MalformedAuthHeader { data_len, pad_len })?;

        offset = end;
        Some(AuthSubheader {
            version: auth_version,
            padded,
            auth_type,
            data_len,
            pad_len,
            body_len,
        })
    } else {
        None
    };

    let payload_status = match (encrypted, compressed) {
        (false, false) => PayloadStatus::Plain,
        (true, false) => PayloadStatus::Encrypted,
        (false, true) => PayloadStatus::Compressed,
        (true, true) => PayloadStatus::EncryptedAndCompressed,
    };

    if payload_status != PayloadStatus::Plain {
        return Ok(SapMessage {
            version,
            address_family,
            message_kind,
            encrypted,
            compressed,
            reserved_bit,
            message_id_hash,
            originating_source,
            authentication,
            payload_type: None,
            payload_offset: offset,
            payload_status,
        });
    }

    let mut payload_type = None;
    if reader.remaining_from(offset) > 0 && !reader.sdp_marker_at(offset) {
        let (token, terminated) = reader.scan_nul_terminated(offset);
        if !terminated {
            return Err(SapError::MalformedPayloadType { offset });
        }
        if !token.is_empty() {
            payload_type = Some(String::from_utf8_lossy(token).into_owned());
        }
        // Token plus the terminating NUL.
        offset += token.len() + 1;
    }

    Ok(SapMessage {
        version,
        address_family,
        message_kind,
        encrypted,
        compressed,
        reserved_bit,
        message_id_hash,
        originating_source,
        authentication,
        payload_type,
        payload_offset: offset,
        payload_status,
    })
}
