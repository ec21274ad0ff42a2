use super::error::SapError;
use super::layout;

pub struct SapReader<'a> {
    payload: &'a [u8],
}

impl<'a> SapReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload }
    }

    pub fn require_len(&self, needed: usize) -> Result<(), SapError> {
        if self.payload.len() < needed {
            return Err(SapError::TruncatedHeader {
                needed,
                actual: self.payload.len(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&self, offset: usize) -> Result<u8, SapError> {
        self.payload
            .get(offset)
            .copied()
            .ok_or(SapError::TruncatedHeader {
                needed: offset + 1,
                actual: self.payload.len(),
            })
    }

    pub fn read_u16_be(&self, range: std::ops::Range<usize>) -> Result<u16, SapError> {
        let bytes = self.read_slice(range)?;
        if bytes.len() != 2 {
            return Err(SapError::TruncatedHeader {
                needed: 2,
                actual: bytes.len(),
            });
        }
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    pub fn read_slice(&self, range: std::ops::Range<usize>) -> Result<&'a [u8], SapError> {
        self.payload
            .get(range.clone())
            .ok_or(SapError::TruncatedHeader {
                needed: range.end,
                actual: self.payload.len(),
            })
    }

    pub fn read_ipv4(&self, offset: usize) -> Result<std::net::Ipv4Addr, SapError> {
        let bytes = self.read_slice(offset..offset + layout::IPV4_ADDR_LEN)?;
        let octets: [u8; 4] = bytes.try_into().map_err(|_| SapError::TruncatedHeader {
            needed: offset + layout::IPV4_ADDR_LEN,
            actual: self.payload.len(),
        })?;
        Ok(std::net::Ipv4Addr::from(octets))
    }

    pub fn read_ipv6(&self, offset: usize) -> Result<std::net::Ipv6Addr, SapError> {
        let bytes = self.read_slice(offset..offset + layout::IPV6_ADDR_LEN)?;
        let octets: [u8; 16] = bytes.try_into().map_err(|_| SapError::TruncatedHeader {
            needed: offset + layout::IPV6_ADDR_LEN,
            actual: self.payload.len(),
        })?;
        Ok(std::net::Ipv6Addr::from(octets))
    }

    pub fn remaining_from(&self, offset: usize) -> usize {
        self.payload.len().saturating_sub(offset)
    }

    /// True when the bytes at `offset` start an SDP payload (`"v="`,
    /// ASCII case-insensitive).
    pub fn sdp_marker_at(&self, offset: usize) -> bool {
        self.payload
            .get(offset..offset + layout::SDP_MARKER.len())
            .is_some_and(|bytes| bytes.eq_ignore_ascii_case(layout::SDP_MARKER))
    }

    /// Scan for a NUL-terminated token starting at `offset`, never past the
    /// end of the buffer. Returns the token bytes and whether a terminator
    /// was found before the buffer ended.
    pub fn scan_nul_terminated(&self, offset: usize) -> (&'a [u8], bool) {
        let rest = self.payload.get(offset..).unwrap_or(&[]);
        match rest.iter().position(|&b| b == 0) {
            Some(end) => (&rest[..end], true),
            None => (rest, false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::SapReader;
    use crate::protocols::sap::error::SapError;

    #[test]
    fn read_u16_be_ok() {
        let payload = [0x00, 0x00, 0x12, 0x34];
        let reader = SapReader::new(&payload);
        assert_eq!(reader.read_u16_be(2..4).unwrap(), 0x1234);
    }

    #[test]
    fn read_past_end_is_truncated() {
        let payload = [0u8; 3];
        let reader = SapReader::new(&payload);
        let err = reader.read_u16_be(2..4).unwrap_err();
        assert!(matches!(err, SapError::TruncatedHeader { needed: 4, actual: 3 }));
    }

    #[test]
    fn read_ipv4_and_ipv6() {
        let mut payload = vec![192, 168, 1, 1];
        payload.extend_from_slice(&[0u8; 16]);
        let reader = SapReader::new(&payload);
        assert_eq!(reader.read_ipv4(0).unwrap(), std::net::Ipv4Addr::new(192, 168, 1, 1));
        assert_eq!(reader.read_ipv6(4).unwrap(), std::net::Ipv6Addr::UNSPECIFIED);
    }

    #[test]
    fn sdp_marker_is_case_insensitive() {
        let reader = SapReader::new(b"V=0");
        assert!(reader.sdp_marker_at(0));
        let reader = SapReader::new(b"x=0");
        assert!(!reader.sdp_marker_at(0));
        let reader = SapReader::new(b"v");
        assert!(!reader.sdp_marker_at(0));
    }

    #[test]
    fn scan_stops_at_nul() {
        let reader = SapReader::new(b"application/sdp\0v=0");
        let (token, terminated) = reader.scan_nul_terminated(0);
        assert_eq!(token, b"application/sdp");
        assert!(terminated);
    }

    #[test]
    fn scan_clamps_to_buffer_end() {
        let reader = SapReader::new(b"application/sdp");
        let (token, terminated) = reader.scan_nul_terminated(0);
        assert_eq!(token, b"application/sdp");
        assert!(!terminated);
    }
}
