use thiserror::Error;

/// Errors returned by SAP decoding.
///
/// Every variant is terminal for the buffer being decoded; callers decide
/// how to report it. Insufficient length inside the authentication block is
/// distinct from a short fixed header so diagnostics stay targeted.
#[derive(Debug, Error)]
pub enum SapError {
    #[error("truncated header: need {needed} bytes, got {actual}")]
    TruncatedHeader { needed: usize, actual: usize },
    #[error("truncated authentication subheader: need {needed} bytes, got {actual}")]
    TruncatedAuthHeader { needed: usize, actual: usize },
    #[error("malformed authentication subheader: pad length {pad_len} in a {data_len}-byte block")]
    MalformedAuthHeader { data_len: u32, pad_len: u8 },
    #[error("unterminated payload type at offset {offset}")]
    MalformedPayloadType { offset: usize },
}
