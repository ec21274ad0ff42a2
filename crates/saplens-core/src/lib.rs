//! Core library for offline SAP (RFC 2974) capture analysis.
//!
//! This crate implements the analysis pipeline used by the CLI: a packet
//! source feeds link-layer frames into UDP extraction, datagrams addressed
//! to the SAP port are decoded by the layered SAP parser, and the results
//! are aggregated into a deterministic JSON report of announced sessions
//! and decode issues. Parsing is byte-oriented and side-effect free; all
//! I/O is isolated in `source` modules.
//!
//! Invariants:
//! - Report outputs are deterministic and stable across runs.
//! - The SAP decoder is a pure function over an immutable buffer.
//! - Sessions are keyed by originating source and message-ID hash.
//!
//! # Examples
//! ```no_run
//! use std::path::Path;
//!
//! use saplens_core::analyze_pcap_file;
//!
//! let report = analyze_pcap_file(Path::new("capture.pcapng"))?;
//! println!("sessions: {}", report.sessions.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use serde::{Deserialize, Serialize};

mod analysis;
mod protocols;
mod source;

pub use analysis::{AnalysisError, analyze_pcap_file, analyze_source};
pub use protocols::sap::{
    AddressFamily, AuthSubheader, AuthType, MessageKind, PayloadStatus, SapError, SapMessage,
    decode_sap,
};
pub use source::{PacketEvent, PacketSource, PcapFileSource, SourceError};

/// Current report schema version.
pub const REPORT_VERSION: u32 = 1;
/// Default timestamp used when no capture time is available.
pub const DEFAULT_GENERATED_AT: &str = "1970-01-01T00:00:00Z";
/// Well-known UDP port SAP announcements are sent to.
pub const SAP_UDP_PORT: u16 = 9875;

/// Aggregated analysis report with deterministic ordering.
///
/// # Examples
/// ```
/// use saplens_core::make_stub_report;
///
/// let report = make_stub_report("capture.pcapng", 123);
/// assert_eq!(report.report_version, saplens_core::REPORT_VERSION);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Report schema version (not the binary version).
    pub report_version: u32,
    /// Tool identification metadata.
    pub tool: ToolInfo,
    /// RFC3339 timestamp representing the report generation time.
    pub generated_at: String,

    /// Input capture metadata.
    pub input: InputInfo,

    /// Optional capture summary (may be empty when unavailable).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capture_summary: Option<CaptureSummary>,
    /// Announced sessions in stable order (origin, then hash).
    pub sessions: Vec<SessionSummary>,
    /// Decode issues sorted by ID.
    pub issues: Vec<IssueSummary>,
}

/// Tool metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name (e.g., "saplens").
    pub name: String,
    /// Tool version (semver).
    pub version: String,
}

/// Input capture metadata embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputInfo {
    /// Input path as provided to the analyzer.
    pub path: String,
    /// Input size in bytes.
    pub bytes: u64,
}

/// Basic capture summary (timestamps may be absent).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSummary {
    /// Total packet count observed in the capture.
    pub packets_total: u64,
    /// UDP datagrams addressed to the SAP port.
    pub sap_datagrams: u64,
    /// RFC3339 timestamp of the first packet (if known).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_start: Option<String>,
    /// RFC3339 timestamp of the last packet (if known).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_end: Option<String>,
}

/// Summary of one announced session.
///
/// # Examples
/// ```
/// use saplens_core::SessionSummary;
///
/// let session = SessionSummary {
///     origin: "10.0.0.1".to_string(),
///     message_id_hash: "0x1234".to_string(),
///     sap_version: 1,
///     announcements: 3,
///     deletions: 0,
///     deleted: false,
///     payload_type: None,
///     payload_status: "plain".to_string(),
///     auth_type: None,
///     time_first: None,
///     time_last: None,
/// };
/// assert_eq!(session.message_id_hash, "0x1234");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    /// Originating source address from the SAP header.
    pub origin: String,
    /// Message-ID hash in `0x` hex form.
    pub message_id_hash: String,
    /// 3-bit SAP version from the last message seen.
    pub sap_version: u8,
    /// Announcement messages observed for this session.
    pub announcements: u64,
    /// Deletion messages observed for this session.
    pub deletions: u64,
    /// True when the last message for this session was a deletion.
    pub deleted: bool,
    /// MIME payload type, when the announcement carried one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_type: Option<String>,
    /// Payload status label (`plain`, `encrypted`, `compressed`, ...).
    pub payload_status: String,
    /// Authentication type label when an auth subheader was present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_type: Option<String>,
    /// RFC3339 timestamp of the first message (if known).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_first: Option<String>,
    /// RFC3339 timestamp of the last message (if known).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_last: Option<String>,
}

/// Aggregated decode failure record.
///
/// # Examples
/// ```
/// use saplens_core::IssueSummary;
///
/// let issue = IssueSummary {
///     id: "SAP-TRUNCATED-HEADER".to_string(),
///     message: "truncated header: need 8 bytes, got 2".to_string(),
///     count: 1,
///     examples: vec![
///         "source 10.0.0.1:5004 -> 224.2.127.254:9875 @ 1970-01-01T00:00:00Z".to_string(),
///     ],
/// };
/// assert_eq!(issue.count, 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueSummary {
    /// Stable issue identifier (e.g., `SAP-TRUNCATED-HEADER`).
    pub id: String,
    /// Human-readable message from the first occurrence.
    pub message: String,
    /// Number of occurrences aggregated into this issue.
    pub count: u64,
    /// At most three example contexts, formatted as `source src -> dst @ ts`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
}

/// Build a stub report with base fields filled and empty aggregates.
///
/// # Examples
/// ```
/// use saplens_core::make_stub_report;
///
/// let report = make_stub_report("capture.pcapng", 123);
/// assert!(report.sessions.is_empty());
/// ```
pub fn make_stub_report(input_path: &str, input_bytes: u64) -> Report {
    Report {
        report_version: REPORT_VERSION,
        tool: ToolInfo {
            name: "saplens".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        generated_at: DEFAULT_GENERATED_AT.to_string(),
        input: InputInfo {
            path: input_path.to_string(),
            bytes: input_bytes,
        },
        capture_summary: None,
        sessions: vec![],
        issues: vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_omits_optional_fields_when_none() {
        let mut report = make_stub_report("capture.pcapng", 1);
        report.capture_summary = Some(CaptureSummary {
            packets_total: 1,
            sap_datagrams: 1,
            time_start: None,
            time_end: None,
        });
        report.sessions = vec![SessionSummary {
            origin: "10.0.0.1".to_string(),
            message_id_hash: "0x0001".to_string(),
            sap_version: 1,
            announcements: 1,
            deletions: 0,
            deleted: false,
            payload_type: None,
            payload_status: "plain".to_string(),
            auth_type: None,
            time_first: None,
            time_last: None,
        }];
        report.issues = vec![IssueSummary {
            id: "SAP-TRUNCATED-HEADER".to_string(),
            message: "truncated header: need 8 bytes, got 2".to_string(),
            count: 1,
            examples: vec![],
        }];

        let value = serde_json::to_value(&report).expect("report json");
        let capture = value.get("capture_summary").expect("capture_summary");
        assert!(capture.get("time_start").is_none());
        assert!(capture.get("time_end").is_none());

        let session = &value["sessions"][0];
        assert!(session.get("payload_type").is_none());
        assert!(session.get("auth_type").is_none());
        assert!(session.get("time_first").is_none());

        let issue = &value["issues"][0];
        assert!(issue.get("examples").is_none());
    }
}
