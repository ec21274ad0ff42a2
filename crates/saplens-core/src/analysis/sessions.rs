use std::collections::HashMap;
use std::net::IpAddr;

use crate::protocols::sap::{AuthType, MessageKind, PayloadStatus, SapError, SapMessage};
use crate::{IssueSummary, SessionSummary};

use super::udp::UdpPacket;
use super::{ts_to_rfc3339, update_ts_bounds};

/// Sessions are identified by originating source and message-ID hash.
pub(crate) type SessionKey = (IpAddr, u16);

#[derive(Debug)]
pub(crate) struct SessionStats {
    sap_version: u8,
    announcements: u64,
    deletions: u64,
    deleted: bool,
    payload_type: Option<String>,
    payload_status: PayloadStatus,
    auth_type: Option<AuthType>,
    first_ts: Option<f64>,
    last_ts: Option<f64>,
}

pub(crate) fn add_sap_message(
    stats: &mut HashMap<SessionKey, SessionStats>,
    msg: &SapMessage,
    ts: Option<f64>,
) {
    let entry = stats
        .entry((msg.originating_source, msg.message_id_hash))
        .or_insert(SessionStats {
            sap_version: msg.version,
            announcements: 0,
            deletions: 0,
            deleted: false,
            payload_type: None,
            payload_status: msg.payload_status,
            auth_type: None,
            first_ts: None,
            last_ts: None,
        });

    match msg.message_kind {
        MessageKind::Announcement => {
            entry.announcements += 1;
            // A re-announcement revives a deleted session.
            entry.deleted = false;
        }
        MessageKind::Deletion => {
            entry.deletions += 1;
            entry.deleted = true;
        }
    }
    entry.sap_version = msg.version;
    entry.payload_status = msg.payload_status;
    if let Some(payload_type) = &msg.payload_type {
        entry.payload_type = Some(payload_type.clone());
    }
    if let Some(auth) = &msg.authentication {
        entry.auth_type = Some(auth.auth_type);
    }
    update_ts_bounds(&mut entry.first_ts, &mut entry.last_ts, ts);
}

pub(crate) fn build_session_summaries(
    stats: HashMap<SessionKey, SessionStats>,
) -> Vec<SessionSummary> {
    let mut entries: Vec<_> = stats.into_iter().collect();
    entries.sort_by_key(|((origin, hash), _)| (*origin, *hash));

    entries
        .into_iter()
        .map(|((origin, hash), stats)| SessionSummary {
            origin: origin.to_string(),
            message_id_hash: format!("0x{:04x}", hash),
            sap_version: stats.sap_version,
            announcements: stats.announcements,
            deletions: stats.deletions,
            deleted: stats.deleted,
            payload_type: stats.payload_type,
            payload_status: payload_status_label(stats.payload_status).to_string(),
            auth_type: stats.auth_type.map(auth_type_label),
            time_first: ts_to_rfc3339(stats.first_ts),
            time_last: ts_to_rfc3339(stats.last_ts),
        })
        .collect()
}

fn payload_status_label(status: PayloadStatus) -> &'static str {
    match status {
        PayloadStatus::Plain => "plain",
        PayloadStatus::Encrypted => "encrypted",
        PayloadStatus::Compressed => "compressed",
        PayloadStatus::EncryptedAndCompressed => "encrypted+compressed",
    }
}

fn auth_type_label(auth_type: AuthType) -> String {
    match auth_type {
        AuthType::Pgp => "pgp".to_string(),
        AuthType::Cms => "cms".to_string(),
        AuthType::Unknown(raw) => format!("unknown({})", raw),
    }
}

const MAX_ISSUE_EXAMPLES: usize = 3;

#[derive(Debug, Default)]
pub(crate) struct IssueStats {
    message: String,
    count: u64,
    examples: Vec<String>,
}

pub(crate) fn add_decode_issue(
    issues: &mut HashMap<&'static str, IssueStats>,
    err: &SapError,
    packet: &UdpPacket<'_>,
    ts: Option<f64>,
) {
    let entry = issues.entry(issue_id(err)).or_default();
    if entry.count == 0 {
        entry.message = err.to_string();
    }
    entry.count += 1;
    if entry.examples.len() < MAX_ISSUE_EXAMPLES {
        let ts = ts_to_rfc3339(ts).unwrap_or_else(|| "unknown".to_string());
        entry.examples.push(format!(
            "source {} -> {} @ {}",
            format_endpoint(packet.src_ip, packet.src_port),
            format_endpoint(packet.dst_ip, packet.dst_port),
            ts
        ));
    }
}

fn issue_id(err: &SapError) -> &'static str {
    match err {
        SapError::TruncatedHeader { .. } => "SAP-TRUNCATED-HEADER",
        SapError::TruncatedAuthHeader { .. } => "SAP-TRUNCATED-AUTH",
        SapError::MalformedAuthHeader { .. } => "SAP-MALFORMED-AUTH",
        SapError::MalformedPayloadType { .. } => "SAP-MALFORMED-PAYLOAD-TYPE",
    }
}

pub(crate) fn build_issue_summaries(
    issues: HashMap<&'static str, IssueStats>,
) -> Vec<IssueSummary> {
    let mut summaries: Vec<IssueSummary> = issues
        .into_iter()
        .map(|(id, stats)| IssueSummary {
            id: id.to_string(),
            message: stats.message,
            count: stats.count,
            examples: stats.examples,
        })
        .collect();

    summaries.sort_by(|a, b| a.id.cmp(&b.id));
    summaries
}

fn format_endpoint(ip: IpAddr, port: u16) -> String {
    match ip {
        IpAddr::V4(addr) => format!("{}:{}", addr, port),
        IpAddr::V6(addr) => format!("[{}]:{}", addr, port),
    }
}
