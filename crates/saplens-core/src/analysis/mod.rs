use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::source::{PacketEvent, PacketSource, PcapFileSource, SourceError};
use crate::{CaptureSummary, DEFAULT_GENERATED_AT, Report, SAP_UDP_PORT, make_stub_report};

mod sessions;
mod udp;

use crate::protocols::sap::decode_sap;
use sessions::{
    IssueStats, SessionKey, SessionStats, add_decode_issue, add_sap_message,
    build_issue_summaries, build_session_summaries,
};
use udp::parse_udp_packet;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source error: {0}")]
    Source(#[from] SourceError),
}

pub fn analyze_pcap_file(path: &Path) -> Result<Report, AnalysisError> {
    let source = PcapFileSource::open(path)?;
    analyze_source(path, source)
}

pub fn analyze_source<S: PacketSource>(
    path: &Path,
    mut source: S,
) -> Result<Report, AnalysisError> {
    let mut packets_total = 0u64;
    let mut sap_datagrams = 0u64;
    let mut first_ts = None;
    let mut last_ts = None;
    let mut session_stats: HashMap<SessionKey, SessionStats> = HashMap::new();
    let mut issue_stats: HashMap<&'static str, IssueStats> = HashMap::new();

    while let Some(PacketEvent { ts, linktype, data }) = source.next_packet()? {
        packets_total += 1;
        update_ts_bounds(&mut first_ts, &mut last_ts, ts);
        if let Ok(Some(packet)) = parse_udp_packet(linktype, &data) {
            if packet.dst_port != SAP_UDP_PORT {
                continue;
            }
            sap_datagrams += 1;
            match decode_sap(packet.payload) {
                Ok(msg) => add_sap_message(&mut session_stats, &msg, ts),
                Err(err) => add_decode_issue(&mut issue_stats, &err, &packet, ts),
            }
        }
    }

    let mut report = make_stub_report(&path.display().to_string(), path.metadata()?.len());
    report.capture_summary = Some(CaptureSummary {
        packets_total,
        sap_datagrams,
        time_start: ts_to_rfc3339(first_ts),
        time_end: ts_to_rfc3339(last_ts),
    });
    report.generated_at = report
        .capture_summary
        .as_ref()
        .and_then(|summary| summary.time_end.clone().or(summary.time_start.clone()))
        .unwrap_or_else(|| DEFAULT_GENERATED_AT.to_string());

    report.sessions = build_session_summaries(session_stats);
    report.issues = build_issue_summaries(issue_stats);
    Ok(report)
}

pub(crate) fn update_ts_bounds(first: &mut Option<f64>, last: &mut Option<f64>, ts: Option<f64>) {
    let ts = match ts {
        Some(ts) => ts,
        None => return,
    };
    match first {
        None => *first = Some(ts),
        Some(existing) => {
            if ts < *existing {
                *first = Some(ts);
            }
        }
    }
    match last {
        None => *last = Some(ts),
        Some(existing) => {
            if ts > *existing {
                *last = Some(ts);
            }
        }
    }
}

pub(crate) fn ts_to_rfc3339(ts: Option<f64>) -> Option<String> {
    let ts = ts?;
    let nanos = (ts * 1_000_000_000.0) as i128;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
}
