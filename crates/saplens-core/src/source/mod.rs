mod pcap;

pub use pcap::PcapFileSource;

use pcap_parser::Linktype;
use thiserror::Error;

/// One captured frame with its link type and optional timestamp (seconds).
#[derive(Debug, Clone)]
pub struct PacketEvent {
    pub ts: Option<f64>,
    pub linktype: Linktype,
    pub data: Vec<u8>,
}

pub trait PacketSource {
    fn next_packet(&mut self) -> Result<Option<PacketEvent>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("PCAP parse error ({context}): {message}")]
    Pcap {
        context: &'static str,
        message: String,
    },
}
