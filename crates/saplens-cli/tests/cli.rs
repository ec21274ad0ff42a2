use assert_cmd::Command;
use etherparse::PacketBuilder;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use serde_json::Value;
use tempfile::TempDir;

fn cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("saplens"))
}

fn udp_frame(dst_port: u16, payload: &[u8]) -> Vec<u8> {
    let builder = PacketBuilder::ethernet2([1, 2, 3, 4, 5, 6], [7, 8, 9, 10, 11, 12])
        .ipv4([192, 168, 1, 1], [224, 2, 127, 254], 64)
        .udp(5004, dst_port);
    let mut frame = Vec::with_capacity(builder.size(payload.len()));
    builder.write(&mut frame, payload).unwrap();
    frame
}

fn sap_announcement() -> Vec<u8> {
    let mut payload = vec![0x20, 0x00, 0x12, 0x34, 192, 168, 1, 1];
    payload.extend_from_slice(b"v=0\r\ns=Demo session\r\n");
    payload
}

/// Legacy PCAP with microsecond timestamps and Ethernet linktype.
fn write_capture(path: &std::path::Path, frames: &[Vec<u8>]) {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&0xa1b2c3d4u32.to_le_bytes());
    bytes.extend_from_slice(&2u16.to_le_bytes());
    bytes.extend_from_slice(&4u16.to_le_bytes());
    bytes.extend_from_slice(&0i32.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.extend_from_slice(&65535u32.to_le_bytes());
    bytes.extend_from_slice(&1u32.to_le_bytes());
    for (index, frame) in frames.iter().enumerate() {
        bytes.extend_from_slice(&(index as u32).to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&(frame.len() as u32).to_le_bytes());
        bytes.extend_from_slice(frame);
    }
    std::fs::write(path, bytes).unwrap();
}

fn sample_capture(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("input.pcap");
    write_capture(&path, &[udp_frame(9875, &sap_announcement())]);
    path
}

fn broken_capture(dir: &TempDir) -> std::path::PathBuf {
    let path = dir.path().join("broken.pcap");
    write_capture(
        &path,
        &[
            udp_frame(9875, &sap_announcement()),
            // Too short for the SAP fixed header.
            udp_frame(9875, &[0x20, 0x00]),
        ],
    );
    path
}

#[test]
fn help_supports_analyse_and_analyze() {
    cmd()
        .arg("pcap")
        .arg("analyse")
        .arg("--help")
        .assert()
        .success();
    cmd()
        .arg("pcap")
        .arg("analyze")
        .arg("--help")
        .assert()
        .success();
}

#[test]
fn missing_input_shows_error_and_hint() {
    let temp = TempDir::new().expect("tempdir");
    let missing = temp.path().join("missing.pcapng");
    let report = temp.path().join("report.json");

    cmd()
        .arg("pcap")
        .arg("analyze")
        .arg(missing)
        .arg("-o")
        .arg(report)
        .assert()
        .failure()
        .stderr(contains("error:").and(contains("hint:")));
}

#[test]
fn unsupported_extension_is_rejected() {
    let temp = TempDir::new().expect("tempdir");
    let input = temp.path().join("capture.txt");
    std::fs::write(&input, b"not a capture").unwrap();
    let report = temp.path().join("report.json");

    cmd()
        .arg("pcap")
        .arg("analyze")
        .arg(input)
        .arg("-o")
        .arg(report)
        .assert()
        .failure()
        .stderr(contains("unsupported input format"));
}

#[test]
fn stdout_outputs_json_with_session() {
    let temp = TempDir::new().expect("tempdir");
    let input = sample_capture(&temp);

    let assert = cmd()
        .arg("pcap")
        .arg("analyze")
        .arg(input)
        .arg("--stdout")
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8 stdout");
    let value: Value = serde_json::from_str(&stdout).expect("valid json");
    assert_eq!(value["sessions"][0]["origin"], "192.168.1.1");
    assert_eq!(value["sessions"][0]["message_id_hash"], "0x1234");
}

#[test]
fn report_file_written() {
    let temp = TempDir::new().expect("tempdir");
    let input = sample_capture(&temp);
    let report = temp.path().join("report.json");

    cmd()
        .arg("pcap")
        .arg("analyze")
        .arg(input)
        .arg("-o")
        .arg(&report)
        .assert()
        .success()
        .stderr(contains("OK:"));

    let value: Value =
        serde_json::from_str(&std::fs::read_to_string(&report).unwrap()).expect("valid json");
    assert_eq!(value["report_version"], 1);
    assert_eq!(value["sessions"][0]["payload_status"], "plain");
}

#[test]
fn stdout_and_report_conflict() {
    let temp = TempDir::new().expect("tempdir");
    let input = sample_capture(&temp);
    let report = temp.path().join("report.json");

    cmd()
        .arg("pcap")
        .arg("analyze")
        .arg(input)
        .arg("--stdout")
        .arg("-o")
        .arg(report)
        .assert()
        .failure()
        .stderr(contains("error:"));
}

#[test]
fn pretty_and_compact_conflict() {
    let temp = TempDir::new().expect("tempdir");
    let input = sample_capture(&temp);
    let report = temp.path().join("report.json");

    cmd()
        .arg("pcap")
        .arg("analyze")
        .arg(input)
        .arg("-o")
        .arg(report)
        .arg("--pretty")
        .arg("--compact")
        .assert()
        .failure()
        .stderr(contains("error:"));
}

#[test]
fn quiet_suppresses_ok_message() {
    let temp = TempDir::new().expect("tempdir");
    let input = sample_capture(&temp);
    let report = temp.path().join("report.json");

    cmd()
        .arg("pcap")
        .arg("analyze")
        .arg(input)
        .arg("-o")
        .arg(report)
        .arg("--quiet")
        .assert()
        .success()
        .stderr(contains("OK:").not());
}

#[test]
fn list_issues_outputs_ids() {
    let temp = TempDir::new().expect("tempdir");
    let input = broken_capture(&temp);
    let report = temp.path().join("report.json");

    cmd()
        .arg("pcap")
        .arg("analyze")
        .arg(input)
        .arg("-o")
        .arg(report)
        .arg("--list-issues")
        .assert()
        .success()
        .stderr(contains("Decode issues:").and(contains("SAP-TRUNCATED-HEADER")));
}

#[test]
fn strict_fails_when_issues_present() {
    let temp = TempDir::new().expect("tempdir");
    let input = broken_capture(&temp);
    let report = temp.path().join("report.json");

    cmd()
        .arg("pcap")
        .arg("analyze")
        .arg(input)
        .arg("-o")
        .arg(report)
        .arg("--strict")
        .assert()
        .failure()
        .stderr(contains("decode issues detected"));
}

#[test]
fn strict_passes_on_clean_capture() {
    let temp = TempDir::new().expect("tempdir");
    let input = sample_capture(&temp);
    let report = temp.path().join("report.json");

    cmd()
        .arg("pcap")
        .arg("analyze")
        .arg(input)
        .arg("-o")
        .arg(report)
        .arg("--strict")
        .assert()
        .success();
}
