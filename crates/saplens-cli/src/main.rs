use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use glob::glob;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("SAPLENS_BUILD_COMMIT"),
    ", ",
    env!("SAPLENS_BUILD_DATE"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "saplens")]
#[command(version, long_version = LONG_VERSION)]
#[command(
    about = "Offline analyzer for SAP (RFC 2974) session announcements in network captures.",
    long_about = None,
    after_help = "Examples:\n  saplens analyse capture.pcapng -o report.json\n  saplens analyze capture.pcap -o report.json\n  saplens pcap analyse capture.pcapng --report report.json"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Operations on PCAP/PCAPNG inputs (offline-first).
    Pcap {
        #[command(subcommand)]
        command: PcapCommands,
    },
}

#[derive(Subcommand, Debug)]
enum PcapCommands {
    /// Analyse a capture file and generate a versioned JSON report of SAP sessions.
    #[command(alias = "analyze")]
    #[command(
        after_help = "Examples:\n  saplens pcap analyse capture.pcapng -o report.json\n  saplens pcap analyze capture.pcap --stdout"
    )]
    Analyse {
        /// Path to a .pcap or .pcapng file
        input: PathBuf,

        /// Output report path (JSON)
        #[arg(short = 'o', long, required_unless_present = "stdout")]
        report: Option<PathBuf>,

        /// Write JSON report to stdout
        #[arg(long, conflicts_with = "report")]
        stdout: bool,

        /// Pretty-print JSON output
        #[arg(long, conflicts_with = "compact")]
        pretty: bool,

        /// Compact JSON output (default)
        #[arg(long)]
        compact: bool,

        /// Suppress non-error output
        #[arg(long)]
        quiet: bool,

        /// Exit with a non-zero code if decode issues are present
        #[arg(long)]
        strict: bool,

        /// List decode issues after analysis
        #[arg(long)]
        list_issues: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Pcap { command } => match command {
            PcapCommands::Analyse {
                input,
                report,
                stdout,
                pretty,
                compact,
                quiet,
                strict,
                list_issues,
            } => cmd_pcap_analyse(
                input,
                report,
                stdout,
                pretty,
                compact,
                quiet,
                strict,
                list_issues,
            ),
        },
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(err.to_string(), None)
    }
}

fn cmd_pcap_analyse(
    input: PathBuf,
    report: Option<PathBuf>,
    stdout: bool,
    pretty: bool,
    compact: bool,
    quiet: bool,
    strict: bool,
    list_issues: bool,
) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(&input)?;
    validate_input_file(&resolved_input)?;
    let input_abs = fs::canonicalize(&resolved_input)
        .with_context(|| format!("Failed to resolve input path: {}", resolved_input.display()))?;

    let report = if stdout {
        None
    } else {
        Some(report.ok_or_else(|| {
            CliError::new(
                "missing output path",
                Some("use -o/--report or --stdout".to_string()),
            )
        })?)
    };

    if let Some(report_path) = report.as_ref() {
        if report_target(report_path)? == Some(input_abs) {
            return Err(CliError::new(
                format!(
                    "report path must differ from input: {}",
                    report_path.display()
                ),
                Some("choose a different output path".to_string()),
            ));
        }
    }

    let rep = saplens_core::analyze_pcap_file(&resolved_input)
        .context("PCAP/PCAPNG analysis failed")?;
    let json = serialize_report(&rep, pretty, compact)?;

    if let Some(report) = report {
        if let Some(parent) = report.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create output directory: {}", parent.display())
                })?;
            }
        }
        fs::write(&report, json)
            .with_context(|| format!("Failed to write report: {}", report.display()))?;
        if !quiet {
            eprintln!("OK: report written -> {}", report.display());
        }
    } else {
        print!("{}", json);
    }

    if list_issues && !quiet {
        print_issues(&rep);
    }
    if strict && !rep.issues.is_empty() {
        return Err(CliError::new(
            "decode issues detected",
            Some("use --list-issues to inspect".to_string()),
        ));
    }
    Ok(())
}

/// Resolve where the report would land, for comparison against the input.
fn report_target(report_path: &PathBuf) -> Result<Option<PathBuf>, CliError> {
    let parent = match report_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let parent_abs = match fs::canonicalize(&parent) {
        Ok(parent_abs) => parent_abs,
        // Output directory does not exist yet, so it cannot be the input.
        Err(_) => return Ok(None),
    };
    let file_name = report_path
        .file_name()
        .ok_or_else(|| CliError::new("Invalid report path", None))?;
    Ok(Some(parent_abs.join(file_name)))
}

fn serialize_report(
    rep: &saplens_core::Report,
    pretty: bool,
    compact: bool,
) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    if pretty {
        serde_json::to_string_pretty(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    } else {
        serde_json::to_string(rep)
            .context("JSON serialization failed")
            .map_err(Into::into)
    }
}

fn print_issues(rep: &saplens_core::Report) {
    eprintln!("Decode issues:");
    for issue in &rep.issues {
        eprintln!("  {} ({})", issue.id, issue.count);
    }
}

fn validate_input_file(input: &PathBuf) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("use a .pcap or .pcapng file".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("use a .pcap or .pcapng file".to_string()),
        ));
    }
    let ext = input
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();
    if ext != "pcap" && ext != "pcapng" {
        return Err(CliError::new(
            format!("unsupported input format '{}'", input.display()),
            Some("expected a .pcap or .pcapng file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &PathBuf) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.clone());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    match matches.len() {
        0 => Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern; expected .pcap or .pcapng".to_string()),
        )),
        1 => Ok(matches.remove(0)),
        count => Err(CliError::new(
            format!("multiple files match pattern '{}' ({} matches)", pattern, count),
            Some("pass a single capture file, or run once per file".to_string()),
        )),
    }
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
