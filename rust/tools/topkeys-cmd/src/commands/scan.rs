//! Scan command implementation

use std::io::{self, BufRead, BufWriter, Write};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use topkeys_io::IoMode;
use topkeys_scan::{Entry, ScanConfig, ScanStats, scan_file, scan_sequential};

use crate::utils::{format_size, trim_line_ending, validate_file_exists};

#[derive(Args, Default)]
pub struct ScanArgs {
    /// File to scan (read from the first line of stdin if not specified)
    #[arg(long)]
    pub path: Option<String>,

    /// JSON file with scan settings; flags below override its values
    #[arg(long)]
    pub config: Option<String>,

    /// Number of keys to print
    #[arg(short = 'n', long)]
    pub top_n: Option<usize>,

    /// Number of worker threads
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Nominal segment size in bytes
    #[arg(long)]
    pub segment_size: Option<u64>,

    /// Probe window size in bytes
    #[arg(long)]
    pub probe_size: Option<u64>,

    /// Read mode: `unbuffered` (O_DIRECT) or `buffered`
    #[arg(long)]
    pub io_mode: Option<IoMode>,

    /// Print `key count` instead of the bare key
    #[arg(long)]
    pub with_counts: bool,

    /// Use the single-threaded buffered scanner
    #[arg(long)]
    pub sequential: bool,

    /// Print a JSON summary of the scan to stderr
    #[arg(long, conflicts_with = "sequential")]
    pub stats: bool,
}

#[derive(Serialize)]
struct ScanSummary {
    path: String,
    file_size: String,
    segments: usize,
    workers: usize,
    records: u64,
    bytes_read: u64,
    io_mode: String,
    elapsed_ms: u128,
    throughput_mb_per_sec: f64,
}

impl ScanSummary {
    fn new(path: &str, stats: &ScanStats) -> ScanSummary {
        ScanSummary {
            path: path.to_string(),
            file_size: format_size(stats.file_size),
            segments: stats.segments,
            workers: stats.workers,
            records: stats.records,
            bytes_read: stats.bytes_read,
            io_mode: stats.io_mode.to_string(),
            elapsed_ms: stats.elapsed.as_millis(),
            throughput_mb_per_sec: stats.throughput_mb_per_sec(),
        }
    }
}

pub fn run(args: ScanArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    let path = match &args.path {
        Some(path) => path.clone(),
        None => read_path_line(io::stdin().lock())?,
    };
    validate_file_exists(&path)?;

    let entries = if args.sequential {
        scan_sequential(&path, config.top_n)
            .with_context(|| format!("Sequential scan of {path} failed"))?
    } else {
        let report = scan_file(&path, &config).with_context(|| format!("Scan of {path} failed"))?;
        if args.stats {
            let summary = ScanSummary::new(&path, &report.stats);
            eprintln!("{}", serde_json::to_string_pretty(&summary)?);
        }
        report.entries
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    write_entries(&mut out, &entries, args.with_counts)?;
    out.flush().context("Failed to write results")?;
    Ok(())
}

/// Loads the optional config file and applies the command-line overrides.
fn resolve_config(args: &ScanArgs) -> Result<ScanConfig> {
    let mut config = match &args.config {
        Some(path) => ScanConfig::from_json_file(path)
            .with_context(|| format!("Failed to load config {path}"))?,
        None => ScanConfig::default(),
    };
    if let Some(top_n) = args.top_n {
        config.top_n = top_n;
    }
    if let Some(workers) = args.workers {
        config.worker_pool_size = workers;
    }
    if let Some(segment_size) = args.segment_size {
        config.nominal_segment_size = segment_size;
    }
    if let Some(probe_size) = args.probe_size {
        config.probe_block_size = probe_size;
    }
    if let Some(io_mode) = args.io_mode {
        config.io_mode = io_mode;
    }
    config.validate().context("Invalid scan configuration")?;
    log::debug!("scan config: {config:?}");
    Ok(config)
}

fn read_path_line<R: BufRead>(mut input: R) -> Result<String> {
    let mut line = String::new();
    let n = input
        .read_line(&mut line)
        .context("Failed to read the input path from stdin")?;
    if n == 0 {
        anyhow::bail!("Expected an input path on stdin");
    }
    let path = trim_line_ending(&line);
    if path.is_empty() {
        anyhow::bail!("Empty input path on stdin");
    }
    Ok(path.to_string())
}

fn write_entries<W: Write>(out: &mut W, entries: &[Entry], with_counts: bool) -> Result<()> {
    for entry in entries {
        out.write_all(&entry.key)?;
        if with_counts {
            write!(out, " {}", entry.count)?;
        }
        out.write_all(b"\n")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_path_line() {
        let path = read_path_line(&b"/data/counts.txt\r\nignored\n"[..]).unwrap();
        assert_eq!(path, "/data/counts.txt");
        assert!(read_path_line(&b""[..]).is_err());
        assert!(read_path_line(&b"\n"[..]).is_err());
    }

    #[test]
    fn test_write_entries() {
        let entries = vec![Entry::new("banana", 20), Entry::new("apple", 5)];
        let mut out = Vec::new();
        write_entries(&mut out, &entries, false).unwrap();
        assert_eq!(out, b"banana\napple\n");

        let mut out = Vec::new();
        write_entries(&mut out, &entries, true).unwrap();
        assert_eq!(out, b"banana 20\napple 5\n");
    }

    #[test]
    fn test_resolve_config_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("scan.json");
        std::fs::write(&config_path, r#"{"top_n": 3, "worker_pool_size": 2}"#).unwrap();

        let args = ScanArgs {
            config: Some(config_path.to_str().unwrap().to_string()),
            workers: Some(5),
            io_mode: Some(IoMode::Buffered),
            ..Default::default()
        };
        let config = resolve_config(&args).unwrap();
        assert_eq!(config.top_n, 3);
        assert_eq!(config.worker_pool_size, 5);
        assert_eq!(config.io_mode, IoMode::Buffered);
        assert_eq!(
            config.nominal_segment_size,
            ScanConfig::DEFAULT_NOMINAL_SEGMENT_SIZE
        );
    }

    #[test]
    fn test_resolve_config_rejects_invalid() {
        let args = ScanArgs {
            segment_size: Some(100),
            probe_size: Some(64),
            ..Default::default()
        };
        assert!(resolve_config(&args).is_err());
    }
}
