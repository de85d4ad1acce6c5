//! Segments command implementation

use std::{
    io::{self, BufWriter, Write},
    path::Path,
};

use anyhow::{Context, Result};
use topkeys_io::{DirectFile, IoMode};
use topkeys_scan::{ScanConfig, SegmentList, build_segments};

use crate::utils::{format_size, preview, validate_file_exists};

pub fn run(
    segment_size: Option<u64>,
    probe_size: Option<u64>,
    buffered: bool,
    preview_len: usize,
    path: String,
) -> Result<()> {
    validate_file_exists(&path)?;
    let io_mode = if buffered {
        IoMode::Buffered
    } else {
        IoMode::Unbuffered
    };
    let config = ScanConfig::default()
        .with_nominal_segment_size(segment_size.unwrap_or(ScanConfig::DEFAULT_NOMINAL_SEGMENT_SIZE))
        .with_probe_block_size(probe_size.unwrap_or(ScanConfig::DEFAULT_PROBE_BLOCK_SIZE))
        .with_io_mode(io_mode);
    config.validate().context("Invalid segment settings")?;

    let segments = build_segments(
        Path::new(&path),
        config.nominal_segment_size,
        config.probe_block_size,
        config.io_mode,
    )
    .with_context(|| format!("Failed to segment {path}"))?;

    let file = DirectFile::open(&path, io_mode).with_context(|| format!("Failed to open {path}"))?;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    print_segments(&mut out, &file, &segments, preview_len)?;
    out.flush()?;
    Ok(())
}

fn print_segments<W: Write>(
    out: &mut W,
    file: &DirectFile,
    segments: &SegmentList,
    preview_len: usize,
) -> Result<()> {
    writeln!(
        out,
        "{} segments, file size {}, largest segment {}",
        segments.len(),
        format_size(segments.file_size()),
        format_size(segments.max_length())
    )?;
    let mut buf = file.allocate_buffer(preview_len)?;
    for (i, segment) in segments.iter().enumerate() {
        let len = preview_len.min(segment.length as usize);
        let head = file
            .read_at_into(segment.offset, len, &mut buf)
            .with_context(|| format!("Failed to read segment #{i}"))?;
        writeln!(
            out,
            "[{i}] = {{{}, {}}} -> {}",
            segment.offset,
            segment.length,
            preview(head, preview_len)
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_print_segments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.txt");
        let mut contents = String::new();
        for i in 0..40 {
            contents.push_str(&format!("key{i:02} {i}\n"));
        }
        std::fs::write(&path, &contents).unwrap();

        let segments = build_segments(&path, 128, 32, IoMode::Buffered).unwrap();
        let file = DirectFile::open(&path, IoMode::Buffered).unwrap();
        let mut out = Vec::new();
        print_segments(&mut out, &file, &segments, 6).unwrap();

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with(&format!("{} segments", segments.len())));
        let first = lines.next().unwrap();
        assert!(first.starts_with(&format!("[0] = {{0, {}}}", segments.as_slice()[0].length)));
        assert!(first.ends_with("-> key00 "));
        assert_eq!(text.lines().count(), segments.len() + 1);
    }
}
