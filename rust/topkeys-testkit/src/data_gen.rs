//! Data generation utilities for testing.
//!
//! All generators are seeded, so a given `(count, seed)` pair always yields
//! byte-identical output.

use std::{
    fs::File,
    io::{BufWriter, Seek, SeekFrom, Write},
    path::Path,
};

/// Seed used when the caller has no preference.
pub const DEFAULT_SEED: u64 = 42;

/// Returns the key of item `index`, shared by all generators.
pub fn item_key(index: usize) -> String {
    format!("http://api.tech.com/item/{index}")
}

/// Writes `count` records `http://api.tech.com/item/{i} {c}`, where each `c`
/// is drawn uniformly from `[1, count]`. Counts may repeat.
pub fn write_counts<W: Write>(writer: W, count: usize, seed: u64) -> std::io::Result<()> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut writer = BufWriter::with_capacity(128 * 1024, writer);
    for i in 0..count {
        let c = rng.u64(1..=count as u64);
        writeln!(writer, "{} {c}", item_key(i))?;
    }
    writer.flush()
}

/// Writes `count` records whose counts are a shuffled permutation of
/// `1..=count`, so no two records share a count.
pub fn write_distinct_counts<W: Write>(writer: W, count: usize, seed: u64) -> std::io::Result<()> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut counts: Vec<u64> = (1..=count as u64).collect();
    rng.shuffle(&mut counts);

    let mut writer = BufWriter::with_capacity(128 * 1024, writer);
    for (i, c) in counts.into_iter().enumerate() {
        writeln!(writer, "{} {c}", item_key(i))?;
    }
    writer.flush()
}

/// Writes the given `(key, count)` records, one per line.
pub fn write_records<W: Write>(writer: W, records: &[(&str, u64)]) -> std::io::Result<()> {
    let mut writer = BufWriter::new(writer);
    for (key, count) in records {
        writeln!(writer, "{key} {count}")?;
    }
    writer.flush()
}

/// Generates a `write_counts` file at `path`.
pub fn generate_counts_at(path: &Path, count: usize, seed: u64) -> anyhow::Result<()> {
    write_counts(File::create(path)?, count, seed)?;
    Ok(())
}

/// Generates a `write_counts` file as a temporary file.
pub fn generate_counts_file(count: usize, seed: u64) -> anyhow::Result<tempfile::NamedTempFile> {
    temp_file_with(|file| write_counts(file, count, seed))
}

/// Generates a `write_distinct_counts` file as a temporary file.
pub fn generate_distinct_counts_file(
    count: usize,
    seed: u64,
) -> anyhow::Result<tempfile::NamedTempFile> {
    temp_file_with(|file| write_distinct_counts(file, count, seed))
}

/// Creates a temporary file holding the given records.
pub fn records_file(records: &[(&str, u64)]) -> anyhow::Result<tempfile::NamedTempFile> {
    temp_file_with(|file| write_records(file, records))
}

/// Creates a temporary file holding `contents` verbatim.
pub fn bytes_file(contents: &[u8]) -> anyhow::Result<tempfile::NamedTempFile> {
    temp_file_with(|file| file.write_all(contents))
}

fn temp_file_with<F>(fill: F) -> anyhow::Result<tempfile::NamedTempFile>
where
    F: FnOnce(&mut File) -> std::io::Result<()>,
{
    let mut file = tempfile::NamedTempFile::new()?;
    fill(file.as_file_mut())?;
    file.as_file_mut().sync_all()?;
    file.seek(SeekFrom::Start(0))?;
    Ok(file)
}
