//! Single-threaded, buffered reference scan.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use topkeys_common::{Error, Result};

use crate::{
    record,
    top_k::{BoundedTopK, Entry},
};

/// Finds the `top_n` highest-count entries by reading the file line by line
/// through the page cache.
///
/// Uses the same record rules and selection structure as the parallel scan;
/// on inputs without tied counts both produce identical results.
pub fn scan_sequential(path: impl AsRef<Path>, top_n: usize) -> Result<Vec<Entry>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| Error::io(format!("open {}", path.display()), e))?;
    let mut reader = BufReader::with_capacity(128 * 1024, file);

    let mut top_k = BoundedTopK::new(top_n);
    let mut line = Vec::new();
    loop {
        line.clear();
        let n = reader
            .read_until(b'\n', &mut line)
            .map_err(|e| Error::io(format!("read {}", path.display()), e))?;
        if n == 0 {
            break;
        }
        record::for_each_record(&line, |key, count| {
            top_k.offer(key, count);
        });
    }
    Ok(top_k.into_descending())
}

#[cfg(test)]
mod tests {
    use super::scan_sequential;

    #[test]
    fn test_sequential_scan() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.txt");
        std::fs::write(&path, "a 3\nb 10\nc 7\nd\ne NaN\n").unwrap();

        let entries = scan_sequential(&path, 2).unwrap();
        let keys: Vec<_> = entries.iter().map(|e| e.key_lossy().into_owned()).collect();
        assert_eq!(keys, vec!["b", "c"]);

        let all = scan_sequential(&path, 10).unwrap();
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(scan_sequential(dir.path().join("missing"), 3).unwrap_err().is_io());
    }
}
