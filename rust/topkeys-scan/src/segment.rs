//! Splitting of a file into record-aligned segments.
//!
//! A segment starts where the previous one ended and extends at least
//! `nominal_segment_size` bytes, up to and including the first newline found
//! in a small probe window past that point. Segments can therefore be read and
//! parsed independently: no record ever straddles two of them.

use std::path::Path;

use memchr::memchr;
use topkeys_common::{Error, Result, verify_arg, verify_data};
use topkeys_io::{DirectFile, IoMode};

/// A contiguous byte range of the input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Segment {
    pub offset: u64,
    pub length: u64,
}

impl Segment {
    /// Exclusive end offset.
    #[inline]
    pub fn end(&self) -> u64 {
        self.offset + self.length
    }
}

/// Ordered, contiguous, non-overlapping segments covering `[0, file_size)`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentList {
    segments: Vec<Segment>,
    file_size: u64,
}

impl SegmentList {
    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    pub fn as_slice(&self) -> &[Segment] {
        &self.segments
    }

    /// Size of the segmented file.
    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Length of the longest segment (0 for an empty list).
    pub fn max_length(&self) -> u64 {
        self.segments.iter().map(|s| s.length).max().unwrap_or(0)
    }
}

impl<'a> IntoIterator for &'a SegmentList {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

/// Builds the segment list of the file at `path`.
///
/// The file is split into `ceil(file_size / nominal_segment_size)` planned
/// slots. Each segment starts at the end of the previous one; `probe_block_size`
/// bytes are read at `offset + nominal_segment_size` and the segment is extended
/// just past the first newline in that window. A probe that reaches the end of
/// the file (cut short, or ending exactly at `file_size`) means the final
/// segment was reached: it is clamped to the file size and the remaining slots
/// are dropped, so a last record without a trailing newline is kept whole.
///
/// # Errors
///
/// * `Io` if the file cannot be opened, stated or read.
/// * `InvalidArgument` if `probe_block_size` is 0 or exceeds a quarter of
///   `nominal_segment_size`.
/// * `UnsegmentableRecord` if a full probe window contains no newline, i.e. a
///   record is longer than `nominal_segment_size + probe_block_size`.
pub fn build_segments(
    path: &Path,
    nominal_segment_size: u64,
    probe_block_size: u64,
    io_mode: IoMode,
) -> Result<SegmentList> {
    verify_arg!(probe_block_size, probe_block_size > 0);
    verify_arg!(
        nominal_segment_size,
        nominal_segment_size / 4 >= probe_block_size
    );
    let probe_len = usize::try_from(probe_block_size)
        .map_err(|_| Error::invalid_arg("probe_block_size", "exceeds the address space"))?;

    let file = DirectFile::open(path, io_mode)
        .map_err(|e| Error::io(format!("open {}", path.display()), e))?;
    let file_size = file
        .size()
        .map_err(|e| Error::io(format!("stat {}", path.display()), e))?;

    let planned = file_size.div_ceil(nominal_segment_size);
    let mut segments = Vec::with_capacity(usize::try_from(planned).unwrap_or(0));
    let mut probe_buf = file
        .allocate_buffer(probe_len)
        .map_err(|e| Error::io("allocate probe buffer", e))?;

    let mut previous = 0u64;
    for _ in 0..planned {
        if previous >= file_size {
            break;
        }

        let boundary = previous + nominal_segment_size;
        let probe = file
            .read_at_into(boundary, probe_len, &mut probe_buf)
            .map_err(|e| Error::io(format!("probe {} at {boundary}", path.display()), e))?;

        if probe.len() < probe_len || boundary + probe_block_size >= file_size {
            segments.push(Segment {
                offset: previous,
                length: file_size - previous,
            });
            previous = file_size;
            break;
        }

        let Some(local_offset) = memchr(b'\n', probe) else {
            return Err(Error::unsegmentable_record(boundary, probe_block_size));
        };
        let segment = Segment {
            offset: previous,
            length: nominal_segment_size + local_offset as u64 + 1,
        };
        previous = segment.end();
        segments.push(segment);
    }
    verify_data!(segments, previous == file_size);

    log::debug!(
        "{}: {file_size} bytes split into {} segments ({} planned, {} reads)",
        path.display(),
        segments.len(),
        planned,
        file.io_mode()
    );

    Ok(SegmentList {
        segments,
        file_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use topkeys_common::ErrorKind;

    fn write_file(contents: &[u8]) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.txt");
        std::fs::write(&path, contents).unwrap();
        (dir, path)
    }

    fn check_invariants(list: &SegmentList, contents: &[u8], nominal: u64) {
        let mut expected_offset = 0;
        for (i, segment) in list.iter().enumerate() {
            assert_eq!(segment.offset, expected_offset, "segment #{i}");
            assert!(segment.length > 0, "segment #{i} is empty");
            expected_offset = segment.end();
            if i + 1 < list.len() {
                assert!(segment.length >= nominal, "segment #{i} too short");
                assert_eq!(contents[segment.end() as usize - 1], b'\n', "segment #{i}");
            }
        }
        assert_eq!(expected_offset, contents.len() as u64);
        assert_eq!(list.file_size(), contents.len() as u64);
    }

    #[test]
    fn test_empty_file() {
        let (_dir, path) = write_file(b"");
        let list = build_segments(&path, 64, 16, IoMode::Buffered).unwrap();
        assert!(list.is_empty());
        assert_eq!(list.max_length(), 0);
    }

    #[test]
    fn test_file_smaller_than_segment() {
        let contents = b"only 7\n";
        let (_dir, path) = write_file(contents);
        let list = build_segments(&path, 64, 16, IoMode::Buffered).unwrap();
        assert_eq!(list.as_slice(), &[Segment { offset: 0, length: 7 }]);
    }

    #[test]
    fn test_segments_follow_newlines() {
        let mut contents = Vec::new();
        for i in 0..500 {
            contents.extend_from_slice(format!("key-{i} {}\n", i * 7 % 113).as_bytes());
        }
        let (_dir, path) = write_file(&contents);

        for (nominal, probe) in [(64, 16), (100, 25), (256, 64), (4096, 1024)] {
            let list = build_segments(&path, nominal, probe, IoMode::Buffered).unwrap();
            check_invariants(&list, &contents, nominal);
            assert!(list.max_length() <= nominal + probe);
            assert!(list.len() as u64 <= (contents.len() as u64).div_ceil(nominal));
        }
    }

    #[test]
    fn test_boundary_on_newline() {
        // The byte at the tentative boundary (offset 8) is itself the terminator.
        let contents = b"aaaa 123\nbb 4\n";
        let (_dir, path) = write_file(contents);
        let list = build_segments(&path, 8, 2, IoMode::Buffered).unwrap();
        assert_eq!(
            list.as_slice(),
            &[
                Segment { offset: 0, length: 9 },
                Segment { offset: 9, length: 5 },
            ]
        );
        check_invariants(&list, contents, 8);
    }

    #[test]
    fn test_short_probe_clamps_last_segment() {
        // The probe at offset 16 wants 4 bytes but only 2 remain.
        let contents = b"aa 1\nbb 2\ncc 3\ndd\n";
        let (_dir, path) = write_file(contents);
        let list = build_segments(&path, 16, 4, IoMode::Buffered).unwrap();
        assert_eq!(list.as_slice(), &[Segment { offset: 0, length: 18 }]);
        assert_eq!(list.max_length(), 18);
    }

    #[test]
    fn test_window_ending_at_eof_clamps_last_segment() {
        // The 16-byte window at offset 64 is read in full and ends the file
        // without a terminator.
        let mut contents = b"a 1\n".repeat(16);
        contents.extend_from_slice(b"bbbbbbbbbbbbb 99");
        assert_eq!(contents.len(), 80);
        let (_dir, path) = write_file(&contents);

        let list = build_segments(&path, 64, 16, IoMode::Buffered).unwrap();
        assert_eq!(list.as_slice(), &[Segment { offset: 0, length: 80 }]);
        assert!(list.max_length() <= 64 + 16);
    }

    #[test]
    fn test_unsegmentable_record() {
        let mut contents = vec![b'x'; 200];
        contents.extend_from_slice(b" 1\n");
        let (_dir, path) = write_file(&contents);
        let err = build_segments(&path, 64, 16, IoMode::Buffered).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::UnsegmentableRecord {
                offset: 64,
                window: 16
            }
        ));
    }

    #[test]
    fn test_invalid_sizes() {
        let (_dir, path) = write_file(b"a 1\n");
        assert!(build_segments(&path, 63, 16, IoMode::Buffered).is_err());
        assert!(build_segments(&path, 64, 0, IoMode::Buffered).is_err());
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = build_segments(&dir.path().join("nope"), 64, 16, IoMode::Unbuffered)
            .unwrap_err();
        assert!(err.is_io());
    }
}
