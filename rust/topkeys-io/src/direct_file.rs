//! Positional reads of arbitrary byte ranges over an unbuffered file handle.
//!
//! `DirectFile` opens a file for reading:
//! - On Linux with `O_DIRECT`
//! - On Windows with `FILE_FLAG_NO_BUFFERING`
//!
//! Unbuffered handles only accept requests whose file offset, transfer size and
//! buffer address are multiples of the device block size. Callers ask for any
//! `[pos, pos + len)` range; `DirectFile` widens it to the enclosing aligned
//! window, reads that window into a caller-owned [`AlignedBuf`] and hands back
//! the requested sub-slice. Buffered handles use an alignment of 1, so the
//! window is exactly the requested range.
//!
//! # Example
//!
//! ```rust,no_run
//! use topkeys_io::{DirectFile, IoMode};
//!
//! let file = DirectFile::open("counts.txt", IoMode::Unbuffered).expect("open");
//! let mut buf = file.allocate_buffer(1024).expect("buffer");
//! let bytes = file.read_at_into(10, 1024, &mut buf).expect("read");
//! println!("read {} bytes in {} mode", bytes.len(), file.io_mode());
//! ```
//!
//! # Platform Notes
//!
//! A conservative 4 KiB alignment is used for unbuffered handles; it is a
//! multiple of every common logical block size (512 B and 4 KiB). If the file
//! system refuses the unbuffered open, the file is reopened buffered (see
//! [`crate::fs::open_with_fallback`]).

use std::{fs::File, path::Path, sync::OnceLock};

use crate::{
    AlignedBuf, IoMode,
    align::{align_down_u64, align_up_u64, aligned_window_capacity},
};

/// A read-only file wrapper that issues aligned positional reads.
pub struct DirectFile {
    file: File,
    io_mode: IoMode,
    size: OnceLock<u64>,
}

impl DirectFile {
    /// Alignment of offsets, sizes and buffers for unbuffered handles.
    pub const UNBUFFERED_ALIGNMENT: usize = 4096;

    /// Opens an existing file for reading, preferring `io_mode`.
    ///
    /// # Returns
    /// * `Ok(DirectFile)` if the file was opened, possibly in buffered mode when
    ///   unbuffered access was refused; see [`DirectFile::io_mode`]
    /// * `Err(std::io::Error)` if the file could not be opened at all
    pub fn open<P: AsRef<Path>>(path: P, io_mode: IoMode) -> std::io::Result<DirectFile> {
        let (file, io_mode) = crate::fs::open_with_fallback(path.as_ref(), io_mode)?;
        Ok(DirectFile {
            file,
            io_mode,
            size: OnceLock::new(),
        })
    }

    /// Returns the I/O mode in effect for this handle.
    pub fn io_mode(&self) -> IoMode {
        self.io_mode
    }

    /// Returns the alignment requirement for reads through this handle.
    pub fn alignment(&self) -> usize {
        match self.io_mode {
            IoMode::Buffered => 1,
            IoMode::Unbuffered => Self::UNBUFFERED_ALIGNMENT,
        }
    }

    /// Returns the file size, queried once and cached.
    pub fn size(&self) -> std::io::Result<u64> {
        if let Some(&size) = self.size.get() {
            Ok(size)
        } else {
            let size = self.file.metadata()?.len();
            let _ = self.size.set(size);
            Ok(size)
        }
    }

    /// Allocates a buffer able to serve [`DirectFile::read_at_into`] for any
    /// range of up to `max_len` bytes.
    pub fn allocate_buffer(&self, max_len: usize) -> std::io::Result<AlignedBuf> {
        let alignment = self.alignment();
        AlignedBuf::zeroed(
            aligned_window_capacity(max_len, alignment),
            alignment.max(std::mem::align_of::<u64>()),
        )
    }

    /// Checks if a buffer and offset are properly aligned for this handle.
    pub fn is_aligned(&self, buffer_ptr: *const u8, offset: u64, length: usize) -> bool {
        let alignment = self.alignment();
        (buffer_ptr as usize) % alignment == 0
            && offset % alignment as u64 == 0
            && length % alignment == 0
    }

    /// Reads the range `[pos, pos + len)` and returns it as a slice of `buf`.
    ///
    /// The returned slice is shorter than `len` only when the range extends
    /// past the end of the file. The underlying request always covers the
    /// aligned window around the range, so `buf` must be aligned to
    /// [`DirectFile::alignment`] and large enough for that window (see
    /// [`DirectFile::allocate_buffer`]).
    pub fn read_at_into<'a>(
        &self,
        pos: u64,
        len: usize,
        buf: &'a mut AlignedBuf,
    ) -> std::io::Result<&'a [u8]> {
        if len == 0 {
            return Ok(&buf[..0]);
        }

        let alignment = self.alignment();
        let window_start = align_down_u64(pos, alignment as u64);
        let window_end = align_up_u64(pos + len as u64, alignment as u64);
        let window_len = (window_end - window_start) as usize;

        if window_len > buf.len() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!(
                    "read window of {window_len} bytes exceeds the {} byte buffer",
                    buf.len()
                ),
            ));
        }
        if buf.alignment() % alignment != 0 {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!(
                    "buffer alignment {} does not satisfy the required {alignment}",
                    buf.alignment()
                ),
            ));
        }
        debug_assert!(self.is_aligned(buf.as_ptr(), window_start, window_len));

        let read = crate::file::file_read_at(
            &self.file,
            window_start,
            &mut buf[..window_len],
            alignment,
        )?;

        let head = (pos - window_start) as usize;
        let available = read.saturating_sub(head).min(len);
        Ok(&buf[head..head + available])
    }

    /// Reads exactly `len` bytes at `pos`, failing with `UnexpectedEof` if the
    /// file ends before the range does.
    pub fn read_exact_at_into<'a>(
        &self,
        pos: u64,
        len: usize,
        buf: &'a mut AlignedBuf,
    ) -> std::io::Result<&'a [u8]> {
        let bytes = self.read_at_into(pos, len, buf)?;
        if bytes.len() != len {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!(
                    "expected {len} bytes at offset {pos}, the file provided {}",
                    bytes.len()
                ),
            ));
        }
        Ok(bytes)
    }
}

impl std::fmt::Debug for DirectFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectFile")
            .field("io_mode", &self.io_mode)
            .field("size", &self.size.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_file(len: usize) -> (TempDir, std::path::PathBuf, Vec<u8>) {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file_path = temp_dir.path().join("sample.bin");
        let data: Vec<u8> = (0..len).map(|i| (i % 251) as u8).collect();
        std::fs::write(&file_path, &data).expect("Failed to write test file");
        (temp_dir, file_path, data)
    }

    #[test]
    fn test_direct_file_open() {
        let (_dir, path, data) = sample_file(100);
        let direct_file = DirectFile::open(&path, IoMode::Unbuffered).expect("open");
        assert_eq!(direct_file.size().unwrap(), data.len() as u64);
        match direct_file.io_mode() {
            IoMode::Unbuffered => assert_eq!(direct_file.alignment(), 4096),
            IoMode::Buffered => assert_eq!(direct_file.alignment(), 1),
        }
    }

    #[test]
    fn test_unaligned_ranges() {
        let (_dir, path, data) = sample_file(3 * 4096 + 17);
        for mode in [IoMode::Buffered, IoMode::Unbuffered] {
            let file = DirectFile::open(&path, mode).expect("open");
            let mut buf = file.allocate_buffer(5000).expect("buffer");

            fastrand::seed(7);
            for _ in 0..200 {
                let pos = fastrand::u64(0..data.len() as u64);
                let len = fastrand::usize(0..5000);
                let bytes = file.read_at_into(pos, len, &mut buf).expect("read");
                let end = (pos as usize + len).min(data.len());
                assert_eq!(bytes, &data[pos as usize..end], "pos {pos} len {len}");
            }
        }
    }

    #[test]
    fn test_read_exact_past_eof() {
        let (_dir, path, _) = sample_file(1000);
        let file = DirectFile::open(&path, IoMode::Buffered).expect("open");
        let mut buf = file.allocate_buffer(64).expect("buffer");

        assert_eq!(file.read_exact_at_into(990, 10, &mut buf).unwrap().len(), 10);
        let err = file.read_exact_at_into(990, 20, &mut buf).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
        assert!(file.read_at_into(2000, 10, &mut buf).unwrap().is_empty());
    }

    #[test]
    fn test_buffer_too_small() {
        let (_dir, path, _) = sample_file(1000);
        let file = DirectFile::open(&path, IoMode::Buffered).expect("open");
        let mut buf = file.allocate_buffer(16).expect("buffer");
        let err = file.read_at_into(0, 500, &mut buf).unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidInput);
    }
}
