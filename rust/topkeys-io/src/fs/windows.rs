//! Windows-specific file system operations.
//!
//! Unbuffered mode maps to `FILE_FLAG_NO_BUFFERING`.

use std::{fs::OpenOptions, path::Path};

use crate::fs::IoMode;

/// Opens an existing file for reading with the specified I/O mode.
///
/// # I/O Modes
///
/// * [`IoMode::Buffered`] - Uses Windows' standard file caching
/// * [`IoMode::Unbuffered`] - Uses `FILE_FLAG_NO_BUFFERING` for direct I/O
///
/// # Platform Notes
///
/// `FILE_FLAG_NO_BUFFERING` requires sector-aligned buffers, offsets and sizes.
pub fn open(file_path: &Path, io_mode: IoMode) -> std::io::Result<std::fs::File> {
    use std::os::windows::fs::OpenOptionsExt;
    use windows_sys::Win32::Storage::FileSystem::{
        FILE_FLAG_NO_BUFFERING, FILE_FLAG_SEQUENTIAL_SCAN,
    };

    let mut options = OpenOptions::new();
    options.read(true);

    match io_mode {
        IoMode::Buffered => {
            options.custom_flags(FILE_FLAG_SEQUENTIAL_SCAN);
        }
        IoMode::Unbuffered => {
            options.custom_flags(FILE_FLAG_NO_BUFFERING);
        }
    }
    options.open(file_path)
}
