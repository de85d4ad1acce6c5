//! Unix-specific file system operations.
//!
//! Unbuffered mode maps to the `O_DIRECT` flag where the platform has one.

use std::{fs::OpenOptions, path::Path};

use crate::fs::IoMode;

/// Opens an existing file for reading with the specified I/O mode.
///
/// # I/O Modes
///
/// * [`IoMode::Buffered`] - Uses the system's page cache for I/O operations
/// * [`IoMode::Unbuffered`] - Uses direct I/O (`O_DIRECT`), bypassing the page cache
///
/// # Platform Notes
///
/// `O_DIRECT` requires the buffer address, file offset and transfer size to be
/// aligned to the file system block size, and is not supported by every file
/// system. On targets without `O_DIRECT` unbuffered mode is rejected with
/// `ErrorKind::Unsupported`.
pub fn open(file_path: &Path, io_mode: IoMode) -> std::io::Result<std::fs::File> {
    let mut options = OpenOptions::new();
    options.read(true);

    match io_mode {
        IoMode::Buffered => (),
        IoMode::Unbuffered => set_direct(&mut options)?,
    }
    options.open(file_path)
}

#[cfg(any(target_os = "linux", target_os = "android", target_os = "freebsd"))]
fn set_direct(options: &mut OpenOptions) -> std::io::Result<()> {
    use std::os::unix::fs::OpenOptionsExt;
    options.custom_flags(libc::O_DIRECT);
    Ok(())
}

#[cfg(not(any(target_os = "linux", target_os = "android", target_os = "freebsd")))]
fn set_direct(_options: &mut OpenOptions) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "O_DIRECT is not available on this platform",
    ))
}
