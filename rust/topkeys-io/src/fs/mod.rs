#[cfg_attr(any(unix, target_os = "redox", target_os = "wasi"), path = "unix.rs")]
#[cfg_attr(windows, path = "windows.rs")]
mod platform;

use std::path::Path;

pub use platform::*;

/// How a file is opened for reading.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum IoMode {
    /// Reads go through the operating system page cache.
    Buffered,
    /// Reads bypass the page cache; offsets, lengths and buffer addresses
    /// must be aligned to the storage block size.
    #[default]
    Unbuffered,
}

impl std::fmt::Display for IoMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IoMode::Buffered => f.write_str("buffered"),
            IoMode::Unbuffered => f.write_str("unbuffered"),
        }
    }
}

impl std::str::FromStr for IoMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "buffered" => Ok(IoMode::Buffered),
            "unbuffered" | "direct" => Ok(IoMode::Unbuffered),
            other => Err(format!("unknown io mode '{other}'")),
        }
    }
}

/// Opens an existing file for reading, preferring `io_mode`.
///
/// If unbuffered access is requested but refused (the file system does not
/// support it, e.g. tmpfs), the file is reopened in buffered mode.
///
/// Returns the file handle together with the mode that is actually in effect.
pub fn open_with_fallback(
    file_path: &Path,
    io_mode: IoMode,
) -> std::io::Result<(std::fs::File, IoMode)> {
    match open(file_path, io_mode) {
        Ok(file) => Ok((file, io_mode)),
        Err(e) if io_mode == IoMode::Unbuffered && e.kind() != std::io::ErrorKind::NotFound => {
            log::warn!(
                "unbuffered open of {} failed ({e}), falling back to buffered reads",
                file_path.display()
            );
            open(file_path, IoMode::Buffered).map(|file| (file, IoMode::Buffered))
        }
        Err(e) => Err(e),
    }
}
