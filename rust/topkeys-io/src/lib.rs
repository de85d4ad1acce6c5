//! Unbuffered positional file reading:
//! - `IoMode` and platform-specific `fs::open` (O_DIRECT / FILE_FLAG_NO_BUFFERING).
//! - `AlignedBuf`: heap buffer with a guaranteed address alignment.
//! - `DirectFile`: positional reads of arbitrary byte ranges, issued as aligned
//!   requests against the underlying handle.

pub mod align;
pub mod aligned_buf;
pub mod direct_file;
pub mod file;
pub mod fs;

pub use aligned_buf::AlignedBuf;
pub use direct_file::DirectFile;
pub use fs::IoMode;
