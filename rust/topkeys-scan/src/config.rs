//! Scan configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use topkeys_common::{Error, Result, verify_arg};
use topkeys_io::IoMode;

/// Tunable parameters of a scan.
///
/// Can be deserialized from JSON; missing fields take their default values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScanConfig {
    /// Number of keys to report.
    pub top_n: usize,
    /// Size of the window read past each tentative segment boundary to find
    /// the next record terminator. Ideally a multiple of the device block size.
    pub probe_block_size: u64,
    /// Minimum length of every segment except the last one.
    /// Must be at least four times `probe_block_size`.
    pub nominal_segment_size: u64,
    /// Number of worker threads.
    pub worker_pool_size: usize,
    /// Preferred read mode. Unbuffered reads fall back to buffered ones when
    /// the file system refuses them.
    pub io_mode: IoMode,
}

impl ScanConfig {
    pub const DEFAULT_TOP_N: usize = 10;
    pub const DEFAULT_PROBE_BLOCK_SIZE: u64 = 512;
    pub const DEFAULT_NOMINAL_SEGMENT_SIZE: u64 = 1024 * 1024;
    pub const DEFAULT_WORKER_POOL_SIZE: usize = 16;

    /// Loads a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<ScanConfig> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::io(format!("read config {}", path.display()), e))?;
        Self::from_json_str(&json)
    }

    /// Parses a configuration from a JSON document.
    pub fn from_json_str(json: &str) -> Result<ScanConfig> {
        serde_json::from_str(json).map_err(|e| Error::invalid_format("scan config", e.to_string()))
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn with_probe_block_size(mut self, probe_block_size: u64) -> Self {
        self.probe_block_size = probe_block_size;
        self
    }

    pub fn with_nominal_segment_size(mut self, nominal_segment_size: u64) -> Self {
        self.nominal_segment_size = nominal_segment_size;
        self
    }

    pub fn with_worker_pool_size(mut self, worker_pool_size: usize) -> Self {
        self.worker_pool_size = worker_pool_size;
        self
    }

    pub fn with_io_mode(mut self, io_mode: IoMode) -> Self {
        self.io_mode = io_mode;
        self
    }

    /// Upper bound on the length of any segment: the nominal size plus the
    /// probe window in which its terminating newline was found.
    pub fn max_segment_len(&self) -> u64 {
        self.nominal_segment_size.saturating_add(self.probe_block_size)
    }

    /// Checks the invariants the segmentation and read paths rely on.
    pub fn validate(&self) -> Result<()> {
        verify_arg!(probe_block_size, self.probe_block_size > 0);
        verify_arg!(
            nominal_segment_size,
            self.nominal_segment_size / 4 >= self.probe_block_size
        );
        verify_arg!(worker_pool_size, self.worker_pool_size >= 1);
        verify_arg!(
            nominal_segment_size,
            usize::try_from(self.max_segment_len()).is_ok()
        );
        Ok(())
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        ScanConfig {
            top_n: Self::DEFAULT_TOP_N,
            probe_block_size: Self::DEFAULT_PROBE_BLOCK_SIZE,
            nominal_segment_size: Self::DEFAULT_NOMINAL_SEGMENT_SIZE,
            worker_pool_size: Self::DEFAULT_WORKER_POOL_SIZE,
            io_mode: IoMode::Unbuffered,
        }
    }
}
