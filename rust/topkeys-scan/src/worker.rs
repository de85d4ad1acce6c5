//! Segment reading and parsing loop run by each pool thread.

use std::path::PathBuf;

use topkeys_common::{Error, Result};
use topkeys_io::{DirectFile, IoMode};

use crate::{dispenser::WorkDispenser, record, segment::SegmentList, top_k::BoundedTopK};

/// Per-worker scan parameters.
#[derive(Debug, Clone)]
pub struct Worker {
    pub path: PathBuf,
    pub io_mode: IoMode,
    /// Capacity of the private top-K selection.
    pub local_capacity: usize,
    /// Largest segment the worker accepts; sizes the read buffer.
    pub max_segment_len: u64,
}

/// Counters collected by one worker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub segments: u64,
    pub bytes_read: u64,
    pub records: u64,
}

impl WorkerStats {
    pub fn add(&mut self, other: &WorkerStats) {
        self.segments += other.segments;
        self.bytes_read += other.bytes_read;
        self.records += other.records;
    }
}

/// Result of [`Worker::run`].
#[derive(Debug)]
pub struct WorkerOutput {
    pub top_k: BoundedTopK,
    pub stats: WorkerStats,
    /// I/O mode the worker's file handle ended up using.
    pub io_mode: IoMode,
}

impl Worker {
    pub fn new(
        path: impl Into<PathBuf>,
        io_mode: IoMode,
        local_capacity: usize,
        max_segment_len: u64,
    ) -> Worker {
        Worker {
            path: path.into(),
            io_mode,
            local_capacity,
            max_segment_len,
        }
    }

    /// Processes segments until `dispenser` is exhausted.
    ///
    /// The worker owns one file handle and one read buffer for its whole
    /// lifetime. Each segment is read in full, split into records, and every
    /// record is offered to the private selection, which is returned at the end.
    ///
    /// # Errors
    ///
    /// * `Io` if the file cannot be opened or a segment cannot be read in full.
    /// * `SegmentTooLarge` if a segment exceeds `max_segment_len`.
    pub fn run(&self, dispenser: &WorkDispenser, segments: &SegmentList) -> Result<WorkerOutput> {
        let buffer_len = usize::try_from(self.max_segment_len)
            .map_err(|_| Error::invalid_arg("max_segment_len", "exceeds the address space"))?;
        let file = DirectFile::open(&self.path, self.io_mode)
            .map_err(|e| Error::io(format!("open {}", self.path.display()), e))?;
        let mut buf = file
            .allocate_buffer(buffer_len)
            .map_err(|e| Error::io("allocate segment buffer", e))?;

        let mut top_k = BoundedTopK::new(self.local_capacity);
        let mut stats = WorkerStats::default();

        while let Some(index) = dispenser.acquire_next() {
            let segment = segments
                .get(index)
                .ok_or_else(|| Error::invalid_arg("segment index", format!("{index} out of range")))?;
            if segment.length > self.max_segment_len {
                return Err(Error::segment_too_large(
                    index,
                    segment.length,
                    self.max_segment_len,
                ));
            }

            let bytes = file
                .read_exact_at_into(segment.offset, segment.length as usize, &mut buf)
                .map_err(|e| {
                    Error::io(
                        format!(
                            "read segment #{index} ({} bytes at {}) of {}",
                            segment.length,
                            segment.offset,
                            self.path.display()
                        ),
                        e,
                    )
                })?;

            let records = record::for_each_record(bytes, |key, count| {
                top_k.offer(key, count);
            });
            log::trace!(
                "segment #{index}: {} bytes at {}, {records} records",
                segment.length,
                segment.offset
            );

            stats.segments += 1;
            stats.bytes_read += segment.length;
            stats.records += records;
        }

        Ok(WorkerOutput {
            top_k,
            stats,
            io_mode: file.io_mode(),
        })
    }
}
