//! Scan driver: segmentation, the worker pool and the final report.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use topkeys_common::{Error, Result};
use topkeys_io::IoMode;

use crate::{
    aggregator::Aggregator,
    config::ScanConfig,
    dispenser::WorkDispenser,
    segment::{SegmentList, build_segments},
    top_k::Entry,
    worker::{Worker, WorkerOutput, WorkerStats},
};

/// State shared by all workers of one scan.
///
/// The segment list is read-only after construction. The dispenser and the
/// aggregator are the only mutable shared state, each behind its own lock;
/// no code path holds both.
#[derive(Debug)]
pub struct ScanContext {
    path: PathBuf,
    config: ScanConfig,
    segments: SegmentList,
    dispenser: WorkDispenser,
    aggregator: Aggregator,
}

impl ScanContext {
    /// Validates `config` and segments the file at `path`.
    pub fn new(path: impl Into<PathBuf>, config: ScanConfig) -> Result<Arc<ScanContext>> {
        config.validate()?;
        let path = path.into();
        let segments = build_segments(
            &path,
            config.nominal_segment_size,
            config.probe_block_size,
            config.io_mode,
        )?;
        Ok(Arc::new(ScanContext {
            dispenser: WorkDispenser::new(segments.len()),
            aggregator: Aggregator::new(config.top_n),
            path,
            config,
            segments,
        }))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn segments(&self) -> &SegmentList {
        &self.segments
    }

    pub fn dispenser(&self) -> &WorkDispenser {
        &self.dispenser
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    fn worker(&self) -> Worker {
        Worker::new(
            self.path.clone(),
            self.config.io_mode,
            self.config.top_n,
            self.config.max_segment_len(),
        )
    }

    /// Body of pool thread `id`: drains the dispenser, then merges the private
    /// result into the aggregator.
    fn run_worker(&self, id: usize) -> Result<(WorkerStats, IoMode)> {
        let started = Instant::now();
        let WorkerOutput {
            top_k,
            stats,
            io_mode,
        } = self.worker().run(&self.dispenser, &self.segments)?;
        self.aggregator.merge_worker_result(top_k);
        log::debug!(
            "worker #{id}: {} segments, {} bytes, {} records in {:.3}s",
            stats.segments,
            stats.bytes_read,
            stats.records,
            started.elapsed().as_secs_f64()
        );
        Ok((stats, io_mode))
    }
}

/// Aggregate counters of a completed scan.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanStats {
    pub file_size: u64,
    pub segments: usize,
    pub workers: usize,
    pub bytes_read: u64,
    pub records: u64,
    /// `Unbuffered` only if every worker read without the page cache.
    pub io_mode: IoMode,
    pub elapsed: Duration,
}

impl ScanStats {
    pub fn throughput_mb_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.bytes_read as f64 / (1024.0 * 1024.0) / secs
        } else {
            0.0
        }
    }
}

/// Outcome of [`scan_file`].
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Selected entries by non-increasing count.
    pub entries: Vec<Entry>,
    pub stats: ScanStats,
}

impl ScanReport {
    /// Selected keys by non-increasing count.
    pub fn keys(&self) -> Vec<&[u8]> {
        self.entries.iter().map(|e| e.key.as_slice()).collect()
    }

    pub fn into_keys(self) -> Vec<Vec<u8>> {
        self.entries.into_iter().map(|e| e.key).collect()
    }
}

/// Finds the `config.top_n` highest-count keys of the file at `path`.
///
/// Segments the file, runs `config.worker_pool_size` worker threads to
/// completion, and drains the merged selection.
///
/// # Errors
///
/// Any configuration, segmentation or worker error is fatal. All started
/// workers are joined before the first error is returned.
pub fn scan_file(path: impl AsRef<Path>, config: &ScanConfig) -> Result<ScanReport> {
    let started = Instant::now();
    let path = path.as_ref();
    let ctx = ScanContext::new(path, config.clone())?;
    log::info!(
        "scanning {} ({} bytes, {} segments) with {} workers",
        path.display(),
        ctx.segments.file_size(),
        ctx.segments.len(),
        config.worker_pool_size
    );

    let mut handles = Vec::with_capacity(config.worker_pool_size);
    let mut first_error = None;
    for id in 0..config.worker_pool_size {
        let worker_ctx = Arc::clone(&ctx);
        let spawned = thread::Builder::new()
            .name(format!("topkeys_worker_{id}"))
            .spawn(move || worker_ctx.run_worker(id));
        match spawned {
            Ok(handle) => handles.push(handle),
            Err(e) => {
                first_error = Some(Error::worker(format!(
                    "failed to start worker thread #{id}: {e}"
                )));
                break;
            }
        }
    }

    let mut totals = WorkerStats::default();
    let mut io_mode = config.io_mode;
    for (id, handle) in handles.into_iter().enumerate() {
        let outcome = match handle.join() {
            Ok(result) => result,
            Err(payload) => Err(Error::worker(format!(
                "worker thread #{id} panicked: {}",
                panic_message(payload.as_ref())
            ))),
        };
        match outcome {
            Ok((stats, worker_io_mode)) => {
                totals.add(&stats);
                if worker_io_mode == IoMode::Buffered {
                    io_mode = IoMode::Buffered;
                }
            }
            Err(e) => {
                log::error!("worker #{id} failed: {e}");
                first_error.get_or_insert(e);
            }
        }
    }
    if let Some(e) = first_error {
        return Err(e);
    }

    let entries = ctx.aggregator.report_ranked();
    let stats = ScanStats {
        file_size: ctx.segments.file_size(),
        segments: ctx.segments.len(),
        workers: config.worker_pool_size,
        bytes_read: totals.bytes_read,
        records: totals.records,
        io_mode,
        elapsed: started.elapsed(),
    };
    log::info!(
        "scanned {} records in {:.3}s ({:.2} MB/s, {} reads)",
        stats.records,
        stats.elapsed.as_secs_f64(),
        stats.throughput_mb_per_sec(),
        stats.io_mode
    );
    Ok(ScanReport { entries, stats })
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic payload"
    }
}
