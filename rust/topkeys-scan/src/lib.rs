//! Parallel top-N selection over large `key count` text files.
//!
//! The scan runs in three phases:
//! 1. [`segment::build_segments`] splits the file into record-aligned byte ranges.
//! 2. A fixed pool of worker threads pulls segment indices from a shared
//!    [`dispenser::WorkDispenser`], reads each segment with unbuffered I/O,
//!    parses its records and keeps a private [`top_k::BoundedTopK`].
//! 3. Each worker merges its partial result into the [`aggregator::Aggregator`],
//!    which is drained in descending count order once all workers have joined.
//!
//! [`scan::scan_file`] drives the whole pipeline; [`sequential::scan_sequential`]
//! is a single-threaded buffered equivalent used for cross-checking.

pub mod aggregator;
pub mod config;
pub mod dispenser;
pub mod record;
pub mod scan;
pub mod segment;
pub mod sequential;
pub mod top_k;
pub mod worker;

pub use config::ScanConfig;
pub use scan::{ScanContext, ScanReport, ScanStats, scan_file};
pub use segment::{Segment, SegmentList, build_segments};
pub use sequential::scan_sequential;
pub use top_k::{BoundedTopK, Entry};
