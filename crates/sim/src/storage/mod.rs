//! Storage module for the reported time series.
//!
//! This module turns pool snapshots into fixed-schema report rows and
//! writes them to tab-separated output or keeps them in memory.

mod recorder;
pub mod types;

pub use recorder::{format_row, header, MemoryRecorder, ReportSink, TsvRecorder};
pub use types::{PoolStats, RecordingStrategy, ReportRow};
