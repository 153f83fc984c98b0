//! Metrics registry for segstore
//!
//! - Counters only, monotonic
//! - Atomic, lock-free increments
//! - One registry per store

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Operational counters of a store
///
/// Relaxed ordering throughout; counters are exact but not synchronized
/// with each other.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    reads: AtomicU64,
    writes: AtomicU64,
    bytes_read: AtomicU64,
    bytes_written: AtomicU64,
    /// Reads that landed on a hole
    hole_reads: AtomicU64,
    /// Reads at or past the logical size
    eof_reads: AtomicU64,
    segments_allocated: AtomicU64,
    slot_tables_allocated: AtomicU64,
    blocks_allocated: AtomicU64,
    segments_released: AtomicU64,
    blocks_released: AtomicU64,
    resets: AtomicU64,
    interrupted: AtomicU64,
    transfer_faults: AtomicU64,
    allocation_failures: AtomicU64,
}

impl MetricsRegistry {
    /// Create a new metrics registry with all counters at zero
    pub fn new() -> Self {
        Self::default()
    }

    // Data path

    /// Record a completed read of `bytes`
    pub fn record_read(&self, bytes: u64) {
        self.reads.fetch_add(1, Ordering::Relaxed);
        self.bytes_read.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Record a completed write of `bytes`
    pub fn record_write(&self, bytes: u64) {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn increment_hole_reads(&self) {
        self.hole_reads.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_eof_reads(&self) {
        self.eof_reads.fetch_add(1, Ordering::Relaxed);
    }

    // Allocation

    pub fn add_segments_allocated(&self, count: u64) {
        self.segments_allocated.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_slot_tables_allocated(&self) {
        self.slot_tables_allocated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_blocks_allocated(&self) {
        self.blocks_allocated.fetch_add(1, Ordering::Relaxed);
    }

    /// Record what a reset gave back
    pub fn record_reset(&self, segments: u64, blocks: u64) {
        self.resets.fetch_add(1, Ordering::Relaxed);
        self.segments_released.fetch_add(segments, Ordering::Relaxed);
        self.blocks_released.fetch_add(blocks, Ordering::Relaxed);
    }

    // Failures

    pub fn increment_interrupted(&self) {
        self.interrupted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_transfer_faults(&self) {
        self.transfer_faults.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_allocation_failures(&self) {
        self.allocation_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Current values as one JSON object
    pub fn to_json(&self) -> String {
        serde_json::to_string(&self.snapshot()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Get all metrics as a snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            reads: self.reads.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            bytes_read: self.bytes_read.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            hole_reads: self.hole_reads.load(Ordering::Relaxed),
            eof_reads: self.eof_reads.load(Ordering::Relaxed),
            segments_allocated: self.segments_allocated.load(Ordering::Relaxed),
            slot_tables_allocated: self.slot_tables_allocated.load(Ordering::Relaxed),
            blocks_allocated: self.blocks_allocated.load(Ordering::Relaxed),
            segments_released: self.segments_released.load(Ordering::Relaxed),
            blocks_released: self.blocks_released.load(Ordering::Relaxed),
            resets: self.resets.load(Ordering::Relaxed),
            interrupted: self.interrupted.load(Ordering::Relaxed),
            transfer_faults: self.transfer_faults.load(Ordering::Relaxed),
            allocation_failures: self.allocation_failures.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub reads: u64,
    pub writes: u64,
    pub bytes_read: u64,
    pub bytes_written: u64,
    pub hole_reads: u64,
    pub eof_reads: u64,
    pub segments_allocated: u64,
    pub slot_tables_allocated: u64,
    pub blocks_allocated: u64,
    pub segments_released: u64,
    pub blocks_released: u64,
    pub resets: u64,
    pub interrupted: u64,
    pub transfer_faults: u64,
    pub allocation_failures: u64,
}
