//! The store: positioned reads and writes over a segment chain.
//!
//! Every public call that touches the chain or the logical size runs under
//! one `tokio::sync::Mutex`. The only suspension point is acquiring that
//! lock, and acquisition races the caller's [`Interrupt`]. Once the lock is
//! held the call runs to completion without awaiting.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, MutexGuard};

use crate::chain::{ChainError, SegmentChain};
use crate::observability::{
    log_event_with_fields, Event, Logger, MetricsRegistry, MetricsSnapshot,
};

use super::config::StoreConfig;
use super::errors::{StoreError, StoreResult};
use super::geometry::Geometry;
use super::handle::{AccessMode, Handle};
use super::interrupt::Interrupt;
use super::transfer::{pull_in, push_out, TransferIn, TransferOut};

/// Point-in-time view of a store, taken under its lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStat {
    /// High-water mark of `offset + count` over successful writes
    pub size: u64,
    pub segments: usize,
    pub allocated_blocks: usize,
    /// Geometry new blocks and slot tables are allocated with
    pub geometry: Geometry,
    /// Configuration the next reset will apply
    pub config: StoreConfig,
}

struct Inner {
    chain: SegmentChain,
    geometry: Geometry,
    config: StoreConfig,
    size: u64,
}

/// In-memory byte store backed by a lazily grown chain of segments.
pub struct Store {
    inner: Mutex<Inner>,
    metrics: MetricsRegistry,
}

impl Store {
    /// Creates an empty store. The configuration is validated first.
    pub fn new(config: StoreConfig) -> StoreResult<Self> {
        config.validate()?;

        log_event_with_fields(
            Event::StoreCreated,
            &[
                ("block_size", config.block_size.to_string().as_str()),
                ("blocks_per_segment", config.blocks_per_segment.to_string().as_str()),
            ],
        );

        Ok(Self {
            inner: Mutex::new(Inner {
                chain: SegmentChain::new(),
                geometry: Geometry::from_config(&config),
                config,
                size: 0,
            }),
            metrics: MetricsRegistry::new(),
        })
    }

    /// Opens a handle positioned at offset 0.
    ///
    /// A write-only open truncates the store first. A failed truncate is
    /// logged and otherwise ignored.
    pub async fn open(self: &Arc<Self>, mode: AccessMode) -> Handle {
        self.open_with_interrupt(mode, Interrupt::new()).await
    }

    /// Like [`open`](Self::open), but the handle waits on `interrupt`.
    pub async fn open_with_interrupt(
        self: &Arc<Self>,
        mode: AccessMode,
        interrupt: Interrupt,
    ) -> Handle {
        if mode == AccessMode::WriteOnly {
            if let Err(e) = self.reset(&interrupt).await {
                Logger::log(
                    e.severity(),
                    "OPEN_TRUNCATE_SKIPPED",
                    &[("error", e.to_string().as_str())],
                );
            }
        }
        Handle::new(Arc::clone(self), mode, interrupt)
    }

    async fn acquire(
        &self,
        operation: &str,
        interrupt: &Interrupt,
    ) -> StoreResult<MutexGuard<'_, Inner>> {
        // A raised interrupt wins even over a free lock
        tokio::select! {
            biased;
            _ = interrupt.triggered() => {
                self.metrics.increment_interrupted();
                log_event_with_fields(Event::AcquireInterrupted, &[("operation", operation)]);
                Err(StoreError::interrupted(operation))
            }
            guard = self.inner.lock() => Ok(guard),
        }
    }

    /// Reads up to `count` bytes at `*pos` into `dst`.
    ///
    /// Never crosses a block boundary. Returns 0 at or past the logical
    /// size, and 0 when `*pos` falls in a hole (an unallocated segment or
    /// block); holes are never filled in. On success `*pos` advances by the
    /// returned count. On a transfer fault `*pos` is unchanged.
    pub async fn read<D>(
        &self,
        pos: &mut u64,
        dst: &mut D,
        count: usize,
        interrupt: &Interrupt,
    ) -> StoreResult<usize>
    where
        D: TransferOut + ?Sized,
    {
        let inner = self.acquire("read", interrupt).await?;
        let offset = *pos;

        if offset >= inner.size {
            self.metrics.increment_eof_reads();
            return Ok(0);
        }
        let count = match usize::try_from(inner.size - offset) {
            Ok(available) => count.min(available),
            Err(_) => count,
        };

        let position = inner.geometry.decompose(offset);
        let block = usize::try_from(position.segment)
            .ok()
            .and_then(|index| inner.chain.locate(index))
            .and_then(|segment| segment.block(position.block));

        let Some(block) = block else {
            self.metrics.increment_hole_reads();
            return Ok(0);
        };

        let count = inner.geometry.clamp_to_block(&position, count);
        let start = position.offset_in_block;

        if let Err(fault) = push_out(dst, &block[start..start + count]) {
            self.metrics.increment_transfer_faults();
            log_event_with_fields(
                Event::TransferFault,
                &[("offset", offset.to_string().as_str()), ("operation", "read")],
            );
            return Err(StoreError::transfer_fault(offset, fault));
        }

        *pos = offset + count as u64;
        self.metrics.record_read(count as u64);
        Ok(count)
    }

    /// Writes up to `count` bytes from `src` at `*pos`.
    ///
    /// Grows the chain and allocates the slot table and block as needed,
    /// then stores at most up to the end of the current block. Returns the
    /// number of bytes stored; the caller issues another write for the
    /// rest. On success `*pos` advances and the logical size is raised to
    /// `*pos` if that is larger.
    ///
    /// Nothing is stored at or past `u64::MAX`: a write is clamped so that
    /// `*pos + n` fits, and a write starting at `u64::MAX` fails with
    /// SEGSTORE_RESOURCE_EXHAUSTED. So does a write whose segment lies past
    /// the configured `max_segments`.
    ///
    /// On failure nothing is rolled back: segments, slot tables and blocks
    /// allocated on the way stay in the chain, but `*pos` and the logical
    /// size are unchanged.
    pub async fn write<S>(
        &self,
        pos: &mut u64,
        src: &S,
        count: usize,
        interrupt: &Interrupt,
    ) -> StoreResult<usize>
    where
        S: TransferIn + ?Sized,
    {
        let mut guard = self.acquire("write", interrupt).await?;
        let inner = &mut *guard;

        if count == 0 {
            return Ok(0);
        }

        let offset = *pos;
        let count = match usize::try_from(u64::MAX - offset) {
            Ok(room) => count.min(room),
            Err(_) => count,
        };
        if count == 0 {
            return Err(self.allocation_failed(offset, ChainError::AddressSpaceExhausted(offset)));
        }

        let geometry = inner.geometry;
        let position = geometry.decompose(offset);

        let index = usize::try_from(position.segment).map_err(|_| {
            self.allocation_failed(offset, ChainError::SegmentOutOfRange(position.segment))
        })?;

        let growth = inner
            .chain
            .locate_or_grow(index, geometry.max_segments)
            .map_err(|e| self.allocation_failed(offset, e))?;
        if growth.appended > 0 {
            self.metrics.add_segments_allocated(growth.appended as u64);
            log_event_with_fields(
                Event::ChainGrow,
                &[
                    ("appended", growth.appended.to_string().as_str()),
                    ("segment", index.to_string().as_str()),
                ],
            );
        }

        let allocated = growth
            .segment
            .block_or_alloc(position.block, geometry.blocks_per_segment, geometry.block_size)
            .map_err(|e| self.allocation_failed(offset, e))?;
        if allocated.new_table {
            self.metrics.increment_slot_tables_allocated();
        }
        if allocated.new_block {
            self.metrics.increment_blocks_allocated();
        }

        let count = geometry.clamp_to_block(&position, count);
        let start = position.offset_in_block;

        if let Err(fault) = pull_in(src, &mut allocated.block[start..start + count]) {
            self.metrics.increment_transfer_faults();
            log_event_with_fields(
                Event::TransferFault,
                &[("offset", offset.to_string().as_str()), ("operation", "write")],
            );
            return Err(StoreError::transfer_fault(offset, fault));
        }

        let end = offset + count as u64;
        *pos = end;
        if end > inner.size {
            inner.size = end;
        }

        self.metrics.record_write(count as u64);
        Ok(count)
    }

    fn allocation_failed(&self, offset: u64, cause: ChainError) -> StoreError {
        self.metrics.increment_allocation_failures();
        log_event_with_fields(
            Event::AllocationFailed,
            &[("offset", offset.to_string().as_str()), ("reason", cause.to_string().as_str())],
        );
        StoreError::resource_exhausted(offset, cause)
    }

    /// Frees the whole chain, sets the logical size to 0 and applies the
    /// configured geometry.
    pub async fn reset(&self, interrupt: &Interrupt) -> StoreResult<()> {
        let mut guard = self.acquire("reset", interrupt).await?;
        let inner = &mut *guard;

        let released = inner.chain.clear();
        inner.size = 0;
        inner.geometry = Geometry::from_config(&inner.config);

        self.metrics
            .record_reset(released.segments as u64, released.blocks as u64);
        log_event_with_fields(
            Event::StoreReset,
            &[
                ("block_size", inner.geometry.block_size.to_string().as_str()),
                ("blocks", released.blocks.to_string().as_str()),
                ("segments", released.segments.to_string().as_str()),
            ],
        );
        Ok(())
    }

    /// Records a new block size. Existing blocks keep their size; the value
    /// takes effect at the next reset.
    pub async fn set_block_size(
        &self,
        block_size: usize,
        interrupt: &Interrupt,
    ) -> StoreResult<()> {
        self.reconfigure("set_block_size", interrupt, |config| {
            config.block_size = block_size
        })
        .await
    }

    /// Records a new segment width. Existing slot tables keep their width;
    /// the value takes effect at the next reset.
    pub async fn set_blocks_per_segment(
        &self,
        blocks_per_segment: usize,
        interrupt: &Interrupt,
    ) -> StoreResult<()> {
        self.reconfigure("set_blocks_per_segment", interrupt, |config| {
            config.blocks_per_segment = blocks_per_segment
        })
        .await
    }

    async fn reconfigure(
        &self,
        operation: &str,
        interrupt: &Interrupt,
        apply: impl FnOnce(&mut StoreConfig),
    ) -> StoreResult<()> {
        let mut inner = self.acquire(operation, interrupt).await?;

        let mut next = inner.config;
        apply(&mut next);
        next.validate()?;
        inner.config = next;

        log_event_with_fields(
            Event::ConfigDeferred,
            &[
                ("block_size", next.block_size.to_string().as_str()),
                ("blocks_per_segment", next.blocks_per_segment.to_string().as_str()),
            ],
        );
        Ok(())
    }

    // The getters below wait for the lock without an interrupt. They hold it
    // only long enough to copy a few fields; dropping the future abandons
    // the wait.

    /// Effective geometry.
    pub async fn geometry(&self) -> Geometry {
        self.inner.lock().await.geometry
    }

    /// Configuration the next reset will apply.
    pub async fn config(&self) -> StoreConfig {
        self.inner.lock().await.config
    }

    /// Logical size in bytes.
    pub async fn size(&self) -> u64 {
        self.inner.lock().await.size
    }

    pub async fn stat(&self) -> StoreStat {
        let inner = self.inner.lock().await;
        StoreStat {
            size: inner.size,
            segments: inner.chain.segment_count(),
            allocated_blocks: inner.chain.allocated_blocks(),
            geometry: inner.geometry,
            config: inner.config,
        }
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}
