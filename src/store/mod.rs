//! Store subsystem for segstore
//!
//! A store maps a linear, byte-addressed space onto a chain of segments,
//! each an array of fixed-size blocks. Nothing is allocated until a write
//! reaches it.
//!
//! # Offset decomposition
//!
//! With block size `B` and `Q` blocks per segment, offset `f` lands in
//! segment `f / (B * Q)`, block `(f % (B * Q)) / B`, byte `f % B`.
//!
//! # Rules
//!
//! - A single read or write never crosses a block boundary
//! - Reads past the logical size, and reads of holes, return 0
//! - The logical size is the high-water mark of successful writes; the
//!   last addressable byte is at `u64::MAX - 1`
//! - A write never grows the chain past `max_segments`
//! - Reset frees everything and applies the configured geometry
//! - One exclusive lock per store; acquiring it is the only wait, and for
//!   reads, writes, reset and the setters it can be interrupted. The
//!   inspection getters take no interrupt; dropping their future is the
//!   only way to abandon them

mod config;
mod engine;
mod errors;
mod geometry;
mod handle;
mod interrupt;
mod transfer;

pub use config::{
    StoreConfig, BLOCKS_PER_SEGMENT_ENV, BLOCK_SIZE_ENV, DEFAULT_BLOCKS_PER_SEGMENT,
    DEFAULT_BLOCK_SIZE, DEFAULT_MAX_SEGMENTS, MAX_SEGMENTS_ENV,
};
pub use engine::{Store, StoreStat};
pub use errors::{StoreError, StoreErrorCode, StoreResult};
pub use geometry::{Geometry, Position};
pub use handle::{AccessMode, Handle};
pub use interrupt::Interrupt;
pub use transfer::{TransferFault, TransferIn, TransferOut};
