//! # Chain Errors

use thiserror::Error;

/// Result type for chain allocation
pub type ChainResult<T> = Result<T, ChainError>;

/// Allocation failures inside the segment chain
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    #[error("Cannot allocate slot table of {0} blocks")]
    SlotTableExhausted(usize),

    #[error("Cannot allocate block of {0} bytes")]
    BlockExhausted(usize),

    #[error("Segment index {0} is not addressable")]
    SegmentOutOfRange(u64),

    #[error("Offset {0} is at the end of the address space")]
    AddressSpaceExhausted(u64),

    #[error("Slot {0} is outside the segment's slot table")]
    SlotOutOfRange(usize),
}

impl ChainError {
    /// Size or index the failed request asked for
    pub fn requested(&self) -> u64 {
        match self {
            ChainError::SlotTableExhausted(n) => *n as u64,
            ChainError::BlockExhausted(n) => *n as u64,
            ChainError::SegmentOutOfRange(n) => *n,
            ChainError::AddressSpaceExhausted(n) => *n,
            ChainError::SlotOutOfRange(n) => *n as u64,
        }
    }
}
