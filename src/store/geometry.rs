//! Offset decomposition.

use serde::Serialize;

use super::config::StoreConfig;

/// Where a logical offset lands in the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Index of the segment in the chain
    pub segment: u64,
    /// Slot within that segment
    pub block: usize,
    /// Byte within that block
    pub offset_in_block: usize,
}

/// Effective block size, segment width and chain limit of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Geometry {
    pub block_size: usize,
    pub blocks_per_segment: usize,
    pub max_segments: usize,
}

impl Geometry {
    /// Geometry from a configuration that has already been validated.
    pub fn from_config(config: &StoreConfig) -> Self {
        Self {
            block_size: config.block_size,
            blocks_per_segment: config.blocks_per_segment,
            max_segments: config.max_segments,
        }
    }

    /// Logical bytes covered by one segment.
    pub fn segment_span(&self) -> u64 {
        self.block_size as u64 * self.blocks_per_segment as u64
    }

    pub fn decompose(&self, offset: u64) -> Position {
        let block_size = self.block_size as u64;
        let span = self.segment_span();
        let rest = offset % span;

        Position {
            segment: offset / span,
            block: (rest / block_size) as usize,
            offset_in_block: (rest % block_size) as usize,
        }
    }

    /// Clamps `count` so a transfer starting at `position` stays in its block.
    pub fn clamp_to_block(&self, position: &Position, count: usize) -> usize {
        count.min(self.block_size - position.offset_in_block)
    }
}
