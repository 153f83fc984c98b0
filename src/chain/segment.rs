//! One link of the chain: a slot table of lazily allocated blocks.

use super::errors::{ChainError, ChainResult};

/// A fixed-size byte buffer, present only once written.
pub type Block = Box<[u8]>;

/// A block handed out by [`Segment::block_or_alloc`], with what had to be
/// allocated to produce it.
#[derive(Debug)]
pub struct Allocated<'a> {
    /// The block itself, always `block_size` bytes long
    pub block: &'a mut [u8],
    /// The slot table was materialized by this call
    pub new_table: bool,
    /// The block was materialized by this call
    pub new_block: bool,
}

/// A segment of the chain.
///
/// The slot table is absent until the first write lands in this segment.
/// Once present it holds exactly `blocks_per_segment` slots, each either
/// absent or a full `block_size` buffer.
#[derive(Debug, Default)]
pub struct Segment {
    slots: Option<Box<[Option<Block>]>>,
    pub(super) next: Option<Box<Segment>>,
}

impl Segment {
    /// A segment with no slot table and no successor.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns whether the slot table has been allocated.
    pub fn has_slots(&self) -> bool {
        self.slots.is_some()
    }

    /// Number of slots in the table, 0 when it is absent.
    pub fn slot_count(&self) -> usize {
        self.slots.as_ref().map_or(0, |slots| slots.len())
    }

    /// Returns the block in `slot`, or `None` for a hole.
    pub fn block(&self, slot: usize) -> Option<&[u8]> {
        self.slots.as_ref()?.get(slot)?.as_deref()
    }

    /// Number of blocks currently allocated in this segment.
    pub fn allocated_blocks(&self) -> usize {
        self.slots
            .as_ref()
            .map_or(0, |slots| slots.iter().filter(|b| b.is_some()).count())
    }

    /// Allocates the slot table if it is absent.
    ///
    /// Returns `true` when this call performed the allocation. An existing
    /// table is never resized, whatever `blocks_per_segment` says now.
    pub fn slots_or_alloc(&mut self, blocks_per_segment: usize) -> ChainResult<bool> {
        if self.slots.is_some() {
            return Ok(false);
        }

        let mut table: Vec<Option<Block>> = Vec::new();
        table
            .try_reserve_exact(blocks_per_segment)
            .map_err(|_| ChainError::SlotTableExhausted(blocks_per_segment))?;
        table.resize_with(blocks_per_segment, || None);

        self.slots = Some(table.into_boxed_slice());
        Ok(true)
    }

    /// Returns the block in `slot`, allocating the slot table and the block
    /// as needed.
    ///
    /// Fresh blocks are zero-filled. If the block allocation fails after the
    /// table was created, the table stays allocated.
    pub fn block_or_alloc(
        &mut self,
        slot: usize,
        blocks_per_segment: usize,
        block_size: usize,
    ) -> ChainResult<Allocated<'_>> {
        let new_table = self.slots_or_alloc(blocks_per_segment)?;

        let entry = self
            .slots
            .as_mut()
            .and_then(|slots| slots.get_mut(slot))
            .ok_or(ChainError::SlotOutOfRange(slot))?;

        let new_block = entry.is_none();
        if new_block {
            *entry = Some(alloc_block(block_size)?);
        }

        match entry {
            Some(block) => Ok(Allocated {
                block,
                new_table,
                new_block,
            }),
            None => Err(ChainError::BlockExhausted(block_size)),
        }
    }

    /// Frees every block and the slot table. Returns the number of blocks
    /// freed.
    pub(super) fn release(&mut self) -> usize {
        match self.slots.take() {
            Some(slots) => slots.iter().filter(|b| b.is_some()).count(),
            None => 0,
        }
    }
}

fn alloc_block(block_size: usize) -> ChainResult<Block> {
    let mut buf: Vec<u8> = Vec::new();
    buf.try_reserve_exact(block_size)
        .map_err(|_| ChainError::BlockExhausted(block_size))?;
    buf.resize(block_size, 0);
    Ok(buf.into_boxed_slice())
}
