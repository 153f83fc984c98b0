//! Segment chain for segstore
//!
//! The chain owns every byte the store holds. The k-th segment covers the
//! logical range `[k * span, (k + 1) * span)`, where `span` is
//! `block_size * blocks_per_segment`. Segments are appended on demand and
//! located by walking from the head; there is no random-access shortcut.
//!
//! # Ownership
//!
//! - The chain owns its segments, each segment owns its slot table, each
//!   slot owns its block. Nothing is shared.
//! - `clear()` and `Drop` tear the list down iteratively, so very long
//!   chains never recurse.

mod errors;
mod segment;

pub use errors::{ChainError, ChainResult};
pub use segment::{Allocated, Block, Segment};

/// Result of [`SegmentChain::locate_or_grow`].
#[derive(Debug)]
pub struct Growth<'a> {
    /// The segment at the requested index
    pub segment: &'a mut Segment,
    /// How many segments had to be appended to reach it
    pub appended: usize,
}

/// What a [`SegmentChain::clear`] gave back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Released {
    pub segments: usize,
    pub blocks: usize,
}

/// Singly linked, owned list of segments.
#[derive(Debug, Default)]
pub struct SegmentChain {
    head: Option<Box<Segment>>,
}

impl SegmentChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if no segment has been created.
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Returns the segment at `index`, or `None` if the chain is shorter.
    ///
    /// `None` is a hole to the caller, not an error.
    pub fn locate(&self, index: usize) -> Option<&Segment> {
        let mut current = self.head.as_deref();
        for _ in 0..index {
            current = current?.next.as_deref();
        }
        current
    }

    /// Mutable variant of [`locate`](Self::locate). Never grows the chain.
    pub fn locate_mut(&mut self, index: usize) -> Option<&mut Segment> {
        let mut current = self.head.as_deref_mut();
        for _ in 0..index {
            current = current?.next.as_deref_mut();
        }
        current
    }

    /// Returns the segment at `index`, appending empty segments one at a
    /// time until it exists.
    ///
    /// Indexes at or past `max_segments` are refused before anything is
    /// appended.
    pub fn locate_or_grow(&mut self, index: usize, max_segments: usize) -> ChainResult<Growth<'_>> {
        if index >= max_segments {
            return Err(ChainError::SegmentOutOfRange(index as u64));
        }

        let mut appended = 0;
        let mut link = &mut self.head;

        for _ in 0..index {
            link = &mut link
                .get_or_insert_with(|| {
                    appended += 1;
                    Box::new(Segment::empty())
                })
                .next;
        }

        let segment = link.get_or_insert_with(|| {
            appended += 1;
            Box::new(Segment::empty())
        });

        Ok(Growth { segment, appended })
    }

    /// Number of segments in the chain.
    pub fn segment_count(&self) -> usize {
        self.iter().count()
    }

    /// Number of blocks allocated across all segments.
    pub fn allocated_blocks(&self) -> usize {
        self.iter().map(Segment::allocated_blocks).sum()
    }

    /// Iterates segments from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        std::iter::successors(self.head.as_deref(), |segment| segment.next.as_deref())
    }

    /// Frees every block, slot table and segment, leaving the chain empty.
    ///
    /// Calling this on an empty chain is a no-op.
    pub fn clear(&mut self) -> Released {
        let mut released = Released::default();
        let mut current = self.head.take();

        while let Some(mut segment) = current {
            released.blocks += segment.release();
            released.segments += 1;
            current = segment.next.take();
        }

        released
    }
}

impl Drop for SegmentChain {
    fn drop(&mut self) {
        self.clear();
    }
}
