//! Open handles onto a store.
//!
//! A handle carries what the store itself does not own: the offset cursor
//! and the interrupt its calls wait on.

use std::sync::Arc;

use super::engine::Store;
use super::errors::StoreResult;
use super::interrupt::Interrupt;

/// How a handle was opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    ReadOnly,
    /// Truncates the store on open
    WriteOnly,
    ReadWrite,
}

/// A cursor onto a shared [`Store`].
pub struct Handle {
    store: Arc<Store>,
    mode: AccessMode,
    pos: u64,
    interrupt: Interrupt,
}

impl Handle {
    pub(super) fn new(store: Arc<Store>, mode: AccessMode, interrupt: Interrupt) -> Self {
        Self {
            store,
            mode,
            pos: 0,
            interrupt,
        }
    }

    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    /// The interrupt this handle's calls wait on. Trigger a clone of it to
    /// abandon a call that is blocked on the store lock.
    pub fn interrupt(&self) -> &Interrupt {
        &self.interrupt
    }

    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Moves the cursor. No bounds are checked; reading past the logical
    /// size returns 0, writing past it grows the store.
    pub fn set_position(&mut self, pos: u64) {
        self.pos = pos;
    }

    /// One read step into `buf`, stopping at the end of the current block.
    pub async fn read(&mut self, buf: &mut [u8]) -> StoreResult<usize> {
        let count = buf.len();
        self.store
            .read(&mut self.pos, buf, count, &self.interrupt)
            .await
    }

    /// One write step from `buf`, stopping at the end of the current block.
    pub async fn write(&mut self, buf: &[u8]) -> StoreResult<usize> {
        self.store
            .write(&mut self.pos, buf, buf.len(), &self.interrupt)
            .await
    }

    /// Appends to `out` until the logical end or the first hole.
    ///
    /// Returns the number of bytes appended.
    pub async fn read_to_end(&mut self, out: &mut Vec<u8>) -> StoreResult<usize> {
        let mut total = 0;
        loop {
            let n = self
                .store
                .read(&mut self.pos, out, usize::MAX, &self.interrupt)
                .await?;
            if n == 0 {
                return Ok(total);
            }
            total += n;
        }
    }

    /// Writes all of `data`, one block at a time.
    ///
    /// An error leaves the cursor after the last block that was stored.
    pub async fn write_all(&mut self, data: &[u8]) -> StoreResult<()> {
        let mut written = 0;
        while written < data.len() {
            written += self.write(&data[written..]).await?;
        }
        Ok(())
    }
}
