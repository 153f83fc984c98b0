//! Byte transfer across the caller boundary
//!
//! The store never touches a caller's buffer directly. Reads push bytes out
//! through [`TransferOut`], writes pull bytes in through [`TransferIn`].
//! Either side may refuse; a short transfer counts as a refusal.

use thiserror::Error;

/// The destination or source refused the copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("transfer fault: {transferred} of {requested} bytes copied")]
pub struct TransferFault {
    pub requested: usize,
    pub transferred: usize,
}

impl TransferFault {
    pub fn new(requested: usize, transferred: usize) -> Self {
        Self {
            requested,
            transferred,
        }
    }
}

/// Destination for bytes leaving the store.
pub trait TransferOut {
    /// Copies all of `src` out. Returns the number of bytes taken.
    fn transfer_out(&mut self, src: &[u8]) -> Result<usize, TransferFault>;
}

/// Source for bytes entering the store.
pub trait TransferIn {
    /// Fills all of `dst`. Returns the number of bytes supplied.
    fn transfer_in(&self, dst: &mut [u8]) -> Result<usize, TransferFault>;
}

impl TransferOut for [u8] {
    fn transfer_out(&mut self, src: &[u8]) -> Result<usize, TransferFault> {
        if src.len() > self.len() {
            return Err(TransferFault::new(src.len(), 0));
        }
        self[..src.len()].copy_from_slice(src);
        Ok(src.len())
    }
}

impl TransferOut for Vec<u8> {
    fn transfer_out(&mut self, src: &[u8]) -> Result<usize, TransferFault> {
        self.extend_from_slice(src);
        Ok(src.len())
    }
}

impl TransferIn for [u8] {
    fn transfer_in(&self, dst: &mut [u8]) -> Result<usize, TransferFault> {
        if dst.len() > self.len() {
            return Err(TransferFault::new(dst.len(), 0));
        }
        dst.copy_from_slice(&self[..dst.len()]);
        Ok(dst.len())
    }
}

/// Runs `transfer_out` and turns a short copy into a fault.
pub(crate) fn push_out<D>(dst: &mut D, src: &[u8]) -> Result<(), TransferFault>
where
    D: TransferOut + ?Sized,
{
    let copied = dst.transfer_out(src)?;
    if copied != src.len() {
        return Err(TransferFault::new(src.len(), copied));
    }
    Ok(())
}

/// Runs `transfer_in` and turns a short copy into a fault.
pub(crate) fn pull_in<S>(src: &S, dst: &mut [u8]) -> Result<(), TransferFault>
where
    S: TransferIn + ?Sized,
{
    let copied = src.transfer_in(dst)?;
    if copied != dst.len() {
        return Err(TransferFault::new(dst.len(), copied));
    }
    Ok(())
}
