//! segstore - an in-memory byte store built from a chain of segments
//!
//! A logical, linear address space backed by a lazily grown chain of
//! fixed-capacity segments, each an array of fixed-size blocks. Reads and
//! writes are positioned, serialized per store, and never cross a block.

pub mod chain;
pub mod observability;
pub mod store;

pub use store::{AccessMode, Handle, Interrupt, Store, StoreConfig, StoreError, StoreResult};
