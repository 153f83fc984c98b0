//! Observable store events
//!
//! Events are explicit and typed; their string forms are the `event` field
//! of every log line.

use std::fmt;

use super::logger::Severity;

/// Observable events in segstore
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Store constructed from a configuration
    StoreCreated,
    /// Chain torn down, size back to zero
    StoreReset,

    // Configuration
    /// Configuration loaded from JSON, file or environment
    ConfigLoaded,
    /// Geometry change recorded, pending the next reset
    ConfigDeferred,

    // Chain
    /// Segments appended to reach a write offset
    ChainGrow,

    // Failures
    /// Caller gave up waiting for exclusive access
    AcquireInterrupted,
    /// Boundary copy refused
    TransferFault,
    /// Slot table or block could not be allocated
    AllocationFailed,
}

impl Event {
    /// Returns the string representation of the event
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::StoreCreated => "STORE_CREATED",
            Event::StoreReset => "STORE_RESET",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ConfigDeferred => "CONFIG_DEFERRED",
            Event::ChainGrow => "CHAIN_GROW",
            Event::AcquireInterrupted => "ACQUIRE_INTERRUPTED",
            Event::TransferFault => "TRANSFER_FAULT",
            Event::AllocationFailed => "ALLOCATION_FAILED",
        }
    }

    /// Severity this event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::ChainGrow => Severity::Trace,
            Event::StoreCreated
            | Event::StoreReset
            | Event::ConfigLoaded
            | Event::ConfigDeferred => Severity::Info,
            Event::AcquireInterrupted | Event::TransferFault => Severity::Warn,
            Event::AllocationFailed => Severity::Error,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
