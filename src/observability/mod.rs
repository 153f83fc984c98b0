//! Observability subsystem for segstore
//!
//! - Structured logging (JSON lines)
//! - Per-store counters
//! - Typed lifecycle events
//!
//! Observability is read-only: nothing here can fail a store call.
//!
//! # Usage
//!
//! ```ignore
//! use segstore::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::StoreReset, &[("segments", "3")]);
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity, LOG_THRESHOLD_ENV};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
