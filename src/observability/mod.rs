//! Observability for the mapper
//!
//! Structured JSON log lines for metadata resolution, input rejection and
//! configuration loading. Logging is synchronous and never fails the
//! operation that emits it.
//!
//! ```ignore
//! use dataobjects::observability::{Logger, Severity};
//!
//! Logger::set_min_severity(Severity::Info);
//! ```

mod events;
mod logger;

pub use events::Event;
pub use logger::{Logger, Severity};

#[cfg(test)]
pub(crate) use logger::capture_log;

/// Logs an event with fields at its own severity.
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
