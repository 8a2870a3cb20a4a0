//! Observable mapper events

use std::fmt;

use super::logger::Severity;

/// Events emitted by the metadata cache, enforcer, path parser and instantiator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Metadata
    /// A type definition was resolved into a descriptor
    MetadataResolved,
    /// A type definition failed its checks
    MetadataResolutionFailed,

    // Input rejection
    /// An enforcement pass raised an aggregated validation error
    ValidationRejected,
    /// Include paths did not resolve
    RelationshipsRejected,
    /// A non-nullable relation was null
    RelationNullabilityViolated,
    /// Relation nesting exceeded the configured depth
    RelationDepthExceeded,

    // Configuration
    ConfigLoaded,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::MetadataResolved => "METADATA_RESOLVED",
            Event::MetadataResolutionFailed => "METADATA_RESOLUTION_FAILED",
            Event::ValidationRejected => "VALIDATION_REJECTED",
            Event::RelationshipsRejected => "RELATIONSHIPS_REJECTED",
            Event::RelationNullabilityViolated => "RELATION_NULLABILITY_VIOLATED",
            Event::RelationDepthExceeded => "RELATION_DEPTH_EXCEEDED",
            Event::ConfigLoaded => "CONFIG_LOADED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::MetadataResolved => Severity::Trace,
            Event::ValidationRejected
            | Event::RelationshipsRejected
            | Event::RelationNullabilityViolated
            | Event::ConfigLoaded => Severity::Info,
            Event::RelationDepthExceeded => Severity::Warn,
            Event::MetadataResolutionFailed => Severity::Error,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
