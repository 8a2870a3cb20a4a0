//! Relationship include paths
//!
//! Callers ask for nested relations with dot-separated alias paths such as
//! `PhoneNumbers.Member`. The parser canonicalizes each path against the
//! declared aliases and rejects unknown or cyclic paths.

mod relationships;

pub use relationships::RelationshipParser;
