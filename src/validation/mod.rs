//! Validation subsystem
//!
//! External input is checked against declared field rules before it is
//! hydrated into a Data Object:
//! - [`Rule`]: leaf validators, all null-tolerant except `NotNull`
//! - [`ValidatorChain`]: the ordered rules for one field
//! - [`ValidationEnforcer`]: runs every chain plus insert or mutate checks
//!   and raises all failures at once

mod chain;
mod enforcer;
mod errors;
mod rules;

pub use chain::ValidatorChain;
pub use enforcer::{EnforcementMode, ValidationEnforcer};
pub use errors::{AggregatedValidationError, FieldError, ValidationErrorSet};
pub use rules::{Rule, Validator};
