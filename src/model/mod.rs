//! Data Objects and the conversions between their representations
//!
//! - [`DataObject`] / [`FieldValue`]: the typed in-memory record
//! - [`StorageRow`]: read access to persisted rows, with adapters for
//!   plain maps and [`MemoryRow`]
//! - [`ModelInstantiator`]: input -> object -> row -> object -> output

mod instantiator;
mod object;
mod row;

pub use instantiator::ModelInstantiator;
pub use object::{DataObject, FieldValue};
pub use row::{MemoryRow, Related, StorageRow};
