//! Value conversion between Data Object fields and storage columns
//!
//! A [`Converter`] attached to a column transforms a field value on its way
//! into a storage row (`on_save`) and a column value on its way back
//! (`on_retrieve`). Converters never see null; the instantiator passes null
//! through untouched.

mod converters;

pub use converters::{Conversion, ConvertError, Converter};
