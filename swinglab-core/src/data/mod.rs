//! Raw price tables and normalization into the canonical bar schema.

pub mod columns;
pub mod table;

pub use table::{DataError, PriceTable};
