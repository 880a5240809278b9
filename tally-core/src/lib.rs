//! tally-core: shared domain types and coercion utilities for the Tally
//! statement-extraction engine.

pub mod dates;
pub mod import;
pub mod money;
pub mod value;

pub use dates::parse_flexible_date;
pub use import::ImportTransaction;
pub use money::parse_number;
pub use value::FieldValue;
