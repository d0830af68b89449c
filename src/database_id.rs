//! The row ID type shared by the transaction and budget tables.

/// SQLite rowids are 64-bit integers.
pub type DatabaseId = i64;
