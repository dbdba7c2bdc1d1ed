pub mod connection;
pub mod operations;

pub use operations::{ensure_schema, store_classification};
