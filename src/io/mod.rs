//! Input/output helpers.
//!
//! - CSV ingest + schema validation (`ingest`)
//! - curve JSON read/write (`curve`)

pub mod curve;
pub mod ingest;

pub use curve::*;
pub use ingest::*;
