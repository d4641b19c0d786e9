//! Report writers for analysis results.

pub mod json;
mod schema;
pub mod text;

pub use schema::SCHEMA;

/// Version of the JSON report schema.
pub const REPORT_VERSION: &str = "1.0.0";
