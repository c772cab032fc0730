pub mod analyzer;
pub mod compiler;
pub mod config;
pub mod generator;
pub mod matcher;
pub mod reducer;

// Re-export the shared data model so callers depend on one crate.
pub use weft_common::error;
pub use weft_common::protocol;
pub use weft_common::recording;
pub use weft_common::spec;
