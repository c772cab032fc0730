pub mod error;
pub mod protocol;
pub mod recording;
pub mod spec;
