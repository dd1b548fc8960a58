//! Value objects representing immutable domain concepts.

pub mod request_metadata;

pub use request_metadata::RequestMetadata;
