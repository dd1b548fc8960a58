//! Domain layer containing entities, value objects and the pure lifecycle
//! functions for invitations and verification codes.

pub mod entities;
pub mod lifecycle;
pub mod value_objects;

// Re-export commonly used domain types
pub use entities::*;
pub use value_objects::*;
