//! Services
//!
//! Business logic services for the application.

pub mod assistant_types;

pub use assistant_types::{AssistantTypeRegistry, IconRegistry, RegistryScope};
