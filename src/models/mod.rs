//! Data Models
//!
//! Command envelopes and registry configuration.

pub mod response;
pub mod settings;

pub use response::CommandResponse;
pub use settings::{
    BaselineFieldDefaults, RegistryConfig, RegistryConfigUpdate, ALWAYS_HIDDEN_FIELDS,
};
