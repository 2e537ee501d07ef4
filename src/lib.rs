//! Assistant Hub Desktop - Rust Backend Library
//!
//! Hosts the assistant-type plugin extension system:
//! - Assistant-type registries per hosting context (main shell, conversation)
//! - Once-per-instance plugin initialization
//! - Sub-task registration with icon registry and persistence surface
//! - Registry configuration and command entry points for the UI

pub mod commands;
pub mod models;
pub mod services;
pub mod state;
pub mod storage;
pub mod utils;

pub use commands::{
    get_assistant_types, get_field_overrides, get_registry_config, list_sub_task_definitions,
    select_assistant_type,
};
pub use models::response::CommandResponse;
pub use models::settings::{BaselineFieldDefaults, RegistryConfig, RegistryConfigUpdate};
pub use services::assistant_types::{
    AssistantTypeRegistry, CapabilityApi, FieldOverrideSnapshot, FormValues, IconRegistry,
    InitReport, RegistryScope,
};
pub use state::AppState;
pub use utils::error::{AppError, AppResult};
