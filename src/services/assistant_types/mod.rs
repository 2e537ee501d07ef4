//! Assistant-Type Plugin Extension System
//!
//! Lets assistant-type plugins customize the shared configuration form and
//! register sub-tasks, with each plugin instance initialized once per registry.
//!
//! Architecture:
//! - icons.rs:         Sub-task icon registry (process-wide accessor)
//! - capability.rs:    Shared capability object and accumulated form overrides
//! - bridge.rs:        Per-plugin capability object and sub-task persistence
//! - orchestrator.rs:  Once-per-instance plugin initialization
//! - registry.rs:      Registry per hosting context (main shell / conversation)
//! - form_values.rs:   Form state sink for `force_field_value`

pub mod bridge;
pub mod capability;
pub mod form_values;
pub mod icons;
pub mod orchestrator;
pub mod registry;

pub use bridge::{PluginScopedApi, RegistrationOutcome, SubTaskBridge};
pub use capability::{CapabilityApi, FieldOverrideSnapshot, TypeRegistration};
pub use form_values::FormValues;
pub use icons::IconRegistry;
pub use orchestrator::{FailedPlugin, InitReport, Orchestrator, SkipReason, SkippedPlugin};
pub use registry::{AssistantTypeRegistry, RegistryBuilder, RegistryScope};
