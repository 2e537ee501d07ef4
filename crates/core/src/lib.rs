//! Assistant Hub Core
//!
//! Plugin contract, data model and error types for the assistant-type plugin
//! system. Plugin crates depend on this crate only; the registry
//! implementation lives in the application crate.
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `assistant_type` - `AssistantType` and the capability tag
//! - `field` - Form field descriptors (`FieldSpec`, `CustomField`, `AddFieldRequest`)
//! - `plugin` - Plugin traits (`AssistantTypePlugin`, `AssistantTypeApi`) and `PluginDescriptor`
//! - `sub_task` - Sub-task types and the `SubTaskStore` persistence surface

pub mod error;
pub mod assistant_type;
pub mod field;
pub mod plugin;
pub mod sub_task;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── Data Model ─────────────────────────────────────────────────────────
pub use assistant_type::{AssistantType, AssistantTypeCode, ASSISTANT_TYPE_CAPABILITY};
pub use field::{AddFieldRequest, CustomField, FieldSpec};

// ── Plugin Contract ────────────────────────────────────────────────────
pub use plugin::{
    AssistantTypeApi, AssistantTypePlugin, FieldValueSink, PluginDescriptor, PluginKind,
    PluginLogic,
};

// ── Persistence Surface ────────────────────────────────────────────────
pub use sub_task::{
    ExecutionStatus, IconRef, NewSubTaskDefinition, SubTaskDefinition, SubTaskExecution,
    SubTaskId, SubTaskOptions, SubTaskSource, SubTaskStore,
};
