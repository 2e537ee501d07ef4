//! Sub-Task Types and Persistence Surface
//!
//! A sub-task is a named, reusable unit of backend-executable behavior a
//! plugin can expose. Definitions and executions live in a backend store the
//! registry does not own; it only talks to it through [`SubTaskStore`].

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreResult;

/// Identifier assigned by the persistence surface.
pub type SubTaskId = i64;

/// Opaque UI icon reference (for example a component or asset name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IconRef(String);

impl IconRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IconRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Arguments a plugin passes to `sub_task_regist`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubTaskOptions {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub system_prompt: String,
    #[serde(default, rename = "iconComponent")]
    pub icon: Option<IconRef>,
}

impl SubTaskOptions {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn with_icon(mut self, icon: IconRef) -> Self {
        self.icon = Some(icon);
        self
    }
}

/// Who created a sub-task definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubTaskSource {
    Plugin,
}

impl fmt::Display for SubTaskSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubTaskSource::Plugin => write!(f, "plugin"),
        }
    }
}

/// Create request sent to the persistence surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubTaskDefinition {
    pub code: String,
    pub name: String,
    pub description: String,
    pub system_prompt: String,
    pub source: SubTaskSource,
    pub source_id: i64,
}

impl NewSubTaskDefinition {
    /// Build the create request for a plugin-owned definition.
    pub fn from_plugin(options: &SubTaskOptions, source_id: i64) -> Self {
        Self {
            code: options.code.clone(),
            name: options.name.clone(),
            description: options.description.clone(),
            system_prompt: options.system_prompt.clone(),
            source: SubTaskSource::Plugin,
            source_id,
        }
    }
}

/// A stored sub-task definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubTaskDefinition {
    pub id: SubTaskId,
    pub code: String,
    pub name: String,
    pub description: String,
    pub system_prompt: String,
    pub source: SubTaskSource,
    pub source_id: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Status of a sub-task execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    Pending,
    Running,
    Completed,
    Failed,
}

/// A stored sub-task execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubTaskExecution {
    pub id: SubTaskId,
    pub definition_id: SubTaskId,
    pub status: ExecutionStatus,
    pub input: Value,
    pub created_at: String,
}

/// Persistence surface for sub-task definitions and executions.
///
/// Implementations must tolerate concurrent writers for the same
/// `(code, source_id)` pair; two registries may share one store.
#[async_trait]
pub trait SubTaskStore: Send + Sync {
    /// Create a definition and return its id.
    async fn create_sub_task_definition(
        &self,
        definition: NewSubTaskDefinition,
    ) -> CoreResult<SubTaskId>;

    /// All definitions, oldest first.
    async fn list_sub_task_definitions(&self) -> CoreResult<Vec<SubTaskDefinition>>;

    /// Record a new execution of a definition.
    async fn create_sub_task_execution(
        &self,
        definition_id: SubTaskId,
        input: Value,
    ) -> CoreResult<SubTaskId>;

    /// Executions of one definition, oldest first.
    async fn list_sub_task_executions(
        &self,
        definition_id: SubTaskId,
    ) -> CoreResult<Vec<SubTaskExecution>>;
}
