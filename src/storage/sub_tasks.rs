//! In-Memory Sub-Task Store
//!
//! Reference implementation of the `SubTaskStore` persistence surface for
//! single-process hosts and tests. Creating a definition for an existing
//! `(code, source_id)` pair updates that definition in place and returns its id.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use assistant_hub_core::{
    CoreError, CoreResult, ExecutionStatus, NewSubTaskDefinition, SubTaskDefinition,
    SubTaskExecution, SubTaskId, SubTaskStore,
};

#[derive(Debug, Default)]
struct StoreInner {
    next_id: SubTaskId,
    definitions: Vec<SubTaskDefinition>,
    executions: Vec<SubTaskExecution>,
}

impl StoreInner {
    fn allocate_id(&mut self) -> SubTaskId {
        self.next_id += 1;
        self.next_id
    }
}

/// Sub-task store backed by process memory.
#[derive(Debug, Default)]
pub struct MemorySubTaskStore {
    inner: RwLock<StoreInner>,
}

impl MemorySubTaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a definition by code and owning source.
    pub async fn find_definition(&self, code: &str, source_id: i64) -> Option<SubTaskDefinition> {
        let inner = self.inner.read().await;
        inner
            .definitions
            .iter()
            .find(|d| d.code == code && d.source_id == source_id)
            .cloned()
    }

    /// Update the status of an execution.
    pub async fn set_execution_status(
        &self,
        execution_id: SubTaskId,
        status: ExecutionStatus,
    ) -> CoreResult<()> {
        let mut inner = self.inner.write().await;
        let execution = inner
            .executions
            .iter_mut()
            .find(|e| e.id == execution_id)
            .ok_or_else(|| CoreError::not_found(format!("sub-task execution {}", execution_id)))?;
        execution.status = status;
        Ok(())
    }
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[async_trait]
impl SubTaskStore for MemorySubTaskStore {
    async fn create_sub_task_definition(
        &self,
        definition: NewSubTaskDefinition,
    ) -> CoreResult<SubTaskId> {
        if definition.code.is_empty() {
            return Err(CoreError::validation("sub-task code must not be empty"));
        }

        let mut inner = self.inner.write().await;
        let timestamp = now();

        if let Some(existing) = inner
            .definitions
            .iter_mut()
            .find(|d| d.code == definition.code && d.source_id == definition.source_id)
        {
            existing.name = definition.name;
            existing.description = definition.description;
            existing.system_prompt = definition.system_prompt;
            existing.source = definition.source;
            existing.updated_at = timestamp;
            return Ok(existing.id);
        }

        let id = inner.allocate_id();
        inner.definitions.push(SubTaskDefinition {
            id,
            code: definition.code,
            name: definition.name,
            description: definition.description,
            system_prompt: definition.system_prompt,
            source: definition.source,
            source_id: definition.source_id,
            created_at: timestamp.clone(),
            updated_at: timestamp,
        });
        Ok(id)
    }

    async fn list_sub_task_definitions(&self) -> CoreResult<Vec<SubTaskDefinition>> {
        Ok(self.inner.read().await.definitions.clone())
    }

    async fn create_sub_task_execution(
        &self,
        definition_id: SubTaskId,
        input: Value,
    ) -> CoreResult<SubTaskId> {
        let mut inner = self.inner.write().await;
        if !inner.definitions.iter().any(|d| d.id == definition_id) {
            return Err(CoreError::not_found(format!(
                "sub-task definition {}",
                definition_id
            )));
        }

        let id = inner.allocate_id();
        inner.executions.push(SubTaskExecution {
            id,
            definition_id,
            status: ExecutionStatus::Pending,
            input,
            created_at: now(),
        });
        Ok(id)
    }

    async fn list_sub_task_executions(
        &self,
        definition_id: SubTaskId,
    ) -> CoreResult<Vec<SubTaskExecution>> {
        let inner = self.inner.read().await;
        Ok(inner
            .executions
            .iter()
            .filter(|e| e.definition_id == definition_id)
            .cloned()
            .collect())
    }
}
