//! Sub-Task Registration Integration Tests
//!
//! Plugins registering sub-tasks during initialization, against stores that
//! succeed, fail, or complete out of order.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use assistant_hub_core::{
    AssistantTypeApi, AssistantTypePlugin, CoreError, CoreResult, IconRef, NewSubTaskDefinition,
    PluginDescriptor, SubTaskDefinition, SubTaskExecution, SubTaskId, SubTaskOptions,
    SubTaskStore,
};
use assistant_hub_desktop::storage::MemorySubTaskStore;
use assistant_hub_desktop::{AppState, AssistantTypeRegistry, IconRegistry, RegistryScope};

// ============================================================================
// Test Stores
// ============================================================================

/// Rejects every write.
pub(super) struct OfflineStore;

#[async_trait]
impl SubTaskStore for OfflineStore {
    async fn create_sub_task_definition(
        &self,
        definition: NewSubTaskDefinition,
    ) -> CoreResult<SubTaskId> {
        Err(CoreError::persistence(format!(
            "cannot create '{}': backend offline",
            definition.code
        )))
    }

    async fn list_sub_task_definitions(&self) -> CoreResult<Vec<SubTaskDefinition>> {
        Ok(vec![])
    }

    async fn create_sub_task_execution(
        &self,
        _definition_id: SubTaskId,
        _input: Value,
    ) -> CoreResult<SubTaskId> {
        Err(CoreError::persistence("backend offline"))
    }

    async fn list_sub_task_executions(
        &self,
        _definition_id: SubTaskId,
    ) -> CoreResult<Vec<SubTaskExecution>> {
        Ok(vec![])
    }
}

/// Delays creates named "slow" and records the order in which creates finish.
#[derive(Default)]
struct SlowFirstStore {
    inner: MemorySubTaskStore,
    completed: Mutex<Vec<String>>,
}

#[async_trait]
impl SubTaskStore for SlowFirstStore {
    async fn create_sub_task_definition(
        &self,
        definition: NewSubTaskDefinition,
    ) -> CoreResult<SubTaskId> {
        if definition.code == "slow" {
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        let code = definition.code.clone();
        let id = self.inner.create_sub_task_definition(definition).await?;
        self.completed.lock().await.push(code);
        Ok(id)
    }

    async fn list_sub_task_definitions(&self) -> CoreResult<Vec<SubTaskDefinition>> {
        self.inner.list_sub_task_definitions().await
    }

    async fn create_sub_task_execution(
        &self,
        definition_id: SubTaskId,
        input: Value,
    ) -> CoreResult<SubTaskId> {
        self.inner.create_sub_task_execution(definition_id, input).await
    }

    async fn list_sub_task_executions(
        &self,
        definition_id: SubTaskId,
    ) -> CoreResult<Vec<SubTaskExecution>> {
        self.inner.list_sub_task_executions(definition_id).await
    }
}

// ============================================================================
// Test Plugins
// ============================================================================

/// Registers the given sub-tasks during init.
pub(super) struct SubTaskPlugin {
    pub(super) sub_tasks: Vec<SubTaskOptions>,
}

impl AssistantTypePlugin for SubTaskPlugin {
    fn on_assistant_type_init(self: Arc<Self>, api: &dyn AssistantTypeApi) -> CoreResult<()> {
        for options in &self.sub_tasks {
            api.sub_task_regist(options.clone());
        }
        Ok(())
    }
}

fn plugin(sub_tasks: Vec<SubTaskOptions>) -> Arc<SubTaskPlugin> {
    Arc::new(SubTaskPlugin { sub_tasks })
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_rejected_persistence_keeps_icon() {
    let icons = Arc::new(IconRegistry::new());
    let mut reg = AssistantTypeRegistry::builder(RegistryScope::MainShell, Arc::new(OfflineStore))
        .icons(icons.clone())
        .build();

    let report = reg.initialize_plugins(&[PluginDescriptor::assistant_type(
        1,
        plugin(vec![
            SubTaskOptions::new("demo", "Demo").with_icon(IconRef::new("DemoIcon"))
        ]),
    )]);

    // the plugin itself saw no failure
    assert_eq!(report.initialized, vec![Some(1)]);
    assert_eq!(icons.get("demo"), Some(IconRef::new("DemoIcon")));

    let outcomes = reg.settle_sub_tasks().await;
    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].code, "demo");
    let error = outcomes[0].result.clone().unwrap_err();
    assert!(error.contains("backend offline"));

    // no rollback of the icon
    assert!(icons.contains("demo"));
}

#[tokio::test]
async fn test_definitions_carry_plugin_source() {
    let store = Arc::new(MemorySubTaskStore::new());
    let mut reg = AssistantTypeRegistry::builder(RegistryScope::MainShell, store.clone())
        .icons(Arc::new(IconRegistry::new()))
        .build();

    reg.initialize_plugins(&[PluginDescriptor::assistant_type(
        12,
        plugin(vec![SubTaskOptions::new("review", "Review")
            .with_description("Review a diff")
            .with_system_prompt("You are a careful reviewer.")]),
    )]);
    reg.settle_sub_tasks().await;

    let defs = store.list_sub_task_definitions().await.unwrap();
    assert_eq!(defs.len(), 1);
    assert_eq!(defs[0].source_id, 12);
    assert_eq!(defs[0].description, "Review a diff");
    assert_eq!(defs[0].system_prompt, "You are a careful reviewer.");
    assert_eq!(serde_json::to_value(defs[0].source).unwrap(), "plugin");
}

#[tokio::test]
async fn test_registrations_do_not_wait_on_each_other() {
    let store = Arc::new(SlowFirstStore::default());
    let mut reg = AssistantTypeRegistry::builder(RegistryScope::MainShell, store.clone())
        .icons(Arc::new(IconRegistry::new()))
        .build();

    reg.initialize_plugins(&[PluginDescriptor::assistant_type(
        1,
        plugin(vec![
            SubTaskOptions::new("slow", "Slow"),
            SubTaskOptions::new("fast", "Fast"),
        ]),
    )]);

    let outcomes = reg.settle_sub_tasks().await;
    assert!(outcomes.iter().all(|o| o.result.is_ok()));
    // outcomes are reported in issue order, completions happened out of order
    assert_eq!(outcomes[0].code, "slow");
    assert_eq!(
        store.completed.lock().await.as_slice(),
        &["fast".to_string(), "slow".to_string()]
    );
}

#[tokio::test]
async fn test_registration_outlives_closed_conversation() {
    let store = Arc::new(SlowFirstStore::default());
    let state = AppState::with_store(store.clone(), Arc::new(IconRegistry::new()));

    state
        .open_conversation(
            "c-9",
            &[PluginDescriptor::assistant_type(
                5,
                plugin(vec![SubTaskOptions::new("slow", "Slow")]),
            )],
            None,
        )
        .await;
    assert!(state.close_conversation("c-9").await);

    tokio::time::sleep(Duration::from_millis(200)).await;
    let defs = store.list_sub_task_definitions().await.unwrap();
    assert_eq!(defs.len(), 1);
    assert_eq!(defs[0].source_id, 5);
}

#[tokio::test]
async fn test_plugins_share_one_store_across_registries() {
    let store = Arc::new(MemorySubTaskStore::new());
    let icons = Arc::new(IconRegistry::new());
    let state = AppState::with_store(store.clone(), icons.clone());
    let shared = plugin(vec![
        SubTaskOptions::new("summarize", "Summarize").with_icon(IconRef::new("SumIcon"))
    ]);

    state
        .mount_main_shell(&[PluginDescriptor::assistant_type(3, shared.clone())])
        .await;
    state
        .open_conversation("c-1", &[PluginDescriptor::assistant_type(3, shared)], None)
        .await;

    state.settle_sub_tasks(&RegistryScope::MainShell).await.unwrap();
    state
        .settle_sub_tasks(&RegistryScope::Conversation("c-1".to_string()))
        .await
        .unwrap();

    // two creates for the same (code, source) upsert into one definition
    assert_eq!(store.list_sub_task_definitions().await.unwrap().len(), 1);
    assert_eq!(icons.len(), 1);
}
