//! Sub-Task Registration Bridge
//!
//! `PluginScopedApi` is the capability object a single plugin receives during
//! initialization. It behaves like the shared `CapabilityApi` except for
//! `sub_task_regist`, which goes through `SubTaskBridge`:
//!
//! 1. the icon (if any) is registered synchronously; failures are ignored
//! 2. the definition is created on the persistence surface in a spawned task
//! 3. a rejected create is logged with its code; no retry, no icon rollback
//!
//! In-flight registrations can be awaited with `SubTaskBridge::settle`.

use std::sync::{Arc, Mutex, PoisonError};

use serde_json::Value;
use tokio::task::JoinHandle;

use assistant_hub_core::{
    AddFieldRequest, AssistantTypeApi, AssistantTypeCode, AssistantTypePlugin, CoreResult,
    NewSubTaskDefinition, PluginKind, PluginLogic, SubTaskId, SubTaskOptions, SubTaskStore,
};

use super::capability::CapabilityApi;
use super::icons::IconRegistry;

/// Completed sub-task registration, as reported by `settle`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationOutcome {
    pub code: String,
    pub source_id: i64,
    pub result: Result<SubTaskId, String>,
}

enum PendingRegistration {
    Spawned {
        code: String,
        source_id: i64,
        handle: JoinHandle<CoreResult<SubTaskId>>,
    },
    NotStarted(RegistrationOutcome),
}

/// Writes plugin sub-task definitions to the icon registry and the store.
pub struct SubTaskBridge {
    store: Arc<dyn SubTaskStore>,
    icons: Arc<IconRegistry>,
    pending: Mutex<Vec<PendingRegistration>>,
}

impl SubTaskBridge {
    pub fn new(store: Arc<dyn SubTaskStore>, icons: Arc<IconRegistry>) -> Self {
        Self {
            store,
            icons,
            pending: Mutex::new(Vec::new()),
        }
    }

    pub fn icons(&self) -> &Arc<IconRegistry> {
        &self.icons
    }

    pub fn store(&self) -> &Arc<dyn SubTaskStore> {
        &self.store
    }

    /// Register `options` on behalf of the plugin `plugin_id` (0 when absent).
    ///
    /// Never fails and never blocks on the store. Requires a Tokio runtime for
    /// the persistence step; without one the create is skipped and logged.
    pub fn register(&self, plugin_id: Option<i64>, options: SubTaskOptions) {
        if let Some(icon) = &options.icon {
            if let Err(e) = self.icons.register(&options.code, icon.clone()) {
                tracing::debug!(code = %options.code, error = %e, "sub-task icon not registered");
            }
        }

        let source_id = plugin_id.unwrap_or(0);
        let code = options.code.clone();
        let definition = NewSubTaskDefinition::from_plugin(&options, source_id);

        let pending = match tokio::runtime::Handle::try_current() {
            Ok(runtime) => {
                let store = self.store.clone();
                let task_code = code.clone();
                let handle = runtime.spawn(async move {
                    let result = store.create_sub_task_definition(definition).await;
                    match &result {
                        Ok(id) => tracing::debug!(
                            code = %task_code,
                            source_id,
                            id,
                            "sub-task definition registered"
                        ),
                        Err(e) => tracing::error!(
                            code = %task_code,
                            source_id,
                            error = %e,
                            "failed to register sub-task definition"
                        ),
                    }
                    result
                });
                PendingRegistration::Spawned {
                    code,
                    source_id,
                    handle,
                }
            }
            Err(e) => {
                tracing::error!(
                    code = %code,
                    source_id,
                    error = %e,
                    "no async runtime; sub-task definition not registered"
                );
                PendingRegistration::NotStarted(RegistrationOutcome {
                    code,
                    source_id,
                    result: Err(format!("no async runtime: {}", e)),
                })
            }
        };

        let mut tracked = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        // finished creates already logged their outcome
        tracked.retain(|registration| match registration {
            PendingRegistration::Spawned { handle, .. } => !handle.is_finished(),
            PendingRegistration::NotStarted(_) => false,
        });
        tracked.push(pending);
    }

    /// Number of registrations still tracked for `settle`.
    pub fn pending_count(&self) -> usize {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Wait for the tracked registrations and report their outcomes in issue
    /// order. Registrations that had already finished when a later one was
    /// issued are dropped from tracking and not reported. Nothing is
    /// cancelled or retried.
    pub async fn settle(&self) -> Vec<RegistrationOutcome> {
        let pending = std::mem::take(
            &mut *self.pending.lock().unwrap_or_else(PoisonError::into_inner),
        );

        let mut outcomes = Vec::with_capacity(pending.len());
        for registration in pending {
            match registration {
                PendingRegistration::Spawned {
                    code,
                    source_id,
                    handle,
                } => {
                    let result = match handle.await {
                        Ok(result) => result.map_err(|e| e.to_string()),
                        Err(e) => Err(format!("registration task failed: {}", e)),
                    };
                    outcomes.push(RegistrationOutcome {
                        code,
                        source_id,
                        result,
                    });
                }
                PendingRegistration::NotStarted(outcome) => outcomes.push(outcome),
            }
        }
        outcomes
    }
}

/// Capability object scoped to one plugin.
pub struct PluginScopedApi {
    base: CapabilityApi,
    bridge: Arc<SubTaskBridge>,
    plugin_id: Option<i64>,
}

impl PluginScopedApi {
    pub fn new(base: CapabilityApi, bridge: Arc<SubTaskBridge>, plugin_id: Option<i64>) -> Self {
        Self {
            base,
            bridge,
            plugin_id,
        }
    }

    pub fn plugin_id(&self) -> Option<i64> {
        self.plugin_id
    }
}

impl AssistantTypeApi for PluginScopedApi {
    fn type_regist(
        &self,
        plugin_kind: PluginKind,
        code: AssistantTypeCode,
        label: &str,
        instance: Arc<dyn AssistantTypePlugin>,
    ) {
        self.base.type_regist(plugin_kind, code, label, instance);
    }

    fn hide_field(&self, field_name: &str) {
        self.base.hide_field(field_name);
    }

    fn change_field_label(&self, field_name: &str, label: &str) {
        self.base.change_field_label(field_name, label);
    }

    fn add_field_tips(&self, field_name: &str, tip: &str) {
        self.base.add_field_tips(field_name, tip);
    }

    fn add_field(&self, field: AddFieldRequest) {
        self.base.add_field(field);
    }

    fn force_field_value(&self, field_name: &str, value: Value) {
        self.base.force_field_value(field_name, value);
    }

    fn run_logic(&self, logic: PluginLogic) {
        self.base.run_logic(logic);
    }

    fn sub_task_regist(&self, options: SubTaskOptions) {
        self.bridge.register(self.plugin_id, options);
    }

    fn markdown_remark_regist(&self, extension: Value) {
        self.base.markdown_remark_regist(extension);
    }
}
