//! Assistant-Type Registry
//!
//! One registry per hosting context (the main shell, or a single conversation
//! window). A registry owns its capability state and its orchestrator; two
//! registries never share mutable state, though they may share a sub-task
//! store and the icon registry.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use assistant_hub_core::{
    AssistantType, AssistantTypeApi, AssistantTypeCode, AssistantTypePlugin, CoreError,
    CoreResult, FieldValueSink, PluginDescriptor, SubTaskStore,
};

use super::bridge::{RegistrationOutcome, SubTaskBridge};
use super::capability::{CapabilityApi, FieldOverrideSnapshot};
use super::icons::IconRegistry;
use super::orchestrator::{panic_message, InitReport, Orchestrator};
use crate::models::settings::{BaselineFieldDefaults, RegistryConfig};

/// Hosting context a registry belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum RegistryScope {
    MainShell,
    Conversation(String),
}

impl fmt::Display for RegistryScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryScope::MainShell => write!(f, "main-shell"),
            RegistryScope::Conversation(id) => write!(f, "conversation:{}", id),
        }
    }
}

/// Builder for [`AssistantTypeRegistry`].
pub struct RegistryBuilder {
    scope: RegistryScope,
    store: Arc<dyn SubTaskStore>,
    icons: Option<Arc<IconRegistry>>,
    config: RegistryConfig,
    field_sink: Option<Arc<dyn FieldValueSink>>,
}

impl RegistryBuilder {
    /// Use a dedicated icon registry instead of the process-wide one.
    pub fn icons(mut self, icons: Arc<IconRegistry>) -> Self {
        self.icons = Some(icons);
        self
    }

    pub fn config(mut self, config: RegistryConfig) -> Self {
        self.config = config;
        self
    }

    /// Target of `force_field_value` for this registry's plugins.
    pub fn field_sink(mut self, sink: Arc<dyn FieldValueSink>) -> Self {
        self.field_sink = Some(sink);
        self
    }

    /// Build the registry and apply the baseline field defaults.
    pub fn build(self) -> AssistantTypeRegistry {
        let mut api = CapabilityApi::new();
        if let Some(sink) = self.field_sink {
            api = api.with_field_sink(sink);
        }
        let icons = self.icons.unwrap_or_else(IconRegistry::global);
        let bridge = Arc::new(SubTaskBridge::new(self.store, icons));
        let orchestrator = Orchestrator::new(api.clone(), bridge.clone(), self.config.capability_tag);

        let mut registry = AssistantTypeRegistry {
            scope: self.scope,
            api,
            bridge,
            orchestrator,
            baseline: self.config.baseline,
        };
        registry.apply_baseline_defaults();
        tracing::debug!(scope = %registry.scope, "assistant-type registry created");
        registry
    }
}

pub struct AssistantTypeRegistry {
    scope: RegistryScope,
    api: CapabilityApi,
    bridge: Arc<SubTaskBridge>,
    orchestrator: Orchestrator,
    baseline: BaselineFieldDefaults,
}

impl AssistantTypeRegistry {
    pub fn builder(scope: RegistryScope, store: Arc<dyn SubTaskStore>) -> RegistryBuilder {
        RegistryBuilder {
            scope,
            store,
            icons: None,
            config: RegistryConfig::default(),
            field_sink: None,
        }
    }

    pub fn scope(&self) -> &RegistryScope {
        &self.scope
    }

    /// The registry's capability object. Same identity for the registry's lifetime.
    pub fn capability_api(&self) -> &CapabilityApi {
        &self.api
    }

    pub fn icons(&self) -> &Arc<IconRegistry> {
        self.bridge.icons()
    }

    /// Apply the configured baseline field defaults. Already done by `build`,
    /// so later calls return `false` and change nothing.
    pub fn apply_baseline_defaults(&mut self) -> bool {
        self.orchestrator.apply_baseline(&self.baseline)
    }

    /// Run an initialization pass. Call again whenever the plugin list changes.
    pub fn initialize_plugins(&mut self, plugins: &[PluginDescriptor]) -> InitReport {
        let report = self.orchestrator.initialize(plugins);
        tracing::info!(
            scope = %self.scope,
            initialized = report.initialized.len(),
            failed = report.failed.len(),
            skipped = report.skipped.len(),
            "assistant-type initialization pass finished"
        );
        report
    }

    pub fn is_initialized(&self, instance: &Arc<dyn AssistantTypePlugin>) -> bool {
        self.orchestrator.is_initialized(instance)
    }

    pub fn assistant_types(&self) -> Vec<AssistantType> {
        self.api.assistant_types()
    }

    pub fn field_overrides(&self) -> FieldOverrideSnapshot {
        self.api.field_overrides()
    }

    /// The instance currently registered for `code`.
    pub fn plugin_for(&self, code: AssistantTypeCode) -> Option<Arc<dyn AssistantTypePlugin>> {
        self.api.registration(code).map(|r| r.instance)
    }

    /// Call `hook` on the plugin owning `code`. A panicking hook is reported
    /// as a plugin error.
    fn dispatch<F>(&self, code: AssistantTypeCode, hook: &str, f: F) -> CoreResult<()>
    where
        F: FnOnce(&dyn AssistantTypePlugin, &dyn AssistantTypeApi) -> CoreResult<()>,
    {
        let plugin = self
            .plugin_for(code)
            .ok_or_else(|| CoreError::not_found(format!("assistant type {}", code)))?;

        let api: &dyn AssistantTypeApi = &self.api;
        match panic::catch_unwind(AssertUnwindSafe(|| f(plugin.as_ref(), api))) {
            Ok(result) => result,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(
                    code,
                    hook,
                    scope = %self.scope,
                    error = %message,
                    "assistant-type plugin hook panicked"
                );
                Err(CoreError::plugin(format!("panic: {}", message)))
            }
        }
    }

    /// Dispatch `on_assistant_type_select` to the plugin owning `code`.
    pub fn select(&self, code: AssistantTypeCode) -> CoreResult<()> {
        self.dispatch(code, "select", |plugin, api| plugin.on_assistant_type_select(api))
    }

    /// Dispatch `on_assistant_type_run` to the plugin owning `code`.
    pub fn run(&self, code: AssistantTypeCode) -> CoreResult<()> {
        self.dispatch(code, "run", |plugin, api| plugin.on_assistant_type_run(api))
    }

    /// Handle on the sub-task bridge, usable after the registry is dropped.
    pub fn sub_task_bridge(&self) -> Arc<SubTaskBridge> {
        self.bridge.clone()
    }

    /// Wait for outstanding sub-task registrations issued by this registry's plugins.
    pub async fn settle_sub_tasks(&self) -> Vec<RegistrationOutcome> {
        self.bridge.settle().await
    }
}

impl fmt::Debug for AssistantTypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssistantTypeRegistry")
            .field("scope", &self.scope)
            .field("api", &self.api)
            .field("initialized", &self.orchestrator.initialized_count())
            .finish()
    }
}
