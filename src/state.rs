//! Application State
//!
//! Owns the registry configuration, the sub-task store, the icon registry,
//! the main-shell assistant-type registry and one registry per open
//! conversation window.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::RwLock;

use assistant_hub_core::{FieldValueSink, PluginDescriptor, SubTaskStore};

use crate::models::settings::{RegistryConfig, RegistryConfigUpdate};
use crate::services::assistant_types::{
    AssistantTypeRegistry, IconRegistry, InitReport, RegistrationOutcome, RegistryScope,
};
use crate::storage::{ConfigService, MemorySubTaskStore};
use crate::utils::error::{AppError, AppResult};

/// Application state shared by all command functions
pub struct AppState {
    /// Configuration service for the registry settings
    config: Arc<RwLock<Option<ConfigService>>>,
    /// Persistence surface for sub-task definitions
    store: Arc<dyn SubTaskStore>,
    icons: Arc<IconRegistry>,
    main_shell: Arc<RwLock<Option<AssistantTypeRegistry>>>,
    conversations: Arc<RwLock<HashMap<String, AssistantTypeRegistry>>>,
}

impl AppState {
    /// State backed by an in-memory store and the process-wide icon registry
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemorySubTaskStore::new()), IconRegistry::global())
    }

    pub fn with_store(store: Arc<dyn SubTaskStore>, icons: Arc<IconRegistry>) -> Self {
        Self {
            config: Arc::new(RwLock::new(None)),
            store,
            icons,
            main_shell: Arc::new(RwLock::new(None)),
            conversations: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Load the registry configuration from its default location
    pub async fn initialize(&self) -> AppResult<()> {
        self.install_config(ConfigService::new()?).await;
        Ok(())
    }

    /// Load the registry configuration from `path`
    pub async fn initialize_with_config_path(&self, path: impl Into<PathBuf>) -> AppResult<()> {
        self.install_config(ConfigService::load_or_create(path)?).await;
        Ok(())
    }

    async fn install_config(&self, service: ConfigService) {
        tracing::info!(path = %service.path().display(), "assistant-type config loaded");
        *self.config.write().await = Some(service);
    }

    pub fn store(&self) -> &Arc<dyn SubTaskStore> {
        &self.store
    }

    pub fn icons(&self) -> &Arc<IconRegistry> {
        &self.icons
    }

    pub fn is_config_healthy(&self) -> bool {
        if let Ok(guard) = self.config.try_read() {
            if let Some(ref config) = *guard {
                return config.is_healthy();
            }
        }
        false
    }

    /// Current registry configuration, or the defaults before `initialize`
    pub async fn registry_config(&self) -> RegistryConfig {
        let guard = self.config.read().await;
        match &*guard {
            Some(config) => config.get_config_clone(),
            None => RegistryConfig::default(),
        }
    }

    /// Update and persist the configuration. Applies to registries created afterwards.
    pub async fn update_registry_config(
        &self,
        update: RegistryConfigUpdate,
    ) -> AppResult<RegistryConfig> {
        let mut guard = self.config.write().await;
        match &mut *guard {
            Some(config) => config.update_config(update),
            None => Err(AppError::config("Config service not initialized")),
        }
    }

    async fn build_registry(
        &self,
        scope: RegistryScope,
        field_sink: Option<Arc<dyn FieldValueSink>>,
    ) -> AssistantTypeRegistry {
        let mut builder = AssistantTypeRegistry::builder(scope, self.store.clone())
            .icons(self.icons.clone())
            .config(self.registry_config().await);
        if let Some(sink) = field_sink {
            builder = builder.field_sink(sink);
        }
        builder.build()
    }

    /// Create the main-shell registry on first use and run an initialization
    /// pass over `plugins`. Call again whenever the plugin list changes.
    pub async fn mount_main_shell(&self, plugins: &[PluginDescriptor]) -> InitReport {
        let mut guard = self.main_shell.write().await;
        if guard.is_none() {
            *guard = Some(self.build_registry(RegistryScope::MainShell, None).await);
        }
        match guard.as_mut() {
            Some(registry) => registry.initialize_plugins(plugins),
            None => InitReport::default(),
        }
    }

    /// Create (or reuse) the registry of a conversation window and run an
    /// initialization pass over `plugins`.
    pub async fn open_conversation(
        &self,
        conversation_id: &str,
        plugins: &[PluginDescriptor],
        field_sink: Option<Arc<dyn FieldValueSink>>,
    ) -> InitReport {
        let mut guard = self.conversations.write().await;
        if !guard.contains_key(conversation_id) {
            let scope = RegistryScope::Conversation(conversation_id.to_string());
            let registry = self.build_registry(scope, field_sink).await;
            guard.insert(conversation_id.to_string(), registry);
        }
        match guard.get_mut(conversation_id) {
            Some(registry) => registry.initialize_plugins(plugins),
            None => InitReport::default(),
        }
    }

    /// Drop a conversation's registry. In-flight sub-task registrations keep running.
    pub async fn close_conversation(&self, conversation_id: &str) -> bool {
        let removed = self.conversations.write().await.remove(conversation_id);
        if removed.is_some() {
            tracing::debug!(conversation_id, "conversation registry dropped");
        }
        removed.is_some()
    }

    pub async fn open_conversation_count(&self) -> usize {
        self.conversations.read().await.len()
    }

    /// Run `f` against the registry of `scope`.
    pub async fn with_registry<F, T>(&self, scope: &RegistryScope, f: F) -> AppResult<T>
    where
        F: FnOnce(&AssistantTypeRegistry) -> T,
    {
        match scope {
            RegistryScope::MainShell => {
                let guard = self.main_shell.read().await;
                match &*guard {
                    Some(registry) => Ok(f(registry)),
                    None => Err(AppError::not_found("Main shell registry not mounted")),
                }
            }
            RegistryScope::Conversation(id) => {
                let guard = self.conversations.read().await;
                match guard.get(id) {
                    Some(registry) => Ok(f(registry)),
                    None => Err(AppError::not_found(format!(
                        "No registry for conversation {}",
                        id
                    ))),
                }
            }
        }
    }

    /// Wait for outstanding sub-task registrations of the registry of `scope`.
    ///
    /// Registry locks are released before waiting on the store.
    pub async fn settle_sub_tasks(
        &self,
        scope: &RegistryScope,
    ) -> AppResult<Vec<RegistrationOutcome>> {
        let bridge = self.with_registry(scope, |r| r.sub_task_bridge()).await?;
        Ok(bridge.settle().await)
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
