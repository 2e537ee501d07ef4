//! Assistant-Type Registry Integration Tests
//!
//! Plugins initialized through `AssistantTypeRegistry` and `AppState`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::json;

use assistant_hub_core::{
    AddFieldRequest, AssistantType, AssistantTypeApi, AssistantTypePlugin, CoreError, CoreResult,
    PluginDescriptor,
};
use assistant_hub_desktop::services::assistant_types::SkipReason;
use assistant_hub_desktop::storage::MemorySubTaskStore;
use assistant_hub_desktop::{
    AppState, AssistantTypeRegistry, FormValues, IconRegistry, RegistryScope,
};

// ============================================================================
// Test Plugins
// ============================================================================

/// Registers code 100 as "ACP 助手" and hides the model field.
#[derive(Default)]
struct AcpPlugin {
    inits: AtomicUsize,
}

impl AssistantTypePlugin for AcpPlugin {
    fn on_assistant_type_init(self: Arc<Self>, api: &dyn AssistantTypeApi) -> CoreResult<()> {
        self.inits.fetch_add(1, Ordering::SeqCst);
        api.type_regist(1, 100, "ACP 助手", self.clone());
        api.hide_field("model");
        Ok(())
    }
}

pub(super) struct BrokenPlugin;

impl AssistantTypePlugin for BrokenPlugin {
    fn on_assistant_type_init(self: Arc<Self>, api: &dyn AssistantTypeApi) -> CoreResult<()> {
        api.hide_field("half_done");
        Err(CoreError::plugin("missing binary"))
    }
}

/// Registers an arbitrary code/name pair.
struct NamedPlugin {
    code: i64,
    name: &'static str,
}

impl AssistantTypePlugin for NamedPlugin {
    fn on_assistant_type_init(self: Arc<Self>, api: &dyn AssistantTypeApi) -> CoreResult<()> {
        api.type_regist(2, self.code, self.name, self.clone());
        Ok(())
    }
}

/// Exercises the form-facing part of the capability API.
struct FormPlugin;

impl AssistantTypePlugin for FormPlugin {
    fn on_assistant_type_init(self: Arc<Self>, api: &dyn AssistantTypeApi) -> CoreResult<()> {
        api.type_regist(3, 400, "Local agent", self);
        for _ in 0..3 {
            api.hide_field("prompt");
        }
        api.change_field_label("a", "L1");
        api.change_field_label("a", "L2");
        api.add_field_tips("acp_cmd", "Command used to start the agent");
        api.add_field(AddFieldRequest::new("acp_cmd", "Command", "input"));
        api.add_field(
            AddFieldRequest::new("acp_cmd", "Command", "input").with_config("value", json!("npx")),
        );
        api.force_field_value("model", json!("local"));
        Ok(())
    }
}

fn registry() -> AssistantTypeRegistry {
    AssistantTypeRegistry::builder(RegistryScope::MainShell, Arc::new(MemorySubTaskStore::new()))
        .icons(Arc::new(IconRegistry::new()))
        .build()
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_single_plugin_registers_type_and_hides_field() {
    let mut reg = registry();
    let plugin = Arc::new(AcpPlugin::default());
    let instance: Arc<dyn AssistantTypePlugin> = plugin.clone();

    let report = reg.initialize_plugins(&[PluginDescriptor::assistant_type(1, instance.clone())]);

    assert_eq!(report.initialized, vec![Some(1)]);
    assert_eq!(reg.assistant_types(), vec![AssistantType::new(100, "ACP 助手")]);
    assert!(reg.field_overrides().is_hidden("model"));
    assert!(reg.is_initialized(&instance));
    assert!(Arc::ptr_eq(&reg.plugin_for(100).unwrap(), &instance));
}

#[test]
fn test_failing_plugin_does_not_block_siblings() {
    let mut reg = registry();
    let q = Arc::new(AcpPlugin::default());

    let report = reg.initialize_plugins(&[
        PluginDescriptor::assistant_type(1, Arc::new(BrokenPlugin)),
        PluginDescriptor::assistant_type(2, q.clone()),
    ]);

    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].id, Some(1));
    assert!(report.failed[0].error.contains("missing binary"));
    assert_eq!(report.initialized, vec![Some(2)]);
    assert_eq!(q.inits.load(Ordering::SeqCst), 1);

    // mutations made before the failure are kept
    assert!(reg.field_overrides().is_hidden("half_done"));
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn test_repeated_passes_initialize_once() {
    let mut reg = registry();
    let plugin = Arc::new(AcpPlugin::default());
    let list = vec![PluginDescriptor::assistant_type(1, plugin.clone())];

    reg.initialize_plugins(&list);
    let second = reg.initialize_plugins(&list);

    // a new list containing the same instance is still a no-op
    let mut grown = list.clone();
    grown.push(PluginDescriptor::assistant_type(2, Arc::new(AcpPlugin::default())));
    let third = reg.initialize_plugins(&grown);

    assert_eq!(plugin.inits.load(Ordering::SeqCst), 1);
    assert_eq!(second.skipped[0].reason, SkipReason::AlreadyInitialized);
    assert_eq!(third.initialized, vec![Some(2)]);
}

#[test]
fn test_duplicate_code_first_name_last_instance() {
    let mut reg = registry();
    let first: Arc<dyn AssistantTypePlugin> = Arc::new(NamedPlugin {
        code: 7,
        name: "First",
    });
    let second: Arc<dyn AssistantTypePlugin> = Arc::new(NamedPlugin {
        code: 7,
        name: "Second",
    });

    let report = reg.initialize_plugins(&[
        PluginDescriptor::assistant_type(1, first.clone()),
        PluginDescriptor::assistant_type(2, second.clone()),
    ]);

    // distinct instances both initialize even though they share a code
    assert_eq!(report.initialized, vec![Some(1), Some(2)]);
    assert_eq!(reg.assistant_types(), vec![AssistantType::new(7, "First")]);
    assert!(Arc::ptr_eq(&reg.plugin_for(7).unwrap(), &second));
}

#[test]
fn test_form_overrides_accumulate() {
    let mut reg = registry();
    reg.initialize_plugins(&[PluginDescriptor::assistant_type(3, Arc::new(FormPlugin))]);

    let overrides = reg.field_overrides();
    assert!(overrides.is_hidden("prompt"));
    assert_eq!(
        overrides.hidden_fields.iter().filter(|f| *f == "prompt").count(),
        1
    );
    assert_eq!(overrides.label_for("a"), Some("L2"));
    assert_eq!(overrides.tip_for("acp_cmd"), Some("Command used to start the agent"));
    assert_eq!(overrides.custom_fields_named("acp_cmd").count(), 2);
    assert_eq!(overrides.custom_fields[1].value.get("value"), Some(&json!("npx")));

    // baseline defaults sit alongside plugin overrides
    assert!(overrides.is_hidden("seed"));
    assert_eq!(overrides.label_for("temperature"), Some("Temperature"));
}

#[test]
fn test_field_overrides_serialize_for_the_form_renderer() {
    let mut reg = registry();
    reg.initialize_plugins(&[PluginDescriptor::assistant_type(3, Arc::new(FormPlugin))]);

    let json = serde_json::to_value(reg.field_overrides()).unwrap();
    assert!(json["hiddenFields"].as_array().unwrap().contains(&json!("prompt")));
    assert_eq!(json["labelOverrides"]["a"], "L2");
    assert_eq!(json["customFields"][0]["key"], "acp_cmd");
    assert_eq!(json["customFields"][0]["value"]["type"], "input");
    assert_eq!(json["customFields"][0]["value"]["value"], "");
}

// ============================================================================
// Hosting Contexts
// ============================================================================

#[tokio::test]
async fn test_conversation_registry_is_isolated_and_forces_values() {
    let state = AppState::with_store(
        Arc::new(MemorySubTaskStore::new()),
        Arc::new(IconRegistry::new()),
    );
    let form = Arc::new(FormValues::new());

    state.mount_main_shell(&[]).await;
    let report = state
        .open_conversation(
            "conv-42",
            &[PluginDescriptor::assistant_type(3, Arc::new(FormPlugin))],
            Some(form.clone()),
        )
        .await;
    assert_eq!(report.initialized, vec![Some(3)]);
    assert_eq!(form.get("model"), Some(json!("local")));

    let conversation = RegistryScope::Conversation("conv-42".to_string());
    let conv_types = state
        .with_registry(&conversation, |r| r.assistant_types())
        .await
        .unwrap();
    let main_types = state
        .with_registry(&RegistryScope::MainShell, |r| r.assistant_types())
        .await
        .unwrap();
    assert_eq!(conv_types.len(), 1);
    assert!(main_types.is_empty());

    let main_hidden = state
        .with_registry(&RegistryScope::MainShell, |r| r.field_overrides().is_hidden("prompt"))
        .await
        .unwrap();
    assert!(!main_hidden);
}
