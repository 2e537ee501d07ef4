//! Assistant-Type Plugin Contract
//!
//! - `AssistantTypeApi` - the capability surface handed to plugins
//! - `AssistantTypePlugin` - hooks a plugin implements
//! - `FieldValueSink` - consumer-side target of `force_field_value`
//! - `PluginDescriptor` - one entry of the externally supplied plugin list
//!
//! The `plugin_type` tags on a descriptor only pre-filter the list; dispatch
//! always goes through the `AssistantTypePlugin` trait.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::assistant_type::{AssistantTypeCode, ASSISTANT_TYPE_CAPABILITY};
use crate::error::CoreResult;
use crate::field::AddFieldRequest;
use crate::sub_task::SubTaskOptions;

/// Kind discriminator a plugin passes along with its type registration.
pub type PluginKind = u32;

/// Deferred plugin logic passed to `run_logic`.
pub type PluginLogic = Box<dyn FnOnce() + Send>;

/// Capability surface exposed to assistant-type plugins.
///
/// None of these operations fail or validate their input.
pub trait AssistantTypeApi: Send + Sync {
    /// Register an assistant type. The first name registered for a code is
    /// kept; the instance mapping is overwritten by every call.
    fn type_regist(
        &self,
        plugin_kind: PluginKind,
        code: AssistantTypeCode,
        label: &str,
        instance: Arc<dyn AssistantTypePlugin>,
    );

    /// Hide a field of the configuration form.
    fn hide_field(&self, field_name: &str);

    /// Replace the label of a field.
    fn change_field_label(&self, field_name: &str, label: &str);

    /// Replace the tip text of a field.
    fn add_field_tips(&self, field_name: &str, tip: &str);

    /// Append a custom field. Repeated names are kept as separate entries.
    fn add_field(&self, field: AddFieldRequest);

    /// Ask the hosting form to overwrite a field's current value.
    fn force_field_value(&self, field_name: &str, value: Value);

    /// Reserved for dynamic behavior.
    fn run_logic(&self, logic: PluginLogic);

    /// Register a sub-task definition on behalf of the calling plugin.
    fn sub_task_regist(&self, options: SubTaskOptions);

    /// Reserved markdown extension point.
    fn markdown_remark_regist(&self, extension: Value);
}

/// An assistant-type plugin instance.
///
/// `on_assistant_type_init` receives the instance as `Arc<Self>` so the
/// plugin can hand itself to `type_regist`.
pub trait AssistantTypePlugin: Send + Sync {
    /// Called exactly once per instance per registry.
    fn on_assistant_type_init(self: Arc<Self>, api: &dyn AssistantTypeApi) -> CoreResult<()>;

    /// Called when the user picks one of this plugin's types.
    fn on_assistant_type_select(&self, _api: &dyn AssistantTypeApi) -> CoreResult<()> {
        Ok(())
    }

    /// Called when an assistant of this plugin's type runs.
    fn on_assistant_type_run(&self, _api: &dyn AssistantTypeApi) -> CoreResult<()> {
        Ok(())
    }
}

/// Form-state target for `force_field_value`.
pub trait FieldValueSink: Send + Sync {
    fn force_value(&self, field_name: &str, value: Value);
}

/// One entry of the plugin list supplied by the plugin loader.
#[derive(Clone, Default)]
pub struct PluginDescriptor {
    pub id: Option<i64>,
    pub plugin_type: BTreeSet<String>,
    pub instance: Option<Arc<dyn AssistantTypePlugin>>,
}

impl PluginDescriptor {
    /// Descriptor tagged with the assistant-type capability.
    pub fn assistant_type(id: i64, instance: Arc<dyn AssistantTypePlugin>) -> Self {
        Self {
            id: Some(id),
            plugin_type: BTreeSet::from([ASSISTANT_TYPE_CAPABILITY.to_string()]),
            instance: Some(instance),
        }
    }

    pub fn with_plugin_type(mut self, tag: impl Into<String>) -> Self {
        self.plugin_type.insert(tag.into());
        self
    }

    pub fn has_capability(&self, tag: &str) -> bool {
        self.plugin_type.contains(tag)
    }
}

impl fmt::Debug for PluginDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDescriptor")
            .field("id", &self.id)
            .field("plugin_type", &self.plugin_type)
            .field("has_instance", &self.instance.is_some())
            .finish()
    }
}
