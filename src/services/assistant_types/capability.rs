//! Capability API
//!
//! `CapabilityApi` is the object handed to assistant-type plugins. Every clone
//! shares one `RegistryState`, so the object identity stays stable for the
//! lifetime of its registry and all plugins accumulate into the same maps:
//!
//! - type list (first name per code wins) and `code -> instance` (last wins)
//! - hidden fields (set union)
//! - label and tip overrides (last writer per field wins)
//! - custom fields (append-only, duplicate keys kept)

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use assistant_hub_core::{
    AddFieldRequest, AssistantType, AssistantTypeApi, AssistantTypeCode, AssistantTypePlugin,
    CustomField, FieldValueSink, PluginKind, PluginLogic, SubTaskOptions,
};

/// The plugin instance behind an assistant-type code.
#[derive(Clone)]
pub struct TypeRegistration {
    pub kind: PluginKind,
    pub instance: Arc<dyn AssistantTypePlugin>,
}

impl fmt::Debug for TypeRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistration")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct RegistryState {
    types: Vec<AssistantType>,
    registrations: HashMap<AssistantTypeCode, TypeRegistration>,
    hidden_fields: BTreeSet<String>,
    label_overrides: BTreeMap<String, String>,
    tip_overrides: BTreeMap<String, String>,
    custom_fields: Vec<CustomField>,
}

/// What the form renderer reads when it builds the configuration form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldOverrideSnapshot {
    pub hidden_fields: BTreeSet<String>,
    pub label_overrides: BTreeMap<String, String>,
    pub tip_overrides: BTreeMap<String, String>,
    pub custom_fields: Vec<CustomField>,
}

impl FieldOverrideSnapshot {
    pub fn is_hidden(&self, field_name: &str) -> bool {
        self.hidden_fields.contains(field_name)
    }

    pub fn label_for(&self, field_name: &str) -> Option<&str> {
        self.label_overrides.get(field_name).map(String::as_str)
    }

    pub fn tip_for(&self, field_name: &str) -> Option<&str> {
        self.tip_overrides.get(field_name).map(String::as_str)
    }

    /// All custom fields registered under `key`, in registration order.
    pub fn custom_fields_named<'a>(
        &'a self,
        key: &'a str,
    ) -> impl Iterator<Item = &'a CustomField> + 'a {
        self.custom_fields.iter().filter(move |f| f.key == key)
    }
}

/// Shared capability object for one registry.
#[derive(Clone, Default)]
pub struct CapabilityApi {
    state: Arc<RwLock<RegistryState>>,
    field_sink: Option<Arc<dyn FieldValueSink>>,
}

impl CapabilityApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Route `force_field_value` into the consumer's form state.
    pub fn with_field_sink(mut self, sink: Arc<dyn FieldValueSink>) -> Self {
        self.field_sink = Some(sink);
        self
    }

    /// Whether `other` shares this object's state.
    pub fn same_instance(&self, other: &CapabilityApi) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registered assistant types in registration order.
    pub fn assistant_types(&self) -> Vec<AssistantType> {
        self.read().types.clone()
    }

    pub fn assistant_type(&self, code: AssistantTypeCode) -> Option<AssistantType> {
        self.read().types.iter().find(|t| t.code == code).cloned()
    }

    pub fn registration(&self, code: AssistantTypeCode) -> Option<TypeRegistration> {
        self.read().registrations.get(&code).cloned()
    }

    pub fn field_overrides(&self) -> FieldOverrideSnapshot {
        let state = self.read();
        FieldOverrideSnapshot {
            hidden_fields: state.hidden_fields.clone(),
            label_overrides: state.label_overrides.clone(),
            tip_overrides: state.tip_overrides.clone(),
            custom_fields: state.custom_fields.clone(),
        }
    }

    pub fn is_field_hidden(&self, field_name: &str) -> bool {
        self.read().hidden_fields.contains(field_name)
    }
}

impl fmt::Debug for CapabilityApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read();
        f.debug_struct("CapabilityApi")
            .field("types", &state.types.len())
            .field("hidden_fields", &state.hidden_fields.len())
            .field("custom_fields", &state.custom_fields.len())
            .field("has_field_sink", &self.field_sink.is_some())
            .finish()
    }
}

impl AssistantTypeApi for CapabilityApi {
    fn type_regist(
        &self,
        plugin_kind: PluginKind,
        code: AssistantTypeCode,
        label: &str,
        instance: Arc<dyn AssistantTypePlugin>,
    ) {
        let mut state = self.write();
        if !state.types.iter().any(|t| t.code == code) {
            state.types.push(AssistantType::new(code, label));
        }
        state.registrations.insert(
            code,
            TypeRegistration {
                kind: plugin_kind,
                instance,
            },
        );
        tracing::debug!(code, plugin_kind, label, "assistant type registered");
    }

    fn hide_field(&self, field_name: &str) {
        self.write().hidden_fields.insert(field_name.to_string());
    }

    fn change_field_label(&self, field_name: &str, label: &str) {
        self.write()
            .label_overrides
            .insert(field_name.to_string(), label.to_string());
    }

    fn add_field_tips(&self, field_name: &str, tip: &str) {
        self.write()
            .tip_overrides
            .insert(field_name.to_string(), tip.to_string());
    }

    fn add_field(&self, field: AddFieldRequest) {
        self.write().custom_fields.push(field.into_custom_field());
    }

    fn force_field_value(&self, field_name: &str, value: Value) {
        match &self.field_sink {
            Some(sink) => sink.force_value(field_name, value),
            None => tracing::trace!(field_name, "force_field_value without a form sink"),
        }
    }

    fn run_logic(&self, _logic: PluginLogic) {}

    fn sub_task_regist(&self, options: SubTaskOptions) {
        tracing::warn!(
            code = %options.code,
            "sub_task_regist called without a plugin context; ignored"
        );
    }

    fn markdown_remark_regist(&self, _extension: Value) {}
}
