//! Form Field Types
//!
//! Declarative descriptors that plugins add to the shared assistant
//! configuration form. The registry never interprets a `FieldSpec` beyond
//! building it; the form renderer owns its meaning.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque field descriptor: `{ type, label, value: "" }` with the plugin's
/// configuration merged on top.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldSpec(Map<String, Value>);

impl FieldSpec {
    /// Build a descriptor from its defaults, then apply `config`.
    ///
    /// Keys in `config` always win, including `type`, `label` and `value`.
    pub fn merged(field_type: &str, label: &str, config: Map<String, Value>) -> Self {
        let mut spec = Map::new();
        spec.insert("type".to_string(), Value::String(field_type.to_string()));
        spec.insert("label".to_string(), Value::String(label.to_string()));
        spec.insert("value".to_string(), Value::String(String::new()));
        for (key, value) in config {
            spec.insert(key, value);
        }
        Self(spec)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn field_type(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    pub fn label(&self) -> Option<&str> {
        self.0.get("label").and_then(Value::as_str)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// A custom field appended by a plugin. Keys may repeat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomField {
    pub key: String,
    pub value: FieldSpec,
}

/// Arguments of `add_field`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFieldRequest {
    pub field_name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub field_config: Map<String, Value>,
}

impl AddFieldRequest {
    pub fn new(
        field_name: impl Into<String>,
        label: impl Into<String>,
        field_type: impl Into<String>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            label: label.into(),
            field_type: field_type.into(),
            field_config: Map::new(),
        }
    }

    /// Add one configuration entry merged over the defaults.
    pub fn with_config(mut self, key: impl Into<String>, value: Value) -> Self {
        self.field_config.insert(key.into(), value);
        self
    }

    pub fn into_custom_field(self) -> CustomField {
        CustomField {
            value: FieldSpec::merged(&self.field_type, &self.label, self.field_config),
            key: self.field_name,
        }
    }
}
