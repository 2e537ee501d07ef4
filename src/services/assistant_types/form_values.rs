//! Backend-held form values, used as the `force_field_value` target by hosts
//! that keep a conversation's configuration form state on this side.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

use serde_json::Value;

use assistant_hub_core::FieldValueSink;

#[derive(Debug, Default)]
pub struct FormValues {
    values: RwLock<BTreeMap<String, Value>>,
}

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field_name: &str) -> Option<Value> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(field_name)
            .cloned()
    }

    pub fn set(&self, field_name: &str, value: Value) {
        self.values
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(field_name.to_string(), value);
    }

    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.values
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl FieldValueSink for FormValues {
    fn force_value(&self, field_name: &str, value: Value) {
        tracing::debug!(field_name, "plugin forced form value");
        self.set(field_name, value);
    }
}
