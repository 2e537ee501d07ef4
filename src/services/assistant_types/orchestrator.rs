//! Initialization Orchestrator
//!
//! Runs `on_assistant_type_init` for every assistant-type plugin in a plugin
//! list, at most once per plugin instance. Instances are tracked by identity
//! (the `Arc` allocation), not by type code, and the orchestrator keeps each
//! initialized instance alive so an address is never reused for a new plugin.
//!
//! A plugin whose init hook returns an error or panics is logged and stays
//! initialized; the remaining plugins in the list are still processed.

use std::any::Any;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use assistant_hub_core::{AssistantTypeApi, AssistantTypePlugin, PluginDescriptor};

use super::bridge::{PluginScopedApi, SubTaskBridge};
use super::capability::CapabilityApi;
use crate::models::settings::{BaselineFieldDefaults, ALWAYS_HIDDEN_FIELDS};

/// Why a descriptor was not initialized in a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    MissingCapability,
    NoInstance,
    AlreadyInitialized,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedPlugin {
    pub id: Option<i64>,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedPlugin {
    pub id: Option<i64>,
    pub error: String,
}

/// Result of one initialization pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitReport {
    /// Plugins whose init hook completed
    pub initialized: Vec<Option<i64>>,
    pub skipped: Vec<SkippedPlugin>,
    /// Plugins whose init hook returned an error or panicked
    pub failed: Vec<FailedPlugin>,
}

impl InitReport {
    /// Number of init hooks invoked during the pass.
    pub fn invoked(&self) -> usize {
        self.initialized.len() + self.failed.len()
    }
}

fn instance_key(instance: &Arc<dyn AssistantTypePlugin>) -> usize {
    Arc::as_ptr(instance) as *const () as usize
}

pub(super) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "plugin panicked".to_string()
    }
}

pub struct Orchestrator {
    api: CapabilityApi,
    bridge: Arc<SubTaskBridge>,
    capability_tag: String,
    initialized: HashMap<usize, Arc<dyn AssistantTypePlugin>>,
    baseline_applied: bool,
}

impl Orchestrator {
    pub fn new(api: CapabilityApi, bridge: Arc<SubTaskBridge>, capability_tag: impl Into<String>) -> Self {
        Self {
            api,
            bridge,
            capability_tag: capability_tag.into(),
            initialized: HashMap::new(),
            baseline_applied: false,
        }
    }

    pub fn capability_tag(&self) -> &str {
        &self.capability_tag
    }

    /// Apply the baseline labels, tips and hidden fields, plus the fields
    /// hidden unconditionally. Only the first call has an effect; returns
    /// whether this call applied them.
    pub fn apply_baseline(&mut self, baseline: &BaselineFieldDefaults) -> bool {
        if self.baseline_applied {
            return false;
        }
        self.baseline_applied = true;

        for (field, label) in &baseline.labels {
            self.api.change_field_label(field, label);
        }
        for (field, tip) in &baseline.tips {
            self.api.add_field_tips(field, tip);
        }
        for field in ALWAYS_HIDDEN_FIELDS {
            self.api.hide_field(field);
        }
        for field in &baseline.hidden {
            self.api.hide_field(field);
        }
        true
    }

    pub fn baseline_applied(&self) -> bool {
        self.baseline_applied
    }

    pub fn is_initialized(&self, instance: &Arc<dyn AssistantTypePlugin>) -> bool {
        self.initialized.contains_key(&instance_key(instance))
    }

    pub fn initialized_count(&self) -> usize {
        self.initialized.len()
    }

    /// Run one pass over `plugins`, in list order.
    pub fn initialize(&mut self, plugins: &[PluginDescriptor]) -> InitReport {
        let mut report = InitReport::default();

        for descriptor in plugins {
            if !descriptor.has_capability(&self.capability_tag) {
                report.skipped.push(SkippedPlugin {
                    id: descriptor.id,
                    reason: SkipReason::MissingCapability,
                });
                continue;
            }
            let Some(instance) = descriptor.instance.as_ref() else {
                report.skipped.push(SkippedPlugin {
                    id: descriptor.id,
                    reason: SkipReason::NoInstance,
                });
                continue;
            };
            let key = instance_key(instance);
            if self.initialized.contains_key(&key) {
                report.skipped.push(SkippedPlugin {
                    id: descriptor.id,
                    reason: SkipReason::AlreadyInitialized,
                });
                continue;
            }

            self.initialized.insert(key, instance.clone());
            let scoped = PluginScopedApi::new(self.api.clone(), self.bridge.clone(), descriptor.id);

            let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
                instance.clone().on_assistant_type_init(&scoped)
            }));
            let error = match outcome {
                Ok(Ok(())) => None,
                Ok(Err(e)) => Some(e.to_string()),
                Err(payload) => Some(format!("panic: {}", panic_message(payload.as_ref()))),
            };

            match error {
                None => {
                    tracing::info!(plugin_id = ?descriptor.id, "assistant-type plugin initialized");
                    report.initialized.push(descriptor.id);
                }
                Some(error) => {
                    tracing::error!(
                        plugin_id = ?descriptor.id,
                        error = %error,
                        "assistant-type plugin failed to initialize"
                    );
                    report.failed.push(FailedPlugin {
                        id: descriptor.id,
                        error,
                    });
                }
            }
        }

        report
    }
}
