//! Settings Models
//!
//! Configuration of the assistant-type registry, stored in
//! `assistant-types.json`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use assistant_hub_core::ASSISTANT_TYPE_CAPABILITY;

/// Fields hidden in every registry regardless of configuration.
pub const ALWAYS_HIDDEN_FIELDS: &[&str] = &["seed"];

/// Registry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Tag a plugin descriptor must carry to be initialized as an assistant-type plugin
    #[serde(default = "default_capability_tag")]
    pub capability_tag: String,
    /// Field overrides applied once per registry before any plugin runs
    #[serde(default)]
    pub baseline: BaselineFieldDefaults,
}

fn default_capability_tag() -> String {
    ASSISTANT_TYPE_CAPABILITY.to_string()
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            capability_tag: default_capability_tag(),
            baseline: BaselineFieldDefaults::default(),
        }
    }
}

impl RegistryConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.capability_tag.trim().is_empty() {
            return Err("capability_tag must not be empty".to_string());
        }
        let names = self
            .baseline
            .labels
            .keys()
            .chain(self.baseline.tips.keys())
            .chain(self.baseline.hidden.iter());
        for name in names {
            if name.trim().is_empty() {
                return Err("baseline field names must not be empty".to_string());
            }
        }
        Ok(())
    }

    /// Apply a partial update
    pub fn apply_update(&mut self, update: RegistryConfigUpdate) {
        if let Some(tag) = update.capability_tag {
            self.capability_tag = tag;
        }
        if let Some(baseline) = update.baseline {
            self.baseline = baseline;
        }
    }
}

/// Labels, tips and hidden fields for the well-known generation parameters.
///
/// `hidden` adds to [`ALWAYS_HIDDEN_FIELDS`]; it cannot unhide those.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineFieldDefaults {
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub tips: BTreeMap<String, String>,
    #[serde(default)]
    pub hidden: Vec<String>,
}

impl Default for BaselineFieldDefaults {
    fn default() -> Self {
        let labels = [
            ("temperature", "Temperature"),
            ("top_p", "Top P"),
            ("max_tokens", "Max tokens"),
            ("presence_penalty", "Presence penalty"),
            ("frequency_penalty", "Frequency penalty"),
        ];
        let tips = [
            (
                "temperature",
                "Higher values make replies more varied, lower values more deterministic",
            ),
            (
                "top_p",
                "Only tokens inside the top P probability mass are sampled",
            ),
            ("max_tokens", "Upper bound on tokens generated per reply"),
            (
                "presence_penalty",
                "Positive values encourage the model to move to new topics",
            ),
            (
                "frequency_penalty",
                "Positive values discourage repeating the same wording",
            ),
        ];
        Self {
            labels: labels
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            tips: tips
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            hidden: Vec::new(),
        }
    }
}

/// Partial update of the registry configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RegistryConfigUpdate {
    pub capability_tag: Option<String>,
    pub baseline: Option<BaselineFieldDefaults>,
}
