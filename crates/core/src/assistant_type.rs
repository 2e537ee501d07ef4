//! Assistant Types
//!
//! An assistant type is a numerically coded variant of assistant behavior
//! that a plugin introduces through `type_regist`.

use serde::{Deserialize, Serialize};

/// Numeric code identifying an assistant type within one registry.
pub type AssistantTypeCode = i64;

/// Capability tag a plugin descriptor must carry to take part in
/// assistant-type initialization.
pub const ASSISTANT_TYPE_CAPABILITY: &str = "assistantType";

/// A registered assistant type, as shown in type pickers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssistantType {
    pub code: AssistantTypeCode,
    pub name: String,
}

impl AssistantType {
    pub fn new(code: AssistantTypeCode, name: impl Into<String>) -> Self {
        Self {
            code,
            name: name.into(),
        }
    }
}
