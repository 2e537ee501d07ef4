//! Sub-Task Icon Registry
//!
//! Synchronous `code -> icon` map. Icons are registered before the matching
//! backend definition exists, so the UI can show them immediately. The map is
//! independent of plugin lifecycle; `IconRegistry::global()` returns the
//! process-wide instance, and hosts may also construct their own.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use assistant_hub_core::{CoreError, CoreResult, IconRef};

static GLOBAL_ICONS: OnceLock<Arc<IconRegistry>> = OnceLock::new();

/// Map from sub-task code to icon reference.
#[derive(Debug, Default)]
pub struct IconRegistry {
    icons: RwLock<HashMap<String, IconRef>>,
}

impl IconRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide icon registry.
    pub fn global() -> Arc<IconRegistry> {
        GLOBAL_ICONS
            .get_or_init(|| Arc::new(IconRegistry::new()))
            .clone()
    }

    /// Associate `icon` with `code`, replacing any previous icon.
    pub fn register(&self, code: &str, icon: IconRef) -> CoreResult<()> {
        if code.is_empty() {
            return Err(CoreError::icon("sub-task code is empty"));
        }
        if icon.name().trim().is_empty() {
            return Err(CoreError::icon(format!(
                "empty icon reference for sub-task '{}'",
                code
            )));
        }
        self.icons
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(code.to_string(), icon);
        Ok(())
    }

    pub fn get(&self, code: &str) -> Option<IconRef> {
        self.icons
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(code)
            .cloned()
    }

    pub fn contains(&self, code: &str) -> bool {
        self.icons
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.icons.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
