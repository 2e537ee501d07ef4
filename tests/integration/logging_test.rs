//! Diagnostics Integration Tests
//!
//! Plugin init failures and rejected sub-task writes must surface as
//! error-level `tracing` events carrying the plugin id or sub-task code.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Level, Metadata, Subscriber};

use assistant_hub_core::{PluginDescriptor, SubTaskOptions};
use assistant_hub_desktop::storage::MemorySubTaskStore;
use assistant_hub_desktop::{AssistantTypeRegistry, IconRegistry, RegistryScope};

use super::assistant_type_test::BrokenPlugin;
use super::sub_task_test::{OfflineStore, SubTaskPlugin};

// ============================================================================
// Event Capture
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: Level,
    fields: BTreeMap<String, String>,
}

impl CapturedEvent {
    fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

struct FieldVisitor<'a>(&'a mut BTreeMap<String, String>);

impl Visit for FieldVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{:?}", value));
    }
}

/// Records every event; spans are ignored.
#[derive(Clone, Default)]
struct CaptureSubscriber {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CaptureSubscriber {
    fn at(&self, level: Level) -> Vec<CapturedEvent> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|e| e.level == level)
            .cloned()
            .collect()
    }
}

impl Subscriber for CaptureSubscriber {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn new_span(&self, _span: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _span: &Id, _values: &Record<'_>) {}

    fn record_follows_from(&self, _span: &Id, _follows: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let mut fields = BTreeMap::new();
        event.record(&mut FieldVisitor(&mut fields));
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            fields,
        });
    }

    fn enter(&self, _span: &Id) {}

    fn exit(&self, _span: &Id) {}
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_init_failure_logged_with_plugin_id() {
    let capture = CaptureSubscriber::default();
    let mut reg = AssistantTypeRegistry::builder(
        RegistryScope::MainShell,
        Arc::new(MemorySubTaskStore::new()),
    )
    .icons(Arc::new(IconRegistry::new()))
    .build();

    tracing::subscriber::with_default(capture.clone(), || {
        reg.initialize_plugins(&[PluginDescriptor::assistant_type(7, Arc::new(BrokenPlugin))]);
    });

    let errors = capture.at(Level::ERROR);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field("plugin_id"), Some("Some(7)"));
    assert!(errors[0].field("error").unwrap().contains("missing binary"));
}

#[tokio::test]
async fn test_rejected_persistence_logged_with_code() {
    let capture = CaptureSubscriber::default();
    // current-thread runtime: the spawned create runs on this thread
    let _guard = tracing::subscriber::set_default(capture.clone());

    let mut reg = AssistantTypeRegistry::builder(RegistryScope::MainShell, Arc::new(OfflineStore))
        .icons(Arc::new(IconRegistry::new()))
        .build();
    let report = reg.initialize_plugins(&[PluginDescriptor::assistant_type(
        3,
        Arc::new(SubTaskPlugin {
            sub_tasks: vec![SubTaskOptions::new("demo", "Demo")],
        }),
    )]);
    assert_eq!(report.initialized, vec![Some(3)]);
    reg.settle_sub_tasks().await;

    let errors = capture.at(Level::ERROR);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].field("code"), Some("demo"));
    assert_eq!(errors[0].field("source_id"), Some("3"));
    assert!(errors[0].field("error").unwrap().contains("backend offline"));
}
