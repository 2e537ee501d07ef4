//! Storage Layer
//!
//! - `config` - JSON configuration of the assistant-type registry
//! - `sub_tasks` - in-memory implementation of the sub-task persistence surface

pub mod config;
pub mod sub_tasks;

pub use config::ConfigService;
pub use sub_tasks::MemorySubTaskStore;
