//! Assistant-Type Commands
//!
//! IPC entry points the UI uses to read registry state and dispatch type
//! selection. `conversation_id = None` addresses the main-shell registry.

use assistant_hub_core::{AssistantType, AssistantTypeCode, SubTaskDefinition};

use crate::models::response::CommandResponse;
use crate::models::settings::RegistryConfig;
use crate::services::assistant_types::{FieldOverrideSnapshot, RegistryScope};
use crate::state::AppState;
use crate::utils::error::AppError;

fn scope_for(conversation_id: Option<String>) -> RegistryScope {
    match conversation_id {
        Some(id) => RegistryScope::Conversation(id),
        None => RegistryScope::MainShell,
    }
}

/// List the registered assistant types
pub async fn get_assistant_types(
    state: &AppState,
    conversation_id: Option<String>,
) -> Result<CommandResponse<Vec<AssistantType>>, String> {
    let scope = scope_for(conversation_id);
    Ok(state
        .with_registry(&scope, |r| r.assistant_types())
        .await
        .into())
}

/// Get the hidden fields, label/tip overrides and custom fields for the config form
pub async fn get_field_overrides(
    state: &AppState,
    conversation_id: Option<String>,
) -> Result<CommandResponse<FieldOverrideSnapshot>, String> {
    let scope = scope_for(conversation_id);
    Ok(state
        .with_registry(&scope, |r| r.field_overrides())
        .await
        .into())
}

/// Notify the plugin owning `code` that the user picked its type
pub async fn select_assistant_type(
    state: &AppState,
    conversation_id: Option<String>,
    code: AssistantTypeCode,
) -> Result<CommandResponse<bool>, String> {
    let scope = scope_for(conversation_id);
    let result = state
        .with_registry(&scope, |r| r.select(code))
        .await
        .and_then(|selected| selected.map(|_| true).map_err(AppError::from));
    if let Err(e) = &result {
        tracing::warn!(code, scope = %scope, error = %e, "assistant type selection failed");
    }
    Ok(result.into())
}

/// List sub-task definitions known to the persistence surface
pub async fn list_sub_task_definitions(
    state: &AppState,
) -> Result<CommandResponse<Vec<SubTaskDefinition>>, String> {
    let result = state
        .store()
        .list_sub_task_definitions()
        .await
        .map_err(AppError::from);
    Ok(result.into())
}

/// Get the current registry configuration
pub async fn get_registry_config(
    state: &AppState,
) -> Result<CommandResponse<RegistryConfig>, String> {
    Ok(CommandResponse::ok(state.registry_config().await))
}
