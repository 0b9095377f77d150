use std::collections::HashMap;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use ulid::Ulid;

use labwatch_core::{ComputerId, LogId, MaintenanceLog, today_utc};

use crate::AppState;
use crate::registry::{ComputerRegistry, MaintenanceLogStore};

use super::error::ApiError;
use super::models::{CreateLogRequest, LogEntryResponse};
use super::parse_id;

/// GET /api/logs
///
/// All audit entries, newest first, joined with the computer's name.
/// Entries whose computer has been deleted are not shown.
pub async fn list_logs<C, S, L, U>(
    State(state): State<AppState<C, S, L, U>>,
) -> Result<Json<Vec<LogEntryResponse>>, ApiError>
where
    C: ComputerRegistry,
    S: Send + Sync,
    L: MaintenanceLogStore,
    U: Send + Sync,
{
    let entries = state
        .logs
        .entries()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let computers = state
        .computers
        .computers()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let names: HashMap<ComputerId, Box<str>> =
        computers.into_iter().map(|c| (c.id, c.name)).collect();

    let response = entries
        .into_iter()
        .filter_map(|entry| {
            let name = names.get(&entry.computer_id)?;
            Some(LogEntryResponse {
                id: entry.id.0.to_string(),
                computer_id: entry.computer_id.0.to_string(),
                computer_name: name.to_string(),
                date: entry.date.to_string(),
                description: entry.description.into_string(),
            })
        })
        .collect();

    Ok(Json(response))
}

/// POST /api/logs
///
/// Records a manual maintenance entry. The date defaults to today (UTC)
/// when left out.
pub async fn create_log<C, S, L, U>(
    State(state): State<AppState<C, S, L, U>>,
    Json(form): Json<CreateLogRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    C: ComputerRegistry,
    S: Send + Sync,
    L: MaintenanceLogStore,
    U: Send + Sync,
{
    let computer_id = ComputerId(parse_id(&form.computer_id)?);
    let computer = state
        .computers
        .computer(computer_id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound(format!("Computer {} not found", form.computer_id)))?;

    let date = match form.date.as_deref().filter(|s| !s.is_empty()) {
        Some(s) => s
            .parse()
            .map_err(|_| ApiError::Validation(format!("Invalid date: {s}")))?,
        None => today_utc(),
    };

    let entry = MaintenanceLog {
        id: LogId(Ulid::new()),
        computer_id,
        date,
        description: form.description.into_boxed_str(),
    };

    state
        .logs
        .append(entry.clone())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(LogEntryResponse {
            id: entry.id.0.to_string(),
            computer_id: entry.computer_id.0.to_string(),
            computer_name: computer.name.into_string(),
            date: entry.date.to_string(),
            description: entry.description.into_string(),
        }),
    ))
}
