use std::collections::HashMap;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use ulid::Ulid;

use labwatch_core::{ComputerId, ScheduleEntry, ScheduleId};

use crate::AppState;
use crate::registry::{ComputerRegistry, ScheduleStore};

use super::error::ApiError;
use super::models::{CreateScheduleRequest, ScheduleEntryResponse};
use super::parse_id;

/// GET /api/schedule
///
/// Planned maintenance in date order, joined with the computer's name.
/// Entries whose computer has been deleted are not shown.
pub async fn list_schedule<C, S, L, U>(
    State(state): State<AppState<C, S, L, U>>,
) -> Result<Json<Vec<ScheduleEntryResponse>>, ApiError>
where
    C: ComputerRegistry,
    S: ScheduleStore,
    L: Send + Sync,
    U: Send + Sync,
{
    let entries = state
        .schedule
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
            Some(ScheduleEntryResponse {
                id: entry.id.0.to_string(),
                computer_id: entry.computer_id.0.to_string(),
                computer_name: name.to_string(),
                scheduled_date: entry.scheduled_date.to_string(),
                task: entry.task.into_string(),
            })
        })
        .collect();

    Ok(Json(response))
}

/// POST /api/schedule
pub async fn create_entry<C, S, L, U>(
    State(state): State<AppState<C, S, L, U>>,
    Json(form): Json<CreateScheduleRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    C: ComputerRegistry,
    S: ScheduleStore,
    L: Send + Sync,
    U: Send + Sync,
{
    let computer_id = ComputerId(parse_id(&form.computer_id)?);
    let computer = state
        .computers
        .computer(computer_id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound(format!("Computer {} not found", form.computer_id)))?;

    let scheduled_date = form
        .scheduled_date
        .parse()
        .map_err(|_| ApiError::Validation(format!("Invalid date: {}", form.scheduled_date)))?;

    let entry = ScheduleEntry {
        id: ScheduleId(Ulid::new()),
        computer_id,
        scheduled_date,
        task: form.task.into_boxed_str(),
    };

    state
        .schedule
        .add(entry.clone())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(ScheduleEntryResponse {
            id: entry.id.0.to_string(),
            computer_id: entry.computer_id.0.to_string(),
            computer_name: computer.name.into_string(),
            scheduled_date: entry.scheduled_date.to_string(),
            task: entry.task.into_string(),
        }),
    ))
}
