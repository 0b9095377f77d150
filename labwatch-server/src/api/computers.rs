use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use rand::Rng;
use ulid::Ulid;

use labwatch_core::{Computer, ComputerId, ComputerStatus, ComputerUpdate, MacAddr};

use crate::AppState;
use crate::registry::{ComputerRegistry, MaintenanceLogStore, ScheduleStore};

use super::error::ApiError;
use super::models::{
    ComputerOverview, ComputerResponse, CreateComputerRequest, DeletedResponse,
    UpdateComputerRequest, computer_to_overview, computer_to_response,
};
use super::parse_id;

/// GET /api/computers
///
/// The inventory ordered by name, each computer annotated with its
/// audit entry count and the earliest scheduled maintenance date.
pub async fn list_computers<C, S, L, U>(
    State(state): State<AppState<C, S, L, U>>,
) -> Result<Json<Vec<ComputerOverview>>, ApiError>
where
    C: ComputerRegistry,
    S: ScheduleStore,
    L: MaintenanceLogStore,
    U: Send + Sync,
{
    let computers = state
        .computers
        .computers()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let counts = state
        .logs
        .counts_by_computer()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;
    let next = state
        .schedule
        .next_by_computer()
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    let overviews = computers
        .into_iter()
        .map(|c| {
            let log_count = counts.get(&c.id).copied().unwrap_or(0);
            let next_maintenance = next.get(&c.id).map(|d| d.to_string());
            computer_to_overview(c, log_count, next_maintenance)
        })
        .collect();

    Ok(Json(overviews))
}

/// POST /api/computers
///
/// Missing or empty `ip`/`mac` fields are filled in with generated
/// values; a missing `status` starts the computer as `offline`.
pub async fn create_computer<C, S, L, U>(
    State(state): State<AppState<C, S, L, U>>,
    Json(form): Json<CreateComputerRequest>,
) -> Result<impl IntoResponse, ApiError>
where
    C: ComputerRegistry,
    S: Send + Sync,
    L: Send + Sync,
    U: Send + Sync,
{
    let addr = match form.ip.as_deref().filter(|s| !s.is_empty()) {
        Some(ip) => ip.into(),
        None => generate_lab_ip(),
    };
    let mac = match form.mac.as_deref().filter(|s| !s.is_empty()) {
        Some(s) => s
            .parse()
            .map_err(|_| ApiError::Validation(format!("Invalid MAC address: {s}")))?,
        None => generate_mac(),
    };

    let computer = Computer {
        id: ComputerId(Ulid::new()),
        name: form.name.into_boxed_str(),
        addr,
        mac,
        location: form.location.unwrap_or_default().into_boxed_str(),
        status: form.status.unwrap_or(ComputerStatus::Offline),
        enrolled_at: jiff::Timestamp::now(),
    };

    state
        .computers
        .register(computer.clone())
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((StatusCode::CREATED, Json(computer_to_response(computer))))
}

/// PUT /api/computers/{id}
pub async fn update_computer<C, S, L, U>(
    State(state): State<AppState<C, S, L, U>>,
    Path(id): Path<String>,
    Json(form): Json<UpdateComputerRequest>,
) -> Result<Json<ComputerResponse>, ApiError>
where
    C: ComputerRegistry,
    S: Send + Sync,
    L: Send + Sync,
    U: Send + Sync,
{
    let computer_id = ComputerId(parse_id(&id)?);
    let mac: MacAddr = form
        .mac
        .parse()
        .map_err(|_| ApiError::Validation(format!("Invalid MAC address: {}", form.mac)))?;

    let update = ComputerUpdate {
        name: form.name.into_boxed_str(),
        addr: form.ip.into_boxed_str(),
        mac,
        location: form.location.into_boxed_str(),
        status: form.status,
    };

    let updated = state
        .computers
        .update(computer_id, update)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .ok_or_else(|| ApiError::NotFound(format!("Computer {id} not found")))?;

    Ok(Json(computer_to_response(updated)))
}

/// DELETE /api/computers/{id}
///
/// Deleting is idempotent; the response reports how many rows went
/// away. Log and schedule entries for the computer are kept.
pub async fn delete_computer<C, S, L, U>(
    State(state): State<AppState<C, S, L, U>>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError>
where
    C: ComputerRegistry,
    S: Send + Sync,
    L: Send + Sync,
    U: Send + Sync,
{
    let computer_id = ComputerId(parse_id(&id)?);

    let deleted = state
        .computers
        .remove(computer_id)
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(DeletedResponse {
        deleted: deleted as u64,
    }))
}

/// Address in the lab's 192.168.0.0/16 block.
fn generate_lab_ip() -> Box<str> {
    let mut rng = rand::rng();
    let a: u8 = rng.random();
    let b: u8 = rng.random();

    format!("192.168.{a}.{b}").into_boxed_str()
}

fn generate_mac() -> MacAddr {
    MacAddr(rand::rng().random())
}
