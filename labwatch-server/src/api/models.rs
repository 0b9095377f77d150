use serde::{Deserialize, Serialize};

use labwatch_core::{Computer, ComputerStatus};

// Computer Request/Response Models
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateComputerRequest {
    pub name: String,
    /// Generated when absent or empty.
    #[serde(default)]
    pub ip: Option<String>,
    /// Generated when absent or empty.
    #[serde(default)]
    pub mac: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Defaults to `offline`.
    #[serde(default)]
    pub status: Option<ComputerStatus>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateComputerRequest {
    pub name: String,
    pub ip: String,
    pub mac: String,
    pub location: String,
    pub status: ComputerStatus,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ComputerResponse {
    pub id: String,
    pub name: String,
    pub ip: String,
    pub mac: String,
    pub location: String,
    pub status: ComputerStatus,
    pub enrolled_at: String,
}

/// A computer as shown on the inventory screen, with its audit entry
/// count and the earliest date it appears on the schedule.
#[derive(Debug, Serialize, Deserialize)]
pub struct ComputerOverview {
    pub id: String,
    pub name: String,
    pub ip: String,
    pub mac: String,
    pub location: String,
    pub status: ComputerStatus,
    pub enrolled_at: String,
    pub log_count: u64,
    pub next_maintenance: Option<String>,
}

pub fn computer_to_response(computer: Computer) -> ComputerResponse {
    ComputerResponse {
        id: computer.id.0.to_string(),
        name: computer.name.into_string(),
        ip: computer.addr.into_string(),
        mac: computer.mac.to_string(),
        location: computer.location.into_string(),
        status: computer.status,
        enrolled_at: computer.enrolled_at.to_string(),
    }
}

pub fn computer_to_overview(
    computer: Computer,
    log_count: u64,
    next_maintenance: Option<String>,
) -> ComputerOverview {
    ComputerOverview {
        id: computer.id.0.to_string(),
        name: computer.name.into_string(),
        ip: computer.addr.into_string(),
        mac: computer.mac.to_string(),
        location: computer.location.into_string(),
        status: computer.status,
        enrolled_at: computer.enrolled_at.to_string(),
        log_count,
        next_maintenance,
    }
}

// Maintenance Log Request/Response Models
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateLogRequest {
    pub computer_id: String,
    /// Defaults to today (UTC) when absent or empty.
    #[serde(default)]
    pub date: Option<String>,
    pub description: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LogEntryResponse {
    pub id: String,
    pub computer_id: String,
    pub computer_name: String,
    pub date: String,
    pub description: String,
}

// Schedule Request/Response Models
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateScheduleRequest {
    pub computer_id: String,
    pub scheduled_date: String,
    pub task: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScheduleEntryResponse {
    pub id: String,
    pub computer_id: String,
    pub computer_name: String,
    pub scheduled_date: String,
    pub task: String,
}

// User/Auth Request/Response Models
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub user: UserResponse,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OkResponse {
    pub success: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeletedResponse {
    pub deleted: u64,
}
